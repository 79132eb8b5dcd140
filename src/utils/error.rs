use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

use crate::{
  domains::session::model::SessionError,
  email::{MailError, TemplateRenderError},
  utils::jwt::SignerError,
};

#[derive(Debug)]
pub struct AppError {
  pub status_code: StatusCode,
  pub message: String,
}

impl AppError {
  pub fn new(status_code: StatusCode, message: impl Into<String>) -> Self {
    Self {
      status_code,
      message: message.into(),
    }
  }

  pub fn bad_request(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_REQUEST, message)
  }

  pub fn unauthorized(message: impl Into<String>) -> Self {
    Self::new(StatusCode::UNAUTHORIZED, message)
  }

  pub fn unprocessable(message: impl Into<String>) -> Self {
    Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
  }

  pub fn internal_server_error(message: impl Into<String>) -> Self {
    Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
  }

  pub fn bad_gateway(message: impl Into<String>) -> Self {
    Self::new(StatusCode::BAD_GATEWAY, message)
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let body = Json(json!({
      "error": self.message,
      "status_code": self.status_code.as_u16(),
    }));

    (self.status_code, body).into_response()
  }
}

impl From<AppError> for StatusCode {
  fn from(err: AppError) -> Self {
    err.status_code
  }
}

impl From<validator::ValidationErrors> for AppError {
  fn from(errors: validator::ValidationErrors) -> Self {
    AppError::unprocessable(format!("Validation failed: {}", errors))
  }
}

impl From<TemplateRenderError> for AppError {
  fn from(error: TemplateRenderError) -> Self {
    match error {
      TemplateRenderError::NotFound(name) => AppError::bad_request(format!("Unknown email template: {}", name)),
      other => {
        tracing::error!("Template error: {}", other);
        AppError::internal_server_error("Failed to render email")
      }
    }
  }
}

impl From<MailError> for AppError {
  fn from(error: MailError) -> Self {
    match error {
      MailError::InvalidAddress(addr) => AppError::bad_request(format!("Invalid email address: {}", addr)),
      MailError::NoRecipients => AppError::bad_request("At least one recipient is required"),
      MailError::Template(err) => err.into(),
      MailError::Build(msg) => {
        tracing::error!("Message build error: {}", msg);
        AppError::internal_server_error("Failed to build email")
      }
      MailError::Smtp(msg) => {
        tracing::error!("SMTP error: {}", msg);
        AppError::bad_gateway("Mail delivery failed")
      }
    }
  }
}

impl From<SignerError> for AppError {
  fn from(error: SignerError) -> Self {
    match error {
      SignerError::Jwt(_) => AppError::unauthorized("Invalid token"),
      other => {
        tracing::error!("Signer error: {}", other);
        AppError::internal_server_error("Token signer unavailable")
      }
    }
  }
}

impl From<SessionError> for AppError {
  fn from(error: SessionError) -> Self {
    AppError::unauthorized(error.to_string())
  }
}
