use axum::{
  extract::{Json, State},
  http::{HeaderMap, StatusCode},
  response::{Html, Json as JsonResponse},
  routing::{get, post},
  Router,
};
use validator::Validate;

use super::model::CtaEmailRequest;
use crate::{
  convert::PublicConvertible,
  email::PublicMailSettings,
  middleware::auth::authenticate,
  state::SharedAppState,
  utils::error::AppError,
};

pub fn email_routes() -> Router<SharedAppState> {
  Router::new()
    .route("/mail/settings", get(mail_settings_handler))
    .route("/emails/preview", post(preview_email_handler))
    .route("/emails/send", post(send_email_handler))
}

pub async fn mail_settings_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
) -> Result<JsonResponse<PublicMailSettings>, AppError> {
  authenticate(&state.signer, &headers)?;
  Ok(JsonResponse(state.mail.convert_to_public()))
}

pub async fn preview_email_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
  Json(payload): Json<CtaEmailRequest>,
) -> Result<Html<String>, AppError> {
  authenticate(&state.signer, &headers)?;
  payload.validate()?;

  let template = payload.template_name().to_string();
  let ctx = payload.into_context(&state.settings);
  let html = state.email_service.render_cta(&template, &ctx).await?;

  Ok(Html(html))
}

pub async fn send_email_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
  Json(payload): Json<CtaEmailRequest>,
) -> Result<StatusCode, AppError> {
  let claims = authenticate(&state.signer, &headers)?;
  payload.validate()?;

  let template = payload.template_name().to_string();
  let ctx = payload.into_context(&state.settings);
  tracing::info!("User {} requested \"{}\" email", claims.user_id, ctx.subject);
  state.email_service.send_cta(&template, &ctx).await?;

  Ok(StatusCode::ACCEPTED)
}
