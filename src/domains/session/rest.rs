use axum::{extract::State, http::HeaderMap, response::Json as JsonResponse, routing::get, Router};

use super::model::PublicSession;
use crate::{
  convert::ThrowingPublicConvertible, middleware::auth::authenticate, state::SharedAppState, utils::error::AppError,
};

pub fn session_routes() -> Router<SharedAppState> {
  Router::new().route("/session", get(session_handler))
}

pub async fn session_handler(
  State(state): State<SharedAppState>,
  headers: HeaderMap,
) -> Result<JsonResponse<PublicSession>, AppError> {
  let claims = authenticate(&state.signer, &headers)?;
  let session = claims.convert_to_public()?;
  Ok(JsonResponse(session))
}

#[cfg(test)]
mod tests {
  use axum::http::StatusCode;
  use serde_json::Value;

  use super::PublicSession;
  use crate::test_support::{app_with_mailer, bearer, get};

  #[tokio::test]
  async fn test_session_describes_token() {
    let (app, state, _) = app_with_mailer();
    let token = bearer(&state, 42);

    let (status, body) = get(app, "/api/v1/session", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let session: PublicSession = serde_json::from_slice(&body).unwrap();
    assert_eq!(session.user_id, 42);
    assert_eq!(session.email, "user42@example.com");
    assert_eq!((session.expires_at - session.issued_at).num_hours(), 1);
  }

  #[tokio::test]
  async fn test_session_rejects_missing_token() {
    let (app, _, _) = app_with_mailer();

    let (status, body) = get(app, "/api/v1/session", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["error"], "Authorization header missing");
    assert_eq!(error["status_code"], 401);
  }

  #[tokio::test]
  async fn test_session_rejects_garbage_token() {
    let (app, _, _) = app_with_mailer();

    let (status, _) = get(app, "/api/v1/session", Some("Bearer not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }
}
