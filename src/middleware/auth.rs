use axum::http::HeaderMap;

use crate::utils::error::AppError;
use crate::utils::jwt::{Claims, TokenSigner};

pub fn authenticate(signer: &TokenSigner, headers: &HeaderMap) -> Result<Claims, AppError> {
  let auth_header = headers
    .get(axum::http::header::AUTHORIZATION)
    .ok_or_else(|| AppError::unauthorized("Authorization header missing"))?
    .to_str()
    .map_err(|_| AppError::unauthorized("Invalid authorization header"))?;

  let token = auth_header
    .strip_prefix("Bearer ")
    .ok_or_else(|| AppError::unauthorized("Invalid authorization format"))?;

  let claims = signer.decode_jwt(token).map_err(|e| {
    tracing::debug!("Rejected bearer token: {}", e);
    AppError::unauthorized("Invalid token")
  })?;

  Ok(claims)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
  use chrono::Duration;

  const PRIVATE_PEM: &str = include_str!("../../tests/fixtures/rsa_private.pem");

  fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
  }

  #[test]
  fn test_valid_bearer_token() {
    let signer = TokenSigner::from_private_pem(PRIVATE_PEM.as_bytes()).unwrap();
    let token = signer
      .encode_jwt(&Claims::new(5, "jane@example.com", Duration::minutes(10)))
      .unwrap();

    let claims = authenticate(&signer, &headers_with(&format!("Bearer {}", token))).unwrap();
    assert_eq!(claims.user_id, 5);
  }

  #[test]
  fn test_rejections() {
    let signer = TokenSigner::from_private_pem(PRIVATE_PEM.as_bytes()).unwrap();

    let missing = authenticate(&signer, &HeaderMap::new()).unwrap_err();
    assert_eq!(missing.status_code, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message, "Authorization header missing");

    let wrong_scheme = authenticate(&signer, &headers_with("Basic abc")).unwrap_err();
    assert_eq!(wrong_scheme.message, "Invalid authorization format");

    let garbage = authenticate(&signer, &headers_with("Bearer not.a.jwt")).unwrap_err();
    assert_eq!(garbage.message, "Invalid token");
  }
}
