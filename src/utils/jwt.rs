use std::fmt;

use base64::prelude::*;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::{
  pkcs1::DecodeRsaPrivateKey,
  pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding},
  RsaPrivateKey,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Settings;

pub const PUBLIC_KEY_VAR: &str = "PUBLIC_RSA_KEY_FOR_VERIFYING";
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_RSA_KEY_FOR_SIGNING";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub user_id: i32,
  pub exp: i64,
  pub iat: i64,
  pub jti: String,
}

impl Claims {
  pub fn new(user_id: i32, sub: impl Into<String>, ttl: Duration) -> Self {
    let now = Utc::now();

    Claims {
      sub: sub.into(),
      user_id,
      exp: (now + ttl).timestamp(),
      iat: now.timestamp(),
      jti: Uuid::new_v4().to_string(),
    }
  }
}

#[derive(Debug)]
pub enum SignerError {
  MissingKey(&'static str),
  InvalidBase64(&'static str, String),
  InvalidKey(String),
  VerifyOnly,
  Jwt(jsonwebtoken::errors::Error),
}

impl std::error::Error for SignerError {}

impl fmt::Display for SignerError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SignerError::MissingKey(var) => write!(f, "{} environment variable must be set", var),
      SignerError::InvalidBase64(var, msg) => write!(f, "{} is not valid base64: {}", var, msg),
      SignerError::InvalidKey(msg) => write!(f, "Invalid RSA key: {}", msg),
      SignerError::VerifyOnly => write!(f, "Signer only holds a public key and cannot issue tokens"),
      SignerError::Jwt(err) => write!(f, "JWT error: {}", err),
    }
  }
}

impl From<jsonwebtoken::errors::Error> for SignerError {
  fn from(err: jsonwebtoken::errors::Error) -> Self {
    SignerError::Jwt(err)
  }
}

/// Decoded PEM bytes of an RSA key.
pub enum SigningKeyMaterial {
  Public(Vec<u8>),
  Private(Vec<u8>),
}

impl SigningKeyMaterial {
  pub fn public_from_settings(settings: &Settings) -> Result<Self, SignerError> {
    decode_key_var(PUBLIC_KEY_VAR, settings.public_rsa_key.as_deref()).map(SigningKeyMaterial::Public)
  }

  pub fn private_from_settings(settings: &Settings) -> Result<Self, SignerError> {
    decode_key_var(PRIVATE_KEY_VAR, settings.private_rsa_key.as_deref()).map(SigningKeyMaterial::Private)
  }
}

fn decode_key_var(var: &'static str, value: Option<&str>) -> Result<Vec<u8>, SignerError> {
  let value = value.ok_or(SignerError::MissingKey(var))?;
  // base64 of a multi-line PEM is often wrapped when pasted into .env files
  let compact: String = value.split_whitespace().collect();

  BASE64_STANDARD
    .decode(compact.as_bytes())
    .map_err(|e| SignerError::InvalidBase64(var, e.to_string()))
}

/// RS256 token signer. Built from a public key it only verifies.
pub struct TokenSigner {
  encoding_key: Option<EncodingKey>,
  decoding_key: DecodingKey,
  validation: Validation,
}

impl TokenSigner {
  pub fn from_material(material: SigningKeyMaterial) -> Result<Self, SignerError> {
    match material {
      SigningKeyMaterial::Public(pem) => Self::from_public_pem(&pem),
      SigningKeyMaterial::Private(pem) => Self::from_private_pem(&pem),
    }
  }

  pub fn from_public_pem(pem: &[u8]) -> Result<Self, SignerError> {
    let decoding_key = DecodingKey::from_rsa_pem(pem).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
    Ok(Self::with_keys(None, decoding_key))
  }

  pub fn from_private_pem(pem: &[u8]) -> Result<Self, SignerError> {
    let encoding_key = EncodingKey::from_rsa_pem(pem).map_err(|e| SignerError::InvalidKey(e.to_string()))?;

    let pem = std::str::from_utf8(pem).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
    let private_key = match RsaPrivateKey::from_pkcs8_pem(pem) {
      Ok(key) => key,
      Err(_) => RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| SignerError::InvalidKey(e.to_string()))?,
    };
    let public_pem = private_key
      .to_public_key()
      .to_public_key_pem(LineEnding::LF)
      .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
    let decoding_key =
      DecodingKey::from_rsa_pem(public_pem.as_bytes()).map_err(|e| SignerError::InvalidKey(e.to_string()))?;

    Ok(Self::with_keys(Some(encoding_key), decoding_key))
  }

  fn with_keys(encoding_key: Option<EncodingKey>, decoding_key: DecodingKey) -> Self {
    Self {
      encoding_key,
      decoding_key,
      validation: Validation::new(Algorithm::RS256),
    }
  }

  pub fn can_sign(&self) -> bool {
    self.encoding_key.is_some()
  }

  pub fn encode_jwt(&self, claims: &Claims) -> Result<String, SignerError> {
    let key = self.encoding_key.as_ref().ok_or(SignerError::VerifyOnly)?;
    Ok(encode(&Header::new(Algorithm::RS256), claims, key)?)
  }

  pub fn decode_jwt(&self, token: &str) -> Result<Claims, SignerError> {
    let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
    Ok(token_data.claims)
  }
}

impl fmt::Debug for TokenSigner {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenSigner")
      .field("algorithm", &Algorithm::RS256)
      .field("can_sign", &self.can_sign())
      .finish()
  }
}

/// Loads the verification-only signer from `PUBLIC_RSA_KEY_FOR_VERIFYING`.
pub fn configure_public_signer(settings: &Settings) -> Result<TokenSigner, SignerError> {
  TokenSigner::from_material(SigningKeyMaterial::public_from_settings(settings)?)
}

/// Loads the signing signer from `PRIVATE_RSA_KEY_FOR_SIGNING`.
pub fn configure_private_signer(settings: &Settings) -> Result<TokenSigner, SignerError> {
  TokenSigner::from_material(SigningKeyMaterial::private_from_settings(settings)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  const PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa_public.pem");
  const PRIVATE_PEM: &str = include_str!("../../tests/fixtures/rsa_private.pem");
  const OTHER_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa_public_other.pem");

  fn settings_from(vars: &[(&str, String)]) -> Settings {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    Settings::from_lookup(|key| vars.get(key).cloned())
  }

  #[test]
  fn test_private_signer_round_trip() {
    let settings = settings_from(&[(PRIVATE_KEY_VAR, BASE64_STANDARD.encode(PRIVATE_PEM))]);
    let signer = configure_private_signer(&settings).unwrap();
    assert!(signer.can_sign());

    let claims = Claims::new(42, "jane@example.com", Duration::hours(1));
    let token = signer.encode_jwt(&claims).unwrap();
    let decoded = signer.decode_jwt(&token).unwrap();

    assert_eq!(decoded.user_id, 42);
    assert_eq!(decoded.sub, "jane@example.com");
    assert_eq!(decoded.jti, claims.jti);
  }

  #[test]
  fn test_public_signer_verifies_private_tokens() {
    let signer = TokenSigner::from_private_pem(PRIVATE_PEM.as_bytes()).unwrap();
    let verifier = TokenSigner::from_public_pem(PUBLIC_PEM.as_bytes()).unwrap();
    assert!(!verifier.can_sign());

    let token = signer
      .encode_jwt(&Claims::new(7, "bob@example.com", Duration::minutes(5)))
      .unwrap();
    assert_eq!(verifier.decode_jwt(&token).unwrap().user_id, 7);
  }

  #[test]
  fn test_public_signer_cannot_sign() {
    let verifier = TokenSigner::from_public_pem(PUBLIC_PEM.as_bytes()).unwrap();
    let result = verifier.encode_jwt(&Claims::new(1, "a@example.com", Duration::minutes(5)));
    assert!(matches!(result, Err(SignerError::VerifyOnly)));
  }

  #[test]
  fn test_other_key_rejects_token() {
    let signer = TokenSigner::from_private_pem(PRIVATE_PEM.as_bytes()).unwrap();
    let other = TokenSigner::from_public_pem(OTHER_PUBLIC_PEM.as_bytes()).unwrap();

    let token = signer
      .encode_jwt(&Claims::new(1, "a@example.com", Duration::minutes(5)))
      .unwrap();
    assert!(matches!(other.decode_jwt(&token), Err(SignerError::Jwt(_))));
  }

  #[test]
  fn test_expired_token_is_rejected() {
    let signer = TokenSigner::from_private_pem(PRIVATE_PEM.as_bytes()).unwrap();
    let token = signer
      .encode_jwt(&Claims::new(1, "a@example.com", Duration::hours(-2)))
      .unwrap();
    assert!(signer.decode_jwt(&token).is_err());
  }

  #[test]
  fn test_missing_key_variable() {
    let settings = settings_from(&[]);

    let err = configure_public_signer(&settings).unwrap_err();
    assert!(matches!(err, SignerError::MissingKey(PUBLIC_KEY_VAR)));

    let err = configure_private_signer(&settings).unwrap_err();
    assert!(matches!(err, SignerError::MissingKey(PRIVATE_KEY_VAR)));
  }

  #[test]
  fn test_invalid_base64() {
    let settings = settings_from(&[(PUBLIC_KEY_VAR, "***not base64***".to_string())]);
    assert!(matches!(
      configure_public_signer(&settings),
      Err(SignerError::InvalidBase64(PUBLIC_KEY_VAR, _))
    ));
  }

  #[test]
  fn test_wrapped_base64_is_accepted() {
    let encoded = BASE64_STANDARD.encode(PUBLIC_PEM);
    let wrapped = encoded
      .as_bytes()
      .chunks(64)
      .map(|chunk| std::str::from_utf8(chunk).unwrap())
      .collect::<Vec<_>>()
      .join("\n");

    let settings = settings_from(&[(PUBLIC_KEY_VAR, wrapped)]);
    assert!(configure_public_signer(&settings).is_ok());
  }

  #[test]
  fn test_valid_base64_but_not_a_key() {
    let settings = settings_from(&[(PUBLIC_KEY_VAR, BASE64_STANDARD.encode("hello world"))]);
    assert!(matches!(configure_public_signer(&settings), Err(SignerError::InvalidKey(_))));
  }

  #[test]
  fn test_public_key_in_private_variable_is_rejected() {
    let settings = settings_from(&[(PRIVATE_KEY_VAR, BASE64_STANDARD.encode(PUBLIC_PEM))]);
    assert!(matches!(configure_private_signer(&settings), Err(SignerError::InvalidKey(_))));
  }
}
