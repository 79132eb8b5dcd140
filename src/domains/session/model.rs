use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{convert::ThrowingPublicConvertible, utils::jwt::Claims};

/// What a client may learn about its own token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSession {
  pub user_id: i32,
  pub email: String,
  pub issued_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
  InvalidTimestamp(&'static str, i64),
}

impl std::error::Error for SessionError {}

impl fmt::Display for SessionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SessionError::InvalidTimestamp(claim, value) => write!(f, "Token claim {} is out of range: {}", claim, value),
    }
  }
}

fn timestamp(claim: &'static str, value: i64) -> Result<DateTime<Utc>, SessionError> {
  DateTime::from_timestamp(value, 0).ok_or(SessionError::InvalidTimestamp(claim, value))
}

impl ThrowingPublicConvertible for Claims {
  type Public = PublicSession;
  type Error = SessionError;

  fn convert_to_public(&self) -> Result<PublicSession, SessionError> {
    Ok(PublicSession {
      user_id: self.user_id,
      email: self.sub.clone(),
      issued_at: timestamp("iat", self.iat)?,
      expires_at: timestamp("exp", self.exp)?,
    })
  }
}
