use std::fmt;

use crate::{email::TemplateRenderError, utils::jwt::SignerError};

/// Errors that stop the service before it accepts traffic.
///
/// None of these are recoverable: `main` returns them and the process exits.
#[derive(Debug)]
pub enum StartupError {
  Signer(SignerError),
  SignerAlreadyConfigured,
  MissingSigner,
  Templates(TemplateRenderError),
}

impl std::error::Error for StartupError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      StartupError::Signer(err) => Some(err),
      StartupError::Templates(err) => Some(err),
      _ => None,
    }
  }
}

impl fmt::Display for StartupError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StartupError::Signer(err) => write!(f, "Token signer setup failed: {}", err),
      StartupError::SignerAlreadyConfigured => write!(f, "A token signer is already configured"),
      StartupError::MissingSigner => write!(f, "No token signer configured"),
      StartupError::Templates(err) => write!(f, "Email templates failed to load: {}", err),
    }
  }
}

impl From<SignerError> for StartupError {
  fn from(err: SignerError) -> Self {
    StartupError::Signer(err)
  }
}

impl From<TemplateRenderError> for StartupError {
  fn from(err: TemplateRenderError) -> Self {
    StartupError::Templates(err)
  }
}
