//! Email configuration, rendering and delivery.
//!
//! SMTP settings come from the environment (see [`MailConfiguration::setup`]),
//! bodies are rendered with tera and messages go out through lettre.

mod render;
mod service;
mod transport;
mod types;

use std::fmt;

pub use render::{EmailRenderer, TemplateRenderError, CTA_EMAIL_TEMPLATE};
pub use service::{build_message, EmailService, Mailer, SmtpMailer};
pub use transport::{AuthMode, MailConfiguration, MailSetup, PublicMailSettings, SmtpCredentials, TlsPolicy};
pub use types::{CtaEmailContext, EmailAddress};

#[derive(Debug)]
pub enum MailError {
  InvalidAddress(String),
  NoRecipients,
  Template(TemplateRenderError),
  Build(String),
  Smtp(String),
}

impl std::error::Error for MailError {}

impl fmt::Display for MailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MailError::InvalidAddress(addr) => write!(f, "Invalid email address: {}", addr),
      MailError::NoRecipients => write!(f, "At least one of to, cc or bcc must be set"),
      MailError::Template(err) => write!(f, "{}", err),
      MailError::Build(msg) => write!(f, "Failed to build message: {}", msg),
      MailError::Smtp(msg) => write!(f, "SMTP error: {}", msg),
    }
  }
}

impl From<TemplateRenderError> for MailError {
  fn from(err: TemplateRenderError) -> Self {
    MailError::Template(err)
  }
}
