use std::fmt;

use lettre::{
  transport::smtp::{
    authentication::Credentials,
    client::{Tls, TlsParameters},
  },
  AsyncSmtpTransport, Tokio1Executor,
};
use serde::Serialize;

use crate::{config::Settings, convert::PublicConvertible};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
  None,
  StartTlsWhenAvailable,
}

#[derive(Clone, PartialEq, Eq)]
pub enum SmtpCredentials {
  Anonymous,
  UsernamePassword(String, String),
}

impl fmt::Debug for SmtpCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SmtpCredentials::Anonymous => f.write_str("Anonymous"),
      SmtpCredentials::UsernamePassword(username, _) => {
        f.debug_tuple("UsernamePassword").field(username).field(&"***").finish()
      }
    }
  }
}

/// Explicit values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct MailSetup {
  pub hostname: Option<String>,
  pub port: Option<u16>,
  pub username: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailConfiguration {
  pub hostname: String,
  pub port: u16,
  pub tls_policy: TlsPolicy,
  pub credentials: SmtpCredentials,
}

impl MailConfiguration {
  /// Resolves SMTP settings; never fails, anything missing falls back to a default.
  pub fn setup(settings: &Settings, overrides: MailSetup) -> Self {
    let env = &settings.mail;

    let hostname = overrides.hostname.unwrap_or_else(|| env.host.clone());
    let port = overrides.port.unwrap_or(env.port);
    let username = overrides.username.or_else(|| env.username.clone());
    let password = overrides.password.or_else(|| env.password.clone());

    let credentials = match (username, password) {
      (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
        SmtpCredentials::UsernamePassword(username, password)
      }
      _ => SmtpCredentials::Anonymous,
    };

    let tls_policy = if env.insecure {
      TlsPolicy::None
    } else {
      TlsPolicy::StartTlsWhenAvailable
    };

    MailConfiguration {
      hostname,
      port,
      tls_policy,
      credentials,
    }
  }

  pub fn transport(&self) -> AsyncSmtpTransport<Tokio1Executor> {
    let tls = match self.tls_policy {
      TlsPolicy::None => Tls::None,
      TlsPolicy::StartTlsWhenAvailable => match TlsParameters::new(self.hostname.clone()) {
        Ok(parameters) => Tls::Opportunistic(parameters),
        Err(e) => {
          tracing::warn!("Could not prepare TLS for {}, using plaintext SMTP: {}", self.hostname, e);
          Tls::None
        }
      },
    };

    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.hostname)
      .port(self.port)
      .tls(tls);

    if let SmtpCredentials::UsernamePassword(username, password) = &self.credentials {
      builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
    }

    builder.build()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
  Anonymous,
  Password,
}

/// SMTP settings without secrets, safe to return from the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicMailSettings {
  pub hostname: String,
  pub port: u16,
  pub tls_policy: TlsPolicy,
  pub auth_mode: AuthMode,
  pub username: Option<String>,
}

impl PublicConvertible for MailConfiguration {
  type Public = PublicMailSettings;

  fn convert_to_public(&self) -> PublicMailSettings {
    let (auth_mode, username) = match &self.credentials {
      SmtpCredentials::Anonymous => (AuthMode::Anonymous, None),
      SmtpCredentials::UsernamePassword(username, _) => (AuthMode::Password, Some(username.clone())),
    };

    PublicMailSettings {
      hostname: self.hostname.clone(),
      port: self.port,
      tls_policy: self.tls_policy,
      auth_mode,
      username,
    }
  }
}
