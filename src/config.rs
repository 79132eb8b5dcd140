use std::{env, fmt};

use crate::email::EmailAddress;

const DEFAULT_MAIL_PORT: u16 = 25;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_NO_REPLY_ADDRESS: &str = "no-reply@generic";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// Which RSA key the service loads at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerMode {
  /// Public key only, tokens can be verified but not issued.
  Verify,
  /// Private key, tokens can be issued and verified.
  Sign,
}

/// SMTP values exactly as found in the environment.
#[derive(Clone, Default)]
pub struct MailEnv {
  pub host: String,
  pub port: u16,
  pub username: Option<String>,
  pub password: Option<String>,
  pub insecure: bool,
}

impl fmt::Debug for MailEnv {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MailEnv")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("username", &self.username)
      .field("password", &self.password.as_ref().map(|_| "***"))
      .field("insecure", &self.insecure)
      .finish()
  }
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct Settings {
  pub mail: MailEnv,
  pub mail_service_uri: String,
  pub frontend_url: String,
  pub no_reply: EmailAddress,
  pub public_rsa_key: Option<String>,
  pub private_rsa_key: Option<String>,
  pub signer_mode: SignerMode,
  pub bind_address: String,
  pub template_dir: String,
}

impl fmt::Debug for Settings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Settings")
      .field("mail", &self.mail)
      .field("mail_service_uri", &self.mail_service_uri)
      .field("frontend_url", &self.frontend_url)
      .field("no_reply", &self.no_reply)
      .field("public_rsa_key", &self.public_rsa_key.is_some())
      .field("private_rsa_key", &self.private_rsa_key.is_some())
      .field("signer_mode", &self.signer_mode)
      .field("bind_address", &self.bind_address)
      .field("template_dir", &self.template_dir)
      .finish()
  }
}

impl Settings {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| env::var_os(key).map(|value| value.to_string_lossy().into_owned()))
  }

  /// Builds settings from an arbitrary variable source.
  ///
  /// `lookup` returns `None` for an unset variable and `Some("")` for one that
  /// is set but empty; only `MAIL_INSECURE` treats the two differently.
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

    let mail = MailEnv {
      host: lookup("MAIL_HOST").unwrap_or_default(),
      port: lookup("MAIL_PORT")
        .and_then(|port| port.trim().parse().ok())
        .unwrap_or(DEFAULT_MAIL_PORT),
      username: non_empty("MAIL_USERNAME"),
      password: non_empty("MAIL_PASSWORD"),
      insecure: lookup("MAIL_INSECURE").is_some(),
    };

    let no_reply = EmailAddress {
      address: non_empty("NO_REPLY_MAIL_ADDRESS").unwrap_or_else(|| DEFAULT_NO_REPLY_ADDRESS.to_string()),
      name: non_empty("NO_REPLY_MAIL_NAME"),
    };

    let signer_mode = match lookup("JWT_SIGNER_MODE").as_deref().map(str::trim) {
      Some(mode) if mode.eq_ignore_ascii_case("sign") => SignerMode::Sign,
      _ => SignerMode::Verify,
    };

    Settings {
      mail,
      mail_service_uri: lookup("MAIL_SERVICE_URI").unwrap_or_default(),
      frontend_url: non_empty("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
      no_reply,
      public_rsa_key: non_empty("PUBLIC_RSA_KEY_FOR_VERIFYING"),
      private_rsa_key: non_empty("PRIVATE_RSA_KEY_FOR_SIGNING"),
      signer_mode,
      bind_address: non_empty("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
      template_dir: non_empty("EMAIL_TEMPLATE_DIR").unwrap_or_else(|| DEFAULT_TEMPLATE_DIR.to_string()),
    }
  }

  /// Absolute frontend URL for `path`, e.g. a CTA destination.
  pub fn frontend_link(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.frontend_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}
