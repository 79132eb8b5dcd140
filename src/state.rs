use std::sync::Arc;

use crate::{
  config::{Settings, SignerMode},
  email::{EmailRenderer, EmailService, MailConfiguration, MailSetup, Mailer, SmtpMailer},
  error::StartupError,
  utils::jwt::{self, TokenSigner},
};

#[derive(Clone)]
pub struct SharedAppState {
  pub settings: Arc<Settings>,
  pub mail: Arc<MailConfiguration>,
  pub email_service: EmailService,
  pub signer: Arc<TokenSigner>,
}

/// Runs the one-time configuration steps in order and produces the state the
/// router serves from. Nothing here is shared until [`AppStateBuilder::build`].
pub struct AppStateBuilder {
  settings: Settings,
  mail: Option<MailConfiguration>,
  mailer: Option<Arc<dyn Mailer>>,
  renderer: Option<EmailRenderer>,
  signer: Option<TokenSigner>,
}

impl AppStateBuilder {
  pub fn new(settings: Settings) -> Self {
    Self {
      settings,
      mail: None,
      mailer: None,
      renderer: None,
      signer: None,
    }
  }

  pub fn settings(&self) -> &Settings {
    &self.settings
  }

  /// Resolves SMTP settings from the environment plus `overrides`. Never fails.
  pub fn setup_mail(mut self, overrides: MailSetup) -> Self {
    self.mail = Some(MailConfiguration::setup(&self.settings, overrides));
    self
  }

  /// Replaces the SMTP mailer, e.g. with a recording one in tests.
  pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
    self.mailer = Some(mailer);
    self
  }

  pub fn with_renderer(mut self, renderer: EmailRenderer) -> Self {
    self.renderer = Some(renderer);
    self
  }

  pub fn configure_public_signer(self) -> Result<Self, StartupError> {
    let signer = jwt::configure_public_signer(&self.settings)?;
    self.register_signer(signer)
  }

  pub fn configure_private_signer(self) -> Result<Self, StartupError> {
    let signer = jwt::configure_private_signer(&self.settings)?;
    self.register_signer(signer)
  }

  /// Picks the public or private key according to `JWT_SIGNER_MODE`.
  pub fn configure_signer(self) -> Result<Self, StartupError> {
    match self.settings.signer_mode {
      SignerMode::Verify => self.configure_public_signer(),
      SignerMode::Sign => self.configure_private_signer(),
    }
  }

  pub fn register_signer(mut self, signer: TokenSigner) -> Result<Self, StartupError> {
    if self.signer.is_some() {
      return Err(StartupError::SignerAlreadyConfigured);
    }

    tracing::info!("Registered RS256 token signer (can sign: {})", signer.can_sign());
    self.signer = Some(signer);
    Ok(self)
  }

  pub fn build(self) -> Result<SharedAppState, StartupError> {
    let signer = self.signer.ok_or(StartupError::MissingSigner)?;
    let mail = self
      .mail
      .unwrap_or_else(|| MailConfiguration::setup(&self.settings, MailSetup::default()));
    let renderer = match self.renderer {
      Some(renderer) => renderer,
      None => EmailRenderer::embedded()?,
    };
    let mailer = self.mailer.unwrap_or_else(|| Arc::new(SmtpMailer::new(&mail)));

    Ok(SharedAppState {
      settings: Arc::new(self.settings),
      mail: Arc::new(mail),
      email_service: EmailService::new(renderer, mailer),
      signer: Arc::new(signer),
    })
  }
}
