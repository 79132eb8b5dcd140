use std::sync::Arc;

use async_trait::async_trait;
use lettre::{message::header::ContentType, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{CtaEmailContext, EmailAddress, EmailRenderer, MailConfiguration, MailError};

/// Delivers fully built messages.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
  async fn send(&self, message: Message) -> Result<(), MailError>;
}

#[derive(Clone)]
pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
  pub fn new(config: &MailConfiguration) -> Self {
    tracing::info!(
      "SMTP transport configured for {}:{} (tls: {:?})",
      config.hostname,
      config.port,
      config.tls_policy
    );

    Self {
      transport: config.transport(),
    }
  }
}

#[async_trait]
impl Mailer for SmtpMailer {
  async fn send(&self, message: Message) -> Result<(), MailError> {
    self
      .transport
      .send(message)
      .await
      .map_err(|e| MailError::Smtp(e.to_string()))?;
    Ok(())
  }
}

#[derive(Clone)]
pub struct EmailService {
  renderer: EmailRenderer,
  mailer: Arc<dyn Mailer>,
}

impl EmailService {
  pub fn new(renderer: EmailRenderer, mailer: Arc<dyn Mailer>) -> Self {
    Self { renderer, mailer }
  }

  pub fn renderer(&self) -> &EmailRenderer {
    &self.renderer
  }

  pub async fn render_cta(&self, template: &str, ctx: &CtaEmailContext) -> Result<String, MailError> {
    Ok(self.renderer.render(template, ctx).await?)
  }

  pub async fn send_cta(&self, template: &str, ctx: &CtaEmailContext) -> Result<(), MailError> {
    if !ctx.has_recipients() {
      return Err(MailError::NoRecipients);
    }

    let html = self.render_cta(template, ctx).await?;
    let message = build_message(ctx, html)?;

    match self.mailer.send(message).await {
      Ok(()) => {
        tracing::info!("Sent \"{}\" email using {}", ctx.subject, template);
        Ok(())
      }
      Err(e) => {
        tracing::error!("Failed to send \"{}\" email: {}", ctx.subject, e);
        Err(e)
      }
    }
  }
}

fn recipients(list: &Option<Vec<EmailAddress>>) -> &[EmailAddress] {
  list.as_deref().unwrap_or_default()
}

pub fn build_message(ctx: &CtaEmailContext, html: String) -> Result<Message, MailError> {
  let mut builder = Message::builder().from(ctx.from.to_mailbox()?).subject(&ctx.subject);

  for address in recipients(&ctx.to) {
    builder = builder.to(address.to_mailbox()?);
  }
  for address in recipients(&ctx.cc) {
    builder = builder.cc(address.to_mailbox()?);
  }
  for address in recipients(&ctx.bcc) {
    builder = builder.bcc(address.to_mailbox()?);
  }

  if let Some(reply_to) = &ctx.reply_to {
    builder = builder.reply_to(reply_to.to_mailbox()?);
  }

  if let Some(reference) = &ctx.reference {
    builder = builder.references(reference.clone());
  }

  builder
    .header(ContentType::TEXT_HTML)
    .body(html)
    .map_err(|e| MailError::Build(e.to_string()))
}
