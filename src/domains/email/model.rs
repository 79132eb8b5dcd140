use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
  config::Settings,
  email::{CtaEmailContext, EmailAddress, CTA_EMAIL_TEMPLATE},
};

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CtaEmailRequest {
  #[serde(default)]
  pub template: Option<String>,
  #[validate(length(min = 1, max = 255, message = "subject must be 1 to 255 characters"))]
  pub subject: String,
  #[serde(default)]
  pub to: Vec<EmailAddress>,
  #[serde(default)]
  pub cc: Vec<EmailAddress>,
  #[serde(default)]
  pub bcc: Vec<EmailAddress>,
  #[serde(default)]
  pub reply_to: Option<EmailAddress>,
  #[serde(default)]
  pub reference: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub preheader: String,
  #[validate(url(message = "image_url must be a valid URL"))]
  #[serde(default)]
  pub image_url: Option<String>,
  #[serde(default)]
  pub greeting: Option<String>,
  #[validate(length(min = 1, message = "headline is required"))]
  pub headline: String,
  #[serde(default)]
  pub cta_description: String,
  /// Absolute URL, or a path resolved against `FRONTEND_URL`.
  #[validate(length(min = 1, message = "cta_destination is required"))]
  pub cta_destination: String,
  #[validate(length(min = 1, message = "cta_label is required"))]
  pub cta_label: String,
}

impl CtaEmailRequest {
  pub fn template_name(&self) -> &str {
    self.template.as_deref().unwrap_or(CTA_EMAIL_TEMPLATE)
  }

  /// Builds the template context, sending from the configured no-reply identity.
  pub fn into_context(self, settings: &Settings) -> CtaEmailContext {
    let destination = if self.cta_destination.starts_with("http://") || self.cta_destination.starts_with("https://") {
      self.cta_destination
    } else {
      settings.frontend_link(&self.cta_destination)
    };

    let mut ctx = CtaEmailContext::new(
      self.subject,
      settings.no_reply.clone(),
      self.preheader,
      self.headline,
      self.cta_description,
      destination,
      self.cta_label,
    );

    if !self.to.is_empty() {
      ctx = ctx.with_to(self.to);
    }
    if !self.cc.is_empty() {
      ctx = ctx.with_cc(self.cc);
    }
    if !self.bcc.is_empty() {
      ctx = ctx.with_bcc(self.bcc);
    }
    if let Some(reply_to) = self.reply_to {
      ctx = ctx.with_reply_to(reply_to);
    }
    if let Some(reference) = self.reference {
      ctx = ctx.with_reference(reference);
    }
    if let Some(title) = self.title {
      ctx = ctx.with_title(title);
    }
    if let Some(image_url) = self.image_url {
      ctx = ctx.with_image_url(image_url);
    }
    if let Some(greeting) = self.greeting {
      ctx = ctx.with_greeting(greeting);
    }

    ctx
  }
}
