use chrono::{Datelike, Utc};
use lettre::{message::Mailbox, Address};
use serde::{Deserialize, Serialize};

use super::MailError;

const DEFAULT_GREETING: &str = "Hello,";
const DEFAULT_WRONG_RECIPIENT_DESCRIPTION: &str =
  "If you did not expect this email, you can safely ignore it. Someone may have entered your address by mistake.";
const DEFAULT_THANKS_GREETING: &str = "Thanks,";
const DEFAULT_THANKS_GREETER: &str = "The Team";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress {
  pub address: String,
  #[serde(default)]
  pub name: Option<String>,
}

impl EmailAddress {
  pub fn new(address: impl Into<String>) -> Self {
    EmailAddress {
      address: address.into(),
      name: None,
    }
  }

  pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
    EmailAddress {
      address: address.into(),
      name: Some(name.into()),
    }
  }

  pub fn to_mailbox(&self) -> Result<Mailbox, MailError> {
    let address: Address = self
      .address
      .parse()
      .map_err(|_| MailError::InvalidAddress(self.address.clone()))?;

    Ok(Mailbox::new(self.name.clone(), address))
  }
}

/// Template context for a transactional email built around a single call to action.
///
/// At least one of `to`, `cc` or `bcc` must be non-empty for the email to be
/// deliverable; construction does not check this.
#[derive(Debug, Clone, Serialize)]
pub struct CtaEmailContext {
  pub subject: String,
  pub from: EmailAddress,
  pub to: Option<Vec<EmailAddress>>,
  pub cc: Option<Vec<EmailAddress>>,
  pub bcc: Option<Vec<EmailAddress>>,
  pub reply_to: Option<EmailAddress>,
  pub reference: Option<String>,
  pub title: String,
  pub preheader: String,
  pub image_url: Option<String>,
  pub greeting: String,
  pub headline: String,
  pub cta_description: String,
  pub cta_destination: String,
  pub cta_label: String,
  pub wrong_recipient_description: String,
  pub thanks_greeting: String,
  pub thanks_greeter: String,
  pub copyright_year: i32,
}

impl CtaEmailContext {
  pub fn new(
    subject: impl Into<String>,
    from: EmailAddress,
    preheader: impl Into<String>,
    headline: impl Into<String>,
    cta_description: impl Into<String>,
    cta_destination: impl Into<String>,
    cta_label: impl Into<String>,
  ) -> Self {
    let subject = subject.into();

    CtaEmailContext {
      title: subject.clone(),
      subject,
      from,
      to: None,
      cc: None,
      bcc: None,
      reply_to: None,
      reference: None,
      preheader: preheader.into(),
      image_url: None,
      greeting: DEFAULT_GREETING.to_string(),
      headline: headline.into(),
      cta_description: cta_description.into(),
      cta_destination: cta_destination.into(),
      cta_label: cta_label.into(),
      wrong_recipient_description: DEFAULT_WRONG_RECIPIENT_DESCRIPTION.to_string(),
      thanks_greeting: DEFAULT_THANKS_GREETING.to_string(),
      thanks_greeter: DEFAULT_THANKS_GREETER.to_string(),
      copyright_year: Utc::now().year(),
    }
  }

  pub fn with_to(mut self, to: Vec<EmailAddress>) -> Self {
    self.to = Some(to);
    self
  }

  pub fn with_cc(mut self, cc: Vec<EmailAddress>) -> Self {
    self.cc = Some(cc);
    self
  }

  pub fn with_bcc(mut self, bcc: Vec<EmailAddress>) -> Self {
    self.bcc = Some(bcc);
    self
  }

  pub fn with_reply_to(mut self, reply_to: EmailAddress) -> Self {
    self.reply_to = Some(reply_to);
    self
  }

  pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
    self.reference = Some(reference.into());
    self
  }

  pub fn with_title(mut self, title: impl Into<String>) -> Self {
    self.title = title.into();
    self
  }

  pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
    self.image_url = Some(image_url.into());
    self
  }

  pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
    self.greeting = greeting.into();
    self
  }

  pub fn with_wrong_recipient_description(mut self, description: impl Into<String>) -> Self {
    self.wrong_recipient_description = description.into();
    self
  }

  pub fn with_thanks(mut self, greeting: impl Into<String>, greeter: impl Into<String>) -> Self {
    self.thanks_greeting = greeting.into();
    self.thanks_greeter = greeter.into();
    self
  }

  pub fn has_recipients(&self) -> bool {
    [&self.to, &self.cc, &self.bcc]
      .into_iter()
      .any(|list| list.as_ref().is_some_and(|addresses| !addresses.is_empty()))
  }
}
