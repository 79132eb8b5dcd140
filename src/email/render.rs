use std::{fmt, path::Path, sync::Arc};

use serde::Serialize;
use tera::{Context, ErrorKind, Tera};

pub const CTA_EMAIL_TEMPLATE: &str = "cta_email.html";

const CTA_EMAIL_SOURCE: &str = include_str!("../../templates/cta_email.html");

#[derive(Debug)]
pub enum TemplateRenderError {
  NotFound(String),
  Context(String),
  Render(String),
  Encoding(String),
  Interrupted,
}

impl std::error::Error for TemplateRenderError {}

impl fmt::Display for TemplateRenderError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TemplateRenderError::NotFound(name) => write!(f, "Template not found: {}", name),
      TemplateRenderError::Context(msg) => write!(f, "Invalid template context: {}", msg),
      TemplateRenderError::Render(msg) => write!(f, "Template rendering failed: {}", msg),
      TemplateRenderError::Encoding(msg) => write!(f, "Rendered template is not UTF-8: {}", msg),
      TemplateRenderError::Interrupted => write!(f, "Template rendering was interrupted"),
    }
  }
}

impl From<tera::Error> for TemplateRenderError {
  fn from(err: tera::Error) -> Self {
    match &err.kind {
      ErrorKind::TemplateNotFound(name) => TemplateRenderError::NotFound(name.clone()),
      _ => TemplateRenderError::Render(render_chain(&err)),
    }
  }
}

// tera keeps the useful part ("Variable `x` not found") in the source chain
fn render_chain(err: &tera::Error) -> String {
  let mut message = err.to_string();
  let mut source = std::error::Error::source(err);
  while let Some(cause) = source {
    message.push_str(": ");
    message.push_str(&cause.to_string());
    source = cause.source();
  }
  message
}

/// Renders HTML email bodies with tera.
#[derive(Clone)]
pub struct EmailRenderer {
  tera: Arc<Tera>,
}

impl EmailRenderer {
  /// Loads every `*.html` template under `dir`; the embedded CTA layout fills in
  /// when the directory does not provide its own.
  pub fn new(dir: impl AsRef<Path>) -> Result<Self, TemplateRenderError> {
    let dir = dir.as_ref();

    let mut tera = if dir.is_dir() {
      let tera = Tera::new(&format!("{}/**/*.html", dir.display()))?;
      tracing::info!("Loaded {} email templates from {}", tera.get_template_names().count(), dir.display());
      tera
    } else {
      tracing::debug!("No template directory at {}, using embedded templates", dir.display());
      Tera::default()
    };

    if tera.get_template(CTA_EMAIL_TEMPLATE).is_err() {
      tera.add_raw_template(CTA_EMAIL_TEMPLATE, CTA_EMAIL_SOURCE)?;
    }

    Ok(Self { tera: Arc::new(tera) })
  }

  /// Builds a renderer from in-memory templates only.
  pub fn from_raw<I, N, C>(templates: I) -> Result<Self, TemplateRenderError>
  where
    I: IntoIterator<Item = (N, C)>,
    N: AsRef<str>,
    C: AsRef<str>,
  {
    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(Self { tera: Arc::new(tera) })
  }

  /// The embedded templates alone.
  pub fn embedded() -> Result<Self, TemplateRenderError> {
    Self::from_raw([(CTA_EMAIL_TEMPLATE, CTA_EMAIL_SOURCE)])
  }

  pub fn has_template(&self, name: &str) -> bool {
    self.tera.get_template(name).is_ok()
  }

  pub async fn render<C>(&self, template: &str, context: &C) -> Result<String, TemplateRenderError>
  where
    C: Serialize + ?Sized,
  {
    let context = Context::from_serialize(context).map_err(|e| TemplateRenderError::Context(render_chain(&e)))?;
    let tera = Arc::clone(&self.tera);
    let template = template.to_string();

    let buffer = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, TemplateRenderError> {
      let mut buffer = Vec::new();
      tera.render_to(&template, &context, &mut buffer)?;
      Ok(buffer)
    })
    .await
    .map_err(|_| TemplateRenderError::Interrupted)??;

    String::from_utf8(buffer).map_err(|e| TemplateRenderError::Encoding(e.to_string()))
  }
}
