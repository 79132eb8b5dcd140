use std::{collections::HashMap, sync::Arc, sync::Mutex};

use async_trait::async_trait;
use axum::{
  body::{Body, Bytes},
  http::{header, Request, StatusCode},
  Router,
};
use base64::prelude::*;
use chrono::Duration;
use lettre::Message;
use serde::Serialize;
use tower::ServiceExt;

use crate::{
  app::create_app,
  config::Settings,
  email::{MailError, MailSetup, Mailer},
  state::{AppStateBuilder, SharedAppState},
  utils::jwt::Claims,
};

const PRIVATE_PEM: &str = include_str!("../tests/fixtures/rsa_private.pem");

#[derive(Default)]
pub struct RecordingMailer {
  pub sent: Mutex<Vec<Message>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
  async fn send(&self, message: Message) -> Result<(), MailError> {
    self.sent.lock().unwrap().push(message);
    Ok(())
  }
}

pub fn test_state(mailer: Arc<RecordingMailer>) -> SharedAppState {
  let vars: HashMap<&str, String> = HashMap::from([
    ("PRIVATE_RSA_KEY_FOR_SIGNING", BASE64_STANDARD.encode(PRIVATE_PEM)),
    ("MAIL_HOST", "smtp.example.com".to_string()),
    ("MAIL_PORT", "587".to_string()),
    ("MAIL_USERNAME", "mailer".to_string()),
    ("MAIL_PASSWORD", "hunter2".to_string()),
    ("FRONTEND_URL", "https://app.example.com".to_string()),
    ("NO_REPLY_MAIL_ADDRESS", "no-reply@example.com".to_string()),
    ("NO_REPLY_MAIL_NAME", "Example".to_string()),
  ]);

  AppStateBuilder::new(Settings::from_lookup(|key| vars.get(key).cloned()))
    .setup_mail(MailSetup::default())
    .with_mailer(mailer)
    .configure_private_signer()
    .expect("configure signer")
    .build()
    .expect("build state")
}

pub fn app_with_mailer() -> (Router, SharedAppState, Arc<RecordingMailer>) {
  let mailer = Arc::new(RecordingMailer::default());
  let state = test_state(mailer.clone());
  (create_app(state.clone()), state, mailer)
}

pub fn bearer(state: &SharedAppState, user_id: i32) -> String {
  let claims = Claims::new(user_id, format!("user{}@example.com", user_id), Duration::hours(1));
  let token = state.signer.encode_jwt(&claims).expect("sign token");
  format!("Bearer {}", token)
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
  let response = app.oneshot(request).await.expect("handle request");
  let status = response.status();
  let body = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("read response body");
  (status, body)
}

pub async fn get(app: Router, uri: &str, authorization: Option<&str>) -> (StatusCode, Bytes) {
  let mut builder = Request::builder().method("GET").uri(uri);
  if let Some(value) = authorization {
    builder = builder.header(header::AUTHORIZATION, value);
  }
  send(app, builder.body(Body::empty()).expect("build request")).await
}

pub async fn post_json<T: Serialize>(
  app: Router,
  uri: &str,
  authorization: Option<&str>,
  body: &T,
) -> (StatusCode, Bytes) {
  let mut builder = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json");
  if let Some(value) = authorization {
    builder = builder.header(header::AUTHORIZATION, value);
  }

  let request = builder
    .body(Body::from(serde_json::to_vec(body).expect("serialize request body")))
    .expect("build request");
  send(app, request).await
}
