use axum::{
  http::{header, HeaderValue, Method},
  response::Html,
  routing::get,
  Router,
};
use tower_http::cors::CorsLayer;

use crate::{
  domains::{email::rest::email_routes, session::rest::session_routes},
  state::SharedAppState,
};

pub fn create_app(state: SharedAppState) -> Router {
  let cors = cors_layer(&state.settings.frontend_url);

  Router::new()
    .route("/", get(hello_world_handler))
    .nest("/api/v1", session_routes().merge(email_routes()))
    .layer(cors)
    .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
  let layer = CorsLayer::new()
    .allow_methods([Method::GET, Method::POST])
    .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

  match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
    Ok(origin) => layer.allow_origin(origin),
    Err(_) => {
      tracing::warn!("FRONTEND_URL {:?} is not a valid origin, cross-origin requests are disabled", frontend_url);
      layer
    }
  }
}

pub async fn hello_world_handler() -> Html<String> {
  Html("<h1>Hello, World!</h1>".to_string())
}
