use tokio::signal;
use tracing_subscriber::EnvFilter;

use dotenvy::dotenv;

use service_kit::app::create_app;
use service_kit::config::Settings;
use service_kit::email::{EmailRenderer, MailSetup};
use service_kit::state::AppStateBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenv().ok();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let settings = Settings::from_env();
  tracing::debug!("Loaded settings: {:?}", settings);

  let renderer = EmailRenderer::new(&settings.template_dir)?;

  // A missing or broken signing key ends the process here, before the listener binds.
  let app_state = AppStateBuilder::new(settings)
    .setup_mail(MailSetup::default())
    .with_renderer(renderer)
    .configure_signer()
    .inspect_err(|e| tracing::error!("{}", e))?
    .build()?;

  let bind_address = app_state.settings.bind_address.clone();
  let app = create_app(app_state);

  let listener = tokio::net::TcpListener::bind(&bind_address).await?;

  tracing::info!("Server running on http://{}", bind_address);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!("Failed to install Ctrl+C handler: {}", e);
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut stream) => {
        stream.recv().await;
      }
      Err(e) => {
        tracing::error!("Failed to install signal handler: {}", e);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
      _ = ctrl_c => {},
      _ = terminate => {},
  }

  tracing::info!("Received termination signal, shutting down gracefully...");
}
