use actix_web::{App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod db;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();
    tracing::debug!(?config, "Loaded configuration");

    let state = web_state(&config).await;

    tracing::info!("Starting mRNA BioPharma server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .configure(|cfg| state.register(cfg))
            .configure(api::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}

async fn web_state(config: &Config) -> std::sync::Arc<AppState> {
    let state = AppState::new(config).await;
    if let Some(reason) = state.store.unavailable_reason() {
        tracing::warn!(reason, "Serving without database access");
    }
    std::sync::Arc::new(state)
}
