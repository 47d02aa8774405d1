//! resto-cloud: multi-tenant restaurant ordering service
//!
//! Long-running service that:
//! - Places storefront orders with server-side pricing
//! - Creates Stripe checkout sessions and records payment via webhook
//! - Serves the kitchen board and its status transitions (staff JWT)
//! - Pushes live order changes to kitchen consoles over WebSocket

mod api;
mod auth;
mod config;
mod db;
mod live;
mod orders;
mod payments;
mod state;
mod stripe;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "resto_cloud=info,tower_http=info".into());
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env()?;

    tracing::info!("Starting resto-cloud (env: {})", config.environment);
    if config.is_development() {
        tracing::warn!("Development mode: unset secrets fall back to placeholder values");
    }

    // Initialize application state
    let state = AppState::new(&config).await?;

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("resto-cloud HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("resto-cloud stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
