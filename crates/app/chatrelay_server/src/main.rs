//! Chatrelay proxy server binary.
//!
//! Loads configuration from the environment, wires the Hugging Face client
//! into the router, and serves until the process is stopped.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use chatrelay_api::{AppState, config::ApiConfig, services::hf::HfClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chatrelay_api=debug".parse().unwrap()),
        )
        .init();

    // A missing HF_API_KEY or PORT aborts here, before any socket is bound.
    let config = ApiConfig::from_env()?;

    let upstream = Arc::new(HfClient::from_config(&config)?);
    let state = AppState::new(config.clone(), upstream);
    let app = chatrelay_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        model_url = %config.model_url,
        "chat proxy listening"
    );

    // Connect info feeds the per-client rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
