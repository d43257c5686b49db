//! # chatrelay_api
//!
//! HTTP API library for the chatrelay proxy: one chat endpoint forwarded to
//! the Hugging Face Inference API, plus a liveness probe.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{ask, health};
use crate::middleware::rate_limit::{self, FixedWindowLimiter};
use crate::services::hf::InferenceClient;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Upstream inference client.
    pub upstream: Arc<dyn InferenceClient>,
    /// Fixed-window request limiter guarding `/ask`.
    pub limiter: Arc<FixedWindowLimiter>,
}

impl AppState {
    /// Builds state from configuration and an injected upstream client.
    pub fn new(config: ApiConfig, upstream: Arc<dyn InferenceClient>) -> Self {
        let limiter = Arc::new(FixedWindowLimiter::new(
            config.rate_limit_window,
            config.rate_limit_max_requests,
        ));
        Self {
            config,
            upstream,
            limiter,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    // Only /ask is throttled. /health must stay reachable for a client that
    // has exhausted its window.
    let ask = Router::new()
        .route("/ask", post(ask::ask_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::enforce,
        ));

    Router::new()
        .merge(ask)
        .route("/health", get(health::health_handler))
        .layer(cors)
        .with_state(state)
}

/// CORS layer over the configured origin allow-list.
///
/// A literal `*` entry allows any origin. Entries that fail header-value
/// parsing are skipped with a warning instead of aborting startup.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    if config.allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
