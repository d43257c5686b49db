//! Fixed-window request limiting keyed by client identity.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;

/// Per-key counter for the current window.
#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter: at most `max_requests` per key per `window`.
///
/// Windows are anchored to each key's first request and reset wholesale
/// when they expire; counts never carry over between windows.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
    window: Duration,
    max_requests: u32,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            max_requests,
        }
    }

    /// Records one request for `key` and reports whether it is admitted.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn allow_at(&self, key: &str, now: Instant) -> bool {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }

        entry.count += 1;
        entry.count <= self.max_requests
    }
}

/// Axum middleware: rejects over-cap clients with the canonical 429 body.
pub async fn enforce(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);
    if !state.limiter.allow(&key) {
        debug!(client = %key, "request over fixed-window cap");
        return Err(AppError::RateLimited);
    }
    Ok(next.run(request).await)
}

/// Client identity for limiting: first `x-forwarded-for` hop when present,
/// else the socket peer address, else a single shared bucket.
fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(client) = forwarded {
        return client.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_cap_then_rejects() {
        let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 3);
        let now = Instant::now();
        assert!(limiter.allow_at("10.0.0.1", now));
        assert!(limiter.allow_at("10.0.0.1", now));
        assert!(limiter.allow_at("10.0.0.1", now));
        assert!(!limiter.allow_at("10.0.0.1", now));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 1);
        let now = Instant::now();
        assert!(limiter.allow_at("10.0.0.1", now));
        assert!(limiter.allow_at("10.0.0.2", now));
        assert!(!limiter.allow_at("10.0.0.1", now));
    }

    #[test]
    fn expired_window_readmits() {
        let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 1);
        let start = Instant::now();
        assert!(limiter.allow_at("10.0.0.1", start));
        assert!(!limiter.allow_at("10.0.0.1", start + Duration::from_secs(59)));
        assert!(limiter.allow_at("10.0.0.1", start + Duration::from_secs(60)));
    }
}
