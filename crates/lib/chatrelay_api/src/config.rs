//! API server configuration.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default upstream endpoint (Hugging Face Inference API, gemma-2-9b-it).
const DEFAULT_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/google/gemma-2-9b-it";

/// Browser origin allowed to call `/ask` when `CORS_ORIGIN` is unset.
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Errors raised while loading configuration from the environment.
///
/// All of these are fatal at startup: the server refuses to start rather
/// than run without a credential or a usable listen address.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

/// Configuration for the API server.
///
/// Constructed once at startup and passed into the router and upstream
/// client by injection; nothing reads the environment after this point.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "0.0.0.0:5000").
    pub bind_addr: String,
    /// Bearer credential for the upstream inference API.
    pub hf_api_key: String,
    /// Upstream text-generation endpoint.
    pub model_url: Url,
    /// Browser origins allowed to call the API; a `*` entry allows any.
    pub allowed_origins: Vec<String>,
    /// Length of one rate-limit window.
    pub rate_limit_window: Duration,
    /// Requests allowed per client within one window.
    pub rate_limit_max_requests: u32,
    /// Timeout applied to each upstream call.
    pub upstream_timeout: Duration,
}

impl ApiConfig {
    /// Reads configuration from environment variables.
    ///
    /// | Variable                  | Required | Default                          |
    /// |---------------------------|----------|----------------------------------|
    /// | `HF_API_KEY`              | yes      | —                                |
    /// | `PORT`                    | yes      | —                                |
    /// | `HF_MODEL_URL`            | no       | gemma-2-9b-it inference endpoint |
    /// | `CORS_ORIGIN`             | no       | `http://localhost:3000`          |
    /// | `RATE_LIMIT_WINDOW_SECS`  | no       | `900`                            |
    /// | `RATE_LIMIT_MAX_REQUESTS` | no       | `100`                            |
    /// | `UPSTREAM_TIMEOUT_SECS`   | no       | `30`                             |
    ///
    /// `CORS_ORIGIN` is a comma-separated allow-list.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|name| std::env::var(name).ok())
    }

    fn load(get: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let hf_api_key = get("HF_API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("HF_API_KEY"))?;

        let port: u16 = get("PORT")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("PORT"))
            .and_then(|raw| parse("PORT", &raw))?;

        let model_url = match get("HF_MODEL_URL") {
            Some(raw) => parse("HF_MODEL_URL", &raw)?,
            None => Url::parse(DEFAULT_MODEL_URL).expect("default model URL parses"),
        };

        let allowed_origins = get("CORS_ORIGIN")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let rate_limit_window =
            Duration::from_secs(parse_or(&get, "RATE_LIMIT_WINDOW_SECS", 900)?);
        let rate_limit_max_requests = parse_or(&get, "RATE_LIMIT_MAX_REQUESTS", 100)?;
        let upstream_timeout = Duration::from_secs(parse_or(&get, "UPSTREAM_TIMEOUT_SECS", 30)?);

        Ok(Self {
            bind_addr: format!("0.0.0.0:{port}"),
            hf_api_key,
            model_url,
            allowed_origins,
            rate_limit_window,
            rate_limit_max_requests,
            upstream_timeout,
        })
    }
}

fn parse<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        var,
        reason: e.to_string(),
    })
}

fn parse_or<T, F>(get: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&'static str) -> Option<String>,
{
    match get(var) {
        Some(raw) => parse(var, &raw),
        None => Ok(default),
    }
}
