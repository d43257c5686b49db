//! Upstream inference client for the Hugging Face text-generation API.
//!
//! One bearer-authenticated POST per call. No retries, no circuit breaking,
//! no caching; the upstream status and body are surfaced verbatim on
//! failure so the handler can shape and log them.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParams {
    pub max_length: u32,
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 500,
            temperature: 0.7,
        }
    }
}

/// One element of the upstream response array.
///
/// The API returns a list of result objects; `generated_text` is optional
/// and only the first element is ever consulted.
#[derive(Debug, Clone, Deserialize)]
pub struct Generation {
    #[serde(default)]
    pub generated_text: Option<String>,
}

/// Wire body for the upstream POST.
#[derive(Serialize)]
struct GenerateBody<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

/// Failures surfaced by the upstream client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream returned a non-success status.
    #[error("upstream returned {status}")]
    Status { status: StatusCode, body: String },

    /// Upstream returned 2xx but the body did not decode as a generation
    /// list.
    #[error("upstream body did not decode: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// The call itself failed (connect, TLS, timeout).
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl UpstreamError {
    /// Best-effort operator-facing detail extracted from the failure.
    ///
    /// For HTTP failures this prefers the `error` field of a JSON error
    /// body, then the raw body text, then the status line.
    pub fn detail(&self) -> String {
        match self {
            UpstreamError::Status { status, body } => {
                let from_json = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned));
                if let Some(message) = from_json {
                    return message;
                }
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            UpstreamError::Decode { source, .. } => source.to_string(),
            UpstreamError::Transport(e) => e.to_string(),
        }
    }
}

/// Abstraction over the upstream text-generation call.
///
/// Lets tests inject a recording double in place of the HTTP client.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Sends one prompt upstream and returns the raw generation list.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<Generation>, UpstreamError>;
}

/// Hugging Face Inference API client.
#[derive(Debug, Clone)]
pub struct HfClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl HfClient {
    /// Builds a client from configuration (endpoint, credential, timeout).
    pub fn from_config(config: &ApiConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: config.model_url.clone(),
            api_key: config.hf_api_key.clone(),
        })
    }
}

#[async_trait]
impl InferenceClient for HfClient {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Vec<Generation>, UpstreamError> {
        let response = self
            .http
            .post(self.endpoint.as_str())
            .bearer_auth(&self.api_key)
            .json(&GenerateBody {
                inputs: prompt,
                parameters: params,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(UpstreamError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(|source| UpstreamError::Decode { source, body })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_params_match_upstream_contract() {
        let params = GenerationParams::default();
        assert_eq!(params.max_length, 500);
        assert_eq!(params.temperature, 0.7);
    }

    #[test]
    fn generate_body_serializes_to_wire_shape() {
        let params = GenerationParams::default();
        let body = GenerateBody {
            inputs: "ping",
            parameters: &params,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "inputs": "ping",
                "parameters": {"max_length": 500, "temperature": 0.7}
            })
        );
    }

    #[test]
    fn detail_prefers_json_error_field() {
        let err = UpstreamError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: r#"{"error":"model loading"}"#.into(),
        };
        assert_eq!(err.detail(), "model loading");
    }

    #[test]
    fn detail_falls_back_to_body_then_status() {
        let err = UpstreamError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream exploded".into(),
        };
        assert_eq!(err.detail(), "upstream exploded");

        let err = UpstreamError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert_eq!(err.detail(), "502 Bad Gateway");
    }
}
