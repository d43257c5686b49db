//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::hf::UpstreamError;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Wire shape for all error responses.
#[derive(Debug, Serialize)]
pub struct ErrorReply {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application-level errors with HTTP status mapping.
///
/// Every per-request failure is converted into one of these at the handler
/// boundary; nothing here ever terminates the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// The inbound request carried no usable `message`.
    #[error("Message is required")]
    MissingMessage,

    /// Upstream replied 2xx but without extractable generated text.
    #[error("Invalid response from Hugging Face API")]
    UpstreamShape,

    /// The upstream call itself failed (transport error, timeout, non-2xx).
    #[error("Error communicating with Hugging Face API")]
    UpstreamCall { details: Option<String> },

    /// The client exceeded the fixed-window request cap.
    #[error("Too many requests, please try again later")]
    RateLimited,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingMessage => StatusCode::BAD_REQUEST,
            AppError::UpstreamShape | AppError::UpstreamCall { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            AppError::UpstreamCall { details } => details.clone(),
            _ => None,
        };
        let body = Json(ErrorReply {
            error: self.to_string(),
            details,
        });
        (status, body).into_response()
    }
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        match e {
            // 2xx with an undecodable body is a shape problem, not a call
            // failure.
            UpstreamError::Decode { .. } => AppError::UpstreamShape,
            other => AppError::UpstreamCall {
                details: Some(other.detail()),
            },
        }
    }
}
