//! Chat proxy handler for `POST /ask`.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::services::hf::{GenerationParams, UpstreamError};
use crate::services::prompt;

/// Inbound payload for `POST /ask`.
///
/// `message` is optional at the serde level so that a body like `{}` lands
/// on the canonical 400 instead of a deserializer rejection.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Shaped success output: one assistant turn.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub role: &'static str,
    pub content: String,
}

/// `POST /ask` — forward one chat message to the upstream model.
///
/// Validates the message, wraps it in the canonical prompt, issues exactly
/// one upstream call, and strips the echoed prompt from the reply.
pub async fn ask_handler(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatReply>> {
    let message = match body.message.as_deref() {
        Some(m) if !m.is_empty() => m,
        _ => return Err(AppError::MissingMessage),
    };

    let prompt = prompt::build_prompt(message);

    let generations = match state
        .upstream
        .generate(&prompt, &GenerationParams::default())
        .await
    {
        Ok(generations) => generations,
        Err(e) => {
            match &e {
                UpstreamError::Status { status, body } => {
                    error!(%status, body = %body, "upstream call failed");
                }
                UpstreamError::Decode { body, .. } => {
                    error!(body = %body, "upstream success body did not decode");
                }
                UpstreamError::Transport(transport) => {
                    error!(error = %transport, "upstream call failed");
                }
            }
            return Err(e.into());
        }
    };

    let Some(text) = generations
        .first()
        .and_then(|g| g.generated_text.as_deref())
    else {
        error!(body = ?generations, "upstream response carried no generated text");
        return Err(AppError::UpstreamShape);
    };

    let content = prompt::strip_prompt_echo(&prompt, text);

    Ok(Json(ChatReply {
        role: "assistant",
        content,
    }))
}
