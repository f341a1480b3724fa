pub mod types;
pub mod validate;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    inference::{GenerationError, TextGenerator},
    prompts::{build_prompt, JokeTone},
};

pub use types::{ErrorBody, JokeResponse, TokenUsage};
pub use validate::{validate_input, ValidatedInput, ValidationError, MAX_INPUT_LEN};

/// The only message a client ever sees for a server-side failure.
pub const GENERIC_FAILURE: &str = "Failed to generate joke. Please try again.";

#[derive(Debug, Error)]
pub enum JokeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] minijinja::Error),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl JokeError {
    pub fn status(&self) -> StatusCode {
        match self {
            JokeError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe text. Validation messages are descriptive, everything else is generic.
    pub fn public_message(&self) -> String {
        match self {
            JokeError::Validation(e) => e.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.public_message())
    }
}

/// Validate → build prompt → call upstream → normalize.
///
/// Shared by the server and function entry points; the tone is fixed for
/// the lifetime of the service.
pub struct JokeService {
    generator: Arc<dyn TextGenerator>,
    model: String,
    tone: JokeTone,
}

impl JokeService {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>, tone: JokeTone) -> Self {
        Self {
            generator,
            model: model.into(),
            tone,
        }
    }

    pub fn tone(&self) -> JokeTone {
        self.tone
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Parse a raw JSON body and run the pipeline, logging any failure.
    pub async fn handle_body(&self, body: &[u8]) -> Result<JokeResponse, JokeError> {
        let result = match serde_json::from_slice::<Value>(body) {
            Ok(parsed) => self.generate(&parsed).await,
            Err(e) => Err(JokeError::from(e)),
        };

        match &result {
            Err(JokeError::Validation(reason)) => {
                warn!(%reason, "rejected joke request");
            }
            Err(err) => {
                error!(error = %err, "error generating joke");
            }
            Ok(_) => {}
        }

        result
    }

    pub async fn generate(&self, body: &Value) -> Result<JokeResponse, JokeError> {
        let input = validate_input(body)?;
        let prompt = build_prompt(self.tone, input.as_str())?;

        let generation = self.generator.generate(&self.model, &prompt).await?;
        let response = JokeResponse::from_generation(input.into_inner(), generation);

        let usage = response.token_usage;
        info!(input = %response.input, tone = %self.tone, "🎭 joke generated");
        info!(
            "📊 token usage: {} input + {} output = {} total",
            usage.prompt_tokens, usage.response_tokens, usage.total_tokens
        );

        Ok(response)
    }
}
