pub mod gemini;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Token counters as reported upstream. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpstreamUsage {
    pub prompt_tokens: Option<u64>,
    pub candidates_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// One complete, non-streamed upstream answer.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub text: String,
    pub usage: Option<UpstreamUsage>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("upstream API key is not configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("prompt blocked upstream: {0}")]
    Blocked(String),
    #[error("generation stopped early: {0}")]
    Stopped(String),
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// Text-in, text-out seam in front of the upstream model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, GenerationError>;
}
