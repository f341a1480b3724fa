use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::inference::{Generation, UpstreamUsage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub response_tokens: u64,
    pub total_tokens: u64,
}

impl From<Option<UpstreamUsage>> for TokenUsage {
    fn from(usage: Option<UpstreamUsage>) -> Self {
        let usage = usage.unwrap_or_default();
        Self {
            prompt_tokens: usage.prompt_tokens.unwrap_or(0),
            response_tokens: usage.candidates_tokens.unwrap_or(0),
            total_tokens: usage.total_tokens.unwrap_or(0),
        }
    }
}

/// Successful generation as serialized to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JokeResponse {
    pub success: bool,
    pub joke: String,
    pub input: String,
    pub timestamp: String,
    pub token_usage: TokenUsage,
}

impl JokeResponse {
    /// Shape an upstream generation into the client payload.
    pub fn from_generation(input: String, generation: Generation) -> Self {
        Self {
            success: true,
            joke: generation.text.trim().to_string(),
            input,
            timestamp: iso_timestamp(),
            token_usage: generation.usage.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Current UTC time, millisecond precision, `Z` suffix.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
