use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Generation, GenerationError, TextGenerator, UpstreamUsage};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Finish reasons that mean the candidate text must not be used.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "LANGUAGE",
];

/// Gemini `generateContent` client.
///
/// Built once at start-up and shared. A missing key is not an error until a
/// request is actually made.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_base: api_base.into(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Generation, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let request = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };

        debug!(model, prompt_chars = prompt.len(), "calling gemini generateContent");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GenerationError::Api {
                status,
                message: api_error_message(&text),
            });
        }

        let body: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        parse_generation(body)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    // Kept loose: counters that are absent or not integers fall back to 0 later.
    #[serde(default)]
    usage_metadata: Option<Value>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.chars().take(512).collect())
}

fn parse_generation(body: GenerateContentResponse) -> Result<Generation, GenerationError> {
    let usage = body.usage_metadata.as_ref().map(usage_from_metadata);

    let Some(first) = body.candidates.first() else {
        if let Some(feedback) = body.prompt_feedback {
            let reason = feedback
                .block_reason
                .unwrap_or_else(|| "unspecified".to_string());
            return Err(GenerationError::Blocked(reason));
        }
        warn!("gemini returned no candidates and no prompt feedback");
        return Ok(Generation {
            text: String::new(),
            usage,
        });
    };

    if body.candidates.len() > 1 {
        debug!(
            count = body.candidates.len(),
            "multiple candidates returned, using the first"
        );
    }

    if let Some(reason) = first
        .finish_reason
        .as_deref()
        .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
    {
        return Err(GenerationError::Stopped(reason.to_string()));
    }

    let text = first
        .content
        .as_ref()
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default();

    Ok(Generation { text, usage })
}

fn usage_from_metadata(metadata: &Value) -> UpstreamUsage {
    let count = |key: &str| metadata.get(key).and_then(Value::as_u64);
    UpstreamUsage {
        prompt_tokens: count("promptTokenCount"),
        candidates_tokens: count("candidatesTokenCount"),
        total_tokens: count("totalTokenCount"),
    }
}
