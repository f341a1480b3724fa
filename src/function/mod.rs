//! On-demand function entry point.
//!
//! The host hands over one HTTP event and expects one response back. There
//! is no middleware stack here, so method gating and CORS headers are done
//! by hand on every response.

use std::{any::Any, collections::BTreeMap, panic::AssertUnwindSafe};

use axum::http::StatusCode;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::joke::{ErrorBody, JokeService};

pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Content-Type", "application/json"),
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    fn new(status: StatusCode, body: String) -> Self {
        Self {
            status_code: status.as_u16(),
            headers: CORS_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
        }
    }

    fn json<T: Serialize>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::new(status, body),
            Err(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                r#"{"error":"Internal server error"}"#.to_string(),
            ),
        }
    }
}

/// Handle a single event: preflight, method gate, then the joke pipeline.
pub async fn handle(jokes: &JokeService, event: FunctionEvent) -> FunctionResponse {
    match event.http_method.as_str() {
        "OPTIONS" => return FunctionResponse::new(StatusCode::OK, String::new()),
        "POST" => {}
        _ => {
            return FunctionResponse::json(
                StatusCode::METHOD_NOT_ALLOWED,
                &ErrorBody::new("Method not allowed"),
            )
        }
    }

    let request_id = Uuid::new_v4();
    let path = event.path.as_deref().unwrap_or("-");
    let body = event.body.as_deref().unwrap_or_default();
    // No middleware here to catch a panic, so the pipeline is its own boundary.
    let result = AssertUnwindSafe(jokes.handle_body(body.as_bytes()))
        .catch_unwind()
        .instrument(info_span!("joke_function", %request_id, path))
        .await;

    match result {
        Ok(Ok(response)) => FunctionResponse::json(StatusCode::OK, &response),
        Ok(Err(err)) => FunctionResponse::json(err.status(), &err.to_body()),
        Err(panic) => {
            error!(detail = panic_detail(panic.as_ref()), "unhandled error");
            FunctionResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorBody::new("Internal server error"),
            )
        }
    }
}

/// Best-effort text of a caught panic payload, for logs only.
pub(crate) fn panic_detail(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        inference::{
            testing::{FailingGenerator, PanickingGenerator, ScriptedGenerator},
            UpstreamUsage,
        },
        joke::GENERIC_FAILURE,
        prompts::JokeTone,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn event(method: &str, body: Option<&str>) -> FunctionEvent {
        FunctionEvent {
            http_method: method.to_string(),
            body: body.map(str::to_string),
            path: Some("/.netlify/functions/joke".into()),
        }
    }

    fn jokes() -> JokeService {
        JokeService::new(
            Arc::new(ScriptedGenerator::new(
                "Why did the cat...",
                Some(UpstreamUsage {
                    prompt_tokens: Some(12),
                    candidates_tokens: Some(8),
                    total_tokens: Some(20),
                }),
            )),
            "gemini-test",
            JokeTone::Mature,
        )
    }

    fn assert_cors(response: &FunctionResponse) {
        for (name, value) in CORS_HEADERS {
            assert_eq!(response.headers.get(name).map(String::as_str), Some(value));
        }
    }

    fn body_json(response: &FunctionResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn preflight_is_empty_ok() {
        let response = handle(&jokes(), event("OPTIONS", None)).await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_empty());
        assert_cors(&response);
    }

    #[tokio::test]
    async fn non_post_is_rejected() {
        for method in ["GET", "PUT", "DELETE", "post"] {
            let response = handle(&jokes(), event(method, Some(r#"{"input":"cat"}"#))).await;
            assert_eq!(response.status_code, 405, "method {method}");
            assert_eq!(body_json(&response), json!({ "error": "Method not allowed" }));
            assert_cors(&response);
        }
    }

    #[tokio::test]
    async fn post_runs_the_pipeline() {
        let response = handle(&jokes(), event("POST", Some(r#"{"input":"cat"}"#))).await;

        assert_eq!(response.status_code, 200);
        assert_cors(&response);
        let body = body_json(&response);
        assert_eq!(body["success"], true);
        assert_eq!(body["joke"], "Why did the cat...");
        assert_eq!(body["input"], "cat");
        assert_eq!(body["tokenUsage"]["totalTokens"], 20);
    }

    #[tokio::test]
    async fn validation_error_keeps_cors() {
        let response = handle(&jokes(), event("POST", Some(r#"{"input":""}"#))).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(
            body_json(&response),
            json!({ "error": "Input is required and must be a string" })
        );
        assert_cors(&response);
    }

    #[tokio::test]
    async fn missing_body_is_generic_failure() {
        let response = handle(&jokes(), event("POST", None)).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(body_json(&response), json!({ "error": GENERIC_FAILURE }));
    }

    #[tokio::test]
    async fn upstream_failure_hides_detail() {
        let jokes = JokeService::new(Arc::new(FailingGenerator), "gemini-test", JokeTone::Clean);
        let response = handle(&jokes, event("POST", Some(r#"{"input":"cat"}"#))).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(body_json(&response), json!({ "error": GENERIC_FAILURE }));
        assert!(!response.body.contains("quota"));
        assert_cors(&response);
    }

    #[tokio::test]
    async fn panicking_pipeline_still_answers() {
        let jokes = JokeService::new(Arc::new(PanickingGenerator), "gemini-test", JokeTone::Clean);
        let response = handle(&jokes, event("POST", Some(r#"{"input":"cat"}"#))).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(body_json(&response), json!({ "error": "Internal server error" }));
        assert!(!response.body.contains("exploded"));
        assert_cors(&response);
    }

    #[test]
    fn decodes_host_event() {
        let raw = r#"{"httpMethod":"POST","path":"/.netlify/functions/joke","headers":{"content-type":"application/json"},"body":"{\"input\":\"cat\"}","isBase64Encoded":false}"#;
        let event: FunctionEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.http_method, "POST");
        assert_eq!(event.body.as_deref(), Some(r#"{"input":"cat"}"#));
        assert_eq!(event.path.as_deref(), Some("/.netlify/functions/joke"));
    }

    #[test]
    fn response_uses_host_field_names() {
        let value = serde_json::to_value(FunctionResponse::new(StatusCode::OK, String::new())).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(value["body"], "");
    }
}
