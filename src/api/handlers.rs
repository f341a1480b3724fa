use std::any::Any;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::{
    api::types::{HealthResponse, NotFoundResponse, AVAILABLE_ENDPOINTS},
    function::panic_detail,
    joke::{types::iso_timestamp, ErrorBody, JokeError, JokeResponse},
    state::AppState,
};

impl IntoResponse for JokeError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_body())).into_response()
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Joke Generator API is running",
        timestamp: iso_timestamp(),
    })
}

/// POST /joke
///
/// The body is taken raw so that a JSON syntax error goes through the same
/// failure path as an upstream error instead of axum's extractor rejection.
pub async fn joke(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<JokeResponse>, JokeError> {
    let request_id = Uuid::new_v4();
    let response = state
        .jokes
        .handle_body(&body)
        .instrument(info_span!("joke_request", %request_id))
        .await?;
    Ok(Json(response))
}

pub async fn not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Endpoint not found",
            available_endpoints: AVAILABLE_ENDPOINTS,
        }),
    )
}

/// Last-resort handler for a panic escaping a route.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    error!(detail = panic_detail(err.as_ref()), "unhandled error");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Internal server error")),
    )
        .into_response()
}
