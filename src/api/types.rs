use serde::Serialize;

pub const AVAILABLE_ENDPOINTS: &[&str] = &["GET /health", "POST /joke"];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundResponse {
    pub error: &'static str,
    pub available_endpoints: &'static [&'static str],
}
