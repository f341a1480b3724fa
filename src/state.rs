use std::sync::Arc;

use tracing::warn;

use crate::{config::AppConfig, inference::GeminiClient, joke::JokeService};

#[derive(Clone)]
pub struct AppState {
    pub jokes: Arc<JokeService>,
}

impl AppState {
    pub fn new(jokes: JokeService) -> Self {
        Self {
            jokes: Arc::new(jokes),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(build_service(config))
    }
}

/// Wire the Gemini client into a joke service for the configured tone.
pub fn build_service(config: &AppConfig) -> JokeService {
    let client = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_api_base.clone());
    if !client.has_api_key() {
        warn!("⚠️  GEMINI_API_KEY not found in environment variables");
        warn!("   Create a .env file with: GEMINI_API_KEY=your_api_key_here");
    }
    JokeService::new(Arc::new(client), config.gemini_model.clone(), config.tone)
}
