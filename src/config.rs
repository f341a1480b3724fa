use anyhow::{Context, Result};

use crate::{
    inference::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL},
    prompts::JokeTone,
};

pub const DEFAULT_PORT: u16 = 3001;

/// Process configuration, read once at start-up.
///
/// Environment variables, with a `.env` file picked up if present:
/// `GEMINI_API_KEY`, `PORT`, `JOKE_TONE`, `GEMINI_MODEL`, `GEMINI_API_BASE`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub port: u16,
    pub tone: JokeTone,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got `{raw}`"))?,
            None => DEFAULT_PORT,
        };

        let tone = match var("JOKE_TONE") {
            Some(raw) => raw.parse::<JokeTone>().context("invalid JOKE_TONE")?,
            None => JokeTone::default(),
        };

        Ok(Self {
            gemini_api_key: var("GEMINI_API_KEY"),
            gemini_model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base: var("GEMINI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            port,
            tone,
        })
    }
}
