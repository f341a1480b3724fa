//! Single-invocation entry point: one event JSON on stdin, one response JSON on stdout.

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use jokesmith::{
    config::AppConfig,
    function::{self, FunctionEvent},
    state::build_service,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // stdout carries the response, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let jokes = build_service(&config);
    debug!(tone = %jokes.tone(), model = jokes.model(), "function invoked");

    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("failed to read event from stdin")?;
    let event: FunctionEvent =
        serde_json::from_str(&raw).context("stdin is not a valid function event")?;

    let response = function::handle(&jokes, event).await;

    let mut out = serde_json::to_vec(&response)?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;

    Ok(())
}
