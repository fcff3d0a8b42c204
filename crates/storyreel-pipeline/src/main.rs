//! Pipeline invocation runner.
//!
//! Takes one JSON request (inline argument or `@file`), runs the
//! pipeline end to end, and prints the structured response. The process
//! exits non-zero only when the invocation itself could not be set up;
//! pipeline failures are reported in the response body.

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storyreel_models::PipelineRequest;
use storyreel_pipeline::{Pipeline, PipelineContext};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let request = parse_request()?;
    info!(topic = %request.topic, "starting invocation");

    let ctx = PipelineContext::from_env()
        .await
        .context("failed to build pipeline context")?;
    let response = Pipeline::new(ctx).run(request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn parse_request() -> Result<PipelineRequest> {
    let arg = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => bail!("usage: storyreel '<json request>' | storyreel @request.json"),
    };

    let payload = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {path}"))?,
        None => arg,
    };

    serde_json::from_str(&payload).context("request payload is not valid JSON")
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("storyreel=info,warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .init();
    }
}
