//! The `taglens serve` command: HTTP API in front of the pipeline.

use anyhow::Context;
use clap::Args;
use taglens_core::config::resolve_env_var;
use taglens_core::{Config, Pipeline};

use crate::server::{build_router, AppState};

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (overrides `server.bind`)
    #[arg(short, long, env = "TAGLENS_BIND")]
    pub bind: Option<String>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let bind = args.bind.clone().unwrap_or_else(|| config.server.bind.clone());
    let app = build_router(build_state(&config).await?);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Assemble the server state from config.
///
/// A pipeline that cannot be built (no label source has credentials) does
/// not stop the server; `/api` then serves the example payload only.
async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let access_token = resolve_env_var(&config.server.access_token);
    if access_token.is_none() {
        tracing::warn!("No access token configured; /api will only serve the example payload");
    }

    let example = match config.server.example_payload {
        Some(ref path) => {
            let payload = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read example payload {:?}", path))?;
            serde_json::from_str::<serde_json::Value>(&payload)
                .with_context(|| format!("Example payload {:?} is not valid JSON", path))?;
            Some(payload)
        }
        None => None,
    };

    let pipeline = match Pipeline::from_config(config).await {
        Ok(pipeline) => Some(pipeline),
        Err(e) => {
            tracing::warn!("Pipeline unavailable, serving the example payload only: {e}");
            None
        }
    };

    Ok(AppState::new(pipeline, access_token, example))
}
