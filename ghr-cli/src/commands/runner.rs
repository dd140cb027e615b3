//! Runner command handlers
//!
//! Handles listing runners, reading their logs and the per-runner lifecycle
//! commands (`stop`, `start`, `rm`).

use anyhow::{Context, Result};
use ghr_core::fleet::Selection;
use ghr_core::runtime::LogOptions;

use super::fleet::finish_batch;
use crate::context::AppContext;
use crate::output::print_runner_table;

/// List managed runners, optionally joined with their GitHub registration
pub async fn list(ctx: &AppContext, github: bool) -> Result<()> {
    let fleet = ctx.fleet()?;

    let runners = if github {
        let client = ctx.github()?;
        fleet.status(Some(&client)).await?
    } else {
        fleet.status(None).await?
    };

    print_runner_table(&runners, github);
    Ok(())
}

/// Copy a runner's container logs to stdout
pub async fn logs(ctx: &AppContext, token: &str, follow: bool) -> Result<()> {
    let options = LogOptions {
        follow,
        ..LogOptions::default()
    };

    let (record, mut stream) = ctx.fleet()?.logs(token, options).await?;
    tracing::debug!("Streaming logs of {}", record.name);

    let mut stdout = tokio::io::stdout();
    tokio::io::copy(&mut stream, &mut stdout)
        .await
        .with_context(|| format!("Failed to read logs of {}", record.name))?;
    Ok(())
}

pub async fn stop(ctx: &AppContext, selection: Selection) -> Result<()> {
    let report = ctx.fleet()?.stop(selection).await?;
    finish_batch(&report)
}

pub async fn start(ctx: &AppContext, selection: Selection) -> Result<()> {
    let report = ctx.fleet()?.start(selection).await?;
    finish_batch(&report)
}

pub async fn remove(ctx: &AppContext, selection: Selection) -> Result<()> {
    let report = ctx.fleet()?.remove(selection).await?;
    finish_batch(&report)
}
