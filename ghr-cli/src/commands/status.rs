//! Status command handler

use anyhow::Result;
use ghr_core::domain::runner::FleetSummary;

use crate::context::AppContext;
use crate::output::status_summary;

/// Print the configuration summary and runner counts
pub async fn show(ctx: &AppContext) -> Result<()> {
    let docker = ctx.docker();
    let version = docker.check_available().await?;

    let records = ctx.fleet()?.list().await?;
    let summary = FleetSummary::from_records(&records);

    let docker_line = format!("{} ({})", version, docker.endpoint());
    println!(
        "{}",
        status_summary(
            &ctx.config_path.display().to_string(),
            &ctx.config,
            &docker_line,
            summary
        )
    );
    Ok(())
}
