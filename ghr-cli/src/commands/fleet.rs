//! Fleet sizing command handlers
//!
//! Handles `up`, `down` and `scale`.

use anyhow::{Result, bail};
use colored::*;
use ghr_core::fleet::{BatchReport, DownTarget, ScaleOutcome};

use crate::context::AppContext;
use crate::output::print_batch_report;

/// Create and start runners in the lowest free numbers
pub async fn up(ctx: &AppContext, count: Option<usize>) -> Result<()> {
    let count = count.unwrap_or(ctx.config.runners.count);
    let fleet = ctx.fleet()?;

    let created = fleet.up(count).await?;

    println!();
    println!("{}", format!("{} runner(s) created.", created.len()).green());
    Ok(())
}

/// Remove the highest-numbered runners, or all of them
pub async fn down(ctx: &AppContext, count: Option<usize>, all: bool) -> Result<()> {
    let target = match (count, all) {
        (_, true) => DownTarget::All,
        (Some(count), false) => DownTarget::Highest(count),
        (None, false) => bail!("specify COUNT or use --all"),
    };

    let report = ctx.fleet()?.down(target).await?;
    finish_batch(&report)
}

/// Converge on exactly `count` runners
pub async fn scale(ctx: &AppContext, count: usize) -> Result<()> {
    let outcome = ctx.fleet()?.scale(count).await?;

    match outcome {
        ScaleOutcome::Unchanged { current } => {
            println!("{}", format!("Already at {} runners.", current).dimmed());
            Ok(())
        }
        ScaleOutcome::ScaledUp { from, to, created } => {
            println!(
                "{}",
                format!(
                    "Scaled up from {} to {} ({} created).",
                    from,
                    to,
                    created.len()
                )
                .green()
            );
            Ok(())
        }
        ScaleOutcome::ScaledDown { from, to, report } => {
            println!(
                "{}",
                format!("Scaled down from {} to {}.", from, to).bold()
            );
            finish_batch(&report)
        }
    }
}

/// Prints a batch report; fails when any runner failed
pub(crate) fn finish_batch(report: &BatchReport) -> Result<()> {
    print_batch_report(report);

    let failed = report.failed().count();
    if failed > 0 {
        bail!(
            "{} of {} runner(s) failed to {}",
            failed,
            report.len(),
            report.action
        );
    }
    Ok(())
}
