//! ghr
//!
//! Manages a fleet of GitHub Actions self-hosted runners running as local
//! docker containers.

mod commands;
mod config;
mod context;
mod dotenv;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use commands::{Commands, handle_command};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ghr")]
#[command(about = "GitHub self-hosted runner manager", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Config file (default: ~/.ghr/config.yaml)
    #[arg(long, global = true, env = "GHR_CONFIG")]
    config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ghr_core=debug,ghr_cli=debug,ghr_docker=debug,ghr_client=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ghr_core=info,ghr_cli=info,ghr_docker=warn,ghr_client=warn".into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    dotenv::load_env_files();

    let result = tokio::select! {
        result = handle_command(cli.command, cli.config) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("{}", "Interrupted.".yellow());
            return ExitCode::from(130);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
