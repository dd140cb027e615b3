//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod completion;
mod fleet;
mod init;
mod runner;
mod status;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Subcommand;
use clap_complete::Shell;
use ghr_core::fleet::Selection;

use crate::context::AppContext;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a config file in ~/.ghr/
    Init {
        /// Import settings from a .env file without asking
        #[arg(long)]
        import_env: bool,
    },
    /// Create and start COUNT new runners (default: runners.count)
    Up {
        /// Number of runners to add
        count: Option<usize>,
    },
    /// Stop and remove runners, highest-numbered first
    Down {
        /// Number of runners to remove
        #[arg(required_unless_present = "all")]
        count: Option<usize>,

        /// Remove all managed runners
        #[arg(long, conflicts_with = "count")]
        all: bool,
    },
    /// Add or remove runners until exactly COUNT exist
    Scale {
        /// Target number of runners
        count: usize,
    },
    /// List managed runners
    #[command(visible_alias = "ls")]
    List {
        /// Include registration status from GitHub
        #[arg(long)]
        github: bool,
    },
    /// Show runner container logs
    Logs {
        /// Runner number, name or container id prefix
        runner: String,

        /// Follow log output
        #[arg(short, long)]
        follow: bool,
    },
    /// Stop runners without removing them
    Stop(Target),
    /// Start stopped runners
    Start(Target),
    /// Remove runners
    Rm(Target),
    /// Show config summary and runner counts
    Status,
    /// Generate a shell completion script
    Completion {
        /// Shell to generate the script for
        shell: Shell,
    },
    /// Print the version
    Version,
}

/// A single runner or `--all`
#[derive(clap::Args)]
pub struct Target {
    /// Runner number, name or container id prefix
    #[arg(required_unless_present = "all")]
    runner: Option<String>,

    /// Apply to all managed runners
    #[arg(long, conflicts_with = "runner")]
    all: bool,
}

impl Target {
    fn selection(self) -> Result<Selection> {
        match (self.runner, self.all) {
            (_, true) => Ok(Selection::All),
            (Some(runner), false) => Ok(Selection::One(runner)),
            (None, false) => bail!("specify a runner or use --all"),
        }
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module. Commands other than
/// `init`, `completion` and `version` need a valid configuration.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config_path` - Explicit config file, if given
pub async fn handle_command(command: Commands, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Init { import_env } => init::handle_init(config_path.as_deref(), import_env),
        Commands::Completion { shell } => completion::handle_completion(shell),
        Commands::Version => {
            println!("ghr {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let ctx = AppContext::load(config_path.as_deref())?;
            handle_fleet_command(command, &ctx).await
        }
    }
}

async fn handle_fleet_command(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Up { count } => fleet::up(ctx, count).await,
        Commands::Down { count, all } => fleet::down(ctx, count, all).await,
        Commands::Scale { count } => fleet::scale(ctx, count).await,
        Commands::List { github } => runner::list(ctx, github).await,
        Commands::Logs { runner, follow } => runner::logs(ctx, &runner, follow).await,
        Commands::Stop(target) => runner::stop(ctx, target.selection()?).await,
        Commands::Start(target) => runner::start(ctx, target.selection()?).await,
        Commands::Rm(target) => runner::remove(ctx, target.selection()?).await,
        Commands::Status => status::show(ctx).await,
        Commands::Init { .. } | Commands::Completion { .. } | Commands::Version => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;

    #[test]
    fn test_parse_down_requires_count_or_all() {
        assert!(Cli::try_parse_from(["ghr", "down"]).is_err());
        assert!(Cli::try_parse_from(["ghr", "down", "2", "--all"]).is_err());
        assert!(Cli::try_parse_from(["ghr", "down", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["ghr", "down", "-1"]).is_err());
    }

    #[test]
    fn test_parse_target_selection() {
        let cli = Cli::try_parse_from(["ghr", "stop", "3"]).unwrap();
        let Commands::Stop(target) = cli.command else {
            panic!("expected stop");
        };
        assert_eq!(target.selection().unwrap(), Selection::One("3".to_string()));

        let cli = Cli::try_parse_from(["ghr", "rm", "--all"]).unwrap();
        let Commands::Rm(target) = cli.command else {
            panic!("expected rm");
        };
        assert_eq!(target.selection().unwrap(), Selection::All);

        assert!(Cli::try_parse_from(["ghr", "start"]).is_err());
    }

    #[test]
    fn test_parse_ls_alias_and_global_flags() {
        let cli = Cli::try_parse_from(["ghr", "ls", "--github", "-v", "--config", "/tmp/c.yaml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(matches!(cli.command, Commands::List { github: true }));
    }
}
