//! Completion command handler

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

use crate::Cli;

/// Write the completion script for `shell` to stdout
pub fn handle_completion(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "ghr", &mut std::io::stdout());
    Ok(())
}
