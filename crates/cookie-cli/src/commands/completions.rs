//! Shell completion generation

use std::io;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::error::Result;

/// Run the completions command
///
/// Writes a completion script for the given shell to stdout.
pub fn run_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "cookie-sync", &mut io::stdout());
    Ok(())
}
