//! Firefox cookie exception sync CLI
//!
//! The command-line interface for keeping Firefox cookie exceptions in
//! sync with a WebDAV remote.

mod cli;
mod commands;
mod context;
mod error;

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use context::CommandContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `export -` stays machine-readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.profile_name, cli.profile_path),
        None => {
            // No command provided - show help hint
            println!(
                "{} Firefox cookie exception sync",
                "cookie-sync".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "cookie-sync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(
    cmd: Commands,
    profile_name: Option<String>,
    profile_path: Option<PathBuf>,
) -> Result<()> {
    match cmd {
        Commands::Sync { simulate } => {
            let context = CommandContext::new(profile_name, profile_path)?;
            commands::run_sync(&context, simulate)
        }
        Commands::List => {
            let context = CommandContext::new(profile_name, profile_path)?;
            commands::run_list(&context)
        }
        Commands::Export { file } => {
            let context = CommandContext::new(profile_name, profile_path)?;
            commands::run_export(&context, file.as_deref())
        }
        Commands::Import {
            file,
            update_existing,
        } => {
            let context = CommandContext::new(profile_name, profile_path)?;
            commands::run_import(&context, &file, update_existing)
        }
        Commands::Clear { yes } => {
            let context = CommandContext::new(profile_name, profile_path)?;
            commands::run_clear(&context, yes)
        }
        Commands::Init => {
            let context = CommandContext::new(profile_name, profile_path)?;
            commands::run_init(&context)
        }
        // Completions must work without a config directory
        Commands::Completions { shell } => commands::run_completions(shell),
    }
}
