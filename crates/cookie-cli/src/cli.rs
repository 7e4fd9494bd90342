//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use tracing::Level;

/// Keep Firefox cookie exceptions in sync with a WebDAV remote
#[derive(Parser, Debug)]
#[command(name = "cookie-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    pub log_level: Level,

    /// Firefox profile name to operate on (overrides the config file)
    #[arg(long, global = true, value_name = "NAME")]
    pub profile_name: Option<String>,

    /// Firefox profile directory to operate on (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub profile_path: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile the local cookie exceptions with the remote
    ///
    /// Reads the local store, the remote state, and the baseline from the
    /// previous run, then pulls, pushes, or merges as needed.
    ///
    /// Examples:
    ///   cookie-sync sync              # Reconcile now
    ///   cookie-sync sync --simulate   # Print the decision, write nothing
    Sync {
        /// Compute the decision without writing anywhere
        #[arg(short = 'n', long)]
        simulate: bool,
    },

    /// List the local cookie exception rules
    List,

    /// Export the local rules as a JSON rule list
    ///
    /// Examples:
    ///   cookie-sync export rules.json   # Write to a file
    ///   cookie-sync export              # Write to stdout
    Export {
        /// Output file ("-" or omitted for stdout)
        file: Option<PathBuf>,
    },

    /// Import rules from a JSON rule list
    ///
    /// The input must be a JSON array of rules; every rule is validated
    /// before anything is written.
    ///
    /// Examples:
    ///   cookie-sync import rules.json
    ///   cookie-sync import rules.json --update-existing
    ///   cat rules.json | cookie-sync import -
    Import {
        /// Input file ("-" for stdin)
        file: PathBuf,

        /// Overwrite rules whose origin already exists
        #[arg(long)]
        update_existing: bool,
    },

    /// Delete every local cookie exception
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Write a commented configuration template
    Init,

    /// Generate shell completions
    ///
    /// Examples:
    ///   cookie-sync completions bash > ~/.local/share/bash-completion/completions/cookie-sync
    ///   cookie-sync completions zsh > ~/.zfunc/_cookie-sync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
