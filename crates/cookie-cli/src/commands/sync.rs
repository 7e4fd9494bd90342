//! Sync command implementation
//!
//! Wires the permission store, the WebDAV remote, and the baseline into
//! one reconciliation run and prints the outcome.

use colored::Colorize;

use cookie_core::{BaselineStore, SyncEngine, SyncOptions, SyncSettings, WebDavRemote};
use cookie_firefox::PermissionStore;
use cookie_webdav::WebDavClient;

use crate::context::CommandContext;
use crate::error::Result;

/// Run the sync command
///
/// Reconciles the local cookie exceptions with the remote state. In
/// simulate mode the decision is computed and printed but nothing is
/// written anywhere.
pub fn run_sync(context: &CommandContext, simulate: bool) -> Result<()> {
    if simulate {
        println!(
            "{} Simulating cookie exception sync...",
            "=>".blue().bold()
        );
    } else {
        println!(
            "{} Synchronizing cookie exceptions...",
            "=>".blue().bold()
        );
    }

    let config = context.require_config()?;
    let profile = context.select_profile(&config)?;
    let mut rules = PermissionStore::open(&profile.path)?;

    let client = WebDavClient::new(
        &config.webdav.url,
        &config.webdav.username,
        &config.webdav.password,
    )?;
    client.selfcheck()?;
    let remote = WebDavRemote::new(client);

    let store = context.config_store();
    let settings = SyncSettings::from_config(&config)?;
    let baseline = BaselineStore::new(store.dir());
    let engine = SyncEngine::new(settings, baseline, store.backups_dir());

    let report = engine.run(&mut rules, &remote, &SyncOptions { simulate })?;

    if report.actions.is_empty() {
        println!(
            "{} Already in sync. No changes needed.",
            "OK".green().bold()
        );
    } else {
        let headline = if report.simulated {
            "Simulation complete"
        } else {
            "Sync complete"
        };
        println!(
            "{} {} ({}):",
            "OK".green().bold(),
            headline,
            report.decision
        );
        for action in &report.actions {
            println!("   {} {}", "+".green(), action);
        }
    }

    Ok(())
}
