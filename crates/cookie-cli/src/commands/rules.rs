//! Local rule commands: list, export, import, clear
//!
//! These commands operate on the permission database only and never
//! touch the remote. Export and import speak the same JSON rule list,
//! with `-` standing for stdout/stdin.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use colored::Colorize;
use dialoguer::Confirm;

use cookie_firefox::PermissionStore;
use cookie_model::CookieRule;

use crate::context::CommandContext;
use crate::error::Result;

fn open_store(context: &CommandContext) -> Result<PermissionStore> {
    let config = context.config_or_default()?;
    let profile = context.select_profile(&config)?;
    Ok(PermissionStore::open(&profile.path)?)
}

/// Run the list command
///
/// Prints every cookie exception in the selected profile.
pub fn run_list(context: &CommandContext) -> Result<()> {
    let store = open_store(context)?;
    let rules = store.read_all()?;

    if rules.is_empty() {
        println!("No cookie exceptions in {}", store.path().display());
        return Ok(());
    }

    println!("{}", "Cookie exceptions".bold());
    println!();
    for rule in &rules {
        println!(
            "  {} {}  {}",
            format!("{:<7}", rule.permission).green(),
            rule.modified_at
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed(),
            rule.origin
        );
    }
    println!();
    println!(
        "{} {} rules in {}",
        "Total:".dimmed(),
        rules.len(),
        store.path().display()
    );

    Ok(())
}

/// Run the export command
///
/// Writes the local rules as a JSON rule list to a file, or to stdout
/// when no file (or `-`) is given.
pub fn run_export(context: &CommandContext, file: Option<&Path>) -> Result<()> {
    let store = open_store(context)?;
    let rules = store.read_all()?;
    let body = serde_json::to_string_pretty(&rules)?;

    match file {
        Some(path) if path.as_os_str() != "-" => {
            fs::write(path, &body)?;
            println!(
                "{} Exported {} rules to {}",
                "OK".green().bold(),
                rules.len(),
                path.display()
            );
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

/// Run the import command
///
/// Reads a JSON rule list from a file (or stdin with `-`) and inserts
/// the rules into the permission database. Existing origins are skipped
/// unless `update_existing` is set. The whole input is validated before
/// anything is written.
pub fn run_import(context: &CommandContext, file: &Path, update_existing: bool) -> Result<()> {
    let body = if file.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(file)?
    };
    let rules: Vec<CookieRule> = serde_json::from_str(&body)?;

    let mut store = open_store(context)?;
    let stats = store.import_rules(&rules, update_existing)?;

    println!(
        "{} Imported {} rules into {} ({} updated, {} skipped)",
        "OK".green().bold(),
        stats.imported,
        store.path().display(),
        stats.updated,
        stats.skipped
    );

    Ok(())
}

/// Run the clear command
///
/// Deletes every cookie exception from the selected profile, asking for
/// confirmation unless `yes` is set.
pub fn run_clear(context: &CommandContext, yes: bool) -> Result<()> {
    let mut store = open_store(context)?;
    let count = store.read_all()?.len();

    if count == 0 {
        println!("{} No cookie exceptions to delete.", "OK".green().bold());
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} cookie exceptions from {}?",
                count,
                store.path().display()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted, nothing was deleted.");
            return Ok(());
        }
    }

    let deleted = store.delete_all()?;
    println!(
        "{} Deleted {} cookie exceptions.",
        "OK".green().bold(),
        deleted
    );

    Ok(())
}
