//! Init command implementation

use colored::Colorize;

use crate::context::CommandContext;
use crate::error::Result;

/// Run the init command
///
/// Writes a commented configuration template into the platform config
/// directory and refuses to overwrite an existing one.
pub fn run_init(context: &CommandContext) -> Result<()> {
    let path = context.config_store().init()?;

    println!(
        "{} Wrote configuration template to {}",
        "OK".green().bold(),
        path.display()
    );
    println!();
    println!(
        "Fill in the {} section, then run {}.",
        "[webdav]".cyan(),
        "cookie-sync sync".cyan()
    );

    Ok(())
}
