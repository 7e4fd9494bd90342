//! Baseline backup rotation
//!
//! After a successful run the baseline file can be copied into a
//! `backups/` directory. The directory's mtime tells when the last
//! backup was taken; a new one is written only once the configured
//! interval has passed, so frequent syncs do not pile up copies.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Utc;

use crate::config::BackupSection;
use crate::error::{Error, Result};

/// Parsed backup settings, ready for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    pub enabled: bool,
    pub interval: Duration,
    pub remote: bool,
}

impl BackupPolicy {
    pub fn from_config(section: &BackupSection) -> Result<Self> {
        Ok(Self {
            enabled: section.enabled,
            interval: parse_interval(&section.interval)?,
            remote: section.remote,
        })
    }
}

/// Parse an interval like `45s`, `30m`, `12h`, or `7d`.
pub fn parse_interval(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = |reason: &str| Error::InvalidBackupInterval {
        value: value.to_string(),
        reason: reason.to_string(),
    };
    if value.len() < 2 || !value.is_ascii() {
        return Err(invalid("expected <number><unit>, e.g. 30m"));
    }
    let (number, unit) = value.split_at(value.len() - 1);
    let n: u64 = number
        .parse()
        .map_err(|_| invalid("the count is not a number"))?;
    let secs = match unit {
        "s" => n,
        "m" => n * 60,
        "h" => n * 3600,
        "d" => n * 86_400,
        _ => return Err(invalid("unknown unit, expected s, m, h, or d")),
    };
    Ok(Duration::from_secs(secs))
}

/// Copy the baseline into `backups_dir` if the interval has passed.
///
/// Returns the path of the new backup, or `None` when the baseline does
/// not exist yet or the previous backup is still fresh.
pub fn backup_baseline(
    baseline_path: &Path,
    backups_dir: &Path,
    interval: Duration,
) -> Result<Option<PathBuf>> {
    if !baseline_path.exists() {
        tracing::debug!("No baseline to back up yet");
        return Ok(None);
    }
    if backups_dir.exists() {
        let modified = fs::metadata(backups_dir)?.modified()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        if age < interval {
            tracing::debug!(
                "Last backup was {}s ago, within the {}s interval",
                age.as_secs(),
                interval.as_secs()
            );
            return Ok(None);
        }
    } else {
        fs::create_dir_all(backups_dir)?;
    }

    let stamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
    let target = backups_dir.join(format!("backup_{stamp}.json"));
    fs::copy(baseline_path, &target)?;
    tracing::info!("Backed up the baseline to {}", target.display());
    Ok(Some(target))
}

/// Remote blob name for a backup taken now.
pub fn remote_backup_name() -> String {
    format!("backup_{}.json", Utc::now().format("%Y-%m-%dT%H-%M-%S"))
}
