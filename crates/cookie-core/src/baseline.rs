//! Persisted baseline snapshot
//!
//! The baseline is the last snapshot both replicas were known to agree
//! on, kept as an interchange-format JSON file next to the
//! configuration. It is read once at the start of a run and atomically
//! overwritten at the end of every successful, non-simulated run.

use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::{Path, PathBuf};

use cookie_model::Snapshot;

use crate::error::Result;

/// File name of the baseline inside the configuration directory.
pub const BASELINE_FILE: &str = "last_sync_state.json";

/// Loads and saves the baseline snapshot with advisory file locks.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    path: PathBuf,
}

impl BaselineStore {
    /// Store the baseline under `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(BASELINE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the baseline, or `None` if no run has persisted one yet.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path)?;
        fs2::FileExt::lock_shared(&file)?;

        // Read through the locked handle to avoid a TOCTOU race.
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        let snapshot = Snapshot::from_json(&content)?;

        // Lock released when file is dropped
        Ok(Some(snapshot))
    }

    /// Save the baseline atomically: write a sibling temp file under an
    /// exclusive lock, then rename it over the target.
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let content = snapshot.to_json()?;

        if let Some(parent) = self.path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        fs2::FileExt::lock_exclusive(&lock_file)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved baseline with {} rules", snapshot.len());
        // Lock released when lock_file is dropped
        Ok(())
    }
}
