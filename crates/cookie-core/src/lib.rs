//! Core reconciliation layer for cookie-sync
//!
//! This crate coordinates the leaf crates into the three-way sync between
//! a Firefox permission store and a WebDAV remote, implementing:
//!
//! - **Diff engine**: added/removed/modified change sets between two snapshots
//! - **Merge engine**: per-origin conflict resolution plus whole-snapshot strategies
//! - **Reconciliation driver**: the four-case no-op/pull/push/merge state machine
//! - **Configuration and baseline persistence**: the `config.toml` and
//!   `last_sync_state.json` files plus interval-based backups
//!
//! # Architecture
//!
//! `cookie-core` sits above the leaf crates and below the CLI:
//!
//! ```text
//!              cookie-cli
//!                   |
//!              cookie-core
//!                   |
//!     +-------------+-------------+
//!     |             |             |
//! cookie-model cookie-firefox cookie-webdav
//! ```
//!
//! The engine itself only speaks to the [`store::RuleStore`] and
//! [`store::RemoteState`] traits; the concrete sqlite and WebDAV
//! implementations are adapters around the leaf crates.

pub mod backup;
pub mod baseline;
pub mod config;
pub mod diff;
pub mod engine;
pub mod error;
pub mod merge;
pub mod report;
pub mod store;

pub use backup::{BackupPolicy, backup_baseline, parse_interval, remote_backup_name};
pub use baseline::{BASELINE_FILE, BaselineStore};
pub use config::{
    AppConfig, BACKUP_DIR, BackupSection, CONFIG_DIR, CONFIG_FILE, ConfigStore, FirefoxSection,
    SyncSection, WebdavSection,
};
pub use diff::{ChangeSet, compute_diff};
pub use engine::{SyncEngine, SyncOptions, SyncSettings};
pub use error::{Error, Result};
pub use merge::{MergeStrategy, merge_change_sets};
pub use report::{SyncDecision, SyncReport};
pub use store::{
    REMOTE_BACKUP_DIR, REMOTE_DIR, REMOTE_STATE_FILE, RemoteState, RuleStore, WebDavRemote,
};
