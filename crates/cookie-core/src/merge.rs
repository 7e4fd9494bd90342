//! Conflict resolution between concurrent change sets
//!
//! When both replicas changed since the baseline, their change sets are
//! merged per rule: for every origin touched on both sides, the entry
//! with the later modification time survives and the other is
//! discarded. Equal timestamps keep the local entry, so the outcome is
//! deterministic. Whole-snapshot strategies are available as configured
//! alternatives to the per-rule merge.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::ChangeSet;
use crate::error::Error;

/// How a both-sides-changed run resolves the conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Merge change sets rule by rule; the later modification wins,
    /// ties keep the local side.
    #[default]
    PerRule,
    /// Whichever snapshot carries the later sync date wins wholesale.
    UseNewest,
    /// The local snapshot wins wholesale.
    UseLocal,
    /// The remote snapshot wins wholesale.
    UseRemote,
    /// Leave both replicas as they are.
    DoNothing,
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "per-rule" => Ok(MergeStrategy::PerRule),
            "use-newest" => Ok(MergeStrategy::UseNewest),
            "use-local" => Ok(MergeStrategy::UseLocal),
            "use-remote" => Ok(MergeStrategy::UseRemote),
            "do-nothing" => Ok(MergeStrategy::DoNothing),
            _ => Err(Error::InvalidMergeStrategy {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeStrategy::PerRule => "per-rule",
            MergeStrategy::UseNewest => "use-newest",
            MergeStrategy::UseLocal => "use-local",
            MergeStrategy::UseRemote => "use-remote",
            MergeStrategy::DoNothing => "do-nothing",
        };
        write!(f, "{name}")
    }
}

/// Merge two concurrent change sets, consuming both.
///
/// For every origin present on both sides exactly one entry survives:
/// the one with the strictly later modification time, or the local one
/// on a tie. Origins touched on one side only pass through untouched.
/// The result is the category-wise union of what survived.
pub fn merge_change_sets(mut local: ChangeSet, mut remote: ChangeSet) -> ChangeSet {
    let local_stamps = stamp_index(&local);
    let remote_stamps = stamp_index(&remote);

    for (origin, local_stamp) in &local_stamps {
        if let Some(remote_stamp) = remote_stamps.get(origin) {
            if remote_stamp > local_stamp {
                tracing::debug!("Conflict on {origin}: remote change is newer");
                local.drop_origin(origin);
            } else {
                tracing::debug!("Conflict on {origin}: keeping the local change");
                remote.drop_origin(origin);
            }
        }
    }

    let mut merged = local;
    merged.added.extend(remote.added);
    merged.removed.extend(remote.removed);
    merged.modified.extend(remote.modified);
    merged
}

/// Modification time of each origin's entry, whichever category holds it.
fn stamp_index(changes: &ChangeSet) -> HashMap<String, DateTime<Utc>> {
    changes
        .iter()
        .map(|rule| (rule.origin.clone(), rule.modified_at))
        .collect()
}
