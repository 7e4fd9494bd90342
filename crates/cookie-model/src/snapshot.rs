//! Point-in-time captures of a replica's rule set
//!
//! A snapshot pairs a capture timestamp with the full rule set of one
//! replica. Snapshots are what the sync engine diffs, merges, and ships
//! over the wire; the JSON interchange form is shared by the remote
//! state blob and the persisted baseline file.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rule::CookieRule;

/// A capture of one replica's rules at a point in time.
///
/// Origins are unique and rules are held sorted by origin, so two
/// snapshots built from the same rules serialize and compare
/// identically regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When this snapshot was captured (or last agreed on, for the
    /// baseline).
    #[serde(rename = "syncDate")]
    pub sync_date: DateTime<Utc>,
    /// The full rule set of the replica.
    #[serde(rename = "exceptionRules")]
    pub rules: Vec<CookieRule>,
}

impl Snapshot {
    /// Build a snapshot, sorting rules by origin and rejecting duplicate
    /// origins.
    pub fn new(sync_date: DateTime<Utc>, mut rules: Vec<CookieRule>) -> Result<Self> {
        rules.sort_by(|a, b| a.origin.cmp(&b.origin));
        for pair in rules.windows(2) {
            if pair[0].origin == pair[1].origin {
                return Err(Error::DuplicateOrigin {
                    origin: pair[0].origin.clone(),
                });
            }
        }
        Ok(Self { sync_date, rules })
    }

    /// A snapshot captured now.
    pub fn taken_now(rules: Vec<CookieRule>) -> Result<Self> {
        Self::new(Utc::now(), rules)
    }

    /// The empty snapshot at the start of time.
    ///
    /// Used where no state exists yet: a remote store with no sync file
    /// and a machine with no persisted baseline both reconcile against
    /// this.
    pub fn empty() -> Self {
        Self {
            sync_date: DateTime::UNIX_EPOCH,
            rules: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Rules indexed by origin.
    pub fn by_origin(&self) -> HashMap<&str, &CookieRule> {
        self.rules
            .iter()
            .map(|rule| (rule.origin.as_str(), rule))
            .collect()
    }

    /// Set equality over full rule values, ignoring `sync_date`.
    pub fn same_rules(&self, other: &Snapshot) -> bool {
        let ours: HashSet<&CookieRule> = self.rules.iter().collect();
        let theirs: HashSet<&CookieRule> = other.rules.iter().collect();
        ours == theirs
    }

    /// Serialize to the interchange format.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse the interchange format, re-establishing the sorted
    /// unique-origin invariant.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: Snapshot = serde_json::from_str(body)?;
        Self::new(raw.sync_date, raw.rules)
    }
}
