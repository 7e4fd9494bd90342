//! Change-set computation between two snapshots
//!
//! A [`ChangeSet`] is the difference between a newer and an older
//! snapshot, partitioned into added, removed, and modified rules and
//! indexed by origin. The three categories are pairwise disjoint by
//! origin; the merge step relies on that invariant.

use std::collections::{HashMap, HashSet};

use cookie_model::{CookieRule, Snapshot};

use crate::error::{Error, Result};

/// The difference between two snapshots.
///
/// `modified` carries the NEW value of each changed rule; `removed`
/// carries the old rule as it appeared in the older snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<CookieRule>,
    pub removed: Vec<CookieRule>,
    pub modified: Vec<CookieRule>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Every rule in the change set, category order added, removed,
    /// modified.
    pub fn iter(&self) -> impl Iterator<Item = &CookieRule> {
        self.added
            .iter()
            .chain(self.removed.iter())
            .chain(self.modified.iter())
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} added, {} removed, {} modified",
            self.added.len(),
            self.removed.len(),
            self.modified.len()
        )
    }

    /// Drop every entry for `origin`, whatever category it is in.
    pub(crate) fn drop_origin(&mut self, origin: &str) {
        self.added.retain(|r| r.origin != origin);
        self.removed.retain(|r| r.origin != origin);
        self.modified.retain(|r| r.origin != origin);
    }

    /// Verify the per-origin disjointness invariant.
    ///
    /// A violation means the diff/merge pipeline itself is broken, so
    /// it maps to an impossible-state error rather than a user-facing
    /// one.
    pub fn ensure_disjoint(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for rule in self.iter() {
            if !seen.insert(rule.origin.as_str()) {
                return Err(Error::ImpossibleState {
                    details: format!(
                        "origin {} appears more than once in a change set",
                        rule.origin
                    ),
                });
            }
        }
        Ok(())
    }

    /// Replay the change set onto a base rule list: removed origins are
    /// dropped, added and modified rules are upserted.
    pub fn apply_to(&self, base: &[CookieRule]) -> Vec<CookieRule> {
        let mut by_origin: HashMap<String, CookieRule> = base
            .iter()
            .map(|rule| (rule.origin.clone(), rule.clone()))
            .collect();
        for rule in &self.removed {
            by_origin.remove(&rule.origin);
        }
        for rule in self.added.iter().chain(self.modified.iter()) {
            by_origin.insert(rule.origin.clone(), rule.clone());
        }
        by_origin.into_values().collect()
    }
}

/// Compute the change set that turns `old` into `new`.
///
/// Pure function of its inputs; runs in O(new + old). Rules present in
/// both snapshots with any value difference land in `modified` with the
/// new value.
pub fn compute_diff(new: &Snapshot, old: &Snapshot) -> ChangeSet {
    let old_index = old.by_origin();
    let new_index = new.by_origin();

    let mut delta = ChangeSet::default();
    for rule in &new.rules {
        match old_index.get(rule.origin.as_str()) {
            None => delta.added.push(rule.clone()),
            Some(previous) if *previous != rule => delta.modified.push(rule.clone()),
            Some(_) => {}
        }
    }
    for rule in &old.rules {
        if !new_index.contains_key(rule.origin.as_str()) {
            delta.removed.push(rule.clone());
        }
    }
    delta
}
