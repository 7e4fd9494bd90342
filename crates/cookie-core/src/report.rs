//! Report types for reconciliation runs
//!
//! Every run of the engine produces a [`SyncReport`] describing which of
//! the four reconciliation cases was taken and what was (or would have
//! been) written.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which reconciliation case a run resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDecision {
    /// Neither side changed since the last run
    NoChanges,
    /// Only the remote changed; its snapshot was applied locally
    Pull,
    /// Only the local store changed; its snapshot was uploaded
    Push,
    /// Both sides changed and were reconciled
    Merge,
    /// Both sides changed but the configured strategy declined to act
    MergeSkipped,
}

impl fmt::Display for SyncDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDecision::NoChanges => write!(f, "no changes"),
            SyncDecision::Pull => write!(f, "pull"),
            SyncDecision::Push => write!(f, "push"),
            SyncDecision::Merge => write!(f, "merge"),
            SyncDecision::MergeSkipped => write!(f, "merge skipped"),
        }
    }
}

/// Report from a reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// The case the run resolved to
    pub decision: SyncDecision,
    /// Actions taken (or, in simulate mode, described) during the run
    pub actions: Vec<String>,
    /// Whether the run was a simulation that wrote nothing
    pub simulated: bool,
}

impl SyncReport {
    /// Create an empty report for the given decision
    pub fn new(decision: SyncDecision, simulated: bool) -> Self {
        Self {
            decision,
            actions: Vec::new(),
            simulated,
        }
    }

    /// Add an action to the report
    pub fn with_action(mut self, action: String) -> Self {
        self.actions.push(action);
        self
    }

    /// Whether the run changed (or would change) anything
    pub fn changed_anything(&self) -> bool {
        !matches!(
            self.decision,
            SyncDecision::NoChanges | SyncDecision::MergeSkipped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_empty() {
        let report = SyncReport::new(SyncDecision::NoChanges, false);
        assert_eq!(report.decision, SyncDecision::NoChanges);
        assert!(report.actions.is_empty());
        assert!(!report.simulated);
    }

    #[test]
    fn test_with_action() {
        let report = SyncReport::new(SyncDecision::Push, false)
            .with_action("Uploaded 3 rules".to_string());
        assert_eq!(report.actions.len(), 1);
        assert_eq!(report.actions[0], "Uploaded 3 rules");
    }

    #[test]
    fn test_changed_anything() {
        assert!(!SyncReport::new(SyncDecision::NoChanges, false).changed_anything());
        assert!(!SyncReport::new(SyncDecision::MergeSkipped, false).changed_anything());
        assert!(SyncReport::new(SyncDecision::Pull, false).changed_anything());
        assert!(SyncReport::new(SyncDecision::Push, true).changed_anything());
        assert!(SyncReport::new(SyncDecision::Merge, false).changed_anything());
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(SyncDecision::NoChanges.to_string(), "no changes");
        assert_eq!(SyncDecision::Merge.to_string(), "merge");
    }

    #[test]
    fn test_decision_serializes_kebab_case() {
        let json = serde_json::to_string(&SyncDecision::MergeSkipped).unwrap();
        assert_eq!(json, "\"merge-skipped\"");
        let json = serde_json::to_string(&SyncDecision::NoChanges).unwrap();
        assert_eq!(json, "\"no-changes\"");
    }
}
