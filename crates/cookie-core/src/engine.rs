//! Reconciliation engine
//!
//! The SyncEngine runs once per invocation. It compares the local store
//! and the remote store against the persisted baseline, decides which of
//! the four reconciliation cases applies (no-op, pull, push, merge), and
//! applies the matching writes in the order local, remote, baseline.

use std::path::PathBuf;

use chrono::Utc;
use cookie_model::{Snapshot, validate_rules};

use crate::backup::{BackupPolicy, backup_baseline};
use crate::baseline::BaselineStore;
use crate::config::AppConfig;
use crate::diff::compute_diff;
use crate::error::{Error, Result};
use crate::merge::{MergeStrategy, merge_change_sets};
use crate::report::{SyncDecision, SyncReport};
use crate::store::{RemoteState, RuleStore};

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// If true, compute the decision without writing anywhere.
    /// Actions will be prefixed with "[simulate] would ..."
    pub simulate: bool,
}

/// Engine settings extracted from the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// How to reconcile when both replicas changed
    pub merge_strategy: MergeStrategy,
    /// Abort when a non-bootstrap run sees an unexpectedly empty replica
    pub panic_enabled: bool,
    /// Baseline and remote backup policy
    pub backup: BackupPolicy,
}

impl SyncSettings {
    /// Build engine settings from a loaded configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            merge_strategy: config.sync.merge_strategy,
            panic_enabled: config.sync.panic,
            backup: BackupPolicy::from_config(&config.backup)?,
        })
    }
}

/// Engine for one reconciliation run
///
/// The engine owns the decision logic and the baseline; the two replicas
/// are injected as trait objects so tests can drive the full state
/// machine against in-memory stores.
pub struct SyncEngine {
    /// Settings from the `[sync]` and `[backup]` config sections
    settings: SyncSettings,
    /// Persisted last-applied snapshot
    baseline: BaselineStore,
    /// Directory for timestamped baseline backups
    backups_dir: PathBuf,
}

impl SyncEngine {
    /// Create a new SyncEngine
    pub fn new(
        settings: SyncSettings,
        baseline: BaselineStore,
        backups_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            baseline,
            backups_dir: backups_dir.into(),
        }
    }

    /// Run one reconciliation pass.
    ///
    /// Reads both replicas and the baseline, decides the case, performs
    /// the writes for that case, and persists the new baseline. Every
    /// fatal condition returns before the first write of its branch; in
    /// simulate mode nothing is written at all.
    pub fn run(
        &self,
        rules: &mut dyn RuleStore,
        remote: &dyn RemoteState,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let simulate = options.simulate;
        if simulate {
            tracing::info!("Simulate mode, neither replica nor the baseline will be written");
        } else {
            remote.ensure_container()?;
        }

        let baseline = match self.baseline.load()? {
            Some(snapshot) => snapshot,
            None => {
                tracing::info!("No baseline from a previous run, comparing against an empty one");
                Snapshot::empty()
            }
        };

        let local = Snapshot::taken_now(rules.read_all()?)?;

        // The raw body is kept around so push/merge can back it up
        // before overwriting the remote state.
        let fetched = remote.fetch()?;
        let bootstrap = fetched.is_none();
        let remote_snapshot = match fetched.as_deref() {
            Some(body) => Snapshot::from_json(body)?,
            None => {
                tracing::info!("No snapshot on the remote yet, this run bootstraps it");
                Snapshot::empty()
            }
        };

        self.check_panic_signs(bootstrap, &local, &remote_snapshot)?;

        let remote_changed = remote_snapshot.sync_date > baseline.sync_date;
        let local_changed = !local.same_rules(&baseline);
        tracing::debug!(
            "Baseline from {}: remote changed = {remote_changed}, local changed = {local_changed}",
            baseline.sync_date
        );

        let mut report = match (remote_changed, local_changed) {
            (false, false) => {
                tracing::info!("Local and remote both match the baseline, nothing to do");
                SyncReport::new(SyncDecision::NoChanges, simulate)
            }
            (true, false) => self.pull(rules, &remote_snapshot, simulate)?,
            (false, true) => self.push(remote, &local, fetched.as_deref(), simulate)?,
            (true, true) => self.merge(
                rules,
                remote,
                &baseline,
                &local,
                &remote_snapshot,
                fetched.as_deref(),
                simulate,
            )?,
        };

        if !simulate && self.settings.backup.enabled {
            let interval = self.settings.backup.interval;
            if let Some(path) = backup_baseline(self.baseline.path(), &self.backups_dir, interval)?
            {
                report = report.with_action(format!("Backed up the baseline to {}", path.display()));
            }
        }

        Ok(report)
    }

    /// Abort (or warn) when a replica is unexpectedly empty.
    ///
    /// An empty rule set on either side of a non-bootstrap run usually
    /// means a wiped profile or a corrupted remote file, and propagating
    /// it would wipe the other side too.
    fn check_panic_signs(&self, bootstrap: bool, local: &Snapshot, remote: &Snapshot) -> Result<()> {
        if bootstrap {
            tracing::debug!("Bootstrap run, skipping the empty-replica checks");
            return Ok(());
        }
        let mut signs: Vec<&str> = Vec::new();
        if remote.is_empty() {
            signs.push("the remote snapshot holds no rules");
        }
        if local.is_empty() {
            signs.push("the local store holds no rules");
        }
        if signs.is_empty() {
            return Ok(());
        }
        let details = signs.join(" and ");
        if self.settings.panic_enabled {
            return Err(Error::Panic { details });
        }
        tracing::error!("Potential accidental wipe ({details}), continuing with panic mode off");
        Ok(())
    }

    /// Remote moved past the baseline and local did not: apply the
    /// remote snapshot locally and make it the new baseline.
    fn pull(
        &self,
        rules: &mut dyn RuleStore,
        remote_snapshot: &Snapshot,
        simulate: bool,
    ) -> Result<SyncReport> {
        tracing::info!(
            "Remote changed and local did not, pulling {} rules",
            remote_snapshot.len()
        );
        validate_rules(&remote_snapshot.rules)?;

        let mut report = SyncReport::new(SyncDecision::Pull, simulate);
        if simulate {
            return Ok(report
                .with_action(format!(
                    "[simulate] would replace the local store with {} remote rules",
                    remote_snapshot.len()
                ))
                .with_action(
                    "[simulate] would persist the remote snapshot as the new baseline".to_string(),
                ));
        }

        rules.replace_all(&remote_snapshot.rules)?;
        report = report.with_action(format!(
            "Replaced the local store with {} remote rules",
            remote_snapshot.len()
        ));
        self.baseline.save(remote_snapshot)?;
        report =
            report.with_action("Persisted the remote snapshot as the new baseline".to_string());
        Ok(report)
    }

    /// Local moved and remote did not: upload the local snapshot and
    /// make it the new baseline. Covers the bootstrap run as well.
    fn push(
        &self,
        remote: &dyn RemoteState,
        local: &Snapshot,
        previous_remote: Option<&str>,
        simulate: bool,
    ) -> Result<SyncReport> {
        tracing::info!(
            "Local changed and remote did not, pushing {} rules",
            local.len()
        );
        validate_rules(&local.rules)?;
        let body = local.to_json()?;

        let mut report = SyncReport::new(SyncDecision::Push, simulate);
        if simulate {
            if self.settings.backup.remote && previous_remote.is_some() {
                report = report.with_action(
                    "[simulate] would back up the previous remote snapshot".to_string(),
                );
            }
            return Ok(report
                .with_action(format!(
                    "[simulate] would upload the local snapshot ({} rules)",
                    local.len()
                ))
                .with_action(
                    "[simulate] would persist the local snapshot as the new baseline".to_string(),
                ));
        }

        if self.settings.backup.remote
            && let Some(previous) = previous_remote
        {
            remote.store_backup(previous)?;
            report = report.with_action("Backed up the previous remote snapshot".to_string());
        }
        remote.store(&body)?;
        report = report.with_action(format!(
            "Uploaded the local snapshot ({} rules)",
            local.len()
        ));
        self.baseline.save(local)?;
        report = report.with_action("Persisted the local snapshot as the new baseline".to_string());
        Ok(report)
    }

    /// Both replicas moved: reconcile them with the configured strategy,
    /// apply the result to both sides, and make it the new baseline.
    #[allow(clippy::too_many_arguments)]
    fn merge(
        &self,
        rules: &mut dyn RuleStore,
        remote: &dyn RemoteState,
        baseline: &Snapshot,
        local: &Snapshot,
        remote_snapshot: &Snapshot,
        previous_remote: Option<&str>,
        simulate: bool,
    ) -> Result<SyncReport> {
        tracing::info!(
            "Both sides changed, merging with the {} strategy",
            self.settings.merge_strategy
        );

        let merged = match self.settings.merge_strategy {
            MergeStrategy::DoNothing => {
                tracing::warn!("Merge strategy is do-nothing, leaving both replicas as they are");
                return Ok(SyncReport::new(SyncDecision::MergeSkipped, simulate)
                    .with_action("Left both replicas untouched (do-nothing strategy)".to_string()));
            }
            MergeStrategy::UseLocal => local.clone(),
            MergeStrategy::UseRemote => remote_snapshot.clone(),
            MergeStrategy::UseNewest => {
                if local.sync_date > remote_snapshot.sync_date {
                    local.clone()
                } else {
                    remote_snapshot.clone()
                }
            }
            MergeStrategy::PerRule => self.merge_per_rule(baseline, local, remote_snapshot)?,
        };

        validate_rules(&merged.rules)?;
        let body = merged.to_json()?;

        let mut report = SyncReport::new(SyncDecision::Merge, simulate);
        if simulate {
            report = report.with_action(format!(
                "[simulate] would replace the local store with {} merged rules",
                merged.len()
            ));
            if self.settings.backup.remote && previous_remote.is_some() {
                report = report.with_action(
                    "[simulate] would back up the previous remote snapshot".to_string(),
                );
            }
            return Ok(report
                .with_action("[simulate] would upload the merged snapshot".to_string())
                .with_action(
                    "[simulate] would persist the merged snapshot as the new baseline".to_string(),
                ));
        }

        rules.replace_all(&merged.rules)?;
        report = report.with_action(format!(
            "Replaced the local store with {} merged rules",
            merged.len()
        ));
        if self.settings.backup.remote
            && let Some(previous) = previous_remote
        {
            remote.store_backup(previous)?;
            report = report.with_action("Backed up the previous remote snapshot".to_string());
        }
        remote.store(&body)?;
        report = report.with_action("Uploaded the merged snapshot".to_string());
        self.baseline.save(&merged)?;
        report =
            report.with_action("Persisted the merged snapshot as the new baseline".to_string());
        Ok(report)
    }

    /// The default strategy: diff both sides against the baseline, merge
    /// the change sets with later-timestamp-wins, and replay the result
    /// onto the baseline rules.
    fn merge_per_rule(
        &self,
        baseline: &Snapshot,
        local: &Snapshot,
        remote: &Snapshot,
    ) -> Result<Snapshot> {
        let local_changes = compute_diff(local, baseline);
        let remote_changes = compute_diff(remote, baseline);
        tracing::debug!("Local changes: {}", local_changes.summary());
        tracing::debug!("Remote changes: {}", remote_changes.summary());

        let merged = merge_change_sets(local_changes, remote_changes);
        merged.ensure_disjoint()?;
        tracing::info!("Merged changes: {}", merged.summary());

        let rules = merged.apply_to(&baseline.rules);
        Snapshot::new(Utc::now(), rules).map_err(|source| Error::ImpossibleState {
            details: format!("the merged rule set is inconsistent: {source}"),
        })
    }
}
