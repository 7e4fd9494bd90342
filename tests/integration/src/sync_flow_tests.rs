//! End-to-end reconciliation tests over the real stack
//!
//! Each test drives the engine against a real `permissions.sqlite`, a
//! real HTTP client, and the in-memory WebDAV stub, checking which
//! replicas end up written for each of the four reconciliation cases.

use std::time::Duration;

use cookie_core::{
    BackupPolicy, BaselineStore, Error, MergeStrategy, REMOTE_BACKUP_DIR, REMOTE_DIR,
    REMOTE_STATE_FILE, SyncDecision, SyncEngine, SyncOptions, SyncSettings, WebDavRemote,
};
use cookie_firefox::PermissionStore;
use cookie_model::{CookieRule, Permission, Snapshot};
use cookie_test_utils::profile::{seed_rules, temp_profile_dir};
use cookie_test_utils::rules::{at, rule, snapshot};
use cookie_test_utils::webdav::DavServer;
use cookie_webdav::WebDavClient;
use tempfile::TempDir;

/// A full sync setup: profile database, WebDAV stub, and config dir
/// holding the baseline.
struct Harness {
    config_dir: TempDir,
    profile: TempDir,
    server: DavServer,
}

impl Harness {
    fn new() -> Self {
        Self {
            config_dir: TempDir::new().unwrap(),
            profile: temp_profile_dir(),
            server: DavServer::start(),
        }
    }

    fn engine(&self, strategy: MergeStrategy, panic_enabled: bool, backup: BackupPolicy) -> SyncEngine {
        let settings = SyncSettings {
            merge_strategy: strategy,
            panic_enabled,
            backup,
        };
        SyncEngine::new(
            settings,
            BaselineStore::new(self.config_dir.path()),
            self.config_dir.path().join("backups"),
        )
    }

    fn run(&self, strategy: MergeStrategy, options: &SyncOptions) -> cookie_core::Result<cookie_core::SyncReport> {
        let engine = self.engine(strategy, true, no_backups());
        let mut store = PermissionStore::open(self.profile.path()).unwrap();
        let remote = self.remote();
        engine.run(&mut store, &remote, options)
    }

    fn remote(&self) -> WebDavRemote {
        WebDavRemote::new(WebDavClient::new(self.server.url(), "tester", "secret").unwrap())
    }

    fn seed_baseline(&self, snapshot: &Snapshot) {
        BaselineStore::new(self.config_dir.path())
            .save(snapshot)
            .unwrap();
    }

    fn baseline(&self) -> Option<Snapshot> {
        BaselineStore::new(self.config_dir.path()).load().unwrap()
    }

    fn seed_remote(&self, snapshot: &Snapshot) {
        self.server.seed_collection(REMOTE_DIR);
        self.server
            .seed_file(REMOTE_STATE_FILE, &snapshot.to_json().unwrap());
    }

    fn remote_snapshot(&self) -> Snapshot {
        Snapshot::from_json(&self.server.file(REMOTE_STATE_FILE).unwrap()).unwrap()
    }

    fn local_rules(&self) -> Vec<CookieRule> {
        PermissionStore::open(self.profile.path())
            .unwrap()
            .read_all()
            .unwrap()
    }

    fn remote_writes(&self) -> Vec<String> {
        self.server
            .requests()
            .into_iter()
            .filter(|r| r.starts_with("PUT"))
            .collect()
    }
}

fn no_backups() -> BackupPolicy {
    BackupPolicy {
        enabled: false,
        interval: Duration::ZERO,
        remote: false,
    }
}

#[test]
fn test_bootstrap_pushes_local_rules() {
    let harness = Harness::new();
    seed_rules(
        harness.profile.path(),
        &[
            rule("https://example.com", Permission::Always, 0),
            rule("https://example.org", Permission::Session, 5),
        ],
    );

    let report = harness
        .run(MergeStrategy::PerRule, &SyncOptions::default())
        .unwrap();

    assert_eq!(report.decision, SyncDecision::Push);
    assert!(!report.simulated);

    // The collection is created before anything else happens
    assert_eq!(
        harness.server.requests()[0],
        "MKCOL /ff-cookie-exceptions"
    );

    let uploaded = harness.remote_snapshot();
    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded.rules[0].origin, "https://example.com");
    assert_eq!(uploaded.rules[1].origin, "https://example.org");

    let baseline = harness.baseline().unwrap();
    assert!(baseline.same_rules(&uploaded));
}

#[test]
fn test_no_op_when_all_replicas_agree() {
    let harness = Harness::new();
    let rules = vec![rule("https://example.com", Permission::Always, 0)];
    seed_rules(harness.profile.path(), &rules);
    let agreed = snapshot(10, rules);
    harness.seed_remote(&agreed);
    harness.seed_baseline(&agreed);

    let report = harness
        .run(MergeStrategy::PerRule, &SyncOptions::default())
        .unwrap();

    assert_eq!(report.decision, SyncDecision::NoChanges);
    assert!(report.actions.is_empty());
    assert!(harness.remote_writes().is_empty());
    assert_eq!(harness.local_rules().len(), 1);
}

#[test]
fn test_pull_applies_remote_snapshot() {
    let harness = Harness::new();
    let old = vec![rule("https://example.com", Permission::Always, 0)];
    seed_rules(harness.profile.path(), &old);
    harness.seed_baseline(&snapshot(10, old));
    let newer = snapshot(
        100,
        vec![
            rule("https://example.com", Permission::Session, 50),
            rule("https://example.net", Permission::Always, 60),
        ],
    );
    harness.seed_remote(&newer);

    let report = harness
        .run(MergeStrategy::PerRule, &SyncOptions::default())
        .unwrap();

    assert_eq!(report.decision, SyncDecision::Pull);
    assert_eq!(harness.local_rules(), newer.rules);
    // Pull never uploads anything
    assert!(harness.remote_writes().is_empty());

    let baseline = harness.baseline().unwrap();
    assert_eq!(baseline.sync_date, at(100));
    assert!(baseline.same_rules(&newer));
}

#[test]
fn test_push_uploads_local_changes() {
    let harness = Harness::new();
    let agreed = snapshot(10, vec![rule("https://example.com", Permission::Always, 0)]);
    harness.seed_baseline(&agreed);
    harness.seed_remote(&agreed);
    seed_rules(
        harness.profile.path(),
        &[
            rule("https://example.com", Permission::Always, 0),
            rule("https://example.org", Permission::Session, 20),
        ],
    );

    let report = harness
        .run(MergeStrategy::PerRule, &SyncOptions::default())
        .unwrap();

    assert_eq!(report.decision, SyncDecision::Push);

    let uploaded = harness.remote_snapshot();
    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded.rules[1].origin, "https://example.org");

    let baseline = harness.baseline().unwrap();
    assert!(baseline.same_rules(&uploaded));
}

#[test]
fn test_merge_reconciles_both_sides() {
    let harness = Harness::new();
    // Baseline knows only A. Local added B; remote flipped A to SESSION.
    harness.seed_baseline(&snapshot(
        10,
        vec![rule("https://a.example", Permission::Always, 0)],
    ));
    seed_rules(
        harness.profile.path(),
        &[
            rule("https://a.example", Permission::Always, 0),
            rule("https://b.example", Permission::Session, 20),
        ],
    );
    harness.seed_remote(&snapshot(
        40,
        vec![rule("https://a.example", Permission::Session, 30)],
    ));

    let report = harness
        .run(MergeStrategy::PerRule, &SyncOptions::default())
        .unwrap();

    assert_eq!(report.decision, SyncDecision::Merge);

    let expected = vec![
        rule("https://a.example", Permission::Session, 30),
        rule("https://b.example", Permission::Session, 20),
    ];
    assert_eq!(harness.local_rules(), expected);
    assert_eq!(harness.remote_snapshot().rules, expected);
    assert_eq!(harness.baseline().unwrap().rules, expected);
}

#[test]
fn test_merge_do_nothing_leaves_both_replicas() {
    let harness = Harness::new();
    harness.seed_baseline(&snapshot(
        10,
        vec![rule("https://a.example", Permission::Always, 0)],
    ));
    seed_rules(
        harness.profile.path(),
        &[
            rule("https://a.example", Permission::Always, 0),
            rule("https://b.example", Permission::Session, 20),
        ],
    );
    let remote = snapshot(40, vec![rule("https://a.example", Permission::Session, 30)]);
    harness.seed_remote(&remote);

    let report = harness
        .run(MergeStrategy::DoNothing, &SyncOptions::default())
        .unwrap();

    assert_eq!(report.decision, SyncDecision::MergeSkipped);
    assert!(harness.remote_writes().is_empty());
    assert_eq!(harness.local_rules().len(), 2);
    assert_eq!(harness.baseline().unwrap().sync_date, at(10));
}

#[test]
fn test_empty_remote_aborts_before_any_write() {
    let harness = Harness::new();
    let rules = vec![rule("https://example.com", Permission::Always, 0)];
    seed_rules(harness.profile.path(), &rules);
    harness.seed_baseline(&snapshot(10, rules));
    // A later, empty remote state smells like a wiped or corrupted file
    harness.seed_remote(&snapshot(100, Vec::new()));

    let err = harness
        .run(MergeStrategy::PerRule, &SyncOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::Panic { .. }));
    assert!(harness.remote_writes().is_empty());
    assert_eq!(harness.local_rules().len(), 1);
    assert_eq!(harness.baseline().unwrap().sync_date, at(10));
}

#[test]
fn test_empty_remote_is_pulled_with_panic_off() {
    let harness = Harness::new();
    let rules = vec![rule("https://example.com", Permission::Always, 0)];
    seed_rules(harness.profile.path(), &rules);
    harness.seed_baseline(&snapshot(10, rules));
    harness.seed_remote(&snapshot(100, Vec::new()));

    let engine = harness.engine(MergeStrategy::PerRule, false, no_backups());
    let mut store = PermissionStore::open(harness.profile.path()).unwrap();
    let report = engine
        .run(&mut store, &harness.remote(), &SyncOptions::default())
        .unwrap();

    // With the safety policy off the empty state propagates
    assert_eq!(report.decision, SyncDecision::Pull);
    assert!(harness.local_rules().is_empty());
}

#[test]
fn test_simulate_computes_without_writing() {
    let harness = Harness::new();
    let old = vec![rule("https://example.com", Permission::Always, 0)];
    seed_rules(harness.profile.path(), &old);
    harness.seed_baseline(&snapshot(10, old.clone()));
    harness.seed_remote(&snapshot(
        100,
        vec![rule("https://example.com", Permission::Session, 50)],
    ));

    let report = harness
        .run(MergeStrategy::PerRule, &SyncOptions { simulate: true })
        .unwrap();

    assert_eq!(report.decision, SyncDecision::Pull);
    assert!(report.simulated);
    assert!(report.actions.iter().all(|a| a.starts_with("[simulate]")));

    // Reads only: no MKCOL, no PUT, untouched replicas and baseline
    assert_eq!(
        harness.server.requests(),
        vec!["GET /ff-cookie-exceptions/sync.json"]
    );
    assert_eq!(harness.local_rules(), old);
    assert_eq!(harness.baseline().unwrap().sync_date, at(10));
}

#[test]
fn test_remote_backup_keeps_previous_state() {
    let harness = Harness::new();
    let agreed = snapshot(10, vec![rule("https://example.com", Permission::Always, 0)]);
    harness.seed_baseline(&agreed);
    harness.seed_remote(&agreed);
    seed_rules(
        harness.profile.path(),
        &[
            rule("https://example.com", Permission::Always, 0),
            rule("https://example.org", Permission::Session, 20),
        ],
    );
    let previous_body = harness.server.file(REMOTE_STATE_FILE).unwrap();

    let policy = BackupPolicy {
        enabled: false,
        interval: Duration::ZERO,
        remote: true,
    };
    let engine = harness.engine(MergeStrategy::PerRule, true, policy);
    let mut store = PermissionStore::open(harness.profile.path()).unwrap();
    let report = engine
        .run(&mut store, &harness.remote(), &SyncOptions::default())
        .unwrap();

    assert_eq!(report.decision, SyncDecision::Push);

    let backups = harness.server.files_under(REMOTE_BACKUP_DIR);
    assert_eq!(backups.len(), 1);
    assert_eq!(harness.server.file(&backups[0]).unwrap(), previous_body);
    // The new state went up after the backup
    assert_eq!(harness.remote_snapshot().len(), 2);
}

#[test]
fn test_baseline_backup_after_successful_run() {
    let harness = Harness::new();
    seed_rules(
        harness.profile.path(),
        &[rule("https://example.com", Permission::Always, 0)],
    );

    let policy = BackupPolicy {
        enabled: true,
        interval: Duration::ZERO,
        remote: false,
    };
    let engine = harness.engine(MergeStrategy::PerRule, true, policy);
    let mut store = PermissionStore::open(harness.profile.path()).unwrap();
    let report = engine
        .run(&mut store, &harness.remote(), &SyncOptions::default())
        .unwrap();

    assert!(
        report
            .actions
            .iter()
            .any(|a| a.starts_with("Backed up the baseline"))
    );
    let backups: Vec<_> = std::fs::read_dir(harness.config_dir.path().join("backups"))
        .unwrap()
        .collect();
    assert_eq!(backups.len(), 1);
}
