//! `cookie-sync sync` through the real binary
//!
//! Spawns the compiled CLI against a temp config home, a seeded
//! profile, and the in-memory WebDAV stub, asserting on exit codes,
//! output, and which replicas changed on disk and on the wire.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use cookie_core::{BASELINE_FILE, BaselineStore, CONFIG_DIR, REMOTE_STATE_FILE};
use cookie_model::Permission;
use cookie_test_utils::profile::{seed_rules, temp_profile_dir};
use cookie_test_utils::rules::{rule, snapshot};
use cookie_test_utils::webdav::DavServer;
use predicates::prelude::*;
use tempfile::TempDir;

fn sync_cmd(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cookie-sync").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home);
    cmd
}

fn write_config(config_home: &Path, server_url: &str) {
    let dir = config_home.join(CONFIG_DIR);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("config.toml"),
        format!(
            r#"[webdav]
url = "{server_url}"
username = "tester"
password = "secret"

[sync]
merge_strategy = "per-rule"
panic = true

[backup]
enabled = false
interval = "1d"
remote = false
"#
        ),
    )
    .unwrap();
}

// ==== First sync ====

#[test]
fn test_first_sync_pushes_and_persists_baseline() {
    let home = TempDir::new().unwrap();
    let profile = temp_profile_dir();
    seed_rules(
        profile.path(),
        &[rule("https://example.com", Permission::Always, 0)],
    );
    let server = DavServer::start();
    write_config(home.path(), server.url());

    sync_cmd(home.path())
        .arg("sync")
        .arg("--profile-path")
        .arg(profile.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("push"));

    assert!(server.file(REMOTE_STATE_FILE).is_some());
    assert!(home.path().join(CONFIG_DIR).join(BASELINE_FILE).exists());
}

#[test]
fn test_second_sync_reports_no_changes() {
    let home = TempDir::new().unwrap();
    let profile = temp_profile_dir();
    seed_rules(
        profile.path(),
        &[rule("https://example.com", Permission::Always, 0)],
    );
    let server = DavServer::start();
    write_config(home.path(), server.url());

    sync_cmd(home.path())
        .arg("sync")
        .arg("--profile-path")
        .arg(profile.path())
        .assert()
        .success();

    sync_cmd(home.path())
        .arg("sync")
        .arg("--profile-path")
        .arg(profile.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Already in sync"));
}

// ==== Simulate ====

#[test]
fn test_simulate_leaves_everything_untouched() {
    let home = TempDir::new().unwrap();
    let profile = temp_profile_dir();
    seed_rules(
        profile.path(),
        &[rule("https://example.com", Permission::Always, 0)],
    );
    let server = DavServer::start();
    write_config(home.path(), server.url());

    sync_cmd(home.path())
        .arg("sync")
        .arg("--simulate")
        .arg("--profile-path")
        .arg(profile.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[simulate]"));

    assert!(server.file(REMOTE_STATE_FILE).is_none());
    assert!(!home.path().join(CONFIG_DIR).join(BASELINE_FILE).exists());
}

// ==== Panic safety ====

#[test]
fn test_empty_remote_aborts_with_nonzero_exit() {
    let home = TempDir::new().unwrap();
    let profile = temp_profile_dir();
    seed_rules(
        profile.path(),
        &[rule("https://example.com", Permission::Always, 0)],
    );
    let server = DavServer::start();
    let wiped = snapshot(100, Vec::new()).to_json().unwrap();
    server.seed_file(REMOTE_STATE_FILE, &wiped);
    write_config(home.path(), server.url());

    sync_cmd(home.path())
        .arg("sync")
        .arg("--profile-path")
        .arg(profile.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Panic condition"));

    // Neither side moved
    assert_eq!(server.file(REMOTE_STATE_FILE).unwrap(), wiped);
    assert!(!home.path().join(CONFIG_DIR).join(BASELINE_FILE).exists());
}

// ==== Pull ====

#[test]
fn test_pull_shows_up_in_list() {
    let home = TempDir::new().unwrap();
    let profile = temp_profile_dir();
    let old = vec![rule("https://old.example", Permission::Always, 0)];
    seed_rules(profile.path(), &old);
    let server = DavServer::start();
    write_config(home.path(), server.url());
    BaselineStore::new(&home.path().join(CONFIG_DIR))
        .save(&snapshot(10, old))
        .unwrap();
    server.seed_file(
        REMOTE_STATE_FILE,
        &snapshot(100, vec![rule("https://new.example", Permission::Session, 50)])
            .to_json()
            .unwrap(),
    );

    sync_cmd(home.path())
        .arg("sync")
        .arg("--profile-path")
        .arg(profile.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("pull"));

    sync_cmd(home.path())
        .arg("list")
        .arg("--profile-path")
        .arg(profile.path())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://new.example")
                .and(predicate::str::contains("https://old.example").not()),
        );
}
