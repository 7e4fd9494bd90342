//! Temporary Firefox profile fixtures.
//!
//! These create real `permissions.sqlite` files with the `moz_perms`
//! table, so store tests and CLI tests run against the same schema
//! Firefox uses.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tempfile::TempDir;

use cookie_model::CookieRule;

const MOZ_PERMS_DDL: &str = "CREATE TABLE moz_perms (
    id INTEGER PRIMARY KEY,
    origin TEXT,
    type TEXT,
    permission INTEGER,
    expireType INTEGER,
    expireTime INTEGER,
    modificationTime INTEGER
)";

/// Create an empty `moz_perms` table at `profile_dir/permissions.sqlite`.
///
/// # Panics
/// Panics if the database cannot be created.
pub fn create_permission_db(profile_dir: &Path) {
    let path = profile_dir.join("permissions.sqlite");
    let conn = Connection::open(&path)
        .unwrap_or_else(|e| panic!("create_permission_db: failed to open {}: {e}", path.display()));
    conn.execute(MOZ_PERMS_DDL, [])
        .unwrap_or_else(|e| panic!("create_permission_db: failed to create moz_perms: {e}"));
}

/// A temporary profile directory containing an empty permission database.
pub fn temp_profile_dir() -> TempDir {
    let dir = tempfile::tempdir()
        .unwrap_or_else(|e| panic!("temp_profile_dir: failed to create tempdir: {e}"));
    create_permission_db(dir.path());
    dir
}

/// Insert cookie exception rows directly, bypassing any store logic.
///
/// # Panics
/// Panics if the database is missing or the insert fails.
pub fn seed_rules(profile_dir: &Path, rules: &[CookieRule]) {
    let path = profile_dir.join("permissions.sqlite");
    let conn = Connection::open(&path)
        .unwrap_or_else(|e| panic!("seed_rules: failed to open {}: {e}", path.display()));
    for rule in rules {
        conn.execute(
            "INSERT INTO moz_perms \
             (origin, type, permission, expireType, expireTime, modificationTime) \
             VALUES (?1, 'cookie', ?2, 0, 0, ?3)",
            params![rule.origin, rule.permission.code(), rule.epoch_millis()],
        )
        .unwrap_or_else(|e| panic!("seed_rules: insert for {} failed: {e}", rule.origin));
    }
}

/// A fake home directory with one registered default Firefox profile.
///
/// Returns the home tempdir and the profile directory inside it. Point
/// `HOME` at the tempdir and profile discovery finds the profile via
/// `.mozilla/firefox/profiles.ini`.
///
/// # Panics
/// Panics if any of the fixture files cannot be created.
pub fn fake_firefox_home() -> (TempDir, PathBuf) {
    let home = tempfile::tempdir()
        .unwrap_or_else(|e| panic!("fake_firefox_home: failed to create tempdir: {e}"));
    let root = home.path().join(".mozilla").join("firefox");
    let profile_dir = root.join("test.default");
    fs::create_dir_all(&profile_dir)
        .unwrap_or_else(|e| panic!("fake_firefox_home: failed to create profile dir: {e}"));
    create_permission_db(&profile_dir);
    fs::write(
        root.join("profiles.ini"),
        "[Profile0]\nName=test-profile\nIsRelative=1\nPath=test.default\nDefault=1\n",
    )
    .unwrap_or_else(|e| panic!("fake_firefox_home: failed to write profiles.ini: {e}"));
    (home, profile_dir)
}
