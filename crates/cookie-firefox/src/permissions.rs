//! Cookie exception rows in `permissions.sqlite`
//!
//! Firefox keeps per-origin permissions in the `moz_perms` table; cookie
//! exceptions are the rows with `type = 'cookie'`. The store reads those
//! rows into [`CookieRule`]s and writes rule sets back atomically. Rows
//! carrying a permission code this tool does not manage are left to
//! Firefox on read, but `replace_all` rewrites the whole cookie slice.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use cookie_model::{CookieRule, validate_rules};

use crate::error::{Error, Result};

/// File name of the permission database inside a profile directory.
pub const DB_FILE: &str = "permissions.sqlite";

/// Counters returned by [`PermissionStore::import_rules`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub imported: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Read/write access to one profile's cookie exceptions.
#[derive(Debug)]
pub struct PermissionStore {
    conn: Connection,
    path: PathBuf,
}

impl PermissionStore {
    /// Open the permission database inside `profile_dir`.
    pub fn open(profile_dir: &Path) -> Result<Self> {
        let path = profile_dir.join(DB_FILE);
        if !path.exists() {
            return Err(Error::PermissionDbNotFound { path });
        }
        let conn = Connection::open(&path)?;
        tracing::debug!("Opened permission database at {}", path.display());
        Ok(Self { conn, path })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every cookie exception rule.
    ///
    /// Rows with a permission code outside the managed set are logged
    /// and skipped; Firefox owns those.
    pub fn read_all(&self) -> Result<Vec<CookieRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT origin, permission, modificationTime FROM moz_perms WHERE type = 'cookie'",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut rules = Vec::new();
        for row in rows {
            let (origin, code, millis) = row?;
            match CookieRule::from_wire(origin.as_str(), code, millis) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    tracing::warn!("Skipping unmanaged cookie permission row: {}", e);
                }
            }
        }
        Ok(rules)
    }

    /// Atomically replace the full cookie exception set.
    ///
    /// Deletes every `type = 'cookie'` row and inserts `rules` in one
    /// transaction.
    pub fn replace_all(&mut self, rules: &[CookieRule]) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM moz_perms WHERE type = 'cookie'", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO moz_perms \
                 (origin, type, permission, expireType, expireTime, modificationTime) \
                 VALUES (?1, 'cookie', ?2, 0, 0, ?3)",
            )?;
            for rule in rules {
                stmt.execute(params![rule.origin, rule.permission.code(), rule.epoch_millis()])?;
            }
        }
        tx.commit()?;
        tracing::debug!("Replaced cookie exceptions with {} rules", rules.len());
        Ok(())
    }

    /// Import rules one origin at a time.
    ///
    /// New origins are inserted; existing ones are updated only when
    /// `update_existing` is set, otherwise skipped. The whole import is
    /// validated first and runs in one transaction.
    pub fn import_rules(&mut self, rules: &[CookieRule], update_existing: bool) -> Result<ImportStats> {
        validate_rules(rules)?;

        let tx = self.conn.transaction()?;
        let mut stats = ImportStats::default();
        for rule in rules {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM moz_perms WHERE type = 'cookie' AND origin = ?1",
                    params![rule.origin],
                    |row| row.get(0),
                )
                .optional()?;
            match existing {
                None => {
                    tx.execute(
                        "INSERT INTO moz_perms \
                         (origin, type, permission, expireType, expireTime, modificationTime) \
                         VALUES (?1, 'cookie', ?2, 0, 0, ?3)",
                        params![rule.origin, rule.permission.code(), rule.epoch_millis()],
                    )?;
                    tracing::info!("Imported rule for {}", rule.origin);
                    stats.imported += 1;
                }
                Some(id) if update_existing => {
                    tx.execute(
                        "UPDATE moz_perms SET permission = ?1, modificationTime = ?2 WHERE id = ?3",
                        params![rule.permission.code(), rule.epoch_millis(), id],
                    )?;
                    tracing::info!("Updated rule for {}", rule.origin);
                    stats.updated += 1;
                }
                Some(_) => {
                    tracing::debug!("Skipping existing rule for {}", rule.origin);
                    stats.skipped += 1;
                }
            }
        }
        tx.commit()?;
        Ok(stats)
    }

    /// Delete every cookie exception, returning how many rows went away.
    pub fn delete_all(&mut self) -> Result<usize> {
        let count = self
            .conn
            .execute("DELETE FROM moz_perms WHERE type = 'cookie'", [])?;
        tracing::debug!("Deleted {} cookie exception rows", count);
        Ok(count)
    }
}
