//! Cookie exception rules and their permission values
//!
//! A rule grants an origin one of two cookie permissions. The local
//! permission database stores the permission as an integer wire code,
//! while the interchange format uses the symbolic name.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cookie permission granted to an origin.
///
/// Wire codes in the permission database: `1` = ALWAYS, `8` = SESSION.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Cookies are always allowed for the origin.
    Always,
    /// Cookies are allowed for the session only.
    Session,
}

impl Permission {
    /// Map a database wire code to a permission.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Permission::Always),
            8 => Ok(Permission::Session),
            _ => Err(Error::UnknownPermissionCode { code }),
        }
    }

    /// The database wire code for this permission.
    pub fn code(&self) -> i64 {
        match self {
            Permission::Always => 1,
            Permission::Session => 8,
        }
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ALWAYS" => Ok(Permission::Always),
            "SESSION" => Ok(Permission::Session),
            _ => Err(Error::UnknownPermissionName {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Always => write!(f, "ALWAYS"),
            Permission::Session => write!(f, "SESSION"),
        }
    }
}

/// A single cookie exception: one origin, one permission, and the time
/// the rule was last changed.
///
/// Set membership compares the full triple; diff and merge index rules
/// by `origin` alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CookieRule {
    /// Origin the exception applies to, e.g. `https://example.com`.
    pub origin: String,
    /// Permission granted to the origin.
    pub permission: Permission,
    /// Last modification time of the rule.
    #[serde(rename = "modificationTime")]
    pub modified_at: DateTime<Utc>,
}

impl CookieRule {
    pub fn new(origin: impl Into<String>, permission: Permission, modified_at: DateTime<Utc>) -> Self {
        Self {
            origin: origin.into(),
            permission,
            modified_at,
        }
    }

    /// Build a rule from permission-database values: an integer wire code
    /// and a modification time in epoch milliseconds.
    pub fn from_wire(origin: impl Into<String>, code: i64, millis: i64) -> Result<Self> {
        let permission = Permission::from_code(code)?;
        let modified_at = DateTime::from_timestamp_millis(millis)
            .ok_or(Error::TimestampOutOfRange { millis })?;
        Ok(Self::new(origin, permission, modified_at))
    }

    /// The modification time in epoch milliseconds, as stored in the
    /// permission database.
    pub fn epoch_millis(&self) -> i64 {
        self.modified_at.timestamp_millis()
    }

    /// Check the rule against the acceptance gate: the origin must carry
    /// a scheme separator and the modification year must be plausible.
    ///
    /// Rules that fail validation are fatal wherever a write is gated on
    /// them; they are never silently skipped.
    pub fn validate(&self) -> Result<()> {
        if !self.origin.contains("://") {
            return Err(Error::InvalidRule {
                origin: self.origin.clone(),
                reason: "origin has no scheme separator".to_string(),
            });
        }
        let year = self.modified_at.year();
        if !(2000..=2050).contains(&year) {
            return Err(Error::InvalidRule {
                origin: self.origin.clone(),
                reason: format!("modification year {year} outside 2000..=2050"),
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl fmt::Display for CookieRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.origin,
            self.permission,
            self.modified_at.to_rfc3339()
        )
    }
}

/// Validate every rule in a slice, failing on the first invalid one.
pub fn validate_rules(rules: &[CookieRule]) -> Result<()> {
    for rule in rules {
        rule.validate()?;
    }
    Ok(())
}
