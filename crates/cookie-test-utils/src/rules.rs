//! Deterministic rule and snapshot builders.
//!
//! All timestamps are offsets in seconds from a fixed base instant, so
//! fixtures built in different tests always agree on ordering.

use chrono::{DateTime, TimeZone, Utc};

use cookie_model::{CookieRule, Permission, Snapshot};

/// Base instant every offset is relative to (2023-11-14T22:13:20Z).
pub const BASE_SECS: i64 = 1_700_000_000;

/// The base instant plus `secs` seconds.
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE_SECS + secs, 0)
        .single()
        .unwrap_or_else(|| panic!("at: offset {secs} leaves the representable range"))
}

/// A rule modified `secs` after the base instant.
pub fn rule(origin: &str, permission: Permission, secs: i64) -> CookieRule {
    CookieRule::new(origin, permission, at(secs))
}

/// A snapshot captured `secs` after the base instant.
///
/// # Panics
/// Panics if `rules` contains duplicate origins.
pub fn snapshot(secs: i64, rules: Vec<CookieRule>) -> Snapshot {
    Snapshot::new(at(secs), rules)
        .unwrap_or_else(|e| panic!("snapshot: fixture rules are invalid: {e}"))
}
