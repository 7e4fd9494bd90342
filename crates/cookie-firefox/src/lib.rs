//! Firefox integration: profile discovery and the cookie permission store.
//!
//! Two concerns live here:
//!
//! - **[`profile`]**: find profiles via `profiles.ini` and pick the one
//!   to operate on (explicit path, explicit name, or the default)
//! - **[`permissions`]**: read and atomically rewrite the cookie
//!   exception rows of a profile's `permissions.sqlite`

pub mod error;
pub mod permissions;
pub mod profile;

pub use error::{Error, Result};
pub use permissions::{DB_FILE, ImportStats, PermissionStore};
pub use profile::{FirefoxProfile, default_root, discover, select};
