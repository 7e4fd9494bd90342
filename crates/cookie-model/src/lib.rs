//! Rule model and interchange format for cookie exception sync.
//!
//! This crate defines the data the whole workspace agrees on:
//!
//! - **[`Permission`]**: the two cookie permissions and their integer
//!   wire codes in the permission database
//! - **[`CookieRule`]**: one origin's exception, with validation
//! - **[`Snapshot`]**: a replica's full rule set at a point in time,
//!   and the JSON interchange form used for the remote state blob and
//!   the persisted baseline

pub mod error;
pub mod rule;
pub mod snapshot;

pub use error::{Error, Result};
pub use rule::{CookieRule, Permission, validate_rules};
pub use snapshot::Snapshot;
