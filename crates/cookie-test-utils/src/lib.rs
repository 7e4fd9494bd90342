//! Shared test utilities for the cookie-sync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only and is never
//! published.
//!
//! # Modules
//!
//! - [`rules`]: deterministic rule and snapshot builders
//! - [`profile`]: temporary Firefox profile fixtures with a real
//!   `permissions.sqlite`
//! - [`webdav`]: an in-memory WebDAV stub server

pub mod profile;
pub mod rules;
pub mod webdav;
