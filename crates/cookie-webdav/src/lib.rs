//! Blocking WebDAV client for the remote sync state.
//!
//! The sync engine treats the remote side as a byte-blob store with
//! four verbs (MKCOL, GET, PUT, DELETE) plus a PROPFIND selfcheck.
//! [`WebDavClient`] implements exactly that surface and nothing more.

pub mod client;
pub mod error;

pub use client::WebDavClient;
pub use error::{Error, Result};
