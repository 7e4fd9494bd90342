//! Store seams the reconciliation engine runs against
//!
//! The engine only ever sees two small traits: the local rule store and
//! the remote state blob. Production wires them to the Firefox
//! permission database and a WebDAV endpoint; tests wire them to
//! in-memory fakes.

use cookie_firefox::PermissionStore;
use cookie_model::CookieRule;
use cookie_webdav::WebDavClient;

use crate::backup::remote_backup_name;
use crate::error::Result;

/// Remote collection holding everything this tool stores.
pub const REMOTE_DIR: &str = "/ff-cookie-exceptions";
/// The sync state blob.
pub const REMOTE_STATE_FILE: &str = "/ff-cookie-exceptions/sync.json";
/// Collection for timestamped copies of previous sync states.
pub const REMOTE_BACKUP_DIR: &str = "/ff-cookie-exceptions/backups";

/// The local, authoritative rule store.
pub trait RuleStore {
    /// Read the full rule set.
    fn read_all(&self) -> Result<Vec<CookieRule>>;
    /// Atomically replace the full rule set.
    fn replace_all(&mut self, rules: &[CookieRule]) -> Result<()>;
}

/// The remote sync state, seen as one blob plus its container.
pub trait RemoteState {
    /// Make sure the container exists; an existing one is fine.
    fn ensure_container(&self) -> Result<()>;
    /// Fetch the state blob, or `None` when no sync has happened yet.
    fn fetch(&self) -> Result<Option<String>>;
    /// Overwrite the state blob.
    fn store(&self, body: &str) -> Result<()>;
    /// Keep a timestamped copy of a previous state blob.
    fn store_backup(&self, body: &str) -> Result<()>;
}

impl RuleStore for PermissionStore {
    fn read_all(&self) -> Result<Vec<CookieRule>> {
        Ok(PermissionStore::read_all(self)?)
    }

    fn replace_all(&mut self, rules: &[CookieRule]) -> Result<()> {
        PermissionStore::replace_all(self, rules)?;
        Ok(())
    }
}

/// WebDAV-backed remote state at the well-known paths.
pub struct WebDavRemote {
    client: WebDavClient,
}

impl WebDavRemote {
    pub fn new(client: WebDavClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &WebDavClient {
        &self.client
    }
}

impl RemoteState for WebDavRemote {
    fn ensure_container(&self) -> Result<()> {
        self.client.mkdir(REMOTE_DIR)?;
        Ok(())
    }

    fn fetch(&self) -> Result<Option<String>> {
        Ok(self.client.download(REMOTE_STATE_FILE)?)
    }

    fn store(&self, body: &str) -> Result<()> {
        self.client.upload(REMOTE_STATE_FILE, body)?;
        Ok(())
    }

    fn store_backup(&self, body: &str) -> Result<()> {
        self.client.mkdir(REMOTE_BACKUP_DIR)?;
        let path = format!("{}/{}", REMOTE_BACKUP_DIR, remote_backup_name());
        self.client.upload(&path, body)?;
        Ok(())
    }
}
