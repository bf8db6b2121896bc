//! Persistence gateway: the durable snapshot plus the append-only audit log,
//! split across logical submodules.

mod audit;
mod connection;
mod json;
mod memory;
mod sqlite;

use std::path::Path;

use anyhow::Result;
use tracing::warn;

use crate::config::{Config, StorageBackend, AUDIT_FILE_NAME, JSON_FILE_NAME, SQLITE_FILE_NAME};
use crate::models::Snapshot;

pub use audit::{AuditEntry, FileAuditLog};
pub use json::JsonStore;
pub use memory::{MemoryAuditLog, MemoryStore};
pub use sqlite::SqliteStore;

/// Reads and rewrites the full application state.
pub trait SnapshotStore {
    fn read(&self) -> Result<Snapshot>;

    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Startup read: anything unreadable degrades to an empty snapshot so a
    /// damaged file never blocks the app from opening.
    fn load_or_default(&self) -> Snapshot {
        match self.read() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("snapshot unreadable, starting empty: {err:#}");
                Snapshot::default()
            }
        }
    }
}

/// Write-only lend/return history.
pub trait AuditLog {
    fn append(&mut self, entry: &AuditEntry) -> Result<()>;
}

/// Build the configured snapshot backend inside `data_dir`.
pub fn open_store(config: &Config, data_dir: &Path) -> Result<Box<dyn SnapshotStore>> {
    let store: Box<dyn SnapshotStore> = match config.storage {
        StorageBackend::Sqlite => Box::new(SqliteStore::open(&data_dir.join(SQLITE_FILE_NAME))?),
        StorageBackend::Json => Box::new(JsonStore::new(data_dir.join(JSON_FILE_NAME))),
    };
    Ok(store)
}

pub fn open_audit_log(config: &Config, data_dir: &Path) -> Box<dyn AuditLog> {
    Box::new(FileAuditLog::new(
        data_dir.join(AUDIT_FILE_NAME),
        config.locale,
    ))
}
