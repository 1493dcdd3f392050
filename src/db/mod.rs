pub mod repository;
pub mod sqlite;

pub use sqlite::*;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Corrupt {field} in stored record: {reason}")]
    CorruptField { field: &'static str, reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Injectable handle to the patients store.
///
/// Explicitly constructed in `main` (or a test) and passed to handlers via
/// the API context, never a module-level singleton. Clones share one
/// connection behind a mutex; repository functions run against `&Connection`.
#[derive(Clone)]
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecordStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run a repository operation against the shared connection.
    pub fn with<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let conn = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        op(&conn)
    }
}
