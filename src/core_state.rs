//! Shared application state for the HTTP surface.
//!
//! `CoreState` owns the single SQLite connection. The engine functions only
//! ever see a borrowed `&Connection`, so tests can hand them an in-memory
//! database directly and skip this type entirely.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use crate::db::{self, DatabaseError};

pub struct CoreState {
    conn: Mutex<Connection>,
    /// `None` for in-memory databases.
    pub db_path: Option<PathBuf>,
}

impl CoreState {
    /// Open (or create) the database file and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Medication database ready");
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Fresh in-memory database; contents vanish with the state.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: Mutex::new(db::open_memory_database()?),
            db_path: None,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_db<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let guard = self.lock()?;
        f(&*guard)
    }
}
