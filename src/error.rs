//! Engine-level error kinds surfaced to callers.
//!
//! `Validation` is raised before any storage mutation. `Storage` wraps
//! everything the SQLite layer can fail with and is never retried.

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Storage failure: {0}")]
    Storage(DatabaseError),
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn medication_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: "Medication".into(),
            id: id.to_string(),
        }
    }
}

impl From<DatabaseError> for TrackerError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Storage(other),
        }
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(DatabaseError::Sqlite(err))
    }
}
