//! Storage Layer
//!
//! Table stores exposing load/save of record sets by table name: an in-memory
//! store and a SQLite store.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use dataset::DatasetError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Table not found: {0}")]
    NotFound(String),
    #[error("Table already exists: {0}")]
    AlreadyExists(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Invalid table data: {0}")]
    InvalidData(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<DatasetError> for StorageError {
    fn from(err: DatasetError) -> Self {
        StorageError::InvalidData(err.to_string())
    }
}

/// What `save` does when the table already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// Drop and recreate the table
    #[default]
    Overwrite,
    /// Refuse to touch an existing table
    ErrorIfExists,
}
