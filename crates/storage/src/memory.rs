//! In-Memory Table Store

use crate::{SaveMode, StorageError};
use dataset::RecordSet;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Table store backed by a map of record sets
pub struct MemoryStore {
    tables: Mutex<HashMap<String, RecordSet>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Creating in-memory table store");
        Self {
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Load a table by name
    pub fn load(&self, table: &str) -> Result<RecordSet, StorageError> {
        let tables = self.tables.lock().map_err(|e| {
            StorageError::DatabaseError(format!("Lock error: {}", e))
        })?;

        tables
            .get(table)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(table.to_string()))
    }

    /// Save a table by name
    pub fn save(
        &self,
        records: &RecordSet,
        table: &str,
        mode: SaveMode,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.lock().map_err(|e| {
            StorageError::DatabaseError(format!("Lock error: {}", e))
        })?;

        if mode == SaveMode::ErrorIfExists && tables.contains_key(table) {
            return Err(StorageError::AlreadyExists(table.to_string()));
        }

        tables.insert(table.to_string(), records.clone());
        debug!("Saved {} rows to {}", records.num_rows(), table);
        Ok(())
    }

    /// Names of stored tables, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .lock()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Whether a table exists
    pub fn contains(&self, table: &str) -> bool {
        self.tables.lock().map(|t| t.contains_key(table)).unwrap_or(false)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
