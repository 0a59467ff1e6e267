//! Record Sets
//!
//! Provides the typed, row-oriented table that every pipeline stage consumes
//! and produces.

mod record_set;
mod schema;
mod value;

pub use record_set::RecordSet;
pub use schema::{ColumnType, Field, Schema};
pub use value::Value;

use thiserror::Error;

/// Errors raised while building or reading a record set
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// Column name not present in the schema
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Two fields share a name
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// Row has the wrong number of cells
    #[error("Row {row} has {actual} values, schema has {expected} columns")]
    ArityMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Cell value does not match the column type
    #[error("Column {column} expects {expected}, row {row} holds {actual}")]
    TypeMismatch {
        column: String,
        row: usize,
        expected: ColumnType,
        actual: String,
    },

    /// Replacement column has the wrong number of values
    #[error("Column {column} has {actual} values, record set has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column cannot be exported as numbers
    #[error("Column {column} is not numeric at row {row}")]
    NotNumeric { column: String, row: usize },
}

/// Result alias for record set operations
pub type Result<T> = std::result::Result<T, DatasetError>;
