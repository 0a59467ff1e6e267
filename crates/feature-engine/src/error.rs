//! Feature Engineering Error Types

use dataset::DatasetError;
use std::fmt;
use thiserror::Error;

/// Which side of a join a key column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Left,
    Right,
}

impl fmt::Display for JoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinSide::Left => write!(f, "left"),
            JoinSide::Right => write!(f, "lookup"),
        }
    }
}

/// Errors raised while fitting or applying stages. All of them end the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Missing or incompatible column
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Invalid stage configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Stateful stage applied without its fitted state
    #[error("Stage {0} has not been fitted")]
    FitNotRunError(String),

    /// Pipeline transform without a matching fitted state
    #[error("Pipeline has not been fitted")]
    PipelineNotFittedError,

    /// Join key column missing from one of the inputs
    #[error("Join key {column} missing from {side} input")]
    JoinKeyError { side: JoinSide, column: String },

    /// Assembler input column not present
    #[error("Assembler input column missing: {0}")]
    MissingColumnError(String),

    /// Row value rejected under the `error` policy
    #[error("{stage}: invalid value {value} at row {row}")]
    InvalidValueError {
        stage: String,
        row: usize,
        value: String,
    },
}

impl From<DatasetError> for FeatureError {
    fn from(err: DatasetError) -> Self {
        FeatureError::SchemaError(err.to_string())
    }
}

/// Result alias for stage operations
pub type Result<T> = std::result::Result<T, FeatureError>;
