//! FILENAME: frame/src/error.rs

use labels::IndexError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Label not found: {0}")]
    KeyNotFound(String),

    #[error("Cannot convert {value} to {dtype}")]
    TypeMismatch { value: String, dtype: String },

    #[error("Data overlaps at row {row}, column {column}")]
    DataConflict { row: String, column: String },

    #[error("Only left join is supported for update, got {0}")]
    UnsupportedJoin(String),
}
