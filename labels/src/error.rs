//! FILENAME: labels/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("Duplicate label in index: {0}")]
    DuplicateLabel(String),

    #[error("Label not found: {0}")]
    KeyNotFound(String),

    #[error("Fill method requires a monotonic index")]
    NotMonotonic,

    #[error("Tuple label has {got} levels, expected {expected}")]
    LevelMismatch { expected: usize, got: usize },

    #[error("Position {position} out of bounds for index of length {len}")]
    OutOfBounds { position: usize, len: usize },

    #[error("Invalid fill method: {0}")]
    InvalidFillMethod(String),

    #[error("Invalid join type: {0}")]
    InvalidJoin(String),
}
