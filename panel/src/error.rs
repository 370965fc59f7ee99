//! FILENAME: panel/src/error.rs

use frame::FrameError;
use labels::IndexError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PanelError {
    // Construction
    #[error("Expected 3 dimensions, got {0}")]
    InvalidDimensions(usize),

    #[error("Failed to cast to {0}")]
    CastFailed(String),

    #[error("Invalid panel input: {0}")]
    InvalidInput(String),

    // Validation
    #[error("No axis named {0}")]
    InvalidAxis(String),

    #[error("Axes must be unique, got {0}")]
    DuplicateAxis(String),

    #[error("Expected {expected} axes, got {got}")]
    WrongAxisCount { expected: usize, got: usize },

    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },

    // Alignment
    #[error("Length of {axis} ({got}) does not match data extent ({expected})")]
    AxisLengthMismatch {
        axis: String,
        expected: usize,
        got: usize,
    },

    #[error("Raw planes must match shape on axis {0}")]
    LengthMismatch(String),

    // Semantic
    #[error("Must specify at least one axis")]
    NoAxisSpecified,

    #[error("Cannot specify both a fill method and value")]
    FillConflict,

    #[error("Must specify a fill method or value")]
    MissingFill,

    #[error("Join not supported: {0}")]
    UnsupportedJoin(String),

    #[error("Suffixes not supported when passing multiple panels")]
    SuffixWithMultiple,

    #[error("Simple arithmetic with Panel can only be done with scalar values")]
    NonScalarOperand,

    #[error("Multi-axis reindex requires homogeneous storage, found kinds {0}")]
    MixedBlockFastPath(String),

    #[error("Operation requires numeric data: {0}")]
    NonNumeric(String),

    #[error("Items overlap: {0}")]
    OverlappingItems(String),

    // Lookup
    #[error("Label not found: {0}")]
    KeyNotFound(String),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Snapshot error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PanelError>;
