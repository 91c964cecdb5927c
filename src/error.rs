//! Error types for volume sequence operations

use crate::geometry::GeometryAttribute;
use thiserror::Error;

/// Main error type for sequence packing, unpacking and storage
#[derive(Error, Debug)]
pub enum SeqError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Header parse error: {0}")]
    Parse(String),

    #[error("No frames to pack")]
    EmptyInput,

    #[error("Frame {index} is incompatible with frame 0: {attribute} differs")]
    IncompatibleGeometry {
        index: usize,
        attribute: GeometryAttribute,
    },

    #[error("Unsupported component kind: {0}")]
    UnsupportedComponentKind(String),

    #[error("Not a volume sequence: {0}")]
    NotASequence(String),

    #[error("Frame count mismatch: {labels} index labels for {frames} frames")]
    FrameCountMismatch { labels: usize, frames: usize },

    #[error("Format error: {0}")]
    Format(String),

    #[error("Unknown frame kind: {0}")]
    UnknownFrameKind(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid data type: {0}")]
    InvalidDataType(String),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Decompression error: {0}")]
    Decompression(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized Result type for sequence operations
pub type Result<T> = std::result::Result<T, SeqError>;

impl From<serde_json::Error> for SeqError {
    fn from(err: serde_json::Error) -> Self {
        SeqError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for SeqError {
    fn from(err: ndarray::ShapeError) -> Self {
        SeqError::InvalidDimensions(err.to_string())
    }
}
