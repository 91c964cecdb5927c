//! Codec options

use crate::compression::CompressionLevel;
use crate::error::{Result, SeqError};
use crate::geometry::GEOMETRY_TOLERANCE;
use crate::header::Encoding;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default extension advertised for writing
pub const DEFAULT_EXTENSION: &str = "seq.nrrd";

/// Options for packing and writing volume sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecOptions {
    /// Body encoding of written files
    pub encoding: Encoding,

    /// Compression level used when the encoding compresses
    pub compression_level: CompressionLevel,

    /// Relative tolerance for geometry comparison between frames
    pub geometry_tolerance: f64,

    /// Extension (without leading dot) advertised for writing
    pub default_extension: String,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Gzip,
            compression_level: CompressionLevel::default(),
            geometry_tolerance: GEOMETRY_TOLERANCE,
            default_extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl CodecOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_compression_level(mut self, level: CompressionLevel) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_geometry_tolerance(mut self, tolerance: f64) -> Self {
        self.geometry_tolerance = tolerance;
        self
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !self.geometry_tolerance.is_finite() || self.geometry_tolerance < 0.0 {
            return Err(SeqError::Configuration(format!(
                "geometry tolerance must be a non-negative number, got {}",
                self.geometry_tolerance
            )));
        }
        if self.default_extension.is_empty() || self.default_extension.starts_with('.') {
            return Err(SeqError::Configuration(format!(
                "default extension must be non-empty without a leading dot, got {:?}",
                self.default_extension
            )));
        }
        Ok(())
    }

    /// Parse options from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}
