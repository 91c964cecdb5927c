//! Body encodings for array files

use crate::error::{Result, SeqError};
use crate::header::Encoding;
use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression as FlateCompression;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Compression level (0-9, where 0 is no compression and 9 is maximum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    pub fn fast() -> Self {
        Self(1)
    }

    pub fn best() -> Self {
        Self(9)
    }

    pub fn value(&self) -> u8 {
        self.0.min(9)
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self(6)
    }
}

/// Upper bound on memory reserved ahead of inflating a body
const MAX_PREALLOCATION_BYTES: usize = 64 << 20;

/// Turns a raw body into its on-disk form and back
pub trait BodyCodec: Send + Sync {
    fn encode(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>>;

    fn decode(&self, data: &[u8], expected_size: Option<usize>) -> Result<Vec<u8>>;

    fn encoding(&self) -> Encoding;
}

/// Body stored verbatim
#[derive(Debug, Default)]
pub struct RawCodec;

impl BodyCodec for RawCodec {
    fn encode(&self, data: &[u8], _level: CompressionLevel) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8], expected_size: Option<usize>) -> Result<Vec<u8>> {
        match expected_size {
            // Trailing bytes after the body are allowed by NRRD
            Some(size) if data.len() >= size => Ok(data[..size].to_vec()),
            Some(size) => Err(SeqError::Decompression(format!(
                "raw body holds {} bytes, expected {}",
                data.len(),
                size
            ))),
            None => Ok(data.to_vec()),
        }
    }

    fn encoding(&self) -> Encoding {
        Encoding::Raw
    }
}

/// Gzip-compressed body
#[derive(Debug, Default)]
pub struct GzipCodec;

impl BodyCodec for GzipCodec {
    fn encode(&self, data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(data, FlateCompression::new(level.value() as u32));
        let mut compressed = Vec::new();
        encoder
            .read_to_end(&mut compressed)
            .map_err(|e| SeqError::Compression(e.to_string()))?;
        Ok(compressed)
    }

    fn decode(&self, data: &[u8], expected_size: Option<usize>) -> Result<Vec<u8>> {
        let decoder = GzDecoder::new(data);
        let mut decompressed = Vec::with_capacity(
            expected_size.unwrap_or(0).min(MAX_PREALLOCATION_BYTES),
        );
        // One byte past the expected size is enough to detect an oversized body
        let limit = expected_size.map_or(u64::MAX, |size| (size as u64).saturating_add(1));
        decoder
            .take(limit)
            .read_to_end(&mut decompressed)
            .map_err(|e| SeqError::Decompression(e.to_string()))?;
        if let Some(size) = expected_size {
            if decompressed.len() != size {
                return Err(SeqError::Decompression(format!(
                    "gzip body inflates to {} bytes, expected {}",
                    decompressed.len(),
                    size
                )));
            }
        }
        Ok(decompressed)
    }

    fn encoding(&self) -> Encoding {
        Encoding::Gzip
    }
}

/// Get a body codec for a given encoding
pub fn get_body_codec(encoding: Encoding) -> Box<dyn BodyCodec> {
    match encoding {
        Encoding::Raw => Box::new(RawCodec),
        Encoding::Gzip => Box::new(GzipCodec),
    }
}
