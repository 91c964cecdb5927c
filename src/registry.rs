//! Explicit codec registry handed to callers

use crate::codec::{SequenceStorageCodec, VolumeSequenceCodec};
use crate::config::CodecOptions;
use crate::error::{Result, SeqError};
use crate::frame::Sequence;
use crate::header::ArrayHeader;
use crate::io::ArrayStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered set of storage codecs; earlier registrations win
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn SequenceStorageCodec>>,
}

impl CodecRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the volume sequence codec
    pub fn with_defaults(options: CodecOptions) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VolumeSequenceCodec::new(options)));
        registry
    }

    pub fn register(&mut self, codec: Arc<dyn SequenceStorageCodec>) {
        debug!(codec = codec.name(), "registered sequence codec");
        self.codecs.push(codec);
    }

    pub fn codecs(&self) -> &[Arc<dyn SequenceStorageCodec>] {
        &self.codecs
    }

    pub fn reader_for(&self, header: &ArrayHeader) -> Option<Arc<dyn SequenceStorageCodec>> {
        self.codecs
            .iter()
            .find(|codec| codec.can_read(header))
            .cloned()
    }

    pub fn writer_for(&self, sequence: &Sequence) -> Option<Arc<dyn SequenceStorageCodec>> {
        self.codecs
            .iter()
            .find(|codec| codec.can_write(sequence))
            .cloned()
    }

    /// Read `path` with the first codec that owns it
    ///
    /// The header is read once; `None` means no codec claimed the file.
    pub async fn read(&self, store: &dyn ArrayStore, path: &str) -> Result<Option<Sequence>> {
        let header = store.read_header(path).await?;
        let Some(codec) = self.reader_for(&header) else {
            warn!(path, "no sequence codec accepts file");
            return Ok(None);
        };
        codec.read_with_header(store, path, header).await.map(Some)
    }

    /// Write `sequence` with the first codec that can store it
    pub async fn write(&self, store: &dyn ArrayStore, path: &str, sequence: &Sequence) -> Result<()> {
        let codec = self.writer_for(sequence).ok_or_else(|| {
            SeqError::Configuration(format!(
                "no registered codec can write a sequence of {} items",
                sequence.len()
            ))
        })?;
        codec.write(store, path, sequence).await
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.codecs.iter().map(|codec| codec.name()))
            .finish()
    }
}
