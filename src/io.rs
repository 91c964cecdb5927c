//! Array storage: the header + raw body reader/writer the codec sits on

use crate::compression::{get_body_codec, CompressionLevel};
use crate::error::{Result, SeqError};
use crate::header::ArrayHeader;
use crate::nrrd::{self, NRRD_MAGIC_PREFIX};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, BufReader};
use tracing::debug;

/// Headers larger than this are not NRRD headers
const MAX_HEADER_BYTES: u64 = 1 << 20;

/// Trait for reading and writing header + body array files
#[async_trait]
pub trait ArrayStore: Send + Sync {
    /// Read only the header of a file
    async fn read_header(&self, path: &str) -> Result<ArrayHeader>;

    /// Read and decode the body described by `header`
    async fn read_body(&self, path: &str, header: &ArrayHeader) -> Result<Bytes>;

    /// Write a complete file, compressing the body at `level` when the
    /// encoding compresses; nothing is left behind on failure
    async fn write(
        &self,
        path: &str,
        header: &ArrayHeader,
        raw: &[u8],
        level: CompressionLevel,
    ) -> Result<()>;
}

/// File system store for attached-header NRRD files
pub struct FileSystemArrayStore {
    base_path: PathBuf,
}

impl FileSystemArrayStore {
    /// Create a new file system store rooted at `base_path`
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for a relative path
    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    fn partial_path(full_path: &Path) -> PathBuf {
        let mut name = full_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        full_path.with_file_name(name)
    }
}

#[async_trait]
impl ArrayStore for FileSystemArrayStore {
    async fn read_header(&self, path: &str) -> Result<ArrayHeader> {
        let full_path = self.full_path(path);
        let file = fs::File::open(&full_path).await?;
        let mut reader = BufReader::new(file);

        if !reader.fill_buf().await?.starts_with(NRRD_MAGIC_PREFIX.as_bytes()) {
            return Err(SeqError::Parse(format!(
                "{} is not an NRRD file",
                full_path.display()
            )));
        }

        let mut text = Vec::new();
        let mut offset = 0u64;
        loop {
            let mut line = Vec::new();
            let read = reader.read_until(b'\n', &mut line).await?;
            if read == 0 {
                break;
            }
            offset += read as u64;
            if line == b"\n" || line == b"\r\n" {
                break;
            }
            if offset > MAX_HEADER_BYTES {
                return Err(SeqError::Parse(format!(
                    "{} has no end of header in the first {} bytes",
                    full_path.display(),
                    MAX_HEADER_BYTES
                )));
            }
            text.extend_from_slice(&line);
        }

        let text = String::from_utf8(text)
            .map_err(|_| SeqError::Parse("header is not valid UTF-8".to_string()))?;
        let mut header = nrrd::parse_header(&text)?;
        header.data_offset = Some(offset);
        debug!(path = %full_path.display(), header_bytes = offset, "read array header");
        Ok(header)
    }

    async fn read_body(&self, path: &str, header: &ArrayHeader) -> Result<Bytes> {
        let full_path = self.full_path(path);
        let offset = header
            .data_offset
            .ok_or_else(|| SeqError::MissingField("data offset".to_string()))?;

        let mut file = fs::File::open(&full_path).await?;
        file.seek(std::io::SeekFrom::Start(offset)).await?;
        let mut encoded = Vec::new();
        file.read_to_end(&mut encoded).await?;

        let codec = get_body_codec(header.encoding);
        let raw = codec.decode(&encoded, Some(header.body_size_bytes()?))?;
        debug!(
            path = %full_path.display(),
            encoded_bytes = encoded.len(),
            raw_bytes = raw.len(),
            "read array body"
        );
        Ok(Bytes::from(raw))
    }

    async fn write(
        &self,
        path: &str,
        header: &ArrayHeader,
        raw: &[u8],
        level: CompressionLevel,
    ) -> Result<()> {
        let expected = header.body_size_bytes()?;
        if raw.len() != expected {
            return Err(SeqError::InvalidDimensions(format!(
                "data size mismatch: header describes {} bytes, got {}",
                expected,
                raw.len()
            )));
        }
        let text = nrrd::format_header(header)?;
        let body = get_body_codec(header.encoding).encode(raw, level)?;

        let full_path = self.full_path(path);

        // Create parent directories if they don't exist
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let partial = Self::partial_path(&full_path);
        let written = async {
            let mut file = fs::File::create(&partial).await?;
            file.write_all(text.as_bytes()).await?;
            file.write_all(&body).await?;
            file.sync_all().await?;
            fs::rename(&partial, &full_path).await
        }
        .await;

        if let Err(err) = written {
            let _ = fs::remove_file(&partial).await;
            return Err(SeqError::Io(err));
        }
        debug!(
            path = %full_path.display(),
            header_bytes = text.len(),
            body_bytes = body.len(),
            level = level.value(),
            "wrote array file"
        );
        Ok(())
    }
}
