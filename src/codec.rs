//! Storage codecs: the file-facing read/write entry points for sequences

use crate::config::CodecOptions;
use crate::error::{Result, SeqError};
use crate::frame::{Frame, IndexLabel, Sequence};
use crate::header::{ArrayHeader, SequenceLayout};
use crate::io::ArrayStore;
use crate::pack::{PackedVolume, SequencePacker};
use crate::probe;
use crate::unpack;
use crate::voxels::PackedVoxels;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// A codec that stores whole sequences in array files
#[async_trait]
pub trait SequenceStorageCodec: Send + Sync {
    /// Human readable codec name
    fn name(&self) -> &str;

    /// Extension (without the leading dot) used for new files
    fn default_extension(&self) -> &str;

    /// Header-only check whether this codec owns a file
    fn can_read(&self, header: &ArrayHeader) -> bool;

    /// Whether this codec can store the given sequence
    fn can_write(&self, sequence: &Sequence) -> bool;

    /// Decode a file whose header has already been read and accepted
    async fn read_with_header(
        &self,
        store: &dyn ArrayStore,
        path: &str,
        header: ArrayHeader,
    ) -> Result<Sequence>;

    /// Store a sequence at `path`
    async fn write(&self, store: &dyn ArrayStore, path: &str, sequence: &Sequence) -> Result<()>;

    /// Read a file, or `None` if this codec does not own it
    async fn read(&self, store: &dyn ArrayStore, path: &str) -> Result<Option<Sequence>> {
        let header = store.read_header(path).await?;
        if !self.can_read(&header) {
            warn!(codec = self.name(), path, "file is not a volume sequence");
            return Ok(None);
        }
        self.read_with_header(store, path, header).await.map(Some)
    }
}

/// Volume sequences stored as one NRRD array with a trailing list axis
#[derive(Debug, Clone, Default)]
pub struct VolumeSequenceCodec {
    options: CodecOptions,
}

impl VolumeSequenceCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }
}

#[async_trait]
impl SequenceStorageCodec for VolumeSequenceCodec {
    fn name(&self) -> &str {
        "Volume sequence"
    }

    fn default_extension(&self) -> &str {
        &self.options.default_extension
    }

    fn can_read(&self, header: &ArrayHeader) -> bool {
        probe::can_read(header)
    }

    fn can_write(&self, sequence: &Sequence) -> bool {
        probe::can_write(sequence)
    }

    async fn read_with_header(
        &self,
        store: &dyn ArrayStore,
        path: &str,
        header: ArrayHeader,
    ) -> Result<Sequence> {
        let layout = SequenceLayout::from_header(&header)?;
        let body = store.read_body(path, &header).await?;
        debug!(
            path,
            frames = layout.frame_count,
            dimensions = ?layout.dimensions,
            components = layout.component_count,
            "decoding sequence body"
        );
        let voxels =
            PackedVoxels::from_bytes(header.data_type, layout.packed_shape(), &body, header.endian)?;

        let sequence = unpack::unpack(PackedVolume { header, voxels })?;
        info!(path, frames = sequence.len(), "read volume sequence");
        Ok(sequence)
    }

    async fn write(&self, store: &dyn ArrayStore, path: &str, sequence: &Sequence) -> Result<()> {
        let frames: Vec<&Frame> = sequence.frames().ok_or_else(|| {
            SeqError::Configuration(format!("{} codec only stores volumes", self.name()))
        })?;
        let labels: Vec<&IndexLabel> = sequence.labels();

        let packed = SequencePacker::new(self.options.clone()).pack_with_index(
            &frames,
            &labels,
            &sequence.index_axis,
        )?;
        store
            .write(path, &packed.header, &packed.body(), self.options.compression_level)
            .await?;
        info!(
            path,
            frames = frames.len(),
            encoding = packed.header.encoding.as_str(),
            "wrote volume sequence"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::FrameKind;
    use crate::compression::CompressionLevel;
    use crate::frame::{DataNode, FrameGeometry, IndexAxis};
    use crate::header::Encoding;
    use crate::io::FileSystemArrayStore;
    use crate::types::{AxisKind, DataType};
    use crate::voxels::FrameVoxels;
    use ndarray::Array4;
    use tempfile::TempDir;

    fn label_map(value: u16) -> Frame {
        let mut frame = Frame::scalar(
            FrameGeometry::with_spacing([0.0, 0.0, 0.0], [0.5, 0.5, 3.0]),
            Array4::from_elem([3, 4, 5, 1], value).into(),
        );
        frame.kind = FrameKind::LabelMapVolume;
        frame
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemArrayStore::new(temp_dir.path());
        let codec = VolumeSequenceCodec::new(CodecOptions::default().with_encoding(Encoding::Raw));

        let mut sequence = Sequence::new(IndexAxis::new("phase", "%"));
        sequence.push_frame(0.0, label_map(1));
        sequence.push_frame(50.0, label_map(2));
        assert!(codec.can_write(&sequence));

        codec.write(&store, "labels.seq.nrrd", &sequence).await.unwrap();
        let read = codec.read(&store, "labels.seq.nrrd").await.unwrap().unwrap();
        assert_eq!(read, sequence);
    }

    #[tokio::test]
    async fn test_read_declines_plain_volume() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemArrayStore::new(temp_dir.path());
        let header = ArrayHeader::new(
            DataType::U8,
            vec![AxisKind::Domain, AxisKind::Domain, AxisKind::Domain],
            vec![2, 2, 2],
        )
        .unwrap()
        .with_encoding(Encoding::Raw);
        store
            .write("volume.nrrd", &header, &[0u8; 8], CompressionLevel::default())
            .await
            .unwrap();

        let codec = VolumeSequenceCodec::default();
        assert!(codec.read(&store, "volume.nrrd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_rejects_non_volume_items() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemArrayStore::new(temp_dir.path());
        let mut sequence = Sequence::default();
        sequence.push_frame(
            0.0,
            Frame::scalar(FrameGeometry::default(), FrameVoxels::zeros(DataType::F32, [1, 1, 1, 1])),
        );
        sequence.push(
            1.0,
            DataNode::Other {
                class_name: "vtkMRMLTransformNode".to_string(),
            },
        );

        let codec = VolumeSequenceCodec::default();
        assert!(!codec.can_write(&sequence));
        assert!(matches!(
            codec.write(&store, "mixed.seq.nrrd", &sequence).await,
            Err(SeqError::Configuration(_))
        ));
        assert!(!temp_dir.path().join("mixed.seq.nrrd").exists());
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(VolumeSequenceCodec::default().default_extension(), "seq.nrrd");
    }
}
