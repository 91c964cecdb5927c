//! volseq - Volume sequence codec
//!
//! Stores an ordered sequence of same-geometry volumetric frames (a 4D time
//! series, a set of cardiac phases, ...) as one NRRD array whose last axis is
//! a `list` axis, and reads such files back into typed, labeled frames.
//!
//! # Features
//!
//! - Scalar, label map and vector/color volumes, any NRRD scalar type
//! - Numeric or text index labels per frame, kept in header custom fields
//! - RAS in memory, LPS on disk, including spatial vector voxels
//! - Raw and gzip bodies through the async [`ArrayStore`] layer
//!
//! # Example
//!
//! ```rust,ignore
//! use volseq::{CodecOptions, CodecRegistry, FileSystemArrayStore};
//!
//! # async fn example(sequence: volseq::Sequence) -> volseq::Result<()> {
//! let registry = CodecRegistry::with_defaults(CodecOptions::default());
//! let store = FileSystemArrayStore::new("/data/cardiac");
//!
//! registry.write(&store, "phases.seq.nrrd", &sequence).await?;
//! let read = registry.read(&store, "phases.seq.nrrd").await?;
//! # Ok(())
//! # }
//! ```

pub mod capability;
pub mod codec;
pub mod compression;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod header;
pub mod index_codec;
pub mod io;
pub mod nrrd;
pub mod orientation;
pub mod pack;
pub mod probe;
pub mod registry;
pub mod types;
pub mod unpack;
pub mod voxels;

// Re-exports
pub use capability::{FrameCapability, FrameKind};
pub use codec::{SequenceStorageCodec, VolumeSequenceCodec};
pub use compression::CompressionLevel;
pub use config::CodecOptions;
pub use error::{Result, SeqError};
pub use frame::{DataNode, Frame, FrameGeometry, IndexAxis, IndexLabel, Sequence};
pub use geometry::GeometryAttribute;
pub use header::{ArrayHeader, Encoding, SequenceLayout};
pub use io::{ArrayStore, FileSystemArrayStore};
pub use pack::{PackedVolume, SequencePacker};
pub use registry::CodecRegistry;
pub use types::{ComponentKind, DataType, IndexType};
pub use unpack::unpack;
pub use voxels::{FrameVoxels, PackedVoxels};

/// Version of the volseq implementation
pub const VOLSEQ_VERSION: &str = env!("CARGO_PKG_VERSION");
