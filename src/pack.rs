//! Packing ordered frames into one sequence array

use crate::config::CodecOptions;
use crate::error::{Result, SeqError};
use crate::frame::{Frame, IndexAxis, IndexLabel};
use crate::geometry;
use crate::header::{index_type_field, index_values_field, ArrayHeader, FRAME_KIND_FIELD};
use crate::index_codec;
use crate::orientation::{self, ras_to_lps};
use crate::types::{AxisKind, Space};
use crate::voxels::{FrameVoxels, PackedVoxels};
use std::borrow::Borrow;
use tracing::debug;

/// Header plus the combined `[n, k, j, i, c]` voxel array
#[derive(Debug, Clone, PartialEq)]
pub struct PackedVolume {
    pub header: ArrayHeader,
    pub voxels: PackedVoxels,
}

impl PackedVolume {
    /// Raw little-endian body in file order
    pub fn body(&self) -> Vec<u8> {
        self.voxels.to_le_bytes()
    }
}

/// Builds [`PackedVolume`]s from frames
#[derive(Debug, Clone, Default)]
pub struct SequencePacker {
    options: CodecOptions,
}

impl SequencePacker {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    /// Pack with the default `time`/`s` index axis
    pub fn pack<F, L>(&self, frames: &[F], labels: &[L]) -> Result<PackedVolume>
    where
        F: Borrow<Frame>,
        L: Borrow<IndexLabel>,
    {
        self.pack_with_index(frames, labels, &IndexAxis::default())
    }

    pub fn pack_with_index<F, L>(
        &self,
        frames: &[F],
        labels: &[L],
        index_axis: &IndexAxis,
    ) -> Result<PackedVolume>
    where
        F: Borrow<Frame>,
        L: Borrow<IndexLabel>,
    {
        let frames: Vec<&Frame> = frames.iter().map(Borrow::borrow).collect();
        let labels: Vec<&IndexLabel> = labels.iter().map(Borrow::borrow).collect();

        let reference = *frames.first().ok_or(SeqError::EmptyInput)?;
        if frames.len() != labels.len() {
            return Err(SeqError::FrameCountMismatch {
                labels: labels.len(),
                frames: frames.len(),
            });
        }
        geometry::validate_with_tolerance(&frames, self.options.geometry_tolerance)?;
        (reference.kind.capability().encode)(reference)?;

        let arrays: Vec<&FrameVoxels> = frames.iter().map(|frame| &frame.voxels).collect();
        let mut voxels = FrameVoxels::stack(&arrays)?;

        let spatial_vectors = orientation::frame_has_spatial_vectors(reference);
        if spatial_vectors {
            orientation::packed_to_storage_convention(&mut voxels)?;
        }

        let header = self.build_header(reference, &labels, index_axis, spatial_vectors)?;
        debug!(
            frames = frames.len(),
            kind = %reference.kind,
            components = %reference.component_kind,
            shape = ?voxels.shape(),
            "packed sequence"
        );
        Ok(PackedVolume { header, voxels })
    }

    fn build_header(
        &self,
        reference: &Frame,
        labels: &[&IndexLabel],
        index_axis: &IndexAxis,
        spatial_vectors: bool,
    ) -> Result<ArrayHeader> {
        let [i, j, k] = reference.dimensions();
        let mut kinds = Vec::with_capacity(5);
        let mut sizes = Vec::with_capacity(5);
        let mut directions = Vec::with_capacity(5);
        if let Some(kind) = reference.component_kind.axis_kind() {
            kinds.push(kind);
            sizes.push(reference.component_count());
            directions.push(None);
        }
        for (axis, size) in [i, j, k].into_iter().enumerate() {
            kinds.push(AxisKind::Domain);
            sizes.push(size);
            directions.push(Some(ras_to_lps(reference.geometry.axis_direction(axis))));
        }
        kinds.push(AxisKind::List);
        sizes.push(labels.len());
        directions.push(None);

        let list_axis = kinds.len() - 1;
        let mut header = ArrayHeader::new(reference.data_type(), kinds, sizes)?
            .with_encoding(self.options.encoding)
            .with_space(Space::Lps, ras_to_lps(reference.geometry.origin));
        header.space_directions = directions;
        header.axis_labels[list_axis] = index_axis.name.clone();
        header.axis_units[list_axis] = index_axis.unit.clone();
        if spatial_vectors {
            if let Some(measurement_frame) = reference.measurement_frame {
                header = header.with_measurement_frame(measurement_frame);
            }
        }

        let (index_type, encoded) = index_codec::encode_labels(labels);
        header.add_field(FRAME_KIND_FIELD, reference.kind.tag());
        header.add_field(index_type_field(list_axis), index_type.as_str());
        header.add_field(index_values_field(list_axis), encoded);
        Ok(header)
    }
}
