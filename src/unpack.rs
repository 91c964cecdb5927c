//! Splitting a sequence array back into typed frames

use crate::capability::{FrameKind, FrameParts};
use crate::error::{Result, SeqError};
use crate::frame::{Frame, FrameGeometry, IndexAxis, Sequence};
use crate::header::{index_values_field, ArrayHeader, SequenceLayout, FRAME_KIND_FIELD};
use crate::index_codec;
use crate::orientation::{self, lps_to_ras};
use crate::pack::PackedVolume;
use crate::types::Space;
use tracing::debug;

/// Resolve the concrete frame kind named in the header
pub fn frame_kind(header: &ArrayHeader) -> Result<FrameKind> {
    let tag = header
        .get_field(FRAME_KIND_FIELD)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .ok_or_else(|| SeqError::MissingField(FRAME_KIND_FIELD.to_string()))?;
    FrameKind::from_tag(tag).ok_or_else(|| SeqError::UnknownFrameKind(tag.to_string()))
}

/// Shared RAS geometry of all frames in the file
fn frame_geometry(header: &ArrayHeader, layout: &SequenceLayout) -> FrameGeometry {
    let to_ras = |point: [f64; 3]| match header.space {
        Some(Space::Ras) => point,
        _ => lps_to_ras(point),
    };

    let mut axes = [[0.0; 3]; 3];
    for (axis, direction) in axes.iter_mut().enumerate() {
        *direction = match header.space_directions.get(layout.first_spatial_axis + axis) {
            Some(Some(step)) => to_ras(*step),
            // Files without directions get unit spacing along the RAS axes
            _ => {
                let mut unit = [0.0; 3];
                unit[axis] = 1.0;
                unit
            }
        };
    }
    let origin = header.space_origin.map(to_ras).unwrap_or([0.0; 3]);
    FrameGeometry::from_axis_directions(origin, axes)
}

/// Rebuild the ordered, labeled frames of a packed volume
pub fn unpack(volume: PackedVolume) -> Result<Sequence> {
    let PackedVolume { header, voxels } = volume;
    let layout = SequenceLayout::from_header(&header)?;
    let kind = frame_kind(&header)?;

    let index_type = layout.index_type(&header)?;
    let encoded = header
        .get_field(&index_values_field(layout.list_axis))
        .unwrap_or_default();
    let labels = index_codec::decode_labels(encoded, index_type)?;

    if labels.len() != layout.frame_count {
        return Err(SeqError::FrameCountMismatch {
            labels: labels.len(),
            frames: layout.frame_count,
        });
    }
    if voxels.shape() != layout.packed_shape() {
        return Err(SeqError::InvalidDimensions(format!(
            "voxel array shape {:?} does not match header shape {:?}",
            voxels.shape(),
            layout.packed_shape()
        )));
    }
    if voxels.data_type() != header.data_type {
        return Err(SeqError::InvalidDataType(format!(
            "header declares {}, voxels are {}",
            header.data_type,
            voxels.data_type()
        )));
    }

    let geometry = frame_geometry(&header, &layout);
    let measurement_frame = header.measurement_frame;
    let decode = kind.capability().decode;
    let stored_as_lps = header.space != Some(Space::Ras);

    let mut sequence = Sequence::new(IndexAxis::new(
        header.axis_labels.get(layout.list_axis).cloned().unwrap_or_default(),
        header.axis_units.get(layout.list_axis).cloned().unwrap_or_default(),
    ));
    for (label, slice) in labels.into_iter().zip(voxels.split()) {
        let frame: Frame = decode(FrameParts {
            component_kind: layout.component_kind,
            geometry,
            measurement_frame,
            voxels: slice,
        })?;
        let frame = if stored_as_lps {
            orientation::from_storage_convention(frame)?
        } else {
            frame
        };
        sequence.push_frame(label, frame);
    }

    debug!(
        frames = sequence.len(),
        kind = %kind,
        components = %layout.component_kind,
        "unpacked sequence"
    );
    Ok(sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{IndexLabel, IDENTITY};
    use crate::pack::SequencePacker;
    use crate::types::{AxisKind, ComponentKind, DataType};
    use crate::voxels::{FrameVoxels, PackedVoxels};
    use ndarray::Array4;

    fn ramp_frame(offset: f32) -> Frame {
        let values: Vec<f32> = (0..1000).map(|v| v as f32 + offset).collect();
        Frame::scalar(
            FrameGeometry::from_axis_directions(
                [12.0, -3.0, 7.5],
                [[0.0, 0.9, 0.0], [-0.9, 0.0, 0.0], [0.0, 0.0, 1.2]],
            ),
            Array4::from_shape_vec([10, 10, 10, 1], values).unwrap().into(),
        )
    }

    fn numeric_labels() -> Vec<IndexLabel> {
        vec![
            IndexLabel::Numeric(0.0),
            IndexLabel::Numeric(10.0),
            IndexLabel::Numeric(25.5),
        ]
    }

    #[test]
    fn test_round_trip_scalar() {
        let frames = vec![ramp_frame(0.0), ramp_frame(1000.0), ramp_frame(2000.0)];
        let packed = SequencePacker::default().pack(&frames, &numeric_labels()).unwrap();

        let sequence = unpack(packed).unwrap();
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.index_axis, IndexAxis::default());
        assert_eq!(sequence.labels(), numeric_labels().iter().collect::<Vec<_>>());

        let unpacked = sequence.frames().unwrap();
        for (original, restored) in frames.iter().zip(unpacked) {
            assert_eq!(restored.kind, FrameKind::ScalarVolume);
            assert!(restored.voxels.approx_eq(&original.voxels, 0.0));
            for axis in 0..3 {
                for (a, b) in restored
                    .geometry
                    .axis_direction(axis)
                    .iter()
                    .zip(original.geometry.axis_direction(axis))
                {
                    assert!((a - b).abs() < 1e-12);
                }
            }
            assert_eq!(restored.geometry.origin, original.geometry.origin);
        }
    }

    #[test]
    fn test_round_trip_spatial_vectors() {
        let voxels: FrameVoxels =
            Array4::from_shape_vec([1, 1, 2, 3], vec![1.0f64, -2.0, 3.0, 0.5, 0.25, -0.125])
                .unwrap()
                .into();
        let frame = Frame::new(
            FrameKind::VectorVolume,
            ComponentKind::Vector,
            FrameGeometry::default(),
            voxels,
        )
        .with_measurement_frame(IDENTITY);

        let packed = SequencePacker::default()
            .pack(&[frame.clone()], &[IndexLabel::from("only")])
            .unwrap();
        let sequence = unpack(packed).unwrap();
        let restored = sequence.frames().unwrap()[0].clone();
        assert_eq!(restored.voxels, frame.voxels);
        assert_eq!(restored.measurement_frame, Some(IDENTITY));
        assert_eq!(restored.component_kind, ComponentKind::Vector);
    }

    #[test]
    fn test_not_a_sequence() {
        let header = ArrayHeader::new(
            DataType::F32,
            vec![AxisKind::Domain, AxisKind::Domain, AxisKind::Domain],
            vec![2, 2, 2],
        )
        .unwrap();
        let volume = PackedVolume {
            header,
            voxels: PackedVoxels::from_bytes(
                DataType::F32,
                [1, 2, 2, 2, 1],
                &[0u8; 32],
                crate::types::Endian::Little,
            )
            .unwrap(),
        };
        assert!(matches!(unpack(volume), Err(SeqError::NotASequence(_))));
    }

    #[test]
    fn test_label_count_mismatch() {
        let frames = vec![ramp_frame(0.0), ramp_frame(1.0), ramp_frame(2.0)];
        let mut packed = SequencePacker::default().pack(&frames, &numeric_labels()).unwrap();
        packed
            .header
            .add_field("axis 3 index values", index_codec::encode(&["0", "1", "2", "3"]));

        assert!(matches!(
            unpack(packed),
            Err(SeqError::FrameCountMismatch { labels: 4, frames: 3 })
        ));
    }

    #[test]
    fn test_missing_and_unknown_kind() {
        let frames = vec![ramp_frame(0.0)];
        let labels = vec![IndexLabel::Numeric(1.0)];

        let mut missing = SequencePacker::default().pack(&frames, &labels).unwrap();
        missing.header.fields.remove(FRAME_KIND_FIELD);
        assert!(matches!(unpack(missing), Err(SeqError::MissingField(_))));

        let mut unknown = SequencePacker::default().pack(&frames, &labels).unwrap();
        unknown.header.add_field(FRAME_KIND_FIELD, "vtkMRMLModelNode");
        assert!(matches!(unpack(unknown), Err(SeqError::UnknownFrameKind(_))));
    }

    #[test]
    fn test_malformed_labels() {
        let frames = vec![ramp_frame(0.0)];
        let mut packed = SequencePacker::default()
            .pack(&frames, &[IndexLabel::Numeric(1.0)])
            .unwrap();
        packed.header.add_field("axis 3 index values", "1%2");
        assert!(matches!(unpack(packed), Err(SeqError::Format(_))));
    }

    #[test]
    fn test_text_labels_default_when_type_missing() {
        let frames = vec![ramp_frame(0.0)];
        let mut packed = SequencePacker::default()
            .pack(&frames, &[IndexLabel::Numeric(4.0)])
            .unwrap();
        packed.header.fields.remove("axis 3 index type");
        let sequence = unpack(packed).unwrap();
        assert_eq!(sequence.labels(), vec![&IndexLabel::from("4")]);
    }

    #[test]
    fn test_ras_space_read_as_is() {
        let frames = vec![ramp_frame(0.0)];
        let mut packed = SequencePacker::default()
            .pack(&frames, &[IndexLabel::Numeric(0.0)])
            .unwrap();
        packed.header.space = Some(Space::Ras);
        packed.header.space_origin = Some([1.0, 2.0, 3.0]);
        let sequence = unpack(packed).unwrap();
        assert_eq!(sequence.frames().unwrap()[0].geometry.origin, [1.0, 2.0, 3.0]);
    }
}
