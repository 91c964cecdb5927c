//! Concrete frame kinds and their encode/decode capabilities
//!
//! Every kind of volume the codec can restore is a variant of [`FrameKind`].
//! The header stores the kind's tag; reading looks the tag up in a static
//! capability table instead of asking live objects what they are.

use crate::error::{Result, SeqError};
use crate::frame::{Frame, FrameGeometry, Matrix3};
use crate::types::ComponentKind;
use crate::voxels::FrameVoxels;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete in-memory kind a frame is restored as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    ScalarVolume,
    LabelMapVolume,
    VectorVolume,
}

impl FrameKind {
    pub const ALL: [FrameKind; 3] = [
        FrameKind::ScalarVolume,
        FrameKind::LabelMapVolume,
        FrameKind::VectorVolume,
    ];

    /// Look up a kind by the tag stored in the header
    pub fn from_tag(tag: &str) -> Option<Self> {
        CAPABILITIES
            .iter()
            .find(|capability| capability.tag == tag.trim())
            .map(|capability| capability.kind)
    }

    pub fn tag(&self) -> &'static str {
        self.capability().tag
    }

    pub fn capability(&self) -> &'static FrameCapability {
        match self {
            FrameKind::ScalarVolume => &CAPABILITIES[0],
            FrameKind::LabelMapVolume => &CAPABILITIES[1],
            FrameKind::VectorVolume => &CAPABILITIES[2],
        }
    }

    /// Whether frames of this kind may carry `component_kind` voxels
    pub fn accepts(&self, component_kind: ComponentKind) -> bool {
        self.capability().component_kinds.contains(&component_kind)
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Everything a frame is made of except its kind
#[derive(Debug, Clone)]
pub struct FrameParts {
    pub component_kind: ComponentKind,
    pub geometry: FrameGeometry,
    pub measurement_frame: Option<Matrix3>,
    pub voxels: FrameVoxels,
}

impl FrameParts {
    fn into_frame(self, kind: FrameKind) -> Frame {
        Frame {
            kind,
            component_kind: self.component_kind,
            geometry: self.geometry,
            measurement_frame: self.measurement_frame,
            voxels: self.voxels,
        }
    }
}

/// Write-side check and read-side constructor for one frame kind
pub struct FrameCapability {
    pub kind: FrameKind,
    /// Value of the concrete type header field
    pub tag: &'static str,
    pub component_kinds: &'static [ComponentKind],
    /// Rejects frames this kind cannot be written from
    pub encode: fn(&Frame) -> Result<()>,
    /// Builds a frame of this kind from decoded parts
    pub decode: fn(FrameParts) -> Result<Frame>,
}

impl fmt::Debug for FrameCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameCapability")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .field("component_kinds", &self.component_kinds)
            .finish()
    }
}

static CAPABILITIES: [FrameCapability; 3] = [
    FrameCapability {
        kind: FrameKind::ScalarVolume,
        tag: "vtkMRMLScalarVolumeNode",
        component_kinds: &[ComponentKind::Scalar],
        encode: encode_scalar,
        decode: decode_scalar,
    },
    FrameCapability {
        kind: FrameKind::LabelMapVolume,
        tag: "vtkMRMLLabelMapVolumeNode",
        component_kinds: &[ComponentKind::Scalar],
        encode: encode_label_map,
        decode: decode_label_map,
    },
    FrameCapability {
        kind: FrameKind::VectorVolume,
        tag: "vtkMRMLVectorVolumeNode",
        component_kinds: &[
            ComponentKind::Vector,
            ComponentKind::CovariantVector,
            ComponentKind::Rgb,
            ComponentKind::Rgba,
        ],
        encode: encode_vector,
        decode: decode_vector,
    },
];

fn check_component_kind(kind: FrameKind, component_kind: ComponentKind) -> Result<()> {
    if kind.accepts(component_kind) {
        Ok(())
    } else {
        Err(SeqError::UnsupportedComponentKind(format!(
            "{} cannot hold {} voxels",
            kind.tag(),
            component_kind
        )))
    }
}

fn check_scalar(kind: FrameKind, component_kind: ComponentKind, voxels: &FrameVoxels) -> Result<()> {
    check_component_kind(kind, component_kind)?;
    let components = voxels.shape()[3];
    if components != 1 {
        return Err(SeqError::InvalidDimensions(format!(
            "scalar frames have one component, found {}",
            components
        )));
    }
    Ok(())
}

fn check_label_map(component_kind: ComponentKind, voxels: &FrameVoxels) -> Result<()> {
    check_scalar(FrameKind::LabelMapVolume, component_kind, voxels)?;
    if !voxels.data_type().is_integer() {
        return Err(SeqError::InvalidDataType(format!(
            "label maps need integer voxels, found {}",
            voxels.data_type()
        )));
    }
    Ok(())
}

fn check_vector(component_kind: ComponentKind, voxels: &FrameVoxels) -> Result<()> {
    check_component_kind(FrameKind::VectorVolume, component_kind)?;
    let components = voxels.shape()[3];
    let expected = match component_kind {
        ComponentKind::Rgb => Some(3),
        ComponentKind::Rgba => Some(4),
        _ => None,
    };
    match expected {
        Some(expected) if expected != components => Err(SeqError::InvalidDimensions(format!(
            "{} voxels have {} components, found {}",
            component_kind, expected, components
        ))),
        _ => Ok(()),
    }
}

fn encode_scalar(frame: &Frame) -> Result<()> {
    check_scalar(FrameKind::ScalarVolume, frame.component_kind, &frame.voxels)
}

fn decode_scalar(parts: FrameParts) -> Result<Frame> {
    check_scalar(FrameKind::ScalarVolume, parts.component_kind, &parts.voxels)?;
    Ok(parts.into_frame(FrameKind::ScalarVolume))
}

fn encode_label_map(frame: &Frame) -> Result<()> {
    check_label_map(frame.component_kind, &frame.voxels)
}

fn decode_label_map(parts: FrameParts) -> Result<Frame> {
    check_label_map(parts.component_kind, &parts.voxels)?;
    Ok(parts.into_frame(FrameKind::LabelMapVolume))
}

fn encode_vector(frame: &Frame) -> Result<()> {
    check_vector(frame.component_kind, &frame.voxels)
}

fn decode_vector(parts: FrameParts) -> Result<Frame> {
    check_vector(parts.component_kind, &parts.voxels)?;
    Ok(parts.into_frame(FrameKind::VectorVolume))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    fn parts(component_kind: ComponentKind, data_type: DataType, components: usize) -> FrameParts {
        FrameParts {
            component_kind,
            geometry: FrameGeometry::default(),
            measurement_frame: None,
            voxels: FrameVoxels::zeros(data_type, [2, 2, 2, components]),
        }
    }

    #[test]
    fn test_tag_lookup() {
        for kind in FrameKind::ALL {
            assert_eq!(FrameKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(kind.capability().kind, kind);
        }
        assert_eq!(FrameKind::from_tag("vtkMRMLModelNode"), None);
    }

    #[test]
    fn test_accepts() {
        assert!(FrameKind::ScalarVolume.accepts(ComponentKind::Scalar));
        assert!(!FrameKind::ScalarVolume.accepts(ComponentKind::Rgb));
        assert!(FrameKind::VectorVolume.accepts(ComponentKind::CovariantVector));
        assert!(!FrameKind::VectorVolume.accepts(ComponentKind::Scalar));
    }

    #[test]
    fn test_decode_builds_kind() {
        let decode = FrameKind::VectorVolume.capability().decode;
        let frame = decode(parts(ComponentKind::Rgba, DataType::U8, 4)).unwrap();
        assert_eq!(frame.kind, FrameKind::VectorVolume);
        assert_eq!(frame.component_kind, ComponentKind::Rgba);
    }

    #[test]
    fn test_label_map_requires_integers() {
        let decode = FrameKind::LabelMapVolume.capability().decode;
        assert!(decode(parts(ComponentKind::Scalar, DataType::I16, 1)).is_ok());
        assert!(matches!(
            decode(parts(ComponentKind::Scalar, DataType::F32, 1)),
            Err(SeqError::InvalidDataType(_))
        ));
    }

    #[test]
    fn test_encode_rejects_mismatched_components() {
        let frame = Frame::new(
            FrameKind::ScalarVolume,
            ComponentKind::Vector,
            FrameGeometry::default(),
            FrameVoxels::zeros(DataType::F32, [1, 1, 1, 3]),
        );
        assert!(matches!(
            (FrameKind::ScalarVolume.capability().encode)(&frame),
            Err(SeqError::UnsupportedComponentKind(_))
        ));

        let rgb = Frame::new(
            FrameKind::VectorVolume,
            ComponentKind::Rgb,
            FrameGeometry::default(),
            FrameVoxels::zeros(DataType::U8, [1, 1, 1, 4]),
        );
        assert!(matches!(
            (FrameKind::VectorVolume.capability().encode)(&rgb),
            Err(SeqError::InvalidDimensions(_))
        ));
    }
}
