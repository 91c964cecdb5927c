//! In-memory frame and sequence model

use crate::capability::FrameKind;
use crate::types::{ComponentKind, DataType, IndexType};
use crate::voxels::FrameVoxels;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 3x3 matrix, row-major
pub type Matrix3 = [[f64; 3]; 3];

pub const IDENTITY: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Spatial placement of a frame in RAS coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameGeometry {
    /// Position of voxel (0, 0, 0)
    pub origin: [f64; 3],
    /// IJK to RAS directions; column `a` is the step along voxel axis `a`
    pub directions: Matrix3,
}

impl FrameGeometry {
    pub fn new(origin: [f64; 3], directions: Matrix3) -> Self {
        Self { origin, directions }
    }

    /// Axis-aligned geometry with the given voxel spacing
    pub fn with_spacing(origin: [f64; 3], spacing: [f64; 3]) -> Self {
        let mut directions = [[0.0; 3]; 3];
        for (axis, &step) in spacing.iter().enumerate() {
            directions[axis][axis] = step;
        }
        Self { origin, directions }
    }

    /// Step vector of voxel axis `axis` (column of the direction matrix)
    pub fn axis_direction(&self, axis: usize) -> [f64; 3] {
        [
            self.directions[0][axis],
            self.directions[1][axis],
            self.directions[2][axis],
        ]
    }

    /// Build from per-axis step vectors
    pub fn from_axis_directions(origin: [f64; 3], axes: [[f64; 3]; 3]) -> Self {
        let mut directions = [[0.0; 3]; 3];
        for (axis, step) in axes.iter().enumerate() {
            for row in 0..3 {
                directions[row][axis] = step[row];
            }
        }
        Self { origin, directions }
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            directions: IDENTITY,
        }
    }
}

/// One volumetric sample of a sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Concrete kind the frame is restored as
    pub kind: FrameKind,
    pub component_kind: ComponentKind,
    pub geometry: FrameGeometry,
    /// Basis of spatial vector components; `None` for scalar and color data
    pub measurement_frame: Option<Matrix3>,
    /// Shape `[k, j, i, c]`
    pub voxels: FrameVoxels,
}

impl Frame {
    pub fn new(
        kind: FrameKind,
        component_kind: ComponentKind,
        geometry: FrameGeometry,
        voxels: FrameVoxels,
    ) -> Self {
        Self {
            kind,
            component_kind,
            geometry,
            measurement_frame: None,
            voxels,
        }
    }

    /// Scalar volume frame
    pub fn scalar(geometry: FrameGeometry, voxels: FrameVoxels) -> Self {
        Self::new(FrameKind::ScalarVolume, ComponentKind::Scalar, geometry, voxels)
    }

    pub fn with_measurement_frame(mut self, measurement_frame: Matrix3) -> Self {
        self.measurement_frame = Some(measurement_frame);
        self
    }

    /// Voxel counts along i, j, k
    pub fn dimensions(&self) -> [usize; 3] {
        let shape = self.voxels.shape();
        [shape[2], shape[1], shape[0]]
    }

    pub fn component_count(&self) -> usize {
        self.voxels.shape()[3]
    }

    pub fn data_type(&self) -> DataType {
        self.voxels.data_type()
    }
}

/// Position of a frame along the sequence axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexLabel {
    Numeric(f64),
    Text(String),
}

impl IndexLabel {
    pub fn index_type(&self) -> IndexType {
        match self {
            IndexLabel::Numeric(_) => IndexType::Numeric,
            IndexLabel::Text(_) => IndexType::Text,
        }
    }

    /// Type tag for a whole label list: numeric only if it is non-empty and
    /// every label is numeric
    pub fn common_type<'a>(labels: impl IntoIterator<Item = &'a IndexLabel>) -> IndexType {
        let mut labels = labels.into_iter().peekable();
        if labels.peek().is_some() && labels.all(|label| label.index_type() == IndexType::Numeric) {
            IndexType::Numeric
        } else {
            IndexType::Text
        }
    }
}

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexLabel::Numeric(value) => write!(f, "{}", value),
            IndexLabel::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for IndexLabel {
    fn from(value: f64) -> Self {
        IndexLabel::Numeric(value)
    }
}

impl From<&str> for IndexLabel {
    fn from(text: &str) -> Self {
        IndexLabel::Text(text.to_string())
    }
}

impl From<String> for IndexLabel {
    fn from(text: String) -> Self {
        IndexLabel::Text(text)
    }
}

/// Name and unit of the sequence axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexAxis {
    pub name: String,
    pub unit: String,
}

impl IndexAxis {
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }
}

impl Default for IndexAxis {
    fn default() -> Self {
        Self::new("time", "s")
    }
}

/// Data held by one sequence item
#[derive(Debug, Clone, PartialEq)]
pub enum DataNode {
    Volume(Frame),
    /// Anything that is not a volume (transforms, markups, ...)
    Other { class_name: String },
}

impl DataNode {
    pub fn as_volume(&self) -> Option<&Frame> {
        match self {
            DataNode::Volume(frame) => Some(frame),
            DataNode::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceItem {
    pub label: IndexLabel,
    pub node: DataNode,
}

/// Ordered collection of labeled data nodes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub index_axis: IndexAxis,
    pub items: Vec<SequenceItem>,
}

impl Sequence {
    pub fn new(index_axis: IndexAxis) -> Self {
        Self {
            index_axis,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<IndexLabel>, node: DataNode) {
        self.items.push(SequenceItem {
            label: label.into(),
            node,
        });
    }

    pub fn push_frame(&mut self, label: impl Into<IndexLabel>, frame: Frame) {
        self.push(label, DataNode::Volume(frame));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn labels(&self) -> Vec<&IndexLabel> {
        self.items.iter().map(|item| &item.label).collect()
    }

    /// All frames in order, or `None` if any item is not a volume
    pub fn frames(&self) -> Option<Vec<&Frame>> {
        self.items.iter().map(|item| item.node.as_volume()).collect()
    }

    /// Label type of the whole sequence
    pub fn index_type(&self) -> IndexType {
        IndexLabel::common_type(self.items.iter().map(|item| &item.label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DataType;

    #[test]
    fn test_frame_dimensions() {
        let frame = Frame::scalar(
            FrameGeometry::default(),
            FrameVoxels::zeros(DataType::U8, [4, 3, 2, 1]),
        );
        assert_eq!(frame.dimensions(), [2, 3, 4]);
        assert_eq!(frame.component_count(), 1);
        assert_eq!(frame.data_type(), DataType::U8);
    }

    #[test]
    fn test_geometry_axis_directions() {
        let geometry = FrameGeometry::from_axis_directions(
            [1.0, 2.0, 3.0],
            [[0.5, 0.0, 0.0], [0.0, 0.0, 2.0], [0.0, -1.0, 0.0]],
        );
        assert_eq!(geometry.axis_direction(1), [0.0, 0.0, 2.0]);
        assert_eq!(geometry.directions[2][1], 2.0);
        assert_eq!(
            FrameGeometry::with_spacing([0.0; 3], [0.5, 0.5, 2.0]).axis_direction(2),
            [0.0, 0.0, 2.0]
        );
    }

    #[test]
    fn test_sequence_index_type() {
        let frame = Frame::scalar(
            FrameGeometry::default(),
            FrameVoxels::zeros(DataType::U8, [1, 1, 1, 1]),
        );
        let mut sequence = Sequence::default();
        assert_eq!(sequence.index_type(), IndexType::Text);

        sequence.push_frame(1.5, frame.clone());
        assert_eq!(sequence.index_type(), IndexType::Numeric);

        sequence.push_frame("baseline", frame);
        assert_eq!(sequence.index_type(), IndexType::Text);
        assert_eq!(sequence.frames().map(|f| f.len()), Some(2));
    }

    #[test]
    fn test_common_label_type() {
        let numeric = [IndexLabel::Numeric(0.0), IndexLabel::Numeric(2.5)];
        assert_eq!(IndexLabel::common_type(&numeric), IndexType::Numeric);
        assert_eq!(IndexLabel::common_type(&[]), IndexType::Text);
        assert_eq!(
            IndexLabel::common_type(&[IndexLabel::Numeric(1.0), IndexLabel::from("x")]),
            IndexType::Text
        );
    }

    #[test]
    fn test_frames_none_with_foreign_node() {
        let mut sequence = Sequence::default();
        sequence.push(
            "0",
            DataNode::Other {
                class_name: "vtkMRMLLinearTransformNode".into(),
            },
        );
        assert!(sequence.frames().is_none());
    }

    #[test]
    fn test_numeric_label_display() {
        assert_eq!(IndexLabel::Numeric(10.0).to_string(), "10");
        assert_eq!(IndexLabel::Numeric(25.5).to_string(), "25.5");
        assert_eq!(IndexLabel::from("a b").to_string(), "a b");
    }
}
