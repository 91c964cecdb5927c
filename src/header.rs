//! Array header model shared by the array layer and the sequence codec

use crate::error::{Result, SeqError};
use crate::frame::Matrix3;
use crate::types::{AxisKind, ComponentKind, DataType, Endian, IndexType, Space};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Custom field naming the concrete frame kind
pub const FRAME_KIND_FIELD: &str = "DataNodeClassName";

/// Custom field holding the index label type of list axis `axis`
pub fn index_type_field(axis: usize) -> String {
    format!("axis {} index type", axis)
}

/// Custom field holding the escaped index labels of list axis `axis`
pub fn index_values_field(axis: usize) -> String {
    format!("axis {} index values", axis)
}

/// Body encoding of an array file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Raw,
    #[default]
    Gzip,
}

impl Encoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Gzip => "gzip",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "raw" => Some(Encoding::Raw),
            "gzip" | "gz" => Some(Encoding::Gzip),
            _ => None,
        }
    }
}

/// Everything the array layer knows about a file except its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayHeader {
    pub data_type: DataType,

    /// Axis kinds, fastest axis first
    pub axis_kinds: Vec<AxisKind>,

    /// Axis sizes, fastest axis first
    pub axis_sizes: Vec<usize>,

    /// Per-axis label; empty when unset
    pub axis_labels: Vec<String>,

    /// Per-axis unit; empty when unset
    pub axis_units: Vec<String>,

    /// Per-axis step vector, `None` for non-spatial axes
    pub space_directions: Vec<Option<[f64; 3]>>,

    pub space: Option<Space>,

    pub space_origin: Option<[f64; 3]>,

    pub measurement_frame: Option<Matrix3>,

    pub encoding: Encoding,

    pub endian: Endian,

    /// Custom `key:=value` fields
    pub fields: BTreeMap<String, String>,

    /// Byte offset of the body in the file, set by readers
    #[serde(skip)]
    pub data_offset: Option<u64>,
}

impl ArrayHeader {
    /// Create a header with one entry per axis kind
    pub fn new(data_type: DataType, axis_kinds: Vec<AxisKind>, axis_sizes: Vec<usize>) -> Result<Self> {
        if axis_kinds.is_empty() || axis_kinds.len() != axis_sizes.len() {
            return Err(SeqError::InvalidDimensions(format!(
                "{} axis kinds for {} axis sizes",
                axis_kinds.len(),
                axis_sizes.len()
            )));
        }
        let dimension = axis_kinds.len();
        Ok(Self {
            data_type,
            axis_kinds,
            axis_sizes,
            axis_labels: vec![String::new(); dimension],
            axis_units: vec![String::new(); dimension],
            space_directions: vec![None; dimension],
            space: None,
            space_origin: None,
            measurement_frame: None,
            encoding: Encoding::default(),
            endian: Endian::Little,
            fields: BTreeMap::new(),
            data_offset: None,
        })
    }

    pub fn dimension(&self) -> usize {
        self.axis_kinds.len()
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_space(mut self, space: Space, origin: [f64; 3]) -> Self {
        self.space = Some(space);
        self.space_origin = Some(origin);
        self
    }

    pub fn with_measurement_frame(mut self, measurement_frame: Matrix3) -> Self {
        self.measurement_frame = Some(measurement_frame);
        self
    }

    /// Add a custom field
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get a custom field
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(|s| s.as_str())
    }

    /// Number of elements in the body; `InvalidDimensions` if it overflows
    pub fn element_count(&self) -> Result<usize> {
        self.axis_sizes
            .iter()
            .try_fold(1usize, |count, &size| count.checked_mul(size))
            .ok_or_else(|| {
                SeqError::InvalidDimensions(format!(
                    "sizes {:?} overflow the addressable element count",
                    self.axis_sizes
                ))
            })
    }

    /// Size of the decoded body in bytes
    pub fn body_size_bytes(&self) -> Result<usize> {
        self.element_count()?
            .checked_mul(self.data_type.size_in_bytes())
            .ok_or_else(|| {
                SeqError::InvalidDimensions(format!(
                    "{} body of sizes {:?} overflows the addressable byte count",
                    self.data_type, self.axis_sizes
                ))
            })
    }
}

/// How a header's axes map onto `[component]? domain domain domain list`
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceLayout {
    pub component_kind: ComponentKind,
    /// Number of components per voxel (1 without a component axis)
    pub component_count: usize,
    /// Index of the first spatial axis
    pub first_spatial_axis: usize,
    /// Voxel counts along i, j, k
    pub dimensions: [usize; 3],
    /// Index of the list axis (always the last)
    pub list_axis: usize,
    pub frame_count: usize,
}

impl SequenceLayout {
    pub fn from_header(header: &ArrayHeader) -> Result<Self> {
        let dimension = header.dimension();
        match header.axis_kinds.last() {
            Some(AxisKind::List) => {}
            Some(other) => {
                return Err(SeqError::NotASequence(format!(
                    "last axis kind is {}, expected list",
                    other
                )))
            }
            None => return Err(SeqError::NotASequence("header has no axes".to_string())),
        }
        if header.axis_sizes.len() != dimension {
            return Err(SeqError::InvalidDimensions(format!(
                "{} axis kinds for {} axis sizes",
                dimension,
                header.axis_sizes.len()
            )));
        }

        header.body_size_bytes()?;

        let leading = &header.axis_kinds[0];
        let (component_kind, first_spatial_axis) = if leading.is_spatial() {
            (ComponentKind::Scalar, 0)
        } else {
            let kind = ComponentKind::from_axis_kind(leading).ok_or_else(|| {
                SeqError::UnsupportedComponentKind(leading.as_str().to_string())
            })?;
            (kind, 1)
        };

        let spatial = &header.axis_kinds[first_spatial_axis..dimension - 1];
        if spatial.len() != 3 || !spatial.iter().all(AxisKind::is_spatial) {
            return Err(SeqError::InvalidDimensions(format!(
                "expected 3 spatial axes before the list axis, found kinds {:?}",
                spatial.iter().map(AxisKind::as_str).collect::<Vec<_>>()
            )));
        }

        let sizes = &header.axis_sizes;
        Ok(Self {
            component_kind,
            component_count: if first_spatial_axis == 1 { sizes[0] } else { 1 },
            first_spatial_axis,
            dimensions: [
                sizes[first_spatial_axis],
                sizes[first_spatial_axis + 1],
                sizes[first_spatial_axis + 2],
            ],
            list_axis: dimension - 1,
            frame_count: sizes[dimension - 1],
        })
    }

    /// Shape of the packed voxel array, slowest axis first
    pub fn packed_shape(&self) -> [usize; 5] {
        [
            self.frame_count,
            self.dimensions[2],
            self.dimensions[1],
            self.dimensions[0],
            self.component_count,
        ]
    }

    /// Index label type declared for the list axis; text when absent
    pub fn index_type(&self, header: &ArrayHeader) -> Result<IndexType> {
        match header.get_field(&index_type_field(self.list_axis)) {
            None => Ok(IndexType::Text),
            Some(text) => IndexType::parse(text).ok_or_else(|| {
                SeqError::Format(format!("unknown index type {:?}", text))
            }),
        }
    }
}
