//! Core data types for volume sequences

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar voxel data types supported by the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DataType {
    /// Unsigned 8-bit integer
    U8 = 1,
    /// Unsigned 16-bit integer
    U16 = 2,
    /// Unsigned 32-bit integer
    U32 = 3,
    /// Unsigned 64-bit integer
    U64 = 4,
    /// Signed 8-bit integer
    I8 = 5,
    /// Signed 16-bit integer
    I16 = 6,
    /// Signed 32-bit integer
    I32 = 7,
    /// Signed 64-bit integer
    I64 = 8,
    /// 32-bit floating point
    F32 = 9,
    /// 64-bit floating point
    F64 = 10,
}

impl DataType {
    /// Size in bytes of this data type
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DataType::U8 | DataType::I8 => 1,
            DataType::U16 | DataType::I16 => 2,
            DataType::U32 | DataType::I32 | DataType::F32 => 4,
            DataType::U64 | DataType::I64 | DataType::F64 => 8,
        }
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, DataType::F32 | DataType::F64)
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        !self.is_float()
    }

    /// Check if values of this type can be negated without wrapping
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DataType::I8 | DataType::I16 | DataType::I32 | DataType::I64 | DataType::F32 | DataType::F64
        )
    }

    /// Canonical NRRD `type:` name
    pub fn nrrd_name(&self) -> &'static str {
        match self {
            DataType::U8 => "unsigned char",
            DataType::I8 => "signed char",
            DataType::U16 => "unsigned short",
            DataType::I16 => "short",
            DataType::U32 => "unsigned int",
            DataType::I32 => "int",
            DataType::U64 => "unsigned long long int",
            DataType::I64 => "long long int",
            DataType::F32 => "float",
            DataType::F64 => "double",
        }
    }

    /// Parse any of the NRRD type spellings
    pub fn from_nrrd_name(name: &str) -> Option<Self> {
        let data_type = match name.trim() {
            "signed char" | "int8" | "int8_t" => DataType::I8,
            "uchar" | "unsigned char" | "uint8" | "uint8_t" => DataType::U8,
            "short" | "short int" | "signed short" | "signed short int" | "int16" | "int16_t" => {
                DataType::I16
            }
            "ushort" | "unsigned short" | "unsigned short int" | "uint16" | "uint16_t" => {
                DataType::U16
            }
            "int" | "signed int" | "int32" | "int32_t" => DataType::I32,
            "uint" | "unsigned int" | "uint32" | "uint32_t" => DataType::U32,
            "longlong" | "long long" | "long long int" | "signed long long"
            | "signed long long int" | "int64" | "int64_t" => DataType::I64,
            "ulonglong" | "unsigned long long" | "unsigned long long int" | "uint64"
            | "uint64_t" => DataType::U64,
            "float" => DataType::F32,
            "double" => DataType::F64,
            _ => return None,
        };
        Some(data_type)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Byte order of the array body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endian::Little => "little",
            Endian::Big => "big",
        }
    }
}

/// Kind tag of one array axis, as written in the NRRD `kinds:` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKind {
    Domain,
    Space,
    List,
    Vector,
    CovariantVector,
    RgbColor,
    RgbaColor,
    None,
    /// Any other kind, kept verbatim
    Other(String),
}

impl AxisKind {
    pub fn parse(text: &str) -> Self {
        match text {
            "domain" => AxisKind::Domain,
            "space" => AxisKind::Space,
            "list" => AxisKind::List,
            "vector" => AxisKind::Vector,
            "covariant-vector" => AxisKind::CovariantVector,
            "RGB-color" => AxisKind::RgbColor,
            "RGBA-color" => AxisKind::RgbaColor,
            "none" | "???" => AxisKind::None,
            other => AxisKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AxisKind::Domain => "domain",
            AxisKind::Space => "space",
            AxisKind::List => "list",
            AxisKind::Vector => "vector",
            AxisKind::CovariantVector => "covariant-vector",
            AxisKind::RgbColor => "RGB-color",
            AxisKind::RgbaColor => "RGBA-color",
            AxisKind::None => "none",
            AxisKind::Other(other) => other,
        }
    }

    /// Domain-like axes carry spatial samples
    pub fn is_spatial(&self) -> bool {
        matches!(self, AxisKind::Domain | AxisKind::Space)
    }
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the per-voxel component axis holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// One value per voxel, no component axis in the file
    Scalar,
    Vector,
    CovariantVector,
    Rgb,
    Rgba,
}

impl ComponentKind {
    /// Axis kind written for the component axis, `None` for scalar data
    pub fn axis_kind(&self) -> Option<AxisKind> {
        match self {
            ComponentKind::Scalar => None,
            ComponentKind::Vector => Some(AxisKind::Vector),
            ComponentKind::CovariantVector => Some(AxisKind::CovariantVector),
            ComponentKind::Rgb => Some(AxisKind::RgbColor),
            ComponentKind::Rgba => Some(AxisKind::RgbaColor),
        }
    }

    /// Component kind for a leading non-spatial axis
    pub fn from_axis_kind(kind: &AxisKind) -> Option<Self> {
        match kind {
            AxisKind::Vector => Some(ComponentKind::Vector),
            AxisKind::CovariantVector => Some(ComponentKind::CovariantVector),
            AxisKind::RgbColor => Some(ComponentKind::Rgb),
            AxisKind::RgbaColor => Some(ComponentKind::Rgba),
            _ => None,
        }
    }

    pub fn is_color(&self) -> bool {
        matches!(self, ComponentKind::Rgb | ComponentKind::Rgba)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis_kind() {
            Some(kind) => write!(f, "{}", kind),
            None => f.write_str("scalar"),
        }
    }
}

/// How index labels are interpreted after decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexType {
    Numeric,
    #[default]
    Text,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Numeric => "numeric",
            IndexType::Text => "text",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "numeric" => Some(IndexType::Numeric),
            "text" => Some(IndexType::Text),
            _ => None,
        }
    }
}

/// Patient coordinate system the header geometry is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Space {
    /// Left-posterior-superior, used for every file we write
    #[default]
    Lps,
    /// Right-anterior-superior, the in-memory convention
    Ras,
}

impl Space {
    pub fn as_str(&self) -> &'static str {
        match self {
            Space::Lps => "left-posterior-superior",
            Space::Ras => "right-anterior-superior",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "left-posterior-superior" | "LPS" => Some(Space::Lps),
            "right-anterior-superior" | "RAS" => Some(Space::Ras),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_sizes() {
        assert_eq!(DataType::U8.size_in_bytes(), 1);
        assert_eq!(DataType::I16.size_in_bytes(), 2);
        assert_eq!(DataType::F32.size_in_bytes(), 4);
        assert_eq!(DataType::F64.size_in_bytes(), 8);
    }

    #[test]
    fn test_nrrd_type_names() {
        for data_type in [
            DataType::U8,
            DataType::I8,
            DataType::U16,
            DataType::I16,
            DataType::U32,
            DataType::I32,
            DataType::U64,
            DataType::I64,
            DataType::F32,
            DataType::F64,
        ] {
            assert_eq!(DataType::from_nrrd_name(data_type.nrrd_name()), Some(data_type));
        }
        assert_eq!(DataType::from_nrrd_name("uint8_t"), Some(DataType::U8));
        assert_eq!(DataType::from_nrrd_name("short int"), Some(DataType::I16));
        assert_eq!(DataType::from_nrrd_name("block"), None);
    }

    #[test]
    fn test_axis_kind_parse() {
        assert_eq!(AxisKind::parse("list"), AxisKind::List);
        assert_eq!(AxisKind::parse("RGBA-color"), AxisKind::RgbaColor);
        assert_eq!(AxisKind::parse("3-vector"), AxisKind::Other("3-vector".into()));
        assert_eq!(AxisKind::CovariantVector.as_str(), "covariant-vector");
        assert!(AxisKind::Space.is_spatial());
        assert!(!AxisKind::List.is_spatial());
    }

    #[test]
    fn test_component_kind_axis_mapping() {
        assert_eq!(ComponentKind::Scalar.axis_kind(), None);
        assert_eq!(
            ComponentKind::from_axis_kind(&AxisKind::RgbColor),
            Some(ComponentKind::Rgb)
        );
        assert_eq!(ComponentKind::from_axis_kind(&AxisKind::Domain), None);
        assert!(ComponentKind::Rgba.is_color());
        assert!(!ComponentKind::Vector.is_color());
    }
}
