//! Typed dense voxel arrays
//!
//! Arrays are kept in row-major order with the fastest-varying axis last, so a
//! frame is `[k, j, i, c]` and a packed sequence is `[n, k, j, i, c]`. Reversed,
//! these are exactly the NRRD axis orders `c i j k` and `c i j k n`, which makes
//! the in-memory element order identical to the on-disk order.

use crate::error::{Result, SeqError};
use crate::types::{DataType, Endian};
use ndarray::{Array, Array4, Array5, Axis, Dimension, Ix4, Ix5};
use num_traits::ToPrimitive;
use std::fmt::Debug;

/// Element types that can live in a voxel array
pub trait Voxel:
    Copy + Default + PartialEq + Debug + ToPrimitive + Send + Sync + 'static
{
    const DATA_TYPE: DataType;

    /// Sign flip; unsigned types wrap
    fn negate(self) -> Self;

    /// Append the little-endian bytes of this value
    fn write_le(self, out: &mut Vec<u8>);

    /// Read one value from exactly `size_in_bytes` bytes
    fn read(bytes: &[u8], endian: Endian) -> Self;

    fn wrap<D: Dimension>(array: Array<Self, D>) -> Voxels<D>;

    fn unwrap_ref<D: Dimension>(voxels: &Voxels<D>) -> Option<&Array<Self, D>>;
}

/// A dense array whose element type is only known at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum Voxels<D: Dimension> {
    U8(Array<u8, D>),
    I8(Array<i8, D>),
    U16(Array<u16, D>),
    I16(Array<i16, D>),
    U32(Array<u32, D>),
    I32(Array<i32, D>),
    U64(Array<u64, D>),
    I64(Array<i64, D>),
    F32(Array<f32, D>),
    F64(Array<f64, D>),
}

/// Voxels of one frame, shape `[k, j, i, c]`
pub type FrameVoxels = Voxels<Ix4>;

/// Voxels of a whole sequence, shape `[n, k, j, i, c]`
pub type PackedVoxels = Voxels<Ix5>;

/// Run `$body` with `$array` bound to the typed array inside `$voxels`
macro_rules! each_variant {
    ($voxels:expr, $array:ident => $body:expr) => {
        match $voxels {
            Voxels::U8($array) => $body,
            Voxels::I8($array) => $body,
            Voxels::U16($array) => $body,
            Voxels::I16($array) => $body,
            Voxels::U32($array) => $body,
            Voxels::I32($array) => $body,
            Voxels::U64($array) => $body,
            Voxels::I64($array) => $body,
            Voxels::F32($array) => $body,
            Voxels::F64($array) => $body,
        }
    };
}

/// Run `$body` with the type alias `$t` set to the Rust type of `$data_type`
macro_rules! with_voxel_type {
    ($data_type:expr, $t:ident => $body:expr) => {
        match $data_type {
            DataType::U8 => {
                type $t = u8;
                $body
            }
            DataType::I8 => {
                type $t = i8;
                $body
            }
            DataType::U16 => {
                type $t = u16;
                $body
            }
            DataType::I16 => {
                type $t = i16;
                $body
            }
            DataType::U32 => {
                type $t = u32;
                $body
            }
            DataType::I32 => {
                type $t = i32;
                $body
            }
            DataType::U64 => {
                type $t = u64;
                $body
            }
            DataType::I64 => {
                type $t = i64;
                $body
            }
            DataType::F32 => {
                type $t = f32;
                $body
            }
            DataType::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}

macro_rules! impl_voxel {
    ($t:ty, $variant:ident, $negate:expr) => {
        impl Voxel for $t {
            const DATA_TYPE: DataType = DataType::$variant;

            #[inline]
            fn negate(self) -> Self {
                let negate: fn($t) -> $t = $negate;
                negate(self)
            }

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read(bytes: &[u8], endian: Endian) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                match endian {
                    Endian::Little => <$t>::from_le_bytes(raw),
                    Endian::Big => <$t>::from_be_bytes(raw),
                }
            }

            fn wrap<D: Dimension>(array: Array<Self, D>) -> Voxels<D> {
                Voxels::$variant(array)
            }

            fn unwrap_ref<D: Dimension>(voxels: &Voxels<D>) -> Option<&Array<Self, D>> {
                match voxels {
                    Voxels::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }

        impl<D: Dimension> From<Array<$t, D>> for Voxels<D> {
            fn from(array: Array<$t, D>) -> Self {
                Voxels::$variant(array)
            }
        }
    };
}

impl_voxel!(u8, U8, |v| v.wrapping_neg());
impl_voxel!(i8, I8, |v| v.wrapping_neg());
impl_voxel!(u16, U16, |v| v.wrapping_neg());
impl_voxel!(i16, I16, |v| v.wrapping_neg());
impl_voxel!(u32, U32, |v| v.wrapping_neg());
impl_voxel!(i32, I32, |v| v.wrapping_neg());
impl_voxel!(u64, U64, |v| v.wrapping_neg());
impl_voxel!(i64, I64, |v| v.wrapping_neg());
impl_voxel!(f32, F32, |v| -v);
impl_voxel!(f64, F64, |v| -v);

impl<D: Dimension> Voxels<D> {
    pub fn data_type(&self) -> DataType {
        match self {
            Voxels::U8(_) => DataType::U8,
            Voxels::I8(_) => DataType::I8,
            Voxels::U16(_) => DataType::U16,
            Voxels::I16(_) => DataType::I16,
            Voxels::U32(_) => DataType::U32,
            Voxels::I32(_) => DataType::I32,
            Voxels::U64(_) => DataType::U64,
            Voxels::I64(_) => DataType::I64,
            Voxels::F32(_) => DataType::F32,
            Voxels::F64(_) => DataType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        each_variant!(self, array => array.shape())
    }

    /// Number of scalar elements
    pub fn len(&self) -> usize {
        each_variant!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the raw body in bytes
    pub fn size_in_bytes(&self) -> usize {
        self.len() * self.data_type().size_in_bytes()
    }

    /// Negate the given components of every voxel, in place.
    ///
    /// The component axis is the last axis; one voxel lane is touched at a time.
    pub fn negate_components(&mut self, components: &[usize]) -> Result<()> {
        let ndim = self.shape().len();
        let count = self.shape().last().copied().unwrap_or(0);
        if let Some(&bad) = components.iter().find(|&&c| c >= count) {
            return Err(SeqError::InvalidDimensions(format!(
                "component {} out of range for {} components",
                bad, count
            )));
        }

        each_variant!(self, array => {
            for mut lane in array.lanes_mut(Axis(ndim - 1)) {
                for &c in components {
                    lane[c] = lane[c].negate();
                }
            }
        });
        Ok(())
    }

    /// Serialize in logical (row-major) order as little-endian bytes
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size_in_bytes());
        each_variant!(self, array => {
            for value in array.iter() {
                value.write_le(&mut out);
            }
        });
        out
    }

    /// Element-wise comparison within an absolute tolerance
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.data_type() != other.data_type() || self.shape() != other.shape() {
            return false;
        }
        with_voxel_type!(self.data_type(), T => {
            match (T::unwrap_ref(self), T::unwrap_ref(other)) {
                (Some(a), Some(b)) => a.iter().zip(b.iter()).all(|(x, y)| {
                    match (x.to_f64(), y.to_f64()) {
                        (Some(x), Some(y)) => (x - y).abs() <= tolerance || x == y,
                        _ => false,
                    }
                }),
                _ => false,
            }
        })
    }
}

impl FrameVoxels {
    /// Zero-filled frame array of shape `[k, j, i, c]`
    pub fn zeros(data_type: DataType, shape: [usize; 4]) -> Self {
        with_voxel_type!(data_type, T => T::wrap(Array4::<T>::default(shape)))
    }

    /// Stack frame arrays along a new slowest axis, in the given order
    pub fn stack(frames: &[&FrameVoxels]) -> Result<PackedVoxels> {
        let first = frames.first().ok_or(SeqError::EmptyInput)?;
        with_voxel_type!(first.data_type(), T => stack_typed::<T>(frames))
    }
}

fn stack_typed<T: Voxel>(frames: &[&FrameVoxels]) -> Result<PackedVoxels> {
    let views = frames
        .iter()
        .map(|frame| {
            T::unwrap_ref(frame).map(|array| array.view()).ok_or_else(|| {
                SeqError::InvalidDataType(format!(
                    "expected {}, found {}",
                    T::DATA_TYPE,
                    frame.data_type()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let stacked = ndarray::stack(Axis(0), &views)?;
    Ok(T::wrap(stacked))
}

impl PackedVoxels {
    /// Number of frames along the list axis
    pub fn frame_count(&self) -> usize {
        self.shape()[0]
    }

    /// Copy each list-axis slice out as its own frame array
    pub fn split(&self) -> Vec<FrameVoxels> {
        each_variant!(self, array => {
            array
                .axis_iter(Axis(0))
                .map(|slice| Voxel::wrap(slice.to_owned()))
                .collect()
        })
    }

    /// Decode a raw body into a `[n, k, j, i, c]` array
    pub fn from_bytes(
        data_type: DataType,
        shape: [usize; 5],
        bytes: &[u8],
        endian: Endian,
    ) -> Result<Self> {
        let element_size = data_type.size_in_bytes();
        let count = shape
            .iter()
            .try_fold(1usize, |count, &size| count.checked_mul(size))
            .ok_or_else(|| SeqError::InvalidDimensions(format!("shape {:?} overflows", shape)))?;
        if bytes.len() / element_size != count || bytes.len() % element_size != 0 {
            return Err(SeqError::Parse(format!(
                "body holds {} bytes, header describes {} elements of {} bytes",
                bytes.len(),
                count,
                element_size
            )));
        }

        with_voxel_type!(data_type, T => {
            let values: Vec<T> = bytes
                .chunks_exact(element_size)
                .map(|chunk| T::read(chunk, endian))
                .collect();
            Ok(T::wrap(Array5::from_shape_vec(shape, values)?))
        })
    }
}
