//! Conversion between the in-memory RAS convention and the LPS file convention
//!
//! Points, axis directions and spatial vector voxels all flip the sign of
//! their first two coordinates. Color components are never touched.

use crate::error::{Result, SeqError};
use crate::frame::{Frame, Matrix3};
use crate::types::ComponentKind;
use crate::voxels::PackedVoxels;

/// Vector components that change sign between RAS and LPS
const FLIPPED_COMPONENTS: [usize; 2] = [0, 1];

/// Spatial vectors need a transform, color data does not
pub fn is_spatial_vector(component_kind: ComponentKind, measurement_frame: Option<&Matrix3>) -> bool {
    matches!(
        component_kind,
        ComponentKind::Vector | ComponentKind::CovariantVector
    ) && measurement_frame.is_some()
}

pub fn frame_has_spatial_vectors(frame: &Frame) -> bool {
    is_spatial_vector(frame.component_kind, frame.measurement_frame.as_ref())
}

/// RAS point or direction to LPS; its own inverse
pub fn ras_to_lps(point: [f64; 3]) -> [f64; 3] {
    [-point[0], -point[1], point[2]]
}

pub fn lps_to_ras(point: [f64; 3]) -> [f64; 3] {
    ras_to_lps(point)
}

/// Spatial vector voxels must be 3-vectors of a signed type
pub fn check_spatial_vector_layout(components: usize, signed: bool) -> Result<()> {
    if components != 3 {
        return Err(SeqError::InvalidDimensions(format!(
            "spatial vectors have 3 components, found {}",
            components
        )));
    }
    if !signed {
        return Err(SeqError::InvalidDataType(
            "spatial vectors need a signed scalar type".to_string(),
        ));
    }
    Ok(())
}

fn flip_vectors(mut frame: Frame) -> Result<Frame> {
    if !frame_has_spatial_vectors(&frame) {
        return Ok(frame);
    }
    check_spatial_vector_layout(frame.component_count(), frame.data_type().is_signed())?;
    frame.voxels.negate_components(&FLIPPED_COMPONENTS)?;
    Ok(frame)
}

/// Rewrite vector voxels from RAS to the LPS storage convention
pub fn to_storage_convention(frame: Frame) -> Result<Frame> {
    flip_vectors(frame)
}

/// Rewrite vector voxels read from a file back to RAS
pub fn from_storage_convention(frame: Frame) -> Result<Frame> {
    flip_vectors(frame)
}

/// Apply the storage flip to a packed `[n, k, j, i, c]` array in place
pub fn packed_to_storage_convention(voxels: &mut PackedVoxels) -> Result<()> {
    let components = voxels.shape()[4];
    check_spatial_vector_layout(components, voxels.data_type().is_signed())?;
    voxels.negate_components(&FLIPPED_COMPONENTS)
}
