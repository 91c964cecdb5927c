//! Frame compatibility checks before packing

use crate::error::{Result, SeqError};
use crate::frame::{Frame, Matrix3};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Default tolerance for origin, direction and measurement frame comparison.
///
/// Two values match when `|a - b| <= tolerance * max(1, |a|, |b|)`.
pub const GEOMETRY_TOLERANCE: f64 = 1e-6;

/// Frame attribute that must agree across a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryAttribute {
    SpatialSize,
    Directions,
    Origin,
    ComponentKind,
    ComponentCount,
    FrameKind,
    ScalarType,
    MeasurementFrame,
}

impl fmt::Display for GeometryAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryAttribute::SpatialSize => "spatial size",
            GeometryAttribute::Directions => "spacing/directions",
            GeometryAttribute::Origin => "origin",
            GeometryAttribute::ComponentKind => "component kind",
            GeometryAttribute::ComponentCount => "component count",
            GeometryAttribute::FrameKind => "frame kind",
            GeometryAttribute::ScalarType => "scalar type",
            GeometryAttribute::MeasurementFrame => "measurement frame",
        };
        f.write_str(name)
    }
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * 1f64.max(a.abs()).max(b.abs())
}

fn close_vector(a: &[f64; 3], b: &[f64; 3], tolerance: f64) -> bool {
    a.iter().zip(b.iter()).all(|(&x, &y)| close(x, y, tolerance))
}

fn close_matrix(a: &Matrix3, b: &Matrix3, tolerance: f64) -> bool {
    a.iter()
        .zip(b.iter())
        .all(|(row_a, row_b)| close_vector(row_a, row_b, tolerance))
}

/// First attribute on which `candidate` differs from `reference`
pub fn first_mismatch(
    reference: &Frame,
    candidate: &Frame,
    tolerance: f64,
) -> Option<GeometryAttribute> {
    if reference.dimensions() != candidate.dimensions() {
        return Some(GeometryAttribute::SpatialSize);
    }
    if !close_matrix(
        &reference.geometry.directions,
        &candidate.geometry.directions,
        tolerance,
    ) {
        return Some(GeometryAttribute::Directions);
    }
    if !close_vector(&reference.geometry.origin, &candidate.geometry.origin, tolerance) {
        return Some(GeometryAttribute::Origin);
    }
    if reference.component_kind != candidate.component_kind {
        return Some(GeometryAttribute::ComponentKind);
    }
    if reference.component_count() != candidate.component_count() {
        return Some(GeometryAttribute::ComponentCount);
    }
    if reference.kind != candidate.kind {
        return Some(GeometryAttribute::FrameKind);
    }
    if reference.data_type() != candidate.data_type() {
        return Some(GeometryAttribute::ScalarType);
    }
    let measurement_frames_match = match (&reference.measurement_frame, &candidate.measurement_frame) {
        (None, None) => true,
        (Some(a), Some(b)) => close_matrix(a, b, tolerance),
        _ => false,
    };
    if !measurement_frames_match {
        return Some(GeometryAttribute::MeasurementFrame);
    }
    None
}

/// Check that all frames can share one packed array
pub fn validate<F: Borrow<Frame>>(frames: &[F]) -> Result<()> {
    validate_with_tolerance(frames, GEOMETRY_TOLERANCE)
}

pub fn validate_with_tolerance<F: Borrow<Frame>>(frames: &[F], tolerance: f64) -> Result<()> {
    let (reference, rest) = frames.split_first().ok_or(SeqError::EmptyInput)?;
    let reference: &Frame = reference.borrow();
    for (offset, candidate) in rest.iter().enumerate() {
        if let Some(attribute) = first_mismatch(reference, candidate.borrow(), tolerance) {
            return Err(SeqError::IncompatibleGeometry {
                index: offset + 1,
                attribute,
            });
        }
    }
    Ok(())
}
