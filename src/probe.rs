//! Header-only ownership checks

use crate::capability::FrameKind;
use crate::frame::Sequence;
use crate::header::{ArrayHeader, FRAME_KIND_FIELD};
use crate::types::{AxisKind, ComponentKind};

/// Whether a header describes a volume sequence this codec can read
///
/// Only the header is inspected. An unknown frame tag still counts as ours;
/// unpacking reports it.
pub fn can_read(header: &ArrayHeader) -> bool {
    if header.axis_kinds.last() != Some(&AxisKind::List) {
        return false;
    }
    let tagged = header
        .get_field(FRAME_KIND_FIELD)
        .is_some_and(|tag| !tag.trim().is_empty());
    if !tagged {
        return false;
    }
    match header.axis_kinds.first() {
        Some(leading) if !leading.is_spatial() => ComponentKind::from_axis_kind(leading).is_some(),
        Some(_) => true,
        None => false,
    }
}

/// Whether every item is a frame and one frame kind can hold them all
pub fn can_write(sequence: &Sequence) -> bool {
    let Some(frames) = sequence.frames() else {
        return false;
    };
    let Some(first) = frames.first() else {
        return false;
    };
    let kind: FrameKind = first.kind;
    frames
        .iter()
        .all(|frame| frame.kind == kind && kind.accepts(frame.component_kind))
}
