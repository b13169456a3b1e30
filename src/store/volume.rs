use std::ops::RangeInclusive;

use crate::transform::Transform;

use super::{MediumId, SolidId};

slotmap::new_key_type! {
    /// Unique identifier for a logical volume in the geometry store.
    pub struct VolumeId;
}

/// Axis code of the runtime's division primitive.
///
/// Codes are shape relative: cylindrical mothers read `X` as radius and `Y`
/// as azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisCode {
    X = 1,
    Y = 2,
    Z = 3,
}

impl AxisCode {
    /// Numeric code (1, 2 or 3).
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One placed daughter (physical volume) inside a mother volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub volume: VolumeId,
    /// Placement id, unique within one build.
    pub copy_number: u32,
    /// Daughter-to-mother transform.
    pub transform: Transform,
}

/// Record of an equal-spacing division applied to a volume.
#[derive(Debug, Clone, PartialEq)]
pub struct DivisionData {
    pub axis: AxisCode,
    pub count: u32,
    pub start: f64,
    pub width: f64,
    /// Cell volumes: one shared by every slice or sector, one per ring for
    /// radial divisions.
    pub cells: Vec<VolumeId>,
    /// Copy numbers given to the cells.
    pub copy_numbers: RangeInclusive<u32>,
}

/// A logical volume: a solid filled with a medium, or a bare assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeData {
    pub name: String,
    /// `None` for assemblies.
    pub solid: Option<SolidId>,
    /// `None` for assemblies.
    pub medium: Option<MediumId>,
    /// Daughters in insertion order.
    pub nodes: Vec<Node>,
    pub division: Option<DivisionData>,
}

impl VolumeData {
    /// A volume filled with `medium` and shaped by `solid`.
    #[must_use]
    pub fn new(name: impl Into<String>, solid: SolidId, medium: MediumId) -> Self {
        Self {
            name: name.into(),
            solid: Some(solid),
            medium: Some(medium),
            nodes: Vec::new(),
            division: None,
        }
    }

    /// A grouping volume with no extent of its own.
    #[must_use]
    pub fn assembly(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            solid: None,
            medium: None,
            nodes: Vec::new(),
            division: None,
        }
    }

    /// Returns `true` for assembly volumes.
    #[must_use]
    pub fn is_assembly(&self) -> bool {
        self.solid.is_none()
    }
}
