use std::fmt;

use crate::math::{Point2, Vector3};
use crate::transform::Transform;

use super::AxisCode;

slotmap::new_key_type! {
    /// Unique identifier for a solid in the geometry store.
    pub struct SolidId;
}

/// Boolean operation combining two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    Union,
    Subtraction,
    Intersection,
}

impl fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Union => "union",
            Self::Subtraction => "subtraction",
            Self::Intersection => "intersection",
        })
    }
}

/// One z-plane of a polycone or polyhedra.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZSection {
    pub z: f64,
    pub rmin: f64,
    pub rmax: f64,
}

impl ZSection {
    #[must_use]
    pub fn new(z: f64, rmin: f64, rmax: f64) -> Self {
        Self { z, rmin, rmax }
    }
}

/// One section of an extruded polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XtruSection {
    /// Section index as given by the definition.
    pub index: usize,
    pub z: f64,
    /// Offset of the polygon origin in this section.
    pub offset: Point2,
    pub scale: f64,
}

/// Dimensions of a general trapezoid, in the runtime's parameter order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapParams {
    pub dz: f64,
    pub theta: f64,
    pub phi: f64,
    pub h1: f64,
    pub bl1: f64,
    pub tl1: f64,
    pub alpha1: f64,
    pub h2: f64,
    pub bl2: f64,
    pub tl2: f64,
    pub alpha2: f64,
}

/// Shape descriptor of a solid.
///
/// Lengths are half-lengths where the shape is symmetric; angles are in
/// degrees and given as (start, end) pairs unless noted.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Box {
        dx: f64,
        dy: f64,
        dz: f64,
    },
    Paraboloid {
        rlo: f64,
        rhi: f64,
        dz: f64,
    },
    /// Eight (x, y) vertices: the first four at `-dz`, the last four at `+dz`.
    Arb8 {
        dz: f64,
        vertices: [Point2; 8],
    },
    Tube {
        rmin: f64,
        rmax: f64,
        dz: f64,
        phi1: f64,
        phi2: f64,
    },
    CutTube {
        rmin: f64,
        rmax: f64,
        dz: f64,
        phi1: f64,
        phi2: f64,
        low_normal: Vector3,
        high_normal: Vector3,
    },
    Cone {
        dz: f64,
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        phi1: f64,
        phi2: f64,
    },
    /// `dphi` is an extent, not an end angle.
    Polycone {
        phi: f64,
        dphi: f64,
        sections: Vec<ZSection>,
    },
    Trap(TrapParams),
    TwistedTrap {
        trap: TrapParams,
        twist: f64,
    },
    Trd {
        dx1: f64,
        dx2: f64,
        dy1: f64,
        dy2: f64,
        dz: f64,
    },
    Sphere {
        rmin: f64,
        rmax: f64,
        theta1: f64,
        theta2: f64,
        phi1: f64,
        phi2: f64,
    },
    Para {
        dx: f64,
        dy: f64,
        dz: f64,
        alpha: f64,
        theta: f64,
        phi: f64,
    },
    /// `dphi` is an extent, not an end angle.
    Torus {
        r: f64,
        rmin: f64,
        rmax: f64,
        phi1: f64,
        dphi: f64,
    },
    Hype {
        rin: f64,
        stin: f64,
        rout: f64,
        stout: f64,
        dz: f64,
    },
    /// `dphi` is an extent, not an end angle.
    Polyhedra {
        phi: f64,
        dphi: f64,
        sides: u32,
        sections: Vec<ZSection>,
    },
    Xtru {
        polygon: Vec<Point2>,
        sections: Vec<XtruSection>,
    },
    EllipticalTube {
        dx: f64,
        dy: f64,
        dz: f64,
    },
    /// Boolean of two solids; `left` sits at the identity, `right` at `right_transform`.
    Composite {
        op: BooleanOp,
        left: SolidId,
        right: SolidId,
        right_transform: Transform,
    },
    /// Mirrored copy of `base`; see [`crate::transform::Reflection`].
    Reflected {
        base: SolidId,
        transform: Transform,
        inverted: bool,
    },
    /// Slice of `mother` produced by an equal-spacing division.
    ///
    /// `low..high` is the cell's extent along the axis in its own frame:
    /// centred on zero for slices and sectors, absolute radii for rings.
    DivisionCell {
        mother: SolidId,
        axis: AxisCode,
        low: f64,
        high: f64,
    },
}

impl Shape {
    /// Short lowercase name of the shape kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Box { .. } => "box",
            Self::Paraboloid { .. } => "paraboloid",
            Self::Arb8 { .. } => "arb8",
            Self::Tube { .. } => "tube",
            Self::CutTube { .. } => "cut tube",
            Self::Cone { .. } => "cone",
            Self::Polycone { .. } => "polycone",
            Self::Trap(_) => "trap",
            Self::TwistedTrap { .. } => "twisted trap",
            Self::Trd { .. } => "trd",
            Self::Sphere { .. } => "sphere",
            Self::Para { .. } => "para",
            Self::Torus { .. } => "torus",
            Self::Hype { .. } => "hype",
            Self::Polyhedra { .. } => "polyhedra",
            Self::Xtru { .. } => "xtru",
            Self::EllipticalTube { .. } => "elliptical tube",
            Self::Composite { .. } => "composite",
            Self::Reflected { .. } => "reflected",
            Self::DivisionCell { .. } => "division cell",
        }
    }

    /// Shapes whose division codes read as (radius, azimuth, z).
    #[must_use]
    pub fn is_cylindrical(&self) -> bool {
        matches!(
            self,
            Self::Tube { .. }
                | Self::CutTube { .. }
                | Self::Cone { .. }
                | Self::Polycone { .. }
                | Self::Polyhedra { .. }
        )
    }

    /// Solids this shape refers to.
    #[must_use]
    pub fn children(&self) -> Vec<SolidId> {
        match self {
            Self::Composite { left, right, .. } => vec![*left, *right],
            Self::Reflected { base, .. } => vec![*base],
            Self::DivisionCell { mother, .. } => vec![*mother],
            _ => Vec::new(),
        }
    }

    /// Extent along a division axis, if the shape's parameters define one.
    ///
    /// Cylindrical shapes read [`AxisCode::X`] as radius and [`AxisCode::Y`]
    /// as azimuth in degrees.
    #[must_use]
    pub fn axis_range(&self, axis: AxisCode) -> Option<(f64, f64)> {
        match (self, axis) {
            (Self::Box { dx, .. } | Self::EllipticalTube { dx, .. }, AxisCode::X) => {
                Some((-dx, *dx))
            }
            (Self::Box { dy, .. } | Self::EllipticalTube { dy, .. }, AxisCode::Y) => {
                Some((-dy, *dy))
            }
            (
                Self::Box { dz, .. }
                | Self::EllipticalTube { dz, .. }
                | Self::Trd { dz, .. }
                | Self::Para { dz, .. }
                | Self::Tube { dz, .. }
                | Self::CutTube { dz, .. }
                | Self::Cone { dz, .. },
                AxisCode::Z,
            ) => Some((-dz, *dz)),
            (Self::Tube { rmin, rmax, .. } | Self::CutTube { rmin, rmax, .. }, AxisCode::X) => {
                Some((*rmin, *rmax))
            }
            (
                Self::Tube { phi1, phi2, .. }
                | Self::CutTube { phi1, phi2, .. }
                | Self::Cone { phi1, phi2, .. },
                AxisCode::Y,
            ) => Some((*phi1, *phi2)),
            (Self::Polycone { phi, dphi, .. } | Self::Polyhedra { phi, dphi, .. }, AxisCode::Y) => {
                Some((*phi, phi + dphi))
            }
            (
                Self::Polycone { sections, .. } | Self::Polyhedra { sections, .. },
                AxisCode::Z,
            ) => match (sections.first(), sections.last()) {
                (Some(first), Some(last)) => Some((first.z, last.z)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Data associated with a solid.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidData {
    pub name: String,
    pub shape: Shape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_ranges_are_symmetric() {
        let shape = Shape::Box { dx: 1.0, dy: 2.0, dz: 3.0 };
        assert_eq!(shape.axis_range(AxisCode::X), Some((-1.0, 1.0)));
        assert_eq!(shape.axis_range(AxisCode::Y), Some((-2.0, 2.0)));
        assert_eq!(shape.axis_range(AxisCode::Z), Some((-3.0, 3.0)));
        assert!(!shape.is_cylindrical());
    }

    #[test]
    fn tube_reads_codes_as_radius_and_azimuth() {
        let shape = Shape::Tube {
            rmin: 1.0,
            rmax: 5.0,
            dz: 10.0,
            phi1: 0.0,
            phi2: 90.0,
        };
        assert!(shape.is_cylindrical());
        assert_eq!(shape.axis_range(AxisCode::X), Some((1.0, 5.0)));
        assert_eq!(shape.axis_range(AxisCode::Y), Some((0.0, 90.0)));
        assert_eq!(shape.axis_range(AxisCode::Z), Some((-10.0, 10.0)));
    }

    #[test]
    fn polycone_z_range_follows_section_order() {
        let shape = Shape::Polycone {
            phi: 0.0,
            dphi: 360.0,
            sections: vec![ZSection::new(-4.0, 0.0, 1.0), ZSection::new(6.0, 0.0, 2.0)],
        };
        assert_eq!(shape.axis_range(AxisCode::Z), Some((-4.0, 6.0)));
        assert_eq!(shape.axis_range(AxisCode::Y), Some((0.0, 360.0)));
        assert_eq!(shape.axis_range(AxisCode::X), None);
    }

    #[test]
    fn sphere_has_no_division_range() {
        let shape = Shape::Sphere {
            rmin: 0.0,
            rmax: 1.0,
            theta1: 0.0,
            theta2: 180.0,
            phi1: 0.0,
            phi2: 360.0,
        };
        assert_eq!(shape.axis_range(AxisCode::X), None);
        assert!(shape.children().is_empty());
    }
}
