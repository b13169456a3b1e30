use tracing::debug;

use crate::error::Result;
use crate::math::{Point2, Vector3};
use crate::operations::MakeComposite;
use crate::reflection::ReflectionEntry;
use crate::registry::{normalize, Category};
use crate::store::{BooleanOp, Shape, SolidData, SolidId, TrapParams, XtruSection, ZSection};
use crate::transform::{make_rotation, make_translation, Reflection};

use super::{GeometryBuilder, Handle};

/// Trapezoid dimensions in definition order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapDims {
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
    pub x4: f64,
    pub y1: f64,
    pub y2: f64,
    pub z: f64,
    pub alpha1: f64,
    pub alpha2: f64,
    pub phi: f64,
    pub theta: f64,
}

impl TrapDims {
    fn params(&self) -> TrapParams {
        TrapParams {
            dz: self.z,
            theta: self.theta,
            phi: self.phi,
            h1: self.y1,
            bl1: self.x1,
            tl1: self.x2,
            alpha1: self.alpha1,
            h2: self.y2,
            bl2: self.x3,
            tl2: self.x4,
            alpha2: self.alpha2,
        }
    }
}

/// A primitive solid as it appears in a geometry description.
///
/// Angular ranges are given as start plus extent; [`Primitive::into_shape`]
/// rewrites them into the store's conventions. Section lists keep their
/// input order and are not validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Box {
        x: f64,
        y: f64,
        z: f64,
    },
    Paraboloid {
        rlo: f64,
        rhi: f64,
        dz: f64,
    },
    Arb8 {
        vertices: [Point2; 8],
        dz: f64,
    },
    Tube {
        rmin: f64,
        rmax: f64,
        z: f64,
        start_phi: f64,
        delta_phi: f64,
    },
    CutTube {
        rmin: f64,
        rmax: f64,
        z: f64,
        start_phi: f64,
        delta_phi: f64,
        low: Vector3,
        high: Vector3,
    },
    Cone {
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        z: f64,
        start_phi: f64,
        delta_phi: f64,
    },
    Polycone {
        start_phi: f64,
        delta_phi: f64,
        planes: Vec<ZSection>,
    },
    Trap(TrapDims),
    TwistedTrap {
        dims: TrapDims,
        twist: f64,
    },
    Trd {
        x1: f64,
        x2: f64,
        y1: f64,
        y2: f64,
        z: f64,
    },
    Sphere {
        rmin: f64,
        rmax: f64,
        start_phi: f64,
        delta_phi: f64,
        start_theta: f64,
        delta_theta: f64,
    },
    Orb {
        r: f64,
    },
    Para {
        x: f64,
        y: f64,
        z: f64,
        alpha: f64,
        theta: f64,
        phi: f64,
    },
    Torus {
        rmin: f64,
        rmax: f64,
        rtor: f64,
        start_phi: f64,
        delta_phi: f64,
    },
    Hype {
        rmin: f64,
        rmax: f64,
        inner_stereo: f64,
        outer_stereo: f64,
        z: f64,
    },
    Polyhedra {
        start_phi: f64,
        delta_phi: f64,
        sides: u32,
        planes: Vec<ZSection>,
    },
    Xtru {
        vertices: Vec<Point2>,
        sections: Vec<XtruSection>,
    },
    EllipticalTube {
        dx: f64,
        dy: f64,
        dz: f64,
    },
}

impl Primitive {
    /// Converts into the store's shape descriptor.
    #[must_use]
    pub fn into_shape(self) -> Shape {
        match self {
            Self::Box { x, y, z } => Shape::Box { dx: x, dy: y, dz: z },
            Self::Paraboloid { rlo, rhi, dz } => Shape::Paraboloid { rlo, rhi, dz },
            Self::Arb8 { vertices, dz } => Shape::Arb8 { dz, vertices },
            Self::Tube {
                rmin,
                rmax,
                z,
                start_phi,
                delta_phi,
            } => Shape::Tube {
                rmin,
                rmax,
                dz: z,
                phi1: start_phi,
                phi2: start_phi + delta_phi,
            },
            Self::CutTube {
                rmin,
                rmax,
                z,
                start_phi,
                delta_phi,
                low,
                high,
            } => Shape::CutTube {
                rmin,
                rmax,
                dz: z,
                phi1: start_phi,
                phi2: start_phi + delta_phi,
                low_normal: low,
                high_normal: high,
            },
            Self::Cone {
                rmin1,
                rmax1,
                rmin2,
                rmax2,
                z,
                start_phi,
                delta_phi,
            } => Shape::Cone {
                dz: z,
                rmin1,
                rmax1,
                rmin2,
                rmax2,
                phi1: start_phi,
                phi2: start_phi + delta_phi,
            },
            Self::Polycone {
                start_phi,
                delta_phi,
                planes,
            } => Shape::Polycone {
                phi: start_phi,
                dphi: delta_phi,
                sections: planes,
            },
            Self::Trap(dims) => Shape::Trap(dims.params()),
            Self::TwistedTrap { dims, twist } => Shape::TwistedTrap {
                trap: dims.params(),
                twist,
            },
            Self::Trd { x1, x2, y1, y2, z } => Shape::Trd {
                dx1: x1,
                dx2: x2,
                dy1: y1,
                dy2: y2,
                dz: z,
            },
            Self::Sphere {
                rmin,
                rmax,
                start_phi,
                delta_phi,
                start_theta,
                delta_theta,
            } => Shape::Sphere {
                rmin,
                rmax,
                theta1: start_theta,
                theta2: start_theta + delta_theta,
                phi1: start_phi,
                phi2: start_phi + delta_phi,
            },
            Self::Orb { r } => Shape::Sphere {
                rmin: 0.0,
                rmax: r,
                theta1: 0.0,
                theta2: 180.0,
                phi1: 0.0,
                phi2: 360.0,
            },
            Self::Para {
                x,
                y,
                z,
                alpha,
                theta,
                phi,
            } => Shape::Para {
                dx: x,
                dy: y,
                dz: z,
                alpha,
                theta,
                phi,
            },
            Self::Torus {
                rmin,
                rmax,
                rtor,
                start_phi,
                delta_phi,
            } => Shape::Torus {
                r: rtor,
                rmin,
                rmax,
                phi1: start_phi,
                dphi: delta_phi,
            },
            Self::Hype {
                rmin,
                rmax,
                inner_stereo,
                outer_stereo,
                z,
            } => Shape::Hype {
                rin: rmin,
                stin: inner_stereo,
                rout: rmax,
                stout: outer_stereo,
                dz: z,
            },
            Self::Polyhedra {
                start_phi,
                delta_phi,
                sides,
                planes,
            } => Shape::Polyhedra {
                phi: start_phi,
                dphi: delta_phi,
                sides,
                sections: planes,
            },
            Self::Xtru { vertices, sections } => Shape::Xtru {
                polygon: vertices,
                sections,
            },
            Self::EllipticalTube { dx, dy, dz } => Shape::EllipticalTube { dx, dy, dz },
        }
    }
}

impl GeometryBuilder {
    /// Defines a primitive solid.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken.
    pub fn primitive(&mut self, name: &str, primitive: Primitive) -> Result<SolidId> {
        let name = normalize(name);
        self.claim(Category::Solid, &name)?;
        let shape = primitive.into_shape();
        let kind = shape.kind();
        let id = self.store.add_solid(SolidData {
            name: name.clone(),
            shape,
        });
        self.register(Category::Solid, &name, Handle::Solid(id))?;
        debug!(name = %name, kind, "solid defined");
        Ok(id)
    }

    /// Defines a boolean composite of two previously defined solids.
    ///
    /// `right` is placed at `translate(position) ∘ inverse(rotation)`, where
    /// `rotation` holds Euler angles in degrees; `left` stays at the identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or either operand is unresolved.
    /// Nothing is registered on failure.
    pub fn boolean(
        &mut self,
        name: &str,
        op: BooleanOp,
        left: &str,
        right: &str,
        position: Vector3,
        rotation: Vector3,
    ) -> Result<SolidId> {
        let name = normalize(name);
        self.claim(Category::Solid, &name)?;
        let left = self.solid_id(left)?;
        let right = self.solid_id(right)?;

        let inverse = make_rotation(rotation.x, rotation.y, rotation.z).inverse();
        let right_transform =
            make_translation(position.x, position.y, position.z).compose(&inverse);

        let id = MakeComposite::new(name.clone(), op, left, right, right_transform)
            .execute(&mut self.store)?;
        self.register(Category::Solid, &name, Handle::Solid(id))?;
        debug!(name = %name, %op, "composite solid defined");
        Ok(id)
    }

    /// Union of `left` and `right`. See [`boolean`](Self::boolean).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or either operand is unresolved.
    pub fn union(
        &mut self,
        name: &str,
        left: &str,
        right: &str,
        position: Vector3,
        rotation: Vector3,
    ) -> Result<SolidId> {
        self.boolean(name, BooleanOp::Union, left, right, position, rotation)
    }

    /// `left` minus `right`. See [`boolean`](Self::boolean).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or either operand is unresolved.
    pub fn subtraction(
        &mut self,
        name: &str,
        left: &str,
        right: &str,
        position: Vector3,
        rotation: Vector3,
    ) -> Result<SolidId> {
        self.boolean(name, BooleanOp::Subtraction, left, right, position, rotation)
    }

    /// Intersection of `left` and `right`. See [`boolean`](Self::boolean).
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or either operand is unresolved.
    pub fn intersection(
        &mut self,
        name: &str,
        left: &str,
        right: &str,
        position: Vector3,
        rotation: Vector3,
    ) -> Result<SolidId> {
        self.boolean(name, BooleanOp::Intersection, left, right, position, rotation)
    }

    /// Defines a mirrored copy of `solid`.
    ///
    /// The reflection (`scale` signs, Euler `rotation` in degrees,
    /// `translation`) is split into a proper transform plus an optional point
    /// inversion, and recorded under `name` in the reflection registry, where
    /// a later definition with the same name replaces this one. The result is
    /// referenced by name from [`logical_volume`](Self::logical_volume) with
    /// `reflected = true`.
    ///
    /// # Errors
    ///
    /// Returns an error if `solid` is unresolved, a scale factor is not ±1,
    /// or an angle or offset is not finite.
    pub fn reflected_solid(
        &mut self,
        name: &str,
        solid: &str,
        scale: Vector3,
        rotation: Vector3,
        translation: Vector3,
    ) -> Result<SolidId> {
        let name = normalize(name);
        let source = self.solid_id(solid)?;
        let reflection = Reflection::new(scale, rotation, translation)?;

        let reflected = self.store.add_solid(SolidData {
            name: name.clone(),
            shape: Shape::Reflected {
                base: source,
                transform: *reflection.transform(),
                inverted: reflection.is_inverted(),
            },
        });
        let replaced = self.reflections.register(
            name.clone(),
            ReflectionEntry {
                source,
                reflected,
                reflection,
            },
        );
        debug!(
            name = %name,
            proper = reflection.is_proper(),
            replaced = replaced.is_some(),
            "reflected solid defined"
        );
        Ok(reflected)
    }
}
