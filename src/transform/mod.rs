//! Placement transforms: proper rotations plus translations.
//!
//! Rotations follow the placement convention of the markup format: the input
//! angles describe how the daughter is turned, and the stored matrix is the
//! frame rotation, i.e. `Rx(-x) * Ry(-y) * Rz(-z)`.

mod reflection;

pub use reflection::{make_reflection, Reflection};

use crate::math::{rotation_x, rotation_y, rotation_z, Matrix3, Point3, Vector3, TOLERANCE};

/// A rigid transform: proper rotation followed by translation.
///
/// `local_to_master(p) = R * p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    rotation: Matrix3,
    translation: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Creates a transform from a rotation matrix and a translation.
    ///
    /// The matrix is taken as given; callers are responsible for passing a
    /// proper rotation.
    #[must_use]
    pub fn from_parts(rotation: Matrix3, translation: Vector3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The rotation part.
    #[must_use]
    pub fn rotation(&self) -> &Matrix3 {
        &self.rotation
    }

    /// The translation part.
    #[must_use]
    pub fn translation(&self) -> &Vector3 {
        &self.translation
    }

    /// Maps a point from the daughter frame into the mother frame.
    #[must_use]
    pub fn local_to_master(&self, p: &Point3) -> Point3 {
        Point3::from(self.rotation * p.coords + self.translation)
    }

    /// Maps a point from the mother frame into the daughter frame.
    #[must_use]
    pub fn master_to_local(&self, p: &Point3) -> Point3 {
        Point3::from(self.rotation.transpose() * (p.coords - self.translation))
    }

    /// The inverse transform.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rt = self.rotation.transpose();
        Self {
            rotation: rt,
            translation: -(rt * self.translation),
        }
    }

    /// Returns `self ∘ other`: `other` is applied first.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Returns `true` if both parts are within [`TOLERANCE`] of the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.translation.norm() < TOLERANCE
            && (self.rotation - Matrix3::identity()).amax() < TOLERANCE
    }

    /// Returns `true` if the rotation part is the identity.
    #[must_use]
    pub fn is_translation(&self) -> bool {
        (self.rotation - Matrix3::identity()).amax() < TOLERANCE
    }
}

/// Pure translation by `(x, y, z)`.
#[must_use]
pub fn make_translation(x: f64, y: f64, z: f64) -> Transform {
    Transform::from_parts(Matrix3::identity(), Vector3::new(x, y, z))
}

/// Rotation from Euler angles in degrees.
///
/// Rotates about Z, then Y, then X, each by the negated angle. The order
/// matters and is fixed.
#[must_use]
pub fn make_rotation(rx: f64, ry: f64, rz: f64) -> Transform {
    let m = rotation_x(-rx) * rotation_y(-ry) * rotation_z(-rz);
    Transform::from_parts(m, Vector3::zeros())
}

/// Translate-then-rotate composite used for every placement.
///
/// Only the translation of `translation` and the rotation of `rotation` are used.
#[must_use]
pub fn make_combined(translation: &Transform, rotation: &Transform) -> Transform {
    Transform::from_parts(rotation.rotation, translation.translation)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn rotation_about_x_maps_master_y_to_local_z() {
        let r = make_rotation(90.0, 0.0, 0.0);
        assert_eq!(r.master_to_local(&p(0.0, 1.0, 0.0)), p(0.0, 0.0, 1.0));
        assert_eq!(r.local_to_master(&p(0.0, 0.0, 1.0)), p(0.0, 1.0, 0.0));
    }

    #[test]
    fn rotation_order_is_z_then_y_then_x() {
        let r = make_rotation(90.0, 90.0, 0.0);
        // Ry(-90) applied first sends x to z, then Rx(-90) sends z to y.
        assert_eq!(r.local_to_master(&p(1.0, 0.0, 0.0)), p(0.0, 1.0, 0.0));
        let swapped = make_rotation(0.0, 90.0, 0.0).compose(&make_rotation(90.0, 0.0, 0.0));
        assert_ne!(swapped.rotation(), r.rotation());
    }

    #[test]
    fn rotation_is_reproducible() {
        let a = make_rotation(12.5, -33.0, 71.25);
        let b = make_rotation(12.5, -33.0, 71.25);
        assert_eq!(a, b);
        assert_relative_eq!(a.rotation().determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn combined_takes_translation_and_rotation() {
        let t = make_translation(1.0, 2.0, 3.0);
        let r = make_rotation(0.0, 0.0, 90.0);
        let c = make_combined(&t, &r);
        // Rz(-90) sends x to -y, then the offset is added.
        assert_eq!(c.local_to_master(&p(1.0, 0.0, 0.0)), p(1.0, 1.0, 3.0));
    }

    #[test]
    fn identity_combined_is_identity() {
        let c = make_combined(&make_translation(0.0, 0.0, 0.0), &make_rotation(0.0, 0.0, 0.0));
        assert!(c.is_identity());
        assert_eq!(c, Transform::identity());
    }

    #[test]
    fn inverse_round_trips_a_point() {
        let t = make_combined(&make_translation(4.0, -1.0, 2.5), &make_rotation(30.0, 45.0, 60.0));
        let q = p(0.3, -7.0, 1.1);
        let back = t.inverse().local_to_master(&t.local_to_master(&q));
        assert_relative_eq!(back, q, epsilon = 1e-12);
        assert!(t.compose(&t.inverse()).is_identity());
    }

    #[test]
    fn compose_applies_right_operand_first() {
        let shift = make_translation(1.0, 0.0, 0.0);
        let turn = make_rotation(0.0, 0.0, -90.0);
        // turn sends x to y, then shift moves along x.
        let c = shift.compose(&turn);
        assert_eq!(c.local_to_master(&p(1.0, 0.0, 0.0)), p(1.0, 1.0, 0.0));
    }
}
