use crate::error::{OperationError, Result};
use crate::math::{Matrix3, Point3, Vector3, TOLERANCE};

use super::{make_rotation, Transform};

/// A mirror transform split into a proper rigid part and a point inversion.
///
/// Placements cannot carry a negative determinant, so `R * diag(s)` with
/// `det < 0` is stored as the proper rotation `-(R * diag(s))` together with
/// `inverted = true`: the solid itself carries the inversion `p -> -p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    transform: Transform,
    inverted: bool,
}

impl Reflection {
    /// Builds the reflection for scale factors `scale` (each ±1), Euler
    /// `angles` in degrees, and translation `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if a scale factor is not ±1, or an angle or offset
    /// component is not finite.
    pub fn new(scale: Vector3, angles: Vector3, offset: Vector3) -> Result<Self> {
        if let Some(bad) = scale
            .iter()
            .find(|s| !(s.is_finite() && (s.abs() - 1.0).abs() <= TOLERANCE))
        {
            return Err(OperationError::InvalidInput(format!(
                "reflection scale factors must be +1 or -1, got {bad}"
            ))
            .into());
        }
        if angles.iter().chain(offset.iter()).any(|x| !x.is_finite()) {
            return Err(OperationError::InvalidInput(format!(
                "reflection angles and offset must be finite, got {angles:?} and {offset:?}"
            ))
            .into());
        }
        let rotation = make_rotation(angles.x, angles.y, angles.z);
        let signs = Matrix3::from_diagonal(&scale.map(f64::signum));
        let improper = rotation.rotation() * signs;

        let (proper, inverted) = if improper.determinant() < 0.0 {
            (-improper, true)
        } else {
            (improper, false)
        };
        let proper = nearest_rotation(&proper);

        Ok(Self {
            transform: Transform::from_parts(proper, offset),
            inverted,
        })
    }

    /// The proper rigid part of the reflection.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// `true` if the original matrix was proper and no inversion is carried.
    #[must_use]
    pub fn is_proper(&self) -> bool {
        !self.inverted
    }

    /// `true` if the reflected solid carries a point inversion.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// The full (possibly improper) matrix this reflection represents.
    #[must_use]
    pub fn matrix(&self) -> Matrix3 {
        if self.inverted {
            -*self.transform.rotation()
        } else {
            *self.transform.rotation()
        }
    }

    /// Maps a point of the original solid onto the reflected solid.
    #[must_use]
    pub fn apply(&self, p: &Point3) -> Point3 {
        let local = if self.inverted { -p.coords } else { p.coords };
        self.transform.local_to_master(&Point3::from(local))
    }
}

/// Projects an almost-orthonormal matrix with positive determinant onto the
/// closest rotation (polar decomposition through the SVD).
fn nearest_rotation(m: &Matrix3) -> Matrix3 {
    let svd = m.svd(true, true);
    match (svd.u, svd.v_t) {
        (Some(mut u), Some(v_t)) => {
            if (u * v_t).determinant() < 0.0 {
                u.column_mut(2).neg_mut();
            }
            u * v_t
        }
        _ => *m,
    }
}

/// Builds a reflection and returns its proper transform and whether the
/// input was already proper.
///
/// # Errors
///
/// Returns an error if a scale factor is not ±1 or any input is not finite.
pub fn make_reflection(
    scale: Vector3,
    angles: Vector3,
    offset: Vector3,
) -> Result<(Transform, bool)> {
    let reflection = Reflection::new(scale, angles, offset)?;
    Ok((reflection.transform, reflection.is_proper()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    #[test]
    fn mirror_in_x_becomes_half_turn_plus_inversion() {
        let r = Reflection::new(v(-1.0, 1.0, 1.0), Vector3::zeros(), Vector3::zeros()).unwrap();
        assert!(!r.is_proper());
        assert_relative_eq!(r.transform().rotation().determinant(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            *r.transform().rotation(),
            Matrix3::from_diagonal(&v(1.0, -1.0, -1.0)),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            r.apply(&Point3::new(1.0, 2.0, 3.0)),
            Point3::new(-1.0, 2.0, 3.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn identity_scale_is_proper() {
        let (t, proper) =
            make_reflection(v(1.0, 1.0, 1.0), Vector3::zeros(), v(1.0, 2.0, 3.0)).unwrap();
        assert!(proper);
        assert_eq!(*t.translation(), v(1.0, 2.0, 3.0));
        assert_relative_eq!(*t.rotation(), Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn double_mirror_is_a_proper_rotation() {
        let r = Reflection::new(v(-1.0, -1.0, 1.0), Vector3::zeros(), Vector3::zeros()).unwrap();
        assert!(r.is_proper());
        assert_relative_eq!(
            r.apply(&Point3::new(1.0, 2.0, 3.0)),
            Point3::new(-1.0, -2.0, 3.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn decomposition_reproduces_rotated_mirror() {
        let scale = v(1.0, 1.0, -1.0);
        let angles = v(20.0, -35.0, 50.0);
        let offset = v(0.5, -2.0, 7.0);
        let r = Reflection::new(scale, angles, offset).unwrap();

        let expected =
            make_rotation(angles.x, angles.y, angles.z).rotation() * Matrix3::from_diagonal(&scale);
        assert_relative_eq!(r.matrix(), expected, epsilon = 1e-9);

        let q = Point3::new(3.0, -1.0, 0.25);
        let direct = Point3::from(expected * q.coords + offset);
        assert_relative_eq!(r.apply(&q), direct, epsilon = 1e-9);
        assert_relative_eq!(r.transform().rotation().determinant(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn non_unit_scale_is_rejected() {
        assert!(Reflection::new(v(2.0, 1.0, 1.0), Vector3::zeros(), Vector3::zeros()).is_err());
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let zero = Vector3::zeros();
        assert!(Reflection::new(v(f64::NAN, 1.0, 1.0), zero, zero).is_err());
        assert!(Reflection::new(v(1.0, f64::INFINITY, 1.0), zero, zero).is_err());
        assert!(Reflection::new(v(-1.0, 1.0, 1.0), v(0.0, f64::NAN, 0.0), zero).is_err());
        assert!(make_reflection(v(-1.0, 1.0, 1.0), zero, v(0.0, 0.0, f64::INFINITY)).is_err());
    }
}
