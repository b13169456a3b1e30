/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix, used for rotation parts of placements.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Elementary rotation about the X axis by `degrees`.
#[must_use]
pub fn rotation_x(degrees: f64) -> Matrix3 {
    let (s, c) = degrees.to_radians().sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, c,   -s,
        0.0, s,   c,
    );
    snap(m)
}

/// Elementary rotation about the Y axis by `degrees`.
#[must_use]
pub fn rotation_y(degrees: f64) -> Matrix3 {
    let (s, c) = degrees.to_radians().sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        c,   0.0, s,
        0.0, 1.0, 0.0,
        -s,  0.0, c,
    );
    snap(m)
}

/// Elementary rotation about the Z axis by `degrees`.
#[must_use]
pub fn rotation_z(degrees: f64) -> Matrix3 {
    let (s, c) = degrees.to_radians().sin_cos();
    #[rustfmt::skip]
    let m = Matrix3::new(
        c,   -s,  0.0,
        s,   c,   0.0,
        0.0, 0.0, 1.0,
    );
    snap(m)
}

/// Rounds entries within [`TOLERANCE`] of 0 or ±1 so that quarter turns are exact.
fn snap(mut m: Matrix3) -> Matrix3 {
    for v in m.iter_mut() {
        if v.abs() < TOLERANCE {
            *v = 0.0;
        } else if (v.abs() - 1.0).abs() < TOLERANCE {
            *v = v.signum();
        }
    }
    m
}
