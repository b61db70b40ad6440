//! Rotation composition for plane transforms
//!
//! A plane's local-to-global linear map is `R_z * R_x * R_y * F`: the
//! reflection first, then rotations about Z, X and Y, each taken in the
//! coordinate frame left behind by the previous one (intrinsic composition,
//! which multiplies on the right).

use nalgebra::Matrix3;

use crate::geometry::plane::Plane;

/// Rotation about the z axis.
pub fn rot_z(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Rotation about the x axis.
pub fn rot_x(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

/// Rotation about the y axis.
pub fn rot_y(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

/// The composed local-to-global linear map of a plane, including the flip.
pub fn plane_linear_map(plane: &Plane) -> Matrix3<f64> {
    let [gz, ax, by] = plane.rotation_deg;
    let rotation = rot_z(gz.to_radians()) * rot_x(ax.to_radians()) * rot_y(by.to_radians());
    rotation * plane.flip.as_matrix3()
}
