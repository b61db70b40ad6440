//! Static description of a single telescope plane
//!
//! Mirrors the content of a GEAR-style geometry file: position, rotation
//! angles in degrees, an integer reflection matrix, pixel pitch and count,
//! sensor thickness, radiation length and intrinsic resolution.

use nalgebra::{Matrix2, Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::types::plane_id::PlaneId;
use crate::{RecoError, Result};

/// Radiation length of silicon (mm).
pub const X0_SILICON_MM: f64 = 93.65;

// ============================================================================
// Flip Matrix
// ============================================================================

/// A 2x2 integer reflection/permutation applied to sensor-local coordinates
/// before the rotation angles.
///
/// Entries are restricted to {-1, 0, 1}; the determinant must be +1 or -1.
/// Geometry loading fails hard on anything else instead of normalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlipMatrix {
    pub xx: i32,
    pub xy: i32,
    pub yx: i32,
    pub yy: i32,
}

impl FlipMatrix {
    pub const fn new(xx: i32, xy: i32, yx: i32, yy: i32) -> Self {
        Self { xx, xy, yx, yy }
    }

    /// The identity flip (no reflection).
    pub const fn identity() -> Self {
        Self::new(1, 0, 0, 1)
    }

    #[inline]
    pub const fn determinant(&self) -> i32 {
        self.xx * self.yy - self.xy * self.yx
    }

    /// Checks the unit-determinant precondition for the given plane.
    pub fn validate(&self, plane: PlaneId) -> Result<()> {
        let det = self.determinant();
        if det != 1 && det != -1 {
            return Err(RecoError::InvalidFlipMatrix { plane, det });
        }
        let entries = [self.xx, self.xy, self.yx, self.yy];
        if entries.iter().any(|e| e.abs() > 1) {
            return Err(RecoError::InvalidFlipMatrix { plane, det });
        }
        Ok(())
    }

    /// The flip as a 2x2 double matrix.
    pub fn as_matrix2(&self) -> Matrix2<f64> {
        Matrix2::new(
            self.xx as f64,
            self.xy as f64,
            self.yx as f64,
            self.yy as f64,
        )
    }

    /// The flip embedded into 3x3, acting on x/y and leaving z untouched.
    pub fn as_matrix3(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.xx as f64,
            self.xy as f64,
            0.0,
            self.yx as f64,
            self.yy as f64,
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }
}

impl Default for FlipMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

// ============================================================================
// Plane
// ============================================================================

/// Geometry of one telescope plane.
///
/// Angles are stored in degrees for GEAR compatibility; radian accessors
/// live on the geometry context. All lengths are millimeters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unique identifier; numeric order matches z-order
    pub id: PlaneId,
    /// Center position in the global frame (mm)
    pub position: [f64; 3],
    /// Rotation angles in degrees, applied about Z, then X, then Y,
    /// each in the frame produced by the previous rotation
    pub rotation_deg: [f64; 3],
    /// Reflection applied before the rotations
    pub flip: FlipMatrix,
    /// Pixel pitch along local x and y (mm)
    pub pitch: [f64; 2],
    /// Number of pixels along local x and y
    pub pixel_count: [u32; 2],
    /// Sensor thickness along its normal (mm)
    pub thickness: f64,
    /// Radiation length X0 of the sensor material (mm)
    pub radiation_length: f64,
    /// Intrinsic position resolution per axis (mm)
    pub resolution: [f64; 2],
}

impl Plane {
    /// A Mimosa26-like reference plane at the given z, unrotated.
    ///
    /// Used by the demo binary and throughout the test suites.
    pub fn telescope_default(id: PlaneId, z: f64) -> Self {
        Self {
            id,
            position: [0.0, 0.0, z],
            rotation_deg: [0.0, 0.0, 0.0],
            flip: FlipMatrix::identity(),
            pitch: [0.0184, 0.0184],
            pixel_count: [1152, 576],
            thickness: 0.05,
            radiation_length: X0_SILICON_MM,
            resolution: [0.0035, 0.0035],
        }
    }

    pub fn with_rotation_deg(mut self, rot_z: f64, rot_x: f64, rot_y: f64) -> Self {
        self.rotation_deg = [rot_z, rot_x, rot_y];
        self
    }

    pub fn with_flip(mut self, flip: FlipMatrix) -> Self {
        self.flip = flip;
        self
    }

    pub fn with_resolution(mut self, res_x: f64, res_y: f64) -> Self {
        self.resolution = [res_x, res_y];
        self
    }

    pub fn with_thickness(mut self, thickness: f64, radiation_length: f64) -> Self {
        self.thickness = thickness;
        self.radiation_length = radiation_length;
        self
    }

    /// Center position as an nalgebra vector.
    #[inline]
    pub fn position_vector(&self) -> Vector3<f64> {
        Vector3::new(self.position[0], self.position[1], self.position[2])
    }

    /// Sensor thickness divided by its radiation length.
    #[inline]
    pub fn budget(&self) -> f64 {
        self.thickness / self.radiation_length
    }
}
