//! Global alignment derivatives
//!
//! During an alignment pass every measurement point carries the derivative
//! of its predicted local impact with respect to the plane's alignment
//! parameters, plus the Millepede label for each parameter. The matrix
//! depends on the local track slope and impact point, so it is recomputed
//! per point.

use nalgebra::{DMatrix, Vector2};
use serde::{Deserialize, Serialize};

use crate::types::plane_id::PlaneId;

/// Which set of alignment parameters is floated per plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentMode {
    /// x/y shifts only
    ShiftsXY,
    /// x/y shifts and rotation about the normal
    ShiftsXYRotZ,
    /// x/y/z shifts and rotation about the normal
    ShiftsXYZRotZ,
    /// Full 3D shifts and rotations
    Full,
}

impl AlignmentMode {
    /// Parameter indices in label order (1 = x shift, 2 = y shift,
    /// 3 = z rotation, 4 = z shift, 5 = x rotation, 6 = y rotation).
    pub fn parameter_indices(&self) -> &'static [u32] {
        match self {
            AlignmentMode::ShiftsXY => &[1, 2],
            AlignmentMode::ShiftsXYRotZ => &[1, 2, 3],
            AlignmentMode::ShiftsXYZRotZ => &[1, 2, 3, 4],
            AlignmentMode::Full => &[1, 2, 3, 4, 5, 6],
        }
    }

    pub fn n_parameters(&self) -> usize {
        self.parameter_indices().len()
    }
}

/// Millepede labels for one plane: `plane_id * 10 + parameter_index`.
pub fn global_labels(plane: PlaneId, mode: AlignmentMode) -> Vec<i32> {
    mode.parameter_indices()
        .iter()
        .map(|k| (plane.value() * 10 + k) as i32)
        .collect()
}

/// Derivative of the predicted local impact (x, y) with respect to the
/// plane's alignment parameters, evaluated at the local impact point and
/// local track slope.
///
/// Column k follows the parameter order of the mode:
/// - x/y shift: unit response on the matching axis
/// - z rotation: the impact point rotates, (-y, x)
/// - z shift: the track advances along its slope, (x', y')
/// - x rotation: tilting moves the surface by y * alpha along z, (x'y, y'y)
/// - y rotation: the surface moves by -x * beta along z, (-x'x, -y'x)
pub fn derivative_matrix(
    mode: AlignmentMode,
    local_slope: Vector2<f64>,
    local_impact: Vector2<f64>,
) -> DMatrix<f64> {
    let (x, y) = (local_impact.x, local_impact.y);
    let (sx, sy) = (local_slope.x, local_slope.y);

    let mut matrix = DMatrix::zeros(2, mode.n_parameters());
    for (col, index) in mode.parameter_indices().iter().enumerate() {
        let (dx, dy) = match index {
            1 => (1.0, 0.0),
            2 => (0.0, 1.0),
            3 => (-y, x),
            4 => (sx, sy),
            5 => (sx * y, sy * y),
            6 => (-sx * x, -sy * x),
            _ => unreachable!("parameter index out of range"),
        };
        matrix[(0, col)] = dx;
        matrix[(1, col)] = dy;
    }
    matrix
}
