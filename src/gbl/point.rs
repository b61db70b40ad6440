//! Trajectory points handed to the external fitter
//!
//! Each point carries the straight-line transport Jacobian from the
//! previous point in the 5-parameter state (1/p, x', y', x, y), an optional
//! local 2D measurement with per-axis precision, an optional scattering
//! precision, and optional global alignment derivatives.

use nalgebra::{DMatrix, Matrix2, SMatrix, Vector2};

use crate::types::plane_id::PlaneId;

/// 5x5 transport Jacobian in (1/p, x', y', x, y).
pub type TransportJacobian = SMatrix<f64, 5, 5>;

/// Straight-line transport over a path length `ds`: identity except for the
/// position/slope coupling dx/dx' = dy/dy' = ds.
pub fn straight_line_jacobian(ds: f64) -> TransportJacobian {
    let mut jac = TransportJacobian::identity();
    jac[(3, 1)] = ds;
    jac[(4, 2)] = ds;
    jac
}

/// A local-frame position measurement attached to a trajectory point.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement2D {
    /// Measured minus predicted local position (mm)
    pub residual: Vector2<f64>,
    /// Per-axis precision 1/sigma^2 (1/mm^2)
    pub precision: Vector2<f64>,
}

/// Global alignment derivative block for one measurement point.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDerivatives {
    /// Millepede labels, `plane_id * 10 + parameter_index`
    pub labels: Vec<i32>,
    /// 2 x n_parameters derivative matrix (rows: local x, y residual)
    pub matrix: DMatrix<f64>,
}

/// One node of the trajectory point list.
#[derive(Debug, Clone)]
pub struct TrajectoryPoint {
    /// Global z of the point (mm)
    pub z: f64,
    /// The plane this point sits on, `None` for air scatterers
    pub plane: Option<PlaneId>,
    /// Transport from the previous point (identity for the first point)
    pub jacobian: TransportJacobian,
    pub measurement: Option<Measurement2D>,
    /// Scattering precision 1/theta^2, identical on both axes
    pub scatterer: Option<Vector2<f64>>,
    pub globals: Option<GlobalDerivatives>,
}

impl TrajectoryPoint {
    /// A bare transport point.
    pub fn new(z: f64, jacobian: TransportJacobian) -> Self {
        Self {
            z,
            plane: None,
            jacobian,
            measurement: None,
            scatterer: None,
            globals: None,
        }
    }

    pub fn on_plane(mut self, plane: PlaneId) -> Self {
        self.plane = Some(plane);
        self
    }

    pub fn with_measurement(mut self, residual: Vector2<f64>, precision: Vector2<f64>) -> Self {
        self.measurement = Some(Measurement2D {
            residual,
            precision,
        });
        self
    }

    pub fn with_scatterer(mut self, precision: Vector2<f64>) -> Self {
        self.scatterer = Some(precision);
        self
    }

    pub fn with_globals(mut self, labels: Vec<i32>, matrix: DMatrix<f64>) -> Self {
        debug_assert_eq!(matrix.nrows(), 2);
        debug_assert_eq!(matrix.ncols(), labels.len());
        self.globals = Some(GlobalDerivatives { labels, matrix });
        self
    }

    /// Scattering precision as the 2x2 matrix the fitter interface expects
    /// (diagonal: no x/y correlation is assumed).
    pub fn scatter_precision_matrix(&self) -> Option<Matrix2<f64>> {
        self.scatterer
            .map(|p| Matrix2::new(p.x, 0.0, 0.0, p.y))
    }
}

/// The assembled point list for one track, plus per-plane bookkeeping.
#[derive(Debug, Clone)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
    /// Point index per plane, in plane z-order
    plane_points: Vec<(PlaneId, usize)>,
}

impl Trajectory {
    pub(crate) fn new(points: Vec<TrajectoryPoint>, plane_points: Vec<(PlaneId, usize)>) -> Self {
        Self {
            points,
            plane_points,
        }
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    /// Index into `points()` of the point sitting on the given plane.
    pub fn point_for_plane(&self, plane: PlaneId) -> Option<usize> {
        self.plane_points
            .iter()
            .find(|(id, _)| *id == plane)
            .map(|(_, idx)| *idx)
    }

    pub fn n_measurements(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.measurement.is_some())
            .count()
    }

    pub fn n_scatterers(&self) -> usize {
        self.points.iter().filter(|p| p.scatterer.is_some()).count()
    }
}
