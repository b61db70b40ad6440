//! Trajectory assembly
//!
//! Walks all planes in z-order and builds one trajectory point per plane
//! plus two scattering-only points in each air gap, attaching measurements,
//! scattering precision and (during alignment) global derivative blocks.
//! The resulting point list is the complete input of the external GBL
//! fitter; the fit itself is not performed here.

use nalgebra::Vector2;

use crate::gbl::alignment::{derivative_matrix, global_labels, AlignmentMode};
use crate::gbl::point::{straight_line_jacobian, Trajectory, TrajectoryPoint};
use crate::gbl::scatter::{
    highland_theta, thick_scatterer_precision, thin_scatterer_precision, AIR_SPLIT,
};
use crate::geometry::context::GeometryContext;
use crate::geometry::material::X0_AIR_MM;
use crate::geometry::plane::Plane;
use crate::types::frames::{GlobalPoint, GlobalVector};
use crate::types::hit::Hit;
use crate::types::plane_id::PlaneId;
use crate::types::triplet::{Track, Triplet};
use crate::Result;

/// Settings for one assembly pass.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Beam energy in GeV, sets the Highland scattering scale
    pub beam_energy_gev: f64,
    /// When set, measurement points carry global alignment derivatives
    pub alignment: Option<AlignmentMode>,
    /// No scatterer is placed on this plane, for an unbiased kink estimate
    pub plane_under_test: Option<PlaneId>,
    /// Planes whose measurements are skipped (scattering still applies)
    pub excluded_planes: Vec<PlaneId>,
}

impl AssemblerConfig {
    pub fn new(beam_energy_gev: f64) -> Self {
        Self {
            beam_energy_gev,
            alignment: None,
            plane_under_test: None,
            excluded_planes: Vec::new(),
        }
    }

    pub fn with_alignment(mut self, mode: AlignmentMode) -> Self {
        self.alignment = Some(mode);
        self
    }

    pub fn with_plane_under_test(mut self, plane: PlaneId) -> Self {
        self.plane_under_test = Some(plane);
        self
    }

    pub fn with_excluded_planes(mut self, planes: Vec<PlaneId>) -> Self {
        self.excluded_planes = planes;
        self
    }
}

/// Builds GBL point lists from matched tracks.
#[derive(Debug, Clone)]
pub struct TrajectoryAssembler {
    config: AssemblerConfig,
}

impl TrajectoryAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Assembles the trajectory point list for one matched track.
    pub fn assemble(&self, track: &Track, ctx: &GeometryContext) -> Result<Trajectory> {
        let planes = ctx.planes();
        debug_assert!(!planes.is_empty());

        // Total traversed budget sets the Highland log correction once per track.
        let first_z = planes[0].position[2];
        let last_z = planes[planes.len() - 1].position[2];
        let start = track_point(track, first_z);
        let end = track_point(track, last_z);
        let total_budget = ctx.radiation_length_between(start, end);

        let mut points: Vec<TrajectoryPoint> = Vec::with_capacity(3 * planes.len());
        let mut plane_points = Vec::with_capacity(planes.len());
        let mut prev_z = first_z;

        for plane in planes {
            let z = plane.position[2];

            // Two air kicks approximate the continuous scattering in the gap.
            let gap = z - prev_z;
            if gap > 0.0 {
                let theta_gap = highland_theta(
                    self.config.beam_energy_gev,
                    gap / X0_AIR_MM,
                    total_budget,
                );
                for fraction in [AIR_SPLIT.0, AIR_SPLIT.1] {
                    let z_air = prev_z + fraction * gap;
                    let ds = self.path_length(track, prev_z, z_air);
                    let mut point =
                        TrajectoryPoint::new(z_air, straight_line_jacobian(ds));
                    if theta_gap > 0.0 {
                        point = point.with_scatterer(thick_scatterer_precision(theta_gap));
                    }
                    points.push(point);
                    prev_z = z_air;
                }
            }

            let ds = self.path_length(track, prev_z, z);
            let mut point = TrajectoryPoint::new(z, straight_line_jacobian(ds)).on_plane(plane.id);

            if let Some(hit) = track.hit_on(plane.id) {
                if !self.config.excluded_planes.contains(&plane.id) {
                    point = self.add_measurement(point, track, plane, hit, ctx)?;
                }
            }

            if self.config.plane_under_test != Some(plane.id) {
                let theta = highland_theta(
                    self.config.beam_energy_gev,
                    plane.budget(),
                    total_budget,
                );
                if theta > 0.0 {
                    point = point.with_scatterer(thin_scatterer_precision(theta));
                }
            }

            plane_points.push((plane.id, points.len()));
            points.push(point);
            prev_z = z;
        }

        tracing::debug!(
            n_points = points.len(),
            n_planes = plane_points.len(),
            "trajectory assembled"
        );
        Ok(Trajectory::new(points, plane_points))
    }

    fn add_measurement(
        &self,
        point: TrajectoryPoint,
        track: &Track,
        plane: &Plane,
        hit: &Hit,
        ctx: &GeometryContext,
    ) -> Result<TrajectoryPoint> {
        let z = plane.position[2];
        let arm = arm_for(track, z);

        let predicted = track_arm_point(arm, z);
        let predicted_local = ctx.global_to_local(plane.id, predicted)?;
        let hit_local = match hit.local {
            Some(local) => local,
            None => ctx.global_to_local(plane.id, hit.global)?,
        };

        let residual = Vector2::new(
            hit_local.x() - predicted_local.x(),
            hit_local.y() - predicted_local.y(),
        );
        let sigma = hit.sigma.unwrap_or(plane.resolution);
        let precision = Vector2::new(1.0 / (sigma[0] * sigma[0]), 1.0 / (sigma[1] * sigma[1]));

        let mut point = point.with_measurement(residual, precision);

        if let Some(mode) = self.config.alignment {
            let slope_local = local_slope(arm, plane.id, ctx)?;
            let impact = Vector2::new(predicted_local.x(), predicted_local.y());
            point = point.with_globals(
                global_labels(plane.id, mode),
                derivative_matrix(mode, slope_local, impact),
            );
        }

        Ok(point)
    }

    /// Path length between two z positions along the owning arm's direction.
    fn path_length(&self, track: &Track, z_from: f64, z_to: f64) -> f64 {
        let slope = arm_for(track, 0.5 * (z_from + z_to)).slope();
        (z_to - z_from) * (1.0 + slope.x * slope.x + slope.y * slope.y).sqrt()
    }
}

/// Whether a track's fit result passes the quality gate.
///
/// Tracks failing the gate are skipped entirely; no partial trajectory is
/// emitted for them.
pub fn accept_fit(chi2: f64, ndf: usize, max_chi2_ndf: f64) -> bool {
    if ndf == 0 {
        return false;
    }
    let reduced = chi2 / ndf as f64;
    if reduced > max_chi2_ndf {
        tracing::debug!(chi2, ndf, "track rejected by fit-quality cut");
        return false;
    }
    true
}

/// The arm that owns the region around z: upstream before the midpoint of
/// the two triplet bases, downstream after.
fn arm_for(track: &Track, z: f64) -> &Triplet {
    let mid = 0.5 * (track.upstream().base()[2] + track.downstream().base()[2]);
    if z <= mid {
        track.upstream()
    } else {
        track.downstream()
    }
}

fn track_arm_point(arm: &Triplet, z: f64) -> GlobalPoint {
    let pos = arm.extrapolate(z);
    GlobalPoint::new(pos.x, pos.y, z)
}

fn track_point(track: &Track, z: f64) -> GlobalPoint {
    track_arm_point(arm_for(track, z), z)
}

/// Track slope in the plane's local frame, for alignment derivatives.
fn local_slope(arm: &Triplet, plane: PlaneId, ctx: &GeometryContext) -> Result<Vector2<f64>> {
    let direction = GlobalVector::new(arm.slope().x, arm.slope().y, 1.0);
    let local = ctx.global_to_local_vec(plane, direction)?;
    if local.z().abs() < 1e-9 {
        tracing::warn!(plane = %plane, "track parallel to plane, local slope degenerate");
        return Ok(Vector2::new(0.0, 0.0));
    }
    Ok(Vector2::new(local.x() / local.z(), local.y() / local.z()))
}
