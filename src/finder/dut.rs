//! DUT hit association
//!
//! For sensors outside the two triplet plane sets, finds the hit closest to
//! a triplet's extrapolated impact point in the sensor's local frame.

use crate::geometry::context::GeometryContext;
use crate::types::frames::GlobalPoint;
use crate::types::hit::HitSet;
use crate::types::plane_id::PlaneId;
use crate::types::triplet::Triplet;
use crate::Result;

/// Attaches the best-matching DUT hit to a triplet.
///
/// The triplet is extrapolated to the DUT's z, both the extrapolated point
/// and each candidate hit are taken to the DUT's local frame, and the hit
/// with the smallest squared local distance among those inside the per-axis
/// windows wins. Returns `Ok(false)` and leaves the triplet untouched when
/// no candidate passes. Several triplets may attach the same hit; no global
/// uniqueness is enforced here.
pub fn attach_dut(
    ctx: &GeometryContext,
    triplet: &mut Triplet,
    hits: &HitSet,
    dut_plane: PlaneId,
    per_axis_cuts: [f64; 2],
) -> Result<bool> {
    let dut_z = ctx.plane_position(dut_plane)?.z();
    let predicted = triplet.extrapolate(dut_z);
    let predicted_local = ctx.global_to_local(
        dut_plane,
        GlobalPoint::new(predicted.x, predicted.y, dut_z),
    )?;

    let mut best: Option<(f64, usize)> = None;
    let candidates = hits.on_plane(ctx, dut_plane)?;
    for (i, hit) in candidates.iter().enumerate() {
        let local = match hit.local {
            Some(local) => local,
            None => ctx.global_to_local(dut_plane, hit.global)?,
        };

        let dx = local.x() - predicted_local.x();
        let dy = local.y() - predicted_local.y();
        if dx.abs() > per_axis_cuts[0] || dy.abs() > per_axis_cuts[1] {
            continue;
        }

        let dist_sq = dx * dx + dy * dy;
        match best {
            Some((best_dist, _)) if best_dist <= dist_sq => {}
            _ => best = Some((dist_sq, i)),
        }
    }

    match best {
        Some((_, i)) => {
            triplet.attach_dut_hit(dut_plane, candidates[i].clone());
            Ok(true)
        }
        None => Ok(false),
    }
}
