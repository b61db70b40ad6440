//! Per-plane detection efficiency estimation
//!
//! Matched, isolated triplet/driplet pairs are built from planes that
//! exclude the plane under test, extrapolated to that plane, and checked
//! for a nearby hit. The triplet vectors are taken by value: estimation
//! consumes them, which makes the original's clear-on-exit side effect an
//! explicit ownership transfer.

use crate::finder::matcher::match_triplets;
use crate::geometry::context::GeometryContext;
use crate::types::hit::HitSet;
use crate::types::plane_id::PlaneId;
use crate::types::triplet::Triplet;
use crate::Result;

/// Outcome of an efficiency estimation over one or more events.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EfficiencyEstimate {
    /// Accepted track candidates with a hit on the plane under test
    pub matched: usize,
    /// All accepted track candidates
    pub total: usize,
}

impl EfficiencyEstimate {
    /// Matched fraction; 0.0 when no candidate was found at all.
    pub fn efficiency(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }

    /// Accumulates another estimate (e.g. across events).
    pub fn merge(&mut self, other: EfficiencyEstimate) {
        self.matched += other.matched;
        self.total += other.total;
    }
}

/// Estimates the detection efficiency of `plane_under_test`.
///
/// The caller builds `upstream`/`downstream` triplets from plane sets that
/// exclude the plane under test; this function consumes them, matches them
/// with isolation exactly as the track finder does, extrapolates every
/// accepted pair to the plane under test and searches for any hit within
/// `search_radius` of the impact point.
#[allow(clippy::too_many_arguments)]
pub fn estimate_efficiency(
    ctx: &GeometryContext,
    upstream: Vec<Triplet>,
    downstream: Vec<Triplet>,
    hits: &HitSet,
    plane_under_test: PlaneId,
    z_match: f64,
    match_cut: f64,
    isolation_cut: f64,
    search_radius: f64,
) -> Result<EfficiencyEstimate> {
    let test_z = ctx.plane_position(plane_under_test)?.z();
    let candidates = hits.on_plane(ctx, plane_under_test)?;

    let tracks = match_triplets(&upstream, &downstream, z_match, match_cut, isolation_cut);

    let mut estimate = EfficiencyEstimate::default();
    for track in &tracks {
        estimate.total += 1;

        let arm = track.upstream();
        let found = candidates.iter().any(|hit| {
            arm.residual_at(hit.global.x(), hit.global.y(), test_z).norm() <= search_radius
        });
        if found {
            estimate.matched += 1;
        }
    }

    if estimate.total == 0 {
        tracing::debug!(plane = %plane_under_test, "no track candidates for efficiency estimate");
    }
    Ok(estimate)
}
