//! Common test helpers for reconstruction integration tests

#![allow(dead_code)]

use tritrack::prelude::*;

/// z spacing between telescope planes (mm).
pub const PLANE_SPACING: f64 = 150.0;

/// Builds a 6-plane Mimosa26-like telescope, planes 0..5 spaced 150 mm.
pub fn six_plane_telescope() -> GeometryContext {
    GeometryContext::new(
        (0..6)
            .map(|i| Plane::telescope_default(PlaneId::new(i), PLANE_SPACING * f64::from(i)))
            .collect(),
    )
    .expect("valid telescope geometry")
}

/// Builds the 6-plane telescope with a thicker DUT plane inserted at the
/// given z, carrying the given ID.
pub fn telescope_with_dut(dut_id: PlaneId, dut_z: f64) -> GeometryContext {
    let mut planes: Vec<Plane> = (0..6)
        .map(|i| Plane::telescope_default(PlaneId::new(i), PLANE_SPACING * f64::from(i)))
        .collect();
    planes.push(
        Plane::telescope_default(dut_id, dut_z)
            .with_thickness(0.3, 93.65)
            .with_resolution(0.010, 0.010),
    );
    GeometryContext::new(planes).expect("valid telescope geometry with DUT")
}

/// Hits of a straight track x(z) = x0 + sx z, y(z) = y0 + sy z on every
/// plane of the geometry.
pub fn straight_track_hits(
    ctx: &GeometryContext,
    x0: f64,
    y0: f64,
    sx: f64,
    sy: f64,
) -> Vec<Hit> {
    ctx.planes()
        .iter()
        .map(|p| {
            let z = p.position[2];
            Hit::new(p.id, x0 + sx * z, y0 + sy * z, z)
        })
        .collect()
}

/// The upstream/downstream plane triples of the 6-plane telescope.
pub fn arm_planes() -> ([PlaneId; 3], [PlaneId; 3]) {
    (
        [PlaneId::new(0), PlaneId::new(1), PlaneId::new(2)],
        [PlaneId::new(3), PlaneId::new(4), PlaneId::new(5)],
    )
}

/// Finds triplets in both arms with the given cuts.
pub fn find_both_arms(
    ctx: &GeometryContext,
    hits: &HitSet,
    cuts: TripletCuts,
) -> (Vec<Triplet>, Vec<Triplet>) {
    let (up_planes, down_planes) = arm_planes();
    let up = find_triplets(ctx, hits, up_planes, cuts, false, TripletDirection::Upstream)
        .expect("upstream arm");
    let down = find_triplets(
        ctx,
        hits,
        down_planes,
        cuts,
        false,
        TripletDirection::Downstream,
    )
    .expect("downstream arm");
    (up, down)
}
