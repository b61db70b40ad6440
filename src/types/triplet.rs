//! Triplets and matched tracks
//!
//! A triplet is a straight-line segment through three plane hits. Its base
//! and slope are defined by the two outer hits only; the middle hit is used
//! by the finder to validate the residual cut, never to define the segment.

use std::collections::BTreeMap;

use nalgebra::Vector2;

use crate::types::hit::Hit;
use crate::types::plane_id::PlaneId;

/// Which arm of the telescope a triplet belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripletDirection {
    /// Planes before the device under test
    Upstream,
    /// Planes after the device under test
    Downstream,
}

impl std::fmt::Display for TripletDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripletDirection::Upstream => write!(f, "upstream"),
            TripletDirection::Downstream => write!(f, "downstream"),
        }
    }
}

/// A 3-hit straight-line track stub.
#[derive(Debug, Clone)]
pub struct Triplet {
    /// The three hits, ordered first/middle/last by plane z
    hits: [Hit; 3],
    /// Midpoint of the outer hits (mm, global frame)
    base: [f64; 3],
    /// dx/dz and dy/dz between the outer hits
    slope: Vector2<f64>,
    /// Hits on device-under-test planes associated after formation
    dut_hits: BTreeMap<PlaneId, Hit>,
    /// Arm this triplet was built for
    pub direction: TripletDirection,
}

impl Triplet {
    /// Builds a triplet from three hits ordered first/middle/last.
    ///
    /// Base and slope are derived from the outer hits. The caller is
    /// responsible for the ordering; the finder always passes hits in
    /// plane z-order.
    pub fn new(first: Hit, middle: Hit, last: Hit, direction: TripletDirection) -> Self {
        let a = first.global;
        let b = last.global;
        let dz = b.z() - a.z();

        let base = [
            0.5 * (a.x() + b.x()),
            0.5 * (a.y() + b.y()),
            0.5 * (a.z() + b.z()),
        ];
        let slope = Vector2::new((b.x() - a.x()) / dz, (b.y() - a.y()) / dz);

        Self {
            hits: [first, middle, last],
            base,
            slope,
            dut_hits: BTreeMap::new(),
            direction,
        }
    }

    /// The three constituent hits in first/middle/last order.
    #[inline]
    pub fn hits(&self) -> &[Hit; 3] {
        &self.hits
    }

    /// The hit on the given plane, if this triplet has one (triplet planes
    /// and attached DUT planes).
    pub fn hit_on(&self, plane: PlaneId) -> Option<&Hit> {
        self.hits
            .iter()
            .find(|h| h.plane == plane)
            .or_else(|| self.dut_hits.get(&plane))
    }

    /// Segment midpoint in the global frame (mm).
    #[inline]
    pub fn base(&self) -> [f64; 3] {
        self.base
    }

    /// Segment slope (dx/dz, dy/dz).
    #[inline]
    pub fn slope(&self) -> Vector2<f64> {
        self.slope
    }

    /// Extrapolated x at a given global z.
    #[inline]
    pub fn x_at(&self, z: f64) -> f64 {
        self.base[0] + self.slope.x * (z - self.base[2])
    }

    /// Extrapolated y at a given global z.
    #[inline]
    pub fn y_at(&self, z: f64) -> f64 {
        self.base[1] + self.slope.y * (z - self.base[2])
    }

    /// Extrapolated (x, y) at a given global z.
    #[inline]
    pub fn extrapolate(&self, z: f64) -> Vector2<f64> {
        Vector2::new(self.x_at(z), self.y_at(z))
    }

    /// Residual of an arbitrary global position against this segment.
    pub fn residual_at(&self, x: f64, y: f64, z: f64) -> Vector2<f64> {
        Vector2::new(x - self.x_at(z), y - self.y_at(z))
    }

    /// Associates a DUT hit with this triplet, replacing any previous hit
    /// on the same plane.
    pub fn attach_dut_hit(&mut self, plane: PlaneId, hit: Hit) {
        self.dut_hits.insert(plane, hit);
    }

    /// Attached DUT hits keyed by plane.
    #[inline]
    pub fn dut_hits(&self) -> &BTreeMap<PlaneId, Hit> {
        &self.dut_hits
    }
}

/// A matched pair of upstream and downstream triplets.
#[derive(Debug, Clone)]
pub struct Track {
    upstream: Triplet,
    downstream: Triplet,
}

impl Track {
    pub fn new(upstream: Triplet, downstream: Triplet) -> Self {
        Self {
            upstream,
            downstream,
        }
    }

    #[inline]
    pub fn upstream(&self) -> &Triplet {
        &self.upstream
    }

    #[inline]
    pub fn downstream(&self) -> &Triplet {
        &self.downstream
    }

    /// Slope change in x between the two arms (rad, small-angle).
    #[inline]
    pub fn kink_x(&self) -> f64 {
        self.downstream.slope().x - self.upstream.slope().x
    }

    /// Slope change in y between the two arms (rad, small-angle).
    #[inline]
    pub fn kink_y(&self) -> f64 {
        self.downstream.slope().y - self.upstream.slope().y
    }

    /// z of closest approach of the two segments, averaged over x and y.
    ///
    /// Falls back to the midpoint between the two bases when the arms are
    /// parallel in both projections.
    pub fn intersection_z(&self) -> f64 {
        let up = &self.upstream;
        let dn = &self.downstream;

        let mut acc = 0.0;
        let mut n = 0;
        for axis in 0..2 {
            let ds = dn.slope()[axis] - up.slope()[axis];
            if ds.abs() < 1e-12 {
                continue;
            }
            let xu = up.base()[axis] - up.slope()[axis] * up.base()[2];
            let xd = dn.base()[axis] - dn.slope()[axis] * dn.base()[2];
            acc += (xu - xd) / ds;
            n += 1;
        }

        if n == 0 {
            0.5 * (up.base()[2] + dn.base()[2])
        } else {
            acc / n as f64
        }
    }

    /// The measured hit on a plane, searching both arms and attached DUT hits.
    pub fn hit_on(&self, plane: PlaneId) -> Option<&Hit> {
        self.upstream
            .hit_on(plane)
            .or_else(|| self.downstream.hit_on(plane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_triplet(x0: f64, slope: f64, z: [f64; 3]) -> Triplet {
        let hit = |i: usize, zi: f64| Hit::new(PlaneId::new(i as u32), x0 + slope * zi, 0.0, zi);
        Triplet::new(
            hit(0, z[0]),
            hit(1, z[1]),
            hit(2, z[2]),
            TripletDirection::Upstream,
        )
    }

    #[test]
    fn test_base_and_slope_from_outer_hits() {
        let first = Hit::new(PlaneId::new(0), 0.0, 0.0, 0.0);
        // Deliberately off-line middle hit: must not affect base or slope.
        let middle = Hit::new(PlaneId::new(1), 5.0, 5.0, 150.0);
        let last = Hit::new(PlaneId::new(2), 0.1, 0.0, 300.0);

        let t = Triplet::new(first, middle, last, TripletDirection::Upstream);
        assert!((t.base()[0] - 0.05).abs() < 1e-12);
        assert!((t.base()[2] - 150.0).abs() < 1e-12);
        assert!((t.slope().x - 0.1 / 300.0).abs() < 1e-15);
        assert!(t.slope().y.abs() < 1e-15);
    }

    #[test]
    fn test_extrapolation_reproduces_outer_hits() {
        let t = straight_triplet(1.0, 0.002, [0.0, 150.0, 300.0]);

        assert!((t.x_at(0.0) - 1.0).abs() < 1e-12);
        assert!((t.x_at(300.0) - 1.6).abs() < 1e-12);
        // Linear in z in between
        assert!((t.x_at(75.0) - 1.15).abs() < 1e-12);
    }

    #[test]
    fn test_kink_and_intersection() {
        let up = straight_triplet(0.0, 0.001, [0.0, 150.0, 300.0]);
        let dn = straight_triplet(0.0, 0.002, [450.0, 600.0, 750.0]);

        let track = Track::new(up, dn);
        assert!((track.kink_x() - 0.001).abs() < 1e-12);
        // x_up(z) = 0.001 z, x_dn(z) = 0.002 z; both pass the origin.
        assert!(track.intersection_z().abs() < 1e-9);
    }

    #[test]
    fn test_residual_against_segment() {
        let t = straight_triplet(1.0, 0.002, [0.0, 150.0, 300.0]);

        // x_at(100) = 1.2, y_at(100) = 0.
        let r = t.residual_at(1.35, 0.1, 100.0);
        assert!((r.x - 0.15).abs() < 1e-12);
        assert!((r.y - 0.1).abs() < 1e-12);

        // A point on the segment has zero residual.
        let on = t.residual_at(t.x_at(220.0), t.y_at(220.0), 220.0);
        assert!(on.norm() < 1e-15);
    }

    #[test]
    fn test_dut_hit_lookup() {
        let mut t = straight_triplet(0.0, 0.0, [0.0, 150.0, 300.0]);
        assert!(t.hit_on(PlaneId::new(8)).is_none());

        t.attach_dut_hit(PlaneId::new(8), Hit::new(PlaneId::new(8), 0.0, 0.0, 350.0));
        assert!(t.hit_on(PlaneId::new(8)).is_some());
        assert!(t.hit_on(PlaneId::new(0)).is_some());
    }
}
