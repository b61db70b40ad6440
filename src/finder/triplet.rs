//! Triplet finding
//!
//! Forms 3-hit straight-line segments across a fixed ordered triple of
//! planes. The outer hits define the candidate segment; the middle hit only
//! has to sit within the residual cut of the line through the outer two.

use crate::geometry::context::GeometryContext;
use crate::types::hit::HitSet;
use crate::types::plane_id::PlaneId;
use crate::types::triplet::{Triplet, TripletDirection};
use crate::Result;

/// Cuts applied during triplet formation (mm and rad, per axis).
#[derive(Debug, Clone, Copy)]
pub struct TripletCuts {
    /// Maximum middle-plane deviation from the outer-hit line, per axis (mm)
    pub residual: f64,
    /// Maximum |dx/dz| and |dy/dz| of the segment (rad)
    pub slope: f64,
}

impl TripletCuts {
    pub fn new(residual: f64, slope: f64) -> Self {
        Self { residual, slope }
    }
}

/// Finds all triplets across the ordered plane triple (first, middle, last).
///
/// Every (first, last) hit combination within the slope cut is tried
/// against every middle-plane hit. With `only_best` set, only the
/// minimum-residual middle hit survives per outer pair; otherwise every
/// passing combination is emitted and ambiguity resolution is left to the
/// isolation check during matching.
///
/// A plane with no hits simply yields no triplets.
pub fn find_triplets(
    ctx: &GeometryContext,
    hits: &HitSet,
    planes: [PlaneId; 3],
    cuts: TripletCuts,
    only_best: bool,
    direction: TripletDirection,
) -> Result<Vec<Triplet>> {
    let first_hits = hits.on_plane(ctx, planes[0])?;
    let middle_hits = hits.on_plane(ctx, planes[1])?;
    let last_hits = hits.on_plane(ctx, planes[2])?;

    let mut triplets = Vec::new();

    for first in first_hits {
        for last in last_hits {
            let dz = last.global.z() - first.global.z();
            if dz == 0.0 {
                continue;
            }
            let slope_x = (last.global.x() - first.global.x()) / dz;
            let slope_y = (last.global.y() - first.global.y()) / dz;
            if slope_x.abs() > cuts.slope || slope_y.abs() > cuts.slope {
                continue;
            }

            let mut best: Option<(f64, Triplet)> = None;
            for middle in middle_hits {
                let dz_mid = middle.global.z() - first.global.z();
                let res_x = middle.global.x() - (first.global.x() + slope_x * dz_mid);
                let res_y = middle.global.y() - (first.global.y() + slope_y * dz_mid);
                if res_x.abs() > cuts.residual || res_y.abs() > cuts.residual {
                    continue;
                }

                let triplet =
                    Triplet::new(first.clone(), middle.clone(), last.clone(), direction);
                if only_best {
                    let score = res_x * res_x + res_y * res_y;
                    match &best {
                        Some((best_score, _)) if *best_score <= score => {}
                        _ => best = Some((score, triplet)),
                    }
                } else {
                    triplets.push(triplet);
                }
            }

            if let Some((_, triplet)) = best {
                triplets.push(triplet);
            }
        }
    }

    tracing::debug!(
        n = triplets.len(),
        direction = %direction,
        "triplet finding done"
    );
    Ok(triplets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::plane::Plane;
    use crate::types::hit::Hit;

    fn ctx() -> GeometryContext {
        GeometryContext::new(vec![
            Plane::telescope_default(PlaneId::new(0), 0.0),
            Plane::telescope_default(PlaneId::new(1), 150.0),
            Plane::telescope_default(PlaneId::new(2), 300.0),
        ])
        .unwrap()
    }

    fn planes() -> [PlaneId; 3] {
        [PlaneId::new(0), PlaneId::new(1), PlaneId::new(2)]
    }

    #[test]
    fn test_single_clean_triplet() {
        // The end-to-end scenario: hits at x = 0, 0.05, 0.1 on three planes.
        let ctx = ctx();
        let hits = HitSet::from_hits(
            &ctx,
            vec![
                Hit::new(PlaneId::new(0), 0.0, 0.0, 0.0),
                Hit::new(PlaneId::new(1), 0.05, 0.0, 150.0),
                Hit::new(PlaneId::new(2), 0.1, 0.0, 300.0),
            ],
        )
        .unwrap();

        let triplets = find_triplets(
            &ctx,
            &hits,
            planes(),
            TripletCuts::new(0.2, 0.001),
            false,
            TripletDirection::Upstream,
        )
        .unwrap();

        assert_eq!(triplets.len(), 1);
        let t = &triplets[0];
        assert!((t.slope().x - 0.1 / 300.0).abs() < 1e-12);
        assert!((t.base()[0] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_slope_cut_rejects() {
        let ctx = ctx();
        let hits = HitSet::from_hits(
            &ctx,
            vec![
                Hit::new(PlaneId::new(0), 0.0, 0.0, 0.0),
                Hit::new(PlaneId::new(1), 2.5, 0.0, 150.0),
                Hit::new(PlaneId::new(2), 5.0, 0.0, 300.0),
            ],
        )
        .unwrap();

        // Slope is 5/300 ~ 17 mrad, above a 1 mrad cut.
        let triplets = find_triplets(
            &ctx,
            &hits,
            planes(),
            TripletCuts::new(0.2, 0.001),
            false,
            TripletDirection::Upstream,
        )
        .unwrap();
        assert!(triplets.is_empty());
    }

    #[test]
    fn test_residual_cut_rejects_middle() {
        let ctx = ctx();
        let hits = HitSet::from_hits(
            &ctx,
            vec![
                Hit::new(PlaneId::new(0), 0.0, 0.0, 0.0),
                Hit::new(PlaneId::new(1), 0.5, 0.0, 150.0),
                Hit::new(PlaneId::new(2), 0.0, 0.0, 300.0),
            ],
        )
        .unwrap();

        let triplets = find_triplets(
            &ctx,
            &hits,
            planes(),
            TripletCuts::new(0.2, 0.001),
            false,
            TripletDirection::Upstream,
        )
        .unwrap();
        assert!(triplets.is_empty());
    }

    #[test]
    fn test_empty_plane_yields_nothing() {
        let ctx = ctx();
        let hits = HitSet::from_hits(
            &ctx,
            vec![
                Hit::new(PlaneId::new(0), 0.0, 0.0, 0.0),
                Hit::new(PlaneId::new(2), 0.0, 0.0, 300.0),
            ],
        )
        .unwrap();

        let triplets = find_triplets(
            &ctx,
            &hits,
            planes(),
            TripletCuts::new(0.2, 0.001),
            false,
            TripletDirection::Upstream,
        )
        .unwrap();
        assert!(triplets.is_empty());
    }

    #[test]
    fn test_only_best_keeps_minimum_residual() {
        let ctx = ctx();
        let hits = HitSet::from_hits(
            &ctx,
            vec![
                Hit::new(PlaneId::new(0), 0.0, 0.0, 0.0),
                Hit::new(PlaneId::new(1), 0.08, 0.0, 150.0),
                Hit::new(PlaneId::new(1), 0.051, 0.0, 150.0),
                Hit::new(PlaneId::new(2), 0.1, 0.0, 300.0),
            ],
        )
        .unwrap();

        let all = find_triplets(
            &ctx,
            &hits,
            planes(),
            TripletCuts::new(0.2, 0.001),
            false,
            TripletDirection::Upstream,
        )
        .unwrap();
        assert_eq!(all.len(), 2);

        let best = find_triplets(
            &ctx,
            &hits,
            planes(),
            TripletCuts::new(0.2, 0.001),
            true,
            TripletDirection::Upstream,
        )
        .unwrap();
        assert_eq!(best.len(), 1);
        assert!((best[0].hits()[1].global.x() - 0.051).abs() < 1e-12);
    }
}
