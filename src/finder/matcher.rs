//! Triplet matching and isolation
//!
//! Pairs upstream and downstream triplets into track candidates by
//! extrapolating both arms to a common reference z and requiring positional
//! agreement, with an isolation requirement on each arm to suppress
//! ambiguous double-matches.

use crate::types::triplet::{Track, Triplet};

/// Safety margin added on top of twice the match cut (mm).
const ISOLATION_MARGIN_MM: f64 = 0.05;

/// The conventional isolation cut for a given match cut: twice the match
/// window plus a small safety margin, so two tracks that could both fall
/// inside one match window are never both accepted.
pub fn isolation_cut_for(match_cut: f64) -> f64 {
    2.0 * match_cut + ISOLATION_MARGIN_MM
}

/// Whether the triplet at `index` is isolated within its own collection.
///
/// Isolated means the minimum distance at `z_match` between this triplet's
/// extrapolation and every other triplet's extrapolation exceeds
/// `isolation_cut`. A triplet alone in its collection is vacuously isolated.
pub fn is_triplet_isolated(
    index: usize,
    triplets: &[Triplet],
    z_match: f64,
    isolation_cut: f64,
) -> bool {
    let own = triplets[index].extrapolate(z_match);

    let mut min_distance = f64::INFINITY;
    for (i, other) in triplets.iter().enumerate() {
        if i == index {
            continue;
        }
        let d = (other.extrapolate(z_match) - own).norm();
        if d < min_distance {
            min_distance = d;
        }
    }

    min_distance > isolation_cut
}

/// Matches upstream against downstream triplets at `z_match`.
///
/// A pair becomes a track when |dx| and |dy| at `z_match` are both within
/// `match_cut` and both arms are isolated within their own collections.
/// Every passing combination is emitted; duplicate candidates are expected
/// to be filtered later by a fit-quality cut, not here.
pub fn match_triplets(
    upstream: &[Triplet],
    downstream: &[Triplet],
    z_match: f64,
    match_cut: f64,
    isolation_cut: f64,
) -> Vec<Track> {
    let mut tracks = Vec::new();

    for (i, up) in upstream.iter().enumerate() {
        let up_pos = up.extrapolate(z_match);
        for (j, down) in downstream.iter().enumerate() {
            let delta = down.extrapolate(z_match) - up_pos;
            if delta.x.abs() > match_cut || delta.y.abs() > match_cut {
                continue;
            }
            if !is_triplet_isolated(i, upstream, z_match, isolation_cut)
                || !is_triplet_isolated(j, downstream, z_match, isolation_cut)
            {
                continue;
            }
            tracks.push(Track::new(up.clone(), down.clone()));
        }
    }

    tracing::debug!(
        n_up = upstream.len(),
        n_down = downstream.len(),
        n_tracks = tracks.len(),
        "triplet matching done"
    );
    tracks
}
