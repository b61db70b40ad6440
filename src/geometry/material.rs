//! Material-budget integration along straight paths
//!
//! Approximates the telescope as sensor slabs separated by air and
//! accumulates path-length over radiation length by walking the slab
//! boundaries crossed by the segment. Degenerate (zero-length) steps at
//! coincident boundaries are resolved by nudging the walk cursor forward
//! by a small epsilon, with a bounded retry count.

use crate::geometry::context::GeometryContext;
use crate::types::frames::GlobalPoint;

/// Radiation length of dry air (mm).
pub const X0_AIR_MM: f64 = 303_900.0;

/// Cursor nudge applied when a step degenerates (mm).
const NUDGE_EPS_MM: f64 = 1e-6;

/// Retries before giving up on a degenerate boundary walk.
const MAX_NUDGES: u32 = 10;

impl GeometryContext {
    /// Integrates traversed radiation length along the straight segment
    /// from `a` to `b`, in units of X0.
    ///
    /// Best-effort on pathological boundary configurations: when the nudge
    /// retry budget is exhausted a warning is emitted and the budget
    /// accumulated so far is returned.
    pub fn radiation_length_between(&self, a: GlobalPoint, b: GlobalPoint) -> f64 {
        let dir = *b.as_vector3() - *a.as_vector3();
        let total = dir.norm();
        if total == 0.0 {
            return 0.0;
        }
        let unit = dir / total;

        // A path (numerically) parallel to the planes never crosses a slab
        // boundary: the whole segment lies in the medium at its start z.
        if unit.z.abs() < 1e-12 {
            return total / self.x0_at(a.z());
        }

        // Path parameters at which the segment crosses a slab face.
        let mut boundaries: Vec<f64> = Vec::new();
        for plane in self.planes() {
            let zc = plane.position[2];
            let half = 0.5 * plane.thickness;
            for edge in [zc - half, zc + half] {
                let s = (edge - a.z()) / unit.z;
                if s > 0.0 && s < total {
                    boundaries.push(s);
                }
            }
        }
        boundaries.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
        boundaries.push(total);

        let mut accumulated = 0.0;
        let mut cursor = 0.0;
        let mut nudges = 0;

        for &stop in &boundaries {
            let step = stop - cursor;
            if step <= 0.0 {
                nudges += 1;
                if nudges > MAX_NUDGES {
                    tracing::warn!(
                        from = ?a.as_vector3().as_slice(),
                        to = ?b.as_vector3().as_slice(),
                        "material walk stuck on coincident boundaries, returning partial budget"
                    );
                    return accumulated;
                }
                cursor += NUDGE_EPS_MM;
                continue;
            }

            // Classify the step by its midpoint.
            let mid_z = a.z() + unit.z * (cursor + 0.5 * step);
            accumulated += step / self.x0_at(mid_z);
            cursor = stop;
        }

        accumulated
    }

    /// Radiation length of the medium at a global z: a sensor slab if z is
    /// inside one, air otherwise.
    fn x0_at(&self, z: f64) -> f64 {
        for plane in self.planes() {
            let half = 0.5 * plane.thickness;
            if (z - plane.position[2]).abs() <= half {
                return plane.radiation_length;
            }
        }
        X0_AIR_MM
    }
}
