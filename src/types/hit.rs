//! Measured hits and per-event hit storage
//!
//! Hits are produced by an upstream clustering stage and are immutable once
//! formed. The [`HitSet`] groups one event's hits per plane, using the
//! geometry context's dense plane index instead of maps keyed by plane ID.

use crate::geometry::context::GeometryContext;
use crate::types::frames::{GlobalPoint, LocalPoint};
use crate::types::plane_id::PlaneId;
use crate::Result;

/// A single measured position on one telescope plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Plane the hit was recorded on
    pub plane: PlaneId,
    /// Position in the global frame (mm)
    pub global: GlobalPoint,
    /// Per-axis position uncertainty (mm), if the clustering stage provides one
    pub sigma: Option<[f64; 2]>,
    /// Position in the sensor-local frame, if already computed upstream
    pub local: Option<LocalPoint>,
    /// Cluster extent in pixels along x and y
    pub cluster_size: Option<[u32; 2]>,
}

impl Hit {
    /// Creates a bare hit from a global position.
    pub fn new(plane: PlaneId, x: f64, y: f64, z: f64) -> Self {
        Self {
            plane,
            global: GlobalPoint::new(x, y, z),
            sigma: None,
            local: None,
            cluster_size: None,
        }
    }

    /// Attaches a per-axis uncertainty.
    pub fn with_sigma(mut self, sigma_x: f64, sigma_y: f64) -> Self {
        self.sigma = Some([sigma_x, sigma_y]);
        self
    }

    /// Attaches cluster-shape metadata.
    pub fn with_cluster_size(mut self, nx: u32, ny: u32) -> Self {
        self.cluster_size = Some([nx, ny]);
        self
    }
}

/// One event's hits, stored densely per plane.
///
/// Construction resolves every hit's plane ID through the geometry context
/// once; all later per-plane access is an indexed slice lookup.
#[derive(Debug, Clone, Default)]
pub struct HitSet {
    per_plane: Vec<Vec<Hit>>,
}

impl HitSet {
    /// Groups an event's hits by plane.
    ///
    /// Hits need not arrive sorted by plane. A hit on a plane the geometry
    /// does not know is a hard error: it indicates a geometry/data mismatch
    /// rather than a sparse event.
    pub fn from_hits(ctx: &GeometryContext, hits: Vec<Hit>) -> Result<Self> {
        let mut per_plane = vec![Vec::new(); ctx.n_planes()];
        for hit in hits {
            let idx = ctx.index_of(hit.plane)?;
            per_plane[idx].push(hit);
        }
        Ok(Self { per_plane })
    }

    /// Hits recorded on the given plane, empty slice if the plane saw none.
    pub fn on_plane(&self, ctx: &GeometryContext, plane: PlaneId) -> Result<&[Hit]> {
        Ok(&self.per_plane[ctx.index_of(plane)?])
    }

    /// Total number of hits across all planes.
    pub fn len(&self) -> usize {
        self.per_plane.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.per_plane.iter().all(Vec::is_empty)
    }
}
