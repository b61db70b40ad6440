//! The geometry context
//!
//! Owns every plane description, the dense plane-ID index, and the memoized
//! per-plane transform state (rotation matrices, axis vectors). Constructed
//! once from a loaded geometry and passed by reference to every component;
//! alignment updates mutate a plane and rebuild its cached state
//! synchronously.

use std::collections::HashMap;

use nalgebra::{Matrix3, Vector3};

use crate::geometry::plane::Plane;
use crate::geometry::transform::plane_linear_map;
use crate::types::frames::{GlobalPoint, GlobalVector, LocalPoint, LocalVector};
use crate::types::plane_id::PlaneId;
use crate::{RecoError, Result};

/// Memoized per-plane transform state, rebuilt whenever the plane moves.
#[derive(Debug, Clone)]
struct PlaneCache {
    /// Local-to-global linear map (rotations * flip)
    forward: Matrix3<f64>,
    /// Global-to-local linear map
    inverse: Matrix3<f64>,
    /// Plane normal (local z axis) in the global frame
    normal: Vector3<f64>,
    /// Local x axis in the global frame
    x_axis: Vector3<f64>,
    /// Local y axis in the global frame
    y_axis: Vector3<f64>,
}

impl PlaneCache {
    fn build(plane: &Plane) -> Result<Self> {
        let forward = plane_linear_map(plane);
        let inverse = forward
            .try_inverse()
            .ok_or(RecoError::NonInvertibleTransform(plane.id))?;

        Ok(Self {
            forward,
            inverse,
            normal: forward * Vector3::z(),
            x_axis: forward * Vector3::x(),
            y_axis: forward * Vector3::y(),
        })
    }
}

/// Owned telescope geometry with cached per-plane transforms.
#[derive(Debug, Clone)]
pub struct GeometryContext {
    /// Planes sorted by z position; this order is fixed for the run
    planes: Vec<Plane>,
    /// Plane ID to dense index, built once
    index: HashMap<PlaneId, usize>,
    /// One cache entry per plane, same order as `planes`
    cache: Vec<PlaneCache>,
}

impl GeometryContext {
    /// Builds a context from a loaded geometry description.
    ///
    /// Fails on an empty plane list, duplicate IDs, or any flip matrix with
    /// determinant outside {+1, -1}. Planes are sorted by z; the resulting
    /// order never changes during a run.
    pub fn new(mut planes: Vec<Plane>) -> Result<Self> {
        if planes.is_empty() {
            return Err(RecoError::InvalidGeometry("no planes defined".into()));
        }
        for plane in &planes {
            plane.flip.validate(plane.id)?;
        }

        planes.sort_by(|a, b| {
            a.position[2]
                .partial_cmp(&b.position[2])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut index = HashMap::with_capacity(planes.len());
        for (i, plane) in planes.iter().enumerate() {
            if index.insert(plane.id, i).is_some() {
                return Err(RecoError::InvalidGeometry(format!(
                    "duplicate plane id {}",
                    plane.id
                )));
            }
        }

        let cache = planes
            .iter()
            .map(PlaneCache::build)
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(n_planes = planes.len(), "geometry context initialized");
        Ok(Self {
            planes,
            index,
            cache,
        })
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Dense index of a plane, usable for per-plane arrays.
    pub fn index_of(&self, id: PlaneId) -> Result<usize> {
        self.index
            .get(&id)
            .copied()
            .ok_or(RecoError::PlaneNotFound(id))
    }

    /// The plane description for an ID.
    pub fn plane(&self, id: PlaneId) -> Result<&Plane> {
        Ok(&self.planes[self.index_of(id)?])
    }

    /// All planes in z-order.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn n_planes(&self) -> usize {
        self.planes.len()
    }

    // ------------------------------------------------------------------
    // Simple accessors
    // ------------------------------------------------------------------

    /// Plane center in the global frame (mm).
    pub fn plane_position(&self, id: PlaneId) -> Result<GlobalPoint> {
        let p = self.plane(id)?;
        Ok(GlobalPoint::new(p.position[0], p.position[1], p.position[2]))
    }

    /// Rotation angles in degrees, in Z/X/Y application order.
    pub fn plane_rotation_deg(&self, id: PlaneId) -> Result<[f64; 3]> {
        Ok(self.plane(id)?.rotation_deg)
    }

    /// Rotation angles in radians, in Z/X/Y application order.
    pub fn plane_rotation_rad(&self, id: PlaneId) -> Result<[f64; 3]> {
        let deg = self.plane_rotation_deg(id)?;
        Ok([
            deg[0].to_radians(),
            deg[1].to_radians(),
            deg[2].to_radians(),
        ])
    }

    /// Sensor radiation length X0 (mm).
    pub fn plane_radiation_length(&self, id: PlaneId) -> Result<f64> {
        Ok(self.plane(id)?.radiation_length)
    }

    /// Sensor thickness along its normal (mm).
    pub fn plane_z_size(&self, id: PlaneId) -> Result<f64> {
        Ok(self.plane(id)?.thickness)
    }

    /// Intrinsic resolution per axis (mm).
    pub fn plane_resolution(&self, id: PlaneId) -> Result<[f64; 2]> {
        Ok(self.plane(id)?.resolution)
    }

    /// Unit normal of the plane in the global frame (cached).
    pub fn plane_normal(&self, id: PlaneId) -> Result<GlobalVector> {
        Ok(GlobalVector::from_vector3(self.cache[self.index_of(id)?].normal))
    }

    /// Local x axis in the global frame (cached).
    pub fn plane_x_axis(&self, id: PlaneId) -> Result<GlobalVector> {
        Ok(GlobalVector::from_vector3(self.cache[self.index_of(id)?].x_axis))
    }

    /// Local y axis in the global frame (cached).
    pub fn plane_y_axis(&self, id: PlaneId) -> Result<GlobalVector> {
        Ok(GlobalVector::from_vector3(self.cache[self.index_of(id)?].y_axis))
    }

    // ------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------

    /// Transforms a sensor-local position to the global frame.
    pub fn local_to_global(&self, id: PlaneId, local: LocalPoint) -> Result<GlobalPoint> {
        let idx = self.index_of(id)?;
        let rotated = self.cache[idx].forward * local.as_vector3();
        Ok(GlobalPoint::from_vector3(
            rotated + self.planes[idx].position_vector(),
        ))
    }

    /// Transforms a global position into a plane's local frame.
    pub fn global_to_local(&self, id: PlaneId, global: GlobalPoint) -> Result<LocalPoint> {
        let idx = self.index_of(id)?;
        let shifted = global.as_vector3() - self.planes[idx].position_vector();
        Ok(LocalPoint::from_vector3(self.cache[idx].inverse * shifted))
    }

    /// Rotates a local displacement into the global frame (no translation).
    pub fn local_to_global_vec(&self, id: PlaneId, local: LocalVector) -> Result<GlobalVector> {
        let idx = self.index_of(id)?;
        Ok(GlobalVector::from_vector3(
            self.cache[idx].forward * local.as_vector3(),
        ))
    }

    /// Rotates a global displacement into a plane's local frame.
    pub fn global_to_local_vec(&self, id: PlaneId, global: GlobalVector) -> Result<LocalVector> {
        let idx = self.index_of(id)?;
        Ok(LocalVector::from_vector3(
            self.cache[idx].inverse * global.as_vector3(),
        ))
    }

    // ------------------------------------------------------------------
    // Alignment updates
    // ------------------------------------------------------------------

    /// Shifts a plane by a global displacement and rebuilds its cache.
    ///
    /// Alignment corrections are small; the caller must not move a plane
    /// past its neighbours, since the z-order is fixed for the run.
    pub fn move_plane(&mut self, id: PlaneId, delta: GlobalVector) -> Result<()> {
        let idx = self.index_of(id)?;
        self.planes[idx].position[0] += delta.x();
        self.planes[idx].position[1] += delta.y();
        self.planes[idx].position[2] += delta.z();
        debug_assert!(self.z_order_intact(), "alignment shift broke plane z-order");
        self.cache[idx] = PlaneCache::build(&self.planes[idx])?;
        tracing::debug!(plane = %id, "plane moved, transform cache rebuilt");
        Ok(())
    }

    /// Adds rotation corrections (degrees, Z/X/Y order) and rebuilds the cache.
    pub fn rotate_plane(&mut self, id: PlaneId, delta_deg: [f64; 3]) -> Result<()> {
        let idx = self.index_of(id)?;
        for axis in 0..3 {
            self.planes[idx].rotation_deg[axis] += delta_deg[axis];
        }
        self.cache[idx] = PlaneCache::build(&self.planes[idx])?;
        tracing::debug!(plane = %id, "plane rotated, transform cache rebuilt");
        Ok(())
    }

    fn z_order_intact(&self) -> bool {
        self.planes
            .windows(2)
            .all(|w| w[0].position[2] <= w[1].position[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::plane::FlipMatrix;

    fn three_plane_ctx() -> GeometryContext {
        GeometryContext::new(vec![
            Plane::telescope_default(PlaneId::new(0), 0.0),
            Plane::telescope_default(PlaneId::new(1), 150.0).with_rotation_deg(30.0, 10.0, -5.0),
            Plane::telescope_default(PlaneId::new(2), 300.0)
                .with_flip(FlipMatrix::new(0, 1, 1, 0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = GeometryContext::new(vec![
            Plane::telescope_default(PlaneId::new(0), 0.0),
            Plane::telescope_default(PlaneId::new(0), 100.0),
        ])
        .unwrap_err();
        assert!(matches!(err, RecoError::InvalidGeometry(_)));
    }

    #[test]
    fn test_bad_flip_fails_at_load() {
        let err = GeometryContext::new(vec![Plane::telescope_default(PlaneId::new(0), 0.0)
            .with_flip(FlipMatrix::new(1, 0, 0, 0))])
        .unwrap_err();
        assert!(matches!(err, RecoError::InvalidFlipMatrix { .. }));
    }

    #[test]
    fn test_unknown_plane_lookup() {
        let ctx = three_plane_ctx();
        assert_eq!(
            ctx.plane_position(PlaneId::new(9)).unwrap_err(),
            RecoError::PlaneNotFound(PlaneId::new(9))
        );
    }

    #[test]
    fn test_planes_sorted_by_z() {
        let ctx = GeometryContext::new(vec![
            Plane::telescope_default(PlaneId::new(2), 300.0),
            Plane::telescope_default(PlaneId::new(0), 0.0),
            Plane::telescope_default(PlaneId::new(1), 150.0),
        ])
        .unwrap();

        let zs: Vec<f64> = ctx.planes().iter().map(|p| p.position[2]).collect();
        assert_eq!(zs, vec![0.0, 150.0, 300.0]);
        assert_eq!(ctx.index_of(PlaneId::new(0)).unwrap(), 0);
        assert_eq!(ctx.index_of(PlaneId::new(2)).unwrap(), 2);
    }

    #[test]
    fn test_round_trip_all_planes() {
        let ctx = three_plane_ctx();
        let samples = [
            LocalPoint::new(0.0, 0.0, 0.0),
            LocalPoint::new(1.2, -3.4, 0.0),
            LocalPoint::new(-5.0, 2.5, 0.1),
        ];

        for plane in ctx.planes() {
            for &local in &samples {
                let global = ctx.local_to_global(plane.id, local).unwrap();
                let back = ctx.global_to_local(plane.id, global).unwrap();
                assert!((back.x() - local.x()).abs() < 1e-10);
                assert!((back.y() - local.y()).abs() < 1e-10);
                assert!((back.z() - local.z()).abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_unrotated_plane_axes() {
        let ctx = three_plane_ctx();
        let n = ctx.plane_normal(PlaneId::new(0)).unwrap();
        assert!((n.z() - 1.0).abs() < 1e-12);

        let x = ctx.plane_x_axis(PlaneId::new(0)).unwrap();
        assert!((x.x() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_swap_flip_exchanges_axes() {
        let ctx = three_plane_ctx();
        // Plane 2 carries the (0 1; 1 0) flip: local x maps to global y.
        let x = ctx.plane_x_axis(PlaneId::new(2)).unwrap();
        assert!((x.y() - 1.0).abs() < 1e-12);
        assert!(x.x().abs() < 1e-12);
    }

    #[test]
    fn test_cache_invalidation_on_move() {
        let mut ctx = three_plane_ctx();
        let before = ctx.plane_position(PlaneId::new(1)).unwrap();

        ctx.move_plane(PlaneId::new(1), GlobalVector::new(0.5, -0.25, 0.0))
            .unwrap();
        let after = ctx.plane_position(PlaneId::new(1)).unwrap();
        assert!((after.x() - before.x() - 0.5).abs() < 1e-12);

        // Transform must use the updated position.
        let origin = ctx
            .local_to_global(PlaneId::new(1), LocalPoint::new(0.0, 0.0, 0.0))
            .unwrap();
        assert!((origin.x() - after.x()).abs() < 1e-12);
    }

    #[test]
    fn test_cache_invalidation_on_rotate() {
        let mut ctx = GeometryContext::new(vec![Plane::telescope_default(PlaneId::new(0), 0.0)])
            .unwrap();
        ctx.rotate_plane(PlaneId::new(0), [90.0, 0.0, 0.0]).unwrap();

        let x = ctx.plane_x_axis(PlaneId::new(0)).unwrap();
        assert!(x.x().abs() < 1e-12);
        assert!((x.y() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_vector_transform_ignores_translation() {
        let ctx = three_plane_ctx();
        let v = ctx
            .local_to_global_vec(PlaneId::new(0), LocalVector::new(1.0, 0.0, 0.0))
            .unwrap();
        // Plane 0 sits at z = 0 with no rotation: displacement is unchanged.
        assert!((v.x() - 1.0).abs() < 1e-12);
        assert!(v.z().abs() < 1e-12);
    }
}
