//! Tritrack: triplet-based track reconstruction for pixel beam telescopes
//!
//! Reconstructs straight-line particle trajectories from pixel hits recorded
//! by a multi-plane telescope, and assembles the transport/measurement/scatter
//! point lists consumed by an external General Broken Lines (GBL) fitter.
//!
//! # Features
//!
//! - **Typed Frames**: local and global coordinates encoded in the type system,
//!   so a local point can never be fed where a global one is expected
//! - **Explicit Geometry Context**: per-plane transforms, cached axis vectors
//!   and material-budget integration behind one owned object
//! - **Triplet Engine**: combinatorial triplet finding, isolation, matching,
//!   DUT association and per-plane efficiency estimation
//! - **Configured Driver**: one validated [`config::ReconstructionConfig`]
//!   steers the whole chain through [`reconstructor::Reconstructor`]

pub mod types;
pub mod geometry;
pub mod finder;
pub mod gbl;
pub mod config;
pub mod reconstructor;

pub mod prelude {
    pub use crate::types::frames::*;
    pub use crate::types::hit::*;
    pub use crate::types::plane_id::PlaneId;
    pub use crate::types::triplet::*;
    pub use crate::geometry::context::GeometryContext;
    pub use crate::geometry::plane::*;
    pub use crate::finder::dut::attach_dut;
    pub use crate::finder::efficiency::{estimate_efficiency, EfficiencyEstimate};
    pub use crate::finder::matcher::{is_triplet_isolated, isolation_cut_for, match_triplets};
    pub use crate::finder::triplet::{find_triplets, TripletCuts};
    pub use crate::gbl::assembler::{AssemblerConfig, TrajectoryAssembler};
    pub use crate::gbl::alignment::AlignmentMode;
    pub use crate::gbl::point::{Trajectory, TrajectoryPoint};
    pub use crate::config::ReconstructionConfig;
    pub use crate::reconstructor::{ReconstructedTrack, Reconstructor};
}

use crate::types::plane_id::PlaneId;

/// Error types for the library
#[derive(Debug, Clone, PartialEq)]
pub enum RecoError {
    /// A plane ID was looked up that the geometry does not contain
    PlaneNotFound(PlaneId),
    /// The geometry description is structurally broken (duplicate IDs, no planes)
    InvalidGeometry(String),
    /// A plane's reflection matrix has a determinant outside {+1, -1}
    InvalidFlipMatrix { plane: PlaneId, det: i32 },
    /// The composed flip/rotation transform of a plane is not invertible
    NonInvertibleTransform(PlaneId),
    /// The reconstruction configuration is inconsistent with the geometry
    InvalidConfig(String),
}

impl std::error::Error for RecoError {}

impl std::fmt::Display for RecoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoError::PlaneNotFound(id) => write!(f, "plane {} not found in geometry", id),
            RecoError::InvalidGeometry(msg) => write!(f, "invalid geometry: {}", msg),
            RecoError::InvalidFlipMatrix { plane, det } => {
                write!(
                    f,
                    "plane {}: flip matrix determinant {} not in {{+1, -1}}",
                    plane, det
                )
            }
            RecoError::NonInvertibleTransform(id) => {
                write!(f, "plane {}: flip/rotation composition is not invertible", id)
            }
            RecoError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecoError>;
