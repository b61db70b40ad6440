//! Trajectory assembly for the external General Broken Lines fitter:
//! transport Jacobians, measurement and scattering precision, and global
//! alignment derivatives.

pub mod point;
pub mod scatter;
pub mod alignment;
pub mod assembler;

pub use alignment::AlignmentMode;
pub use assembler::{accept_fit, AssemblerConfig, TrajectoryAssembler};
pub use point::{GlobalDerivatives, Measurement2D, Trajectory, TrajectoryPoint};
