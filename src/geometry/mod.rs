//! Telescope geometry: plane descriptions, coordinate transforms and
//! material-budget integration.

pub mod plane;
pub mod transform;
pub mod context;
pub mod material;

pub use context::GeometryContext;
pub use plane::{FlipMatrix, Plane};
