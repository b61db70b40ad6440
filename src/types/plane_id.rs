//! Plane identifiers
//!
//! Planes are identified by small integer IDs taken from the geometry
//! description. IDs are unique and their numeric order matches the z-order
//! of the planes along the beam axis.

use serde::{Deserialize, Serialize};

/// A unique identifier for a telescope plane.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlaneId(pub u32);

impl PlaneId {
    /// Creates a new plane identifier.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw integer value, as used in global alignment parameter labels.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PlaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PlaneId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
