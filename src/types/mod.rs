//! Core data types: coordinate frames, plane identifiers, hits, triplets and tracks.

pub mod frames;
pub mod plane_id;
pub mod hit;
pub mod triplet;

pub use frames::{GlobalPoint, GlobalVector, LocalPoint, LocalVector};
pub use plane_id::PlaneId;
pub use hit::{Hit, HitSet};
pub use triplet::{Track, Triplet, TripletDirection};
