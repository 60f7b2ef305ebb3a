//! Ground geometry: foothold chains, ray casts and chain matching.

pub mod footholds;
pub mod matcher;
pub mod ray;

pub use footholds::{GroundChain, GroundGeometry, GroundSegment, build_chains, dedup_contained_chains};
pub use matcher::contains_sequence;
pub use ray::{GroundHit, cast_down};
