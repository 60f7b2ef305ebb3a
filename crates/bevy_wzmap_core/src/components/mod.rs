//! Components for map entities.

pub mod map;

pub use map::{PendingMapCompile, RecompileWzMap, WzMap};
