pub mod map;
pub mod metadata;
