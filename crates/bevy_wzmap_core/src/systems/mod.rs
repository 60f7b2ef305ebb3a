//! ECS systems driving compilation.

pub mod compile;

pub use compile::{poll_map_compilation, start_map_compilation};
