//! # bevy_wzmap
//!
//! MapleStory map compilation for Bevy.
//!
//! This is a unified meta-crate that combines the `bevy_wzmap_*` sub-crates behind a
//! single plugin and prelude.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_wzmap::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(BevyWzMapPlugin::default())
//!         .add_systems(Startup, spawn_map)
//!         .run();
//! }
//!
//! fn spawn_map(mut commands: Commands) {
//!     commands.spawn(WzMap::new(100000000));
//! }
//! ```
//!
//! ## Features
//!
//! - **http** (default): fetch map data from a running asset backend with [`HttpSource`]
//!
//! ## Architecture
//!
//! - **Layer 1** ([`assets`]): backend access, map documents, asset metadata
//! - **Layer 2** ([`core`]): ground geometry, scene composition, ECS integration
//!
//! ## Without an ECS
//!
//! Compilation is a plain async function and can run on any executor:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bevy::tasks::block_on;
//! use bevy_wzmap::prelude::*;
//!
//! let source = Arc::new(HttpSource::new(SourceConfig::new("http://localhost:12258")));
//! let compiled = block_on(compile_map(100000000, source, &WzMapCoreConfig::default()));
//! ```
//!
//! [`HttpSource`]: bevy_wzmap_assets::http::HttpSource

#[cfg(feature = "http")]
pub mod plugin;

// Re-export sub-crates for advanced usage
pub use bevy_wzmap_assets as assets;
pub use bevy_wzmap_core as core;

/// Unified prelude for bevy_wzmap
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_wzmap::prelude::*;
///
/// fn list_npcs(maps: Query<&CompiledMap>) {
///     for map in &maps {
///         for npc in &map.render.npcs {
///             info!("{:?} at {}", npc.template_id, npc.position);
///         }
///     }
/// }
/// ```
pub mod prelude {
    pub use crate::assets::prelude::*;
    pub use crate::core::prelude::*;

    // Unified plugin
    #[cfg(feature = "http")]
    pub use crate::plugin::BevyWzMapPlugin;
}
