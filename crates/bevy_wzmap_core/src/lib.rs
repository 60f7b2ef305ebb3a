//! # `bevy_wzmap_core`
//!
//! Scene compilation backbone for `bevy_wzmap`. Turns a map document fetched through
//! `bevy_wzmap_assets` into a flat scene: placed sprites with a total draw order,
//! ground polylines, NPCs snapped onto the ground, and resolved backgrounds.
//!
//! **This crate does NOT decode images or render** - the compiled scene carries image
//! URLs and geometry for whatever draws it.
//!
//! ## Architecture
//!
//! Layer 2 (this crate) sits on top of:
//! - **Layer 1** (`bevy_wzmap_assets`): backend access, map documents, asset metadata
//!
//! ## What Layer 2 Provides
//!
//! 1. **Geometry**: foothold chains, downward ray casts, chain matching
//! 2. **Composition**: [`compile_map`](compile::compile_map), usable without an ECS
//! 3. **ECS integration**: `WzMap` component, `CompiledMap` result, compile events
//! 4. **Debug drawing**: ground gizmos behind `DebugGroundChains`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_wzmap_assets::prelude::*;
//! use bevy_wzmap_core::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(WzAssetsPlugin::new(MemorySource::default()))
//!         .add_plugins(WzMapCorePlugin::<MemorySource>::default())
//!         .add_systems(Startup, spawn_map)
//!         .add_observer(|trigger: On<MapCompiled>| {
//!             info!("Map {} compiled", trigger.event().map_id);
//!         })
//!         .run();
//! }
//!
//! fn spawn_map(mut commands: Commands) {
//!     commands.spawn(WzMap::new(100000000));
//! }
//! ```

pub mod compile;
pub mod components;
pub mod debug;
pub mod events;
pub mod geometry;
pub mod plugin;
pub mod scene;
pub mod systems;

pub mod prelude {
    //! Common imports for `bevy_wzmap_core` users.

    pub use crate::compile::compile_map;
    pub use crate::components::{RecompileWzMap, WzMap};
    pub use crate::debug::DebugGroundChains;
    pub use crate::events::{MapCompileFailed, MapCompiled};
    pub use crate::geometry::{
        GroundChain, GroundGeometry, GroundHit, GroundSegment, build_chains, cast_down,
        contains_sequence,
    };
    pub use crate::plugin::{LayerZConfig, WzMapCoreConfig, WzMapCorePlugin};
    pub use crate::scene::{
        BackgroundSprite, CompiledMap, LogicalScene, RenderEntity, RenderScene, SceneBounds,
        ZOrder,
    };
}

// Re-export plugin types at crate root for convenience
pub use plugin::{LayerZConfig, WzMapCoreConfig, WzMapCorePlugin};
