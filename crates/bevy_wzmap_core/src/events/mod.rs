//! Map compilation events.
//!
//! Both are `EntityEvent`s targeting the map entity, so they can be observed globally
//! or on the entity itself.

use bevy::prelude::*;

/// Fired when a map finished compiling and its [`CompiledMap`](crate::scene::CompiledMap)
/// is in place.
///
/// # Example
///
/// ```ignore
/// commands.spawn(WzMap::new(100000000))
///     .observe(|trigger: On<MapCompiled>| {
///         info!("Map ready: {}", trigger.event().map_id);
///     });
/// ```
#[derive(EntityEvent, Debug, Clone)]
pub struct MapCompiled {
    /// The map entity
    #[event_target]
    pub entity: Entity,
    pub map_id: u32,
}

/// Fired when the map document could not be loaded.
#[derive(EntityEvent, Debug, Clone)]
pub struct MapCompileFailed {
    /// The map entity
    #[event_target]
    pub entity: Entity,
    pub map_id: u32,
    /// Human-readable cause
    pub reason: String,
}
