use bevy::prelude::*;
use bevy::tasks::Task;
use bevy_wzmap_assets::prelude::MapLoadError;

use crate::scene::CompiledMap;

/// Marks an entity as a map to compile.
///
/// Inserting (or changing) this component starts a compilation. The result lands on
/// the same entity as a [`CompiledMap`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct WzMap {
    pub map_id: u32,
}

impl WzMap {
    pub fn new(map_id: u32) -> Self {
        Self { map_id }
    }
}

/// Marker component to trigger map recompilation.
///
/// Add this component to force the map to be compiled again even if it hasn't changed.
#[derive(Component, Debug, Default)]
pub struct RecompileWzMap;

/// Compilation in flight for a map entity.
///
/// Removed once the task finishes. Replacing or removing it drops (and cancels) the task.
#[derive(Component)]
pub struct PendingMapCompile {
    pub map_id: u32,
    pub(crate) task: Task<Result<CompiledMap, MapLoadError>>,
}
