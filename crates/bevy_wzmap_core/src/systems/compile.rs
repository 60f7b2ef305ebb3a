//! Reactive compilation systems.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, TaskPool, block_on, futures_lite::future};
use bevy_wzmap_assets::prelude::{AssetSource, WzAssetSource};

use crate::compile::compile_map;
use crate::components::{PendingMapCompile, RecompileWzMap, WzMap};
use crate::events::{MapCompileFailed, MapCompiled};
use crate::plugin::WzMapCoreConfig;

/// Starts a compilation task for every new, changed or recompile-marked [`WzMap`].
///
/// Runs in `PreUpdate` before user systems.
///
/// # Triggers
///
/// - `Changed<WzMap>` - When the map component is added or its id changes
/// - `With<RecompileWzMap>` - When manual recompilation is requested
pub fn start_map_compilation<S: AssetSource>(
    source: Res<WzAssetSource<S>>,
    config: Res<WzMapCoreConfig>,
    mut commands: Commands,
    map_query: Query<(Entity, &WzMap), Or<(Changed<WzMap>, With<RecompileWzMap>)>>,
) {
    let pool = AsyncComputeTaskPool::get_or_init(TaskPool::new);

    for (map_entity, map) in &map_query {
        info!("Compiling map {} for entity {:?}", map.map_id, map_entity);

        let map_id = map.map_id;
        let source = Arc::clone(&source.0);
        let config = config.clone();
        let task = pool.spawn(async move { compile_map(map_id, source, &config).await });

        commands
            .entity(map_entity)
            .insert(PendingMapCompile { map_id, task })
            .remove::<RecompileWzMap>();
    }
}

/// Collects finished compilations.
///
/// On success the [`CompiledMap`](crate::scene::CompiledMap) is inserted and
/// [`MapCompiled`] is triggered; on failure [`MapCompileFailed`] is triggered instead.
pub fn poll_map_compilation(
    mut commands: Commands,
    mut pending_query: Query<(Entity, &mut PendingMapCompile)>,
) {
    for (map_entity, mut pending) in &mut pending_query {
        let Some(result) = block_on(future::poll_once(&mut pending.task)) else {
            continue;
        };
        let map_id = pending.map_id;

        let mut map_commands = commands.entity(map_entity);
        map_commands.remove::<PendingMapCompile>();

        match result {
            Ok(compiled) => {
                map_commands.insert((Name::new(format!("Map: {map_id}")), compiled));
                map_commands.trigger(|entity| MapCompiled { entity, map_id });
            }
            Err(e) => {
                error!("Failed to compile map {}: {}", map_id, e);
                let reason = e.to_string();
                map_commands.trigger(|entity| MapCompileFailed {
                    entity,
                    map_id,
                    reason,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::scene::CompiledMap;
    use bevy_wzmap_assets::prelude::{MemorySource, WzAssetsPlugin, map_document_path};
    use serde_json::json;

    #[derive(Resource, Default)]
    struct Outcomes {
        compiled: Vec<u32>,
        failed: Vec<u32>,
    }

    fn app(source: MemorySource) -> App {
        let mut app = App::new();
        app.add_plugins(WzAssetsPlugin::new(source))
            .init_resource::<WzMapCoreConfig>()
            .init_resource::<Outcomes>()
            .add_systems(
                Update,
                (start_map_compilation::<MemorySource>, poll_map_compilation).chain(),
            )
            .add_observer(|trigger: On<MapCompiled>, mut outcomes: ResMut<Outcomes>| {
                outcomes.compiled.push(trigger.event().map_id);
            })
            .add_observer(|trigger: On<MapCompileFailed>, mut outcomes: ResMut<Outcomes>| {
                outcomes.failed.push(trigger.event().map_id);
            });
        app
    }

    fn run_until_idle(app: &mut App) {
        for _ in 0..500 {
            app.update();
            let mut pending = app.world_mut().query::<&PendingMapCompile>();
            if pending.iter(app.world()).next().is_none() {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("compilation did not finish");
    }

    #[test]
    fn test_compiles_spawned_map() {
        let mut source = MemorySource::default();
        source
            .insert_json(
                map_document_path(100000000),
                &json!({ "children": { "info": { "children": { "town": { "data": 1 } } } } }),
            )
            .unwrap();

        let mut app = app(source);
        let entity = app.world_mut().spawn(WzMap::new(100000000)).id();
        run_until_idle(&mut app);

        let compiled = app.world().get::<CompiledMap>(entity).unwrap();
        assert_eq!(compiled.map_id(), 100000000);
        assert_eq!(app.world().resource::<Outcomes>().compiled, vec![100000000]);
        assert!(app.world().get::<RecompileWzMap>(entity).is_none());
    }

    #[test]
    fn test_missing_map_reports_failure() {
        let mut app = app(MemorySource::default());
        let entity = app.world_mut().spawn(WzMap::new(7)).id();
        run_until_idle(&mut app);

        assert!(app.world().get::<CompiledMap>(entity).is_none());
        let outcomes = app.world().resource::<Outcomes>();
        assert_eq!(outcomes.failed, vec![7]);
        assert!(outcomes.compiled.is_empty());
    }
}
