//! One-shot map compilation.

use std::sync::Arc;

use bevy::prelude::*;
use bevy_wzmap_assets::prelude::{AssetSource, MapDocument, MapLoadError, MetadataResolver};

use crate::plugin::WzMapCoreConfig;
use crate::scene::{CompiledMap, compose};

/// Load `map_id` from `source` and compile it.
///
/// Each call uses its own metadata cache, so compilations never see each other's entries.
/// Fails only when the map document itself is missing or cannot be fetched.
pub async fn compile_map<S: AssetSource>(
    map_id: u32,
    source: Arc<S>,
    config: &WzMapCoreConfig,
) -> Result<CompiledMap, MapLoadError> {
    let document = MapDocument::load(map_id, &*source).await?;
    let resolver = MetadataResolver::new(source);
    let compiled = compose(&document, &resolver, config).await;

    info!(
        "Compiled map {}: {} images, {} ground chains, {} npcs, {} backgrounds ({} assets resolved)",
        map_id,
        compiled.render.images.len(),
        compiled.logical.footholds.len(),
        compiled.render.npcs.len(),
        compiled.render.backgrounds.len(),
        resolver.cache().len()
    );
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::tasks::block_on;
    use bevy_wzmap_assets::prelude::{MemorySource, map_document_path};
    use serde_json::json;

    fn source_with_map(map_id: u32) -> MemorySource {
        let mut source = MemorySource::default();
        source
            .insert_json(
                map_document_path(map_id),
                &json!({ "children": {
                    "info": { "children": { "bgm": { "data": "Bgm00/GoPicnic" } } },
                    "0": { "children": { "obj": { "children": { "0": { "children": {
                        "oS": { "data": "acc1" }, "l0": { "data": "grassySoil" },
                        "l1": { "data": "nature" }, "l2": { "data": 0 },
                        "x": { "data": 100 }, "y": { "data": 50 }
                    } } } } } }
                } }),
            )
            .unwrap();
        source
            .insert_json(
                "Map/Obj/acc1.img/grassySoil/nature/0/0",
                &json!({
                    "data": { "width": 20, "height": 30 },
                    "children": { "origin": { "data": { "x": 10, "y": 10 } } }
                }),
            )
            .unwrap();
        source
    }

    #[test]
    fn test_compile_map_end_to_end() {
        let source = Arc::new(source_with_map(100000000));
        let compiled =
            block_on(compile_map(100000000, source, &WzMapCoreConfig::default())).unwrap();

        assert_eq!(compiled.map_id(), 100000000);
        assert_eq!(
            compiled.logical.info.get("bgm").map(ToString::to_string),
            Some("Bgm00/GoPicnic".to_string())
        );
        assert_eq!(compiled.render.images[0].position, Vec2::new(90.0, 40.0));
        assert!(!compiled.render.images[0].flipped);
    }

    #[test]
    fn test_missing_map_fails() {
        let source = Arc::new(source_with_map(100000000));
        let err = block_on(compile_map(1, source, &WzMapCoreConfig::default())).unwrap_err();
        assert!(matches!(err, MapLoadError::NotFound { map_id: 1 }));
    }

    #[test]
    fn test_compilations_do_not_share_cache() {
        let source = Arc::new(source_with_map(100000000));
        let config = WzMapCoreConfig::default();

        block_on(compile_map(100000000, Arc::clone(&source), &config)).unwrap();
        block_on(compile_map(100000000, Arc::clone(&source), &config)).unwrap();

        // Document + one asset per compilation
        assert_eq!(source.requests(), 4);
    }
}
