//! Scene composition: places sprites, builds ground and snaps NPCs.

use bevy::prelude::*;
use bevy_wzmap_assets::prelude::{
    AssetMetadata, AssetSource, LayerSprite, MapDocument, MetadataResolver, SpawnKind,
    SpawnTemplate,
};
use futures::future::join_all;

use super::{BackgroundSprite, CompiledMap, LogicalScene, RenderEntity, RenderScene, SceneBounds, ZOrder};
use crate::geometry::{GroundSegment, build_chains, cast_down, dedup_contained_chains};
use crate::plugin::{LayerZConfig, WzMapCoreConfig};

/// Compile a loaded document into a scene.
///
/// Metadata lookups for all sprites are issued at once and joined; results keep document
/// order regardless of completion order. Unresolvable assets fall back to zeroed metadata,
/// so this never fails.
pub async fn compose<S: AssetSource>(
    document: &MapDocument,
    resolver: &MetadataResolver<S>,
    config: &WzMapCoreConfig,
) -> CompiledMap {
    let sprites: Vec<(u8, &LayerSprite)> = document
        .layers
        .iter()
        .enumerate()
        .flat_map(|(index, layer)| layer.sprites().map(move |sprite| (index as u8, sprite)))
        .collect();

    let metadata = join_all(
        sprites
            .iter()
            .map(|(_, sprite)| resolver.resolve(&sprite.path, sprite.kind.asset_kind())),
    )
    .await;

    let mut images: Vec<RenderEntity> = sprites
        .iter()
        .zip(metadata)
        .map(|(&(layer, sprite), meta)| place_sprite(layer, sprite, &meta, resolver.source()))
        .collect();
    assign_z(&mut images, &config.layer_z);

    let image_bounds = images
        .iter()
        .map(RenderEntity::bounds)
        .reduce(|acc, rect| acc.union(rect));

    let mut ground = build_chains(&document.footholds);
    if config.dedup_ground_chains {
        ground.chains = dedup_contained_chains(ground.chains);
    }

    let mut npcs = Vec::new();
    let mut monsters = Vec::new();
    for template in &document.spawn_templates {
        match &template.kind {
            SpawnKind::Npc => {
                let mut npc = template.clone();
                snap_to_ground(&mut npc, &ground.segments);
                npcs.push(npc);
            }
            SpawnKind::Monster => monsters.push(template.clone()),
            SpawnKind::Other(tag) => {
                debug!("Ignoring life entry of type '{}'", tag);
            }
        }
    }

    let background_metadata = join_all(
        document
            .backgrounds
            .iter()
            .map(|background| resolver.resolve(&background.path, background.asset_kind())),
    )
    .await;
    let backgrounds = document
        .backgrounds
        .iter()
        .zip(background_metadata)
        .map(|(background, meta)| BackgroundSprite {
            url: resolver
                .source()
                .image_url(&background.asset_kind().node_path(&background.path)),
            size: meta.size,
            origin: meta.origin,
            background: background.clone(),
        })
        .collect();

    let bounds = SceneBounds {
        images: image_bounds,
        ground: ground.extents,
    };

    CompiledMap {
        logical: LogicalScene {
            map_id: document.map_id,
            info: document.info.clone(),
            bounds,
            footholds: ground
                .chains
                .into_iter()
                .filter(|chain| chain.is_drawable())
                .collect(),
            ground_segments: ground.segments,
            portals: document.portals.clone(),
            ropes: document.ropes.clone(),
            monsters,
        },
        render: RenderScene {
            images,
            npcs,
            backgrounds,
            bounds,
        },
    }
}

/// Position a sprite from its placement and resolved metadata. `z` is assigned later.
fn place_sprite<S: AssetSource>(
    layer: u8,
    sprite: &LayerSprite,
    meta: &AssetMetadata,
    source: &S,
) -> RenderEntity {
    let mut position = sprite.position - meta.origin;
    if sprite.flipped {
        position.x = sprite.position.x + meta.origin.x - meta.size.x;
    }

    let depth = sprite
        .depth
        .filter(|depth| *depth != 0)
        .unwrap_or(meta.depth);

    RenderEntity {
        kind: sprite.kind,
        layer,
        path: sprite.path.clone(),
        url: source.image_url(&sprite.kind.asset_kind().node_path(&sprite.path)),
        position,
        size: meta.size,
        origin: meta.origin,
        depth,
        z_order: ZOrder {
            layer,
            kind: sprite.kind,
            depth,
        },
        z: 0.0,
        flipped: sprite.flipped,
    }
}

/// Number entities by their rank in draw order. Equal keys keep document order.
fn assign_z(images: &mut [RenderEntity], config: &LayerZConfig) {
    let mut ranking: Vec<usize> = (0..images.len()).collect();
    ranking.sort_by_key(|&index| images[index].z_order);

    for (rank, index) in ranking.into_iter().enumerate() {
        images[index].z = config.z_for(rank);
    }
}

/// Move `template` onto the ground right below it, if there is any.
fn snap_to_ground(template: &mut SpawnTemplate, segments: &[GroundSegment]) {
    if let Some(hit) = cast_down(template.position, segments) {
        template.position = hit.point;
        template.layer = Some(hit.layer);
    }
}
