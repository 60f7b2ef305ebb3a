use bevy::prelude::*;
use thiserror::Error;

use crate::assets::map::{
    Background, Foothold, LayerSprite, MapDocument, MapLayer, Portal, PortalTarget,
    Rope, SpawnKind, SpawnTemplate, SpriteKind,
};
use crate::node::DataNode;
use crate::source::{AssetSource, SourceError, map_document_path};

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("Map {map_id} has no document")]
    NotFound { map_id: u32 },

    #[error("Failed to fetch map document: {0}")]
    Source(#[from] SourceError),
}

impl MapDocument {
    /// Fetch and normalize the document of `map_id`.
    ///
    /// Only a missing or unreadable top-level document is an error. Malformed entries
    /// inside it are skipped one by one.
    pub async fn load<S: AssetSource>(map_id: u32, source: &S) -> Result<Self, MapLoadError> {
        let path = map_document_path(map_id);

        if let Err(e) = source.prepare(&path).await {
            warn!("Parse trigger for '{}' failed: {}", path, e);
        }

        let root = source
            .fetch_node(&path)
            .await?
            .ok_or(MapLoadError::NotFound { map_id })?;

        let document = Self::from_node(map_id, &root)?;
        info!(
            "Loaded map {}: {} sprites, {} footholds, {} backgrounds",
            map_id,
            document.sprite_count(),
            document.footholds.len(),
            document.backgrounds.len()
        );
        Ok(document)
    }

    /// Normalize an already fetched document tree.
    pub fn from_node(map_id: u32, root: &DataNode) -> Result<Self, MapLoadError> {
        if !root.has_children() {
            return Err(MapLoadError::NotFound { map_id });
        }

        let mut document = MapDocument {
            map_id,
            ..Default::default()
        };

        if let Some(info) = root.child("info") {
            document.info = info
                .children()
                .filter_map(|(key, node)| node.value().map(|v| (key.to_string(), v.clone())))
                .collect();
        }
        if let Some(portals) = root.child("portal") {
            document.portals = portals.children().filter_map(parse_portal).collect();
        }
        if let Some(life) = root.child("life") {
            document.spawn_templates = life.children().filter_map(parse_spawn).collect();
        }
        if let Some(footholds) = root.child("foothold") {
            parse_footholds(footholds, &mut document);
        }
        if let Some(ropes) = root.child("ladderRope") {
            document.ropes = ropes.children().filter_map(parse_rope).collect();
        }
        if let Some(backs) = root.child("back") {
            document.backgrounds = backs
                .sorted_children()
                .into_iter()
                .filter_map(parse_background)
                .collect();
        }

        let map_tile_set = document.info.get("tS").map(ToString::to_string);
        for (index, layer) in document.layers.iter_mut().enumerate() {
            if let Some(node) = root.child(&index.to_string()) {
                *layer = parse_layer(node, map_tile_set.as_deref());
            }
        }

        Ok(document)
    }
}

/// Position from `x`/`y` children; both must be present.
fn position(node: &DataNode) -> Option<Vec2> {
    Some(Vec2::new(node.get::<f32>("x")?, node.get::<f32>("y")?))
}

fn parse_portal((key, node): (&str, &DataNode)) -> Option<Portal> {
    let Some(position) = position(node) else {
        debug!("Skipping portal '{}' without coordinates", key);
        return None;
    };
    Some(Portal {
        name: node.get("pn"),
        kind: node.get("pt"),
        position,
        target: PortalTarget {
            map_id: node.get("tm"),
            name: node.get("tn"),
        },
    })
}

fn parse_spawn((key, node): (&str, &DataNode)) -> Option<SpawnTemplate> {
    let Some(position) = position(node) else {
        debug!("Skipping life entry '{}' without coordinates", key);
        return None;
    };
    let kind = node
        .get::<String>("type")
        .map_or(SpawnKind::Other(String::new()), |tag| SpawnKind::from_tag(&tag));
    Some(SpawnTemplate {
        template_id: node.get("id"),
        kind,
        position,
        foothold: node.get("fh"),
        facing_left: node.flag("f"),
        hidden: node.flag("hide"),
        layer: None,
    })
}

/// Flatten `layer -> group -> foothold` into `document.footholds`.
fn parse_footholds(root: &DataNode, document: &mut MapDocument) {
    for (layer_key, layer_node) in root.children() {
        let Ok(layer) = layer_key.parse::<u32>() else {
            debug!("Skipping foothold layer '{}'", layer_key);
            continue;
        };
        for (group_key, group_node) in layer_node.children() {
            let Ok(group) = group_key.parse::<u32>() else {
                debug!("Skipping foothold group '{}/{}'", layer_key, group_key);
                continue;
            };
            for (id_key, node) in group_node.children() {
                let Ok(id) = id_key.parse::<u32>() else {
                    debug!("Skipping foothold '{}/{}/{}'", layer_key, group_key, id_key);
                    continue;
                };
                let endpoints = (
                    node.get::<f32>("x1"),
                    node.get::<f32>("y1"),
                    node.get::<f32>("x2"),
                    node.get::<f32>("y2"),
                );
                let (Some(x1), Some(y1), Some(x2), Some(y2)) = endpoints else {
                    debug!("Skipping foothold {} without endpoints", id);
                    continue;
                };
                document.footholds.insert(
                    id,
                    Foothold {
                        id,
                        start: Vec2::new(x1, y1),
                        end: Vec2::new(x2, y2),
                        layer,
                        group,
                        prev: node.get("prev"),
                        next: node.get("next"),
                        piece: node.get("piece"),
                    },
                );
            }
        }
    }
}

fn parse_rope((key, node): (&str, &DataNode)) -> Option<Rope> {
    let (Some(x), Some(top), Some(bottom)) =
        (node.get::<f32>("x"), node.get::<f32>("y1"), node.get::<f32>("y2"))
    else {
        debug!("Skipping rope '{}' without extent", key);
        return None;
    };
    Some(Rope {
        x,
        top,
        bottom,
        is_ladder: node.get::<i64>("l") == Some(Rope::LADDER),
    })
}

fn parse_background((key, node): (&str, &DataNode)) -> Option<Background> {
    let (Some(set), Some(number)) = (node.get::<String>("bS"), node.get::<i64>("no")) else {
        debug!("Skipping background '{}' without bS/no", key);
        return None;
    };
    let animated = node.flag("ani");
    let folder = if animated { "ani" } else { "back" };
    let component = |name: &str| node.get::<f32>(name).unwrap_or(0.0);

    Some(Background {
        index: key.parse().unwrap_or(-1),
        path: format!("{set}.img/{folder}/{number}"),
        set,
        number,
        position: Vec2::new(component("x"), component("y")),
        parallax: Vec2::new(component("rx"), component("ry")),
        tiling: Vec2::new(component("cx"), component("cy")),
        kind: node.get("type").unwrap_or(0),
        alpha: node.get("a"),
        front: node.flag("front"),
        animated,
        flipped: node.flag("f"),
    })
}

fn parse_layer(node: &DataNode, map_tile_set: Option<&str>) -> MapLayer {
    let tile_set = node
        .child("info")
        .and_then(|info| info.get::<String>("tS"))
        .or_else(|| map_tile_set.map(str::to_string));

    let objects = node
        .child("obj")
        .map(|bucket| {
            bucket
                .sorted_children()
                .into_iter()
                .filter_map(parse_object)
                .collect()
        })
        .unwrap_or_default();

    let tiles = node
        .child("tile")
        .map(|bucket| {
            bucket
                .sorted_children()
                .into_iter()
                .filter_map(|entry| parse_tile(entry, tile_set.as_deref()))
                .collect()
        })
        .unwrap_or_default();

    MapLayer { objects, tiles }
}

fn parse_object((key, node): (&str, &DataNode)) -> Option<LayerSprite> {
    let components = ["oS", "l0", "l1", "l2"].map(|name| node.get::<String>(name));
    let [Some(set), Some(l0), Some(l1), Some(l2)] = components else {
        debug!("Skipping object '{}' with incomplete path", key);
        return None;
    };
    Some(LayerSprite {
        kind: SpriteKind::Object,
        path: format!("{set}.img/{l0}/{l1}/{l2}"),
        position: raw_position(node),
        depth: node.get("z"),
        z_m: node.get("zM"),
        flipped: node.flag("f"),
    })
}

fn parse_tile((key, node): (&str, &DataNode), tile_set: Option<&str>) -> Option<LayerSprite> {
    let (Some(tile_set), Some(u), Some(no)) =
        (tile_set, node.get::<String>("u"), node.get::<String>("no"))
    else {
        debug!("Skipping tile '{}' without tS/u/no", key);
        return None;
    };
    Some(LayerSprite {
        kind: SpriteKind::Tile,
        path: format!("{tile_set}.img/{u}/{no}"),
        position: raw_position(node),
        depth: None,
        z_m: node.get("zM"),
        flipped: node.flag("f"),
    })
}

/// Sprite placement; missing coordinates default to zero.
fn raw_position(node: &DataNode) -> Vec2 {
    Vec2::new(
        node.get::<f32>("x").unwrap_or(0.0),
        node.get::<f32>("y").unwrap_or(0.0),
    )
}
