//! Compiled scene types.
//!
//! A compiled map is split the way its consumers use it: the [`LogicalScene`] carries
//! what gameplay needs (ground, portals, ropes, monster spawns) and the [`RenderScene`]
//! carries what a renderer draws (sprites, NPCs, backgrounds). Everything serializes to
//! JSON so it can be handed to a frontend as-is.

pub mod compose;

use std::collections::BTreeMap;

use bevy::prelude::*;
use bevy_wzmap_assets::prelude::{Background, NodeValue, Portal, Rope, SpawnTemplate, SpriteKind};
use serde::Serialize;

use crate::geometry::{GroundChain, GroundSegment};

pub use compose::compose;

/// Draw-order key of a sprite.
///
/// Ordering is lexicographic over the fields: lower layers first, objects before tiles
/// inside a layer, then ascending depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ZOrder {
    pub layer: u8,
    pub kind: SpriteKind,
    pub depth: i64,
}

/// A placed object or tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderEntity {
    pub kind: SpriteKind,
    pub layer: u8,
    /// Resource path as found in the map document
    pub path: String,
    /// Where a client can fetch the bitmap
    pub url: String,
    /// Top-left corner in map space
    pub position: Vec2,
    pub size: Vec2,
    pub origin: Vec2,
    /// Effective depth: the sprite's own hint, else the canvas depth
    pub depth: i64,
    pub z_order: ZOrder,
    /// Numeric draw depth derived from the entity's rank in `z_order`
    pub z: f32,
    pub flipped: bool,
}

impl RenderEntity {
    /// Area covered by the bitmap.
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.position, self.position + self.size)
    }
}

/// A background with its resolved bitmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundSprite {
    #[serde(flatten)]
    pub background: Background,
    pub url: String,
    pub size: Vec2,
    pub origin: Vec2,
}

/// Map extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SceneBounds {
    /// Union of all placed sprites
    pub images: Option<Rect>,
    /// Union of all ground segments
    pub ground: Option<Rect>,
}

impl SceneBounds {
    /// Smallest rectangle covering both sprites and ground.
    pub fn combined(&self) -> Option<Rect> {
        match (self.images, self.ground) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LogicalScene {
    pub map_id: u32,
    pub info: BTreeMap<String, NodeValue>,
    pub bounds: SceneBounds,
    /// Ground chains that have at least one segment
    pub footholds: Vec<GroundChain>,
    /// Every ground segment, the input to ground snapping
    pub ground_segments: Vec<GroundSegment>,
    pub portals: Vec<Portal>,
    pub ropes: Vec<Rope>,
    pub monsters: Vec<SpawnTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderScene {
    /// Objects and tiles in document order
    pub images: Vec<RenderEntity>,
    /// NPCs, snapped to the ground where possible
    pub npcs: Vec<SpawnTemplate>,
    pub backgrounds: Vec<BackgroundSprite>,
    pub bounds: SceneBounds,
}

/// Result of compiling one map.
///
/// Inserted on the map entity once compilation finishes.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledMap {
    pub logical: LogicalScene,
    pub render: RenderScene,
}

impl CompiledMap {
    pub fn map_id(&self) -> u32 {
        self.logical.map_id
    }

    /// Render entities sorted back to front.
    pub fn images_in_draw_order(&self) -> Vec<&RenderEntity> {
        let mut images: Vec<_> = self.render.images.iter().collect();
        images.sort_by(|a, b| a.z.total_cmp(&b.z));
        images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_order_ranking() {
        let key = |layer, kind, depth| ZOrder { layer, kind, depth };

        assert!(key(0, SpriteKind::Tile, 100) < key(1, SpriteKind::Object, -5));
        assert!(key(2, SpriteKind::Object, 9) < key(2, SpriteKind::Tile, 0));
        assert!(key(2, SpriteKind::Tile, 1) < key(2, SpriteKind::Tile, 2));
    }

    #[test]
    fn test_combined_bounds() {
        let bounds = SceneBounds {
            images: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            ground: Some(Rect::new(-5.0, 5.0, 5.0, 20.0)),
        };
        assert_eq!(bounds.combined(), Some(Rect::new(-5.0, 0.0, 10.0, 20.0)));

        let ground_only = SceneBounds {
            images: None,
            ..bounds
        };
        assert_eq!(ground_only.combined(), bounds.ground);
        assert_eq!(SceneBounds::default().combined(), None);
    }
}
