use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::Serialize;

use crate::loaders::metadata::AssetKind;
use crate::node::NodeValue;

/// Number of drawing layers every map has.
pub const LAYER_COUNT: usize = 8;

/// Normalized contents of one map document.
///
/// Built once by [`MapDocument::load`] and never mutated afterwards;
/// compilation copies what it needs out of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapDocument {
    pub map_id: u32,

    /// `info` section, values copied verbatim
    pub info: BTreeMap<String, NodeValue>,

    pub portals: Vec<Portal>,

    /// Raw NPC / monster placements (`life` section)
    pub spawn_templates: Vec<SpawnTemplate>,

    /// Every foothold of every layer and group, keyed by its own id
    pub footholds: BTreeMap<u32, Foothold>,

    /// Ropes and ladders (`ladderRope` section)
    pub ropes: Vec<Rope>,

    /// Backgrounds in ascending key order (later entries draw over earlier ones)
    pub backgrounds: Vec<Background>,

    /// Drawing layers `0..8`
    pub layers: [MapLayer; LAYER_COUNT],
}

impl MapDocument {
    /// Value of an `info` entry.
    pub fn info_value(&self, key: &str) -> Option<&NodeValue> {
        self.info.get(key)
    }

    /// Total number of sprites (objects and tiles) across all layers.
    pub fn sprite_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.objects.len() + layer.tiles.len())
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Portal {
    pub name: Option<String>,
    /// Portal type (`pt`): spawn point, visible, hidden, ...
    pub kind: Option<i64>,
    pub position: Vec2,
    pub target: PortalTarget,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortalTarget {
    pub map_id: Option<u32>,
    pub name: Option<String>,
}

/// Class of entity a spawn template places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SpawnKind {
    /// `type = "n"`
    Npc,
    /// `type = "m"`
    Monster,
    Other(String),
}

impl SpawnKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "n" => SpawnKind::Npc,
            "m" => SpawnKind::Monster,
            other => SpawnKind::Other(other.to_string()),
        }
    }
}

/// Placement record for an NPC or monster.
///
/// `position` and `layer` are overwritten when the entity is snapped to the ground
/// during compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnTemplate {
    pub template_id: Option<String>,
    pub kind: SpawnKind,
    pub position: Vec2,
    /// Foothold the entity was placed on in the editor (`fh`)
    pub foothold: Option<u32>,
    pub facing_left: bool,
    pub hidden: bool,
    /// Ground layer after snapping
    pub layer: Option<u32>,
}

/// One ground-collision segment as stored in the document.
///
/// `prev`/`next` link footholds into chains. The links may dangle or form cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Foothold {
    pub id: u32,
    pub start: Vec2,
    pub end: Vec2,
    /// Zero-based layer the foothold was declared under
    pub layer: u32,
    pub group: u32,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub piece: Option<i64>,
}

impl Foothold {
    /// `prev` value marking the first foothold of a chain.
    pub const ROOT: u32 = 0;

    #[inline]
    pub fn is_root(&self) -> bool {
        self.prev == Some(Self::ROOT)
    }

    /// Both endpoints coincide.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rope {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
    pub is_ladder: bool,
}

impl Rope {
    /// Discriminator value (`l`) marking a ladder.
    pub const LADDER: i64 = 1;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Background {
    /// Key of the entry in the `back` section
    pub index: i64,
    /// Background set (`bS`)
    pub set: String,
    /// Sprite number inside the set (`no`)
    pub number: i64,
    pub position: Vec2,
    /// Parallax rates (`rx`, `ry`)
    pub parallax: Vec2,
    /// Tiling distances (`cx`, `cy`)
    pub tiling: Vec2,
    /// Tiling/scroll mode (`type`)
    pub kind: i64,
    /// Opacity 0-255 (`a`)
    pub alpha: Option<i64>,
    pub front: bool,
    pub animated: bool,
    pub flipped: bool,
    /// Resource path, e.g. `grassySoil.img/back/1`
    pub path: String,
}

impl Background {
    pub fn asset_kind(&self) -> AssetKind {
        if self.animated {
            AssetKind::AnimatedBackground
        } else {
            AssetKind::Background
        }
    }
}

/// Sub-layer of a drawing layer. Objects draw before tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SpriteKind {
    Object,
    Tile,
}

impl SpriteKind {
    pub fn asset_kind(self) -> AssetKind {
        match self {
            SpriteKind::Object => AssetKind::Object,
            SpriteKind::Tile => AssetKind::Tile,
        }
    }
}

/// An object or tile placed on a layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSprite {
    pub kind: SpriteKind,
    /// Resource path, e.g. `acc1.img/grassySoil/nature/0` or `woodMarble.img/bsc/0`
    pub path: String,
    /// Raw placement (pivot position in map space)
    pub position: Vec2,
    /// Depth hint (`z`); only objects carry one
    pub depth: Option<i64>,
    /// `zM`
    pub z_m: Option<i64>,
    pub flipped: bool,
}

/// Objects and tiles of one drawing layer, each in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapLayer {
    pub objects: Vec<LayerSprite>,
    pub tiles: Vec<LayerSprite>,
}

impl MapLayer {
    /// Objects followed by tiles, the order sprites of this layer are processed in.
    pub fn sprites(&self) -> impl Iterator<Item = &LayerSprite> {
        self.objects.iter().chain(self.tiles.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.tiles.is_empty()
    }
}
