pub mod assets;
pub mod loaders;
pub mod node;
pub mod plugin;
pub mod source;

#[cfg(feature = "http")]
pub mod http;

// Re-export the plugin for convenience
pub use plugin::WzAssetsPlugin;

/// Prelude module for convenient imports
///
/// # Example
/// ```no_run
/// use bevy_wzmap_assets::prelude::*;
///
/// async fn load(source: &MemorySource) -> Result<MapDocument, MapLoadError> {
///     MapDocument::load(100000000, source).await
/// }
/// ```
pub mod prelude {
    pub use crate::assets::map::{
        Background, Foothold, LAYER_COUNT, LayerSprite, MapDocument, MapLayer, Portal,
        PortalTarget, Rope, SpawnKind, SpawnTemplate, SpriteKind,
    };
    #[cfg(feature = "http")]
    pub use crate::http::HttpSource;
    pub use crate::loaders::map::MapLoadError;
    pub use crate::loaders::metadata::{AssetKind, AssetMetadata, MetadataCache, MetadataResolver};
    pub use crate::node::{DataNode, FromNodeValue, NodeError, NodeValue};
    pub use crate::plugin::{WzAssetSource, WzAssetsPlugin};
    pub use crate::source::{AssetSource, MemorySource, SourceConfig, SourceError, map_document_path};
}
