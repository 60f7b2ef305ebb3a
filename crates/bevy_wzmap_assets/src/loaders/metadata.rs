//! Sprite metadata lookup (pivot origin, bitmap size, base depth).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bevy::prelude::*;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;

use crate::node::{DataNode, NodeValue};
use crate::source::AssetSource;

/// Which archive a resource path belongs to.
///
/// Object paths address a sprite directory whose first frame is `0`; tile paths address
/// the canvas directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssetKind {
    Object,
    Tile,
    Background,
    /// Animated background: a frame directory like objects
    AnimatedBackground,
}

impl AssetKind {
    /// Fully-qualified node path of the canvas describing `path`.
    pub fn node_path(self, path: &str) -> String {
        match self {
            AssetKind::Object => format!("Map/Obj/{path}/0"),
            AssetKind::Tile => format!("Map/Tile/{path}"),
            AssetKind::Background => format!("Map/Back/{path}"),
            AssetKind::AnimatedBackground => format!("Map/Back/{path}/0"),
        }
    }
}

/// Render-relevant facts about one canvas.
///
/// The default (all zeros) stands in for anything that could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AssetMetadata {
    /// Pivot offset inside the bitmap
    pub origin: Vec2,
    /// Bitmap width and height
    pub size: Vec2,
    /// Base depth (`z`) declared on the canvas
    pub depth: i64,
}

impl AssetMetadata {
    /// Read metadata from a canvas node. Missing pieces stay zero.
    pub fn from_node(node: &DataNode) -> Self {
        Self {
            origin: node.get::<Vec2>("origin").unwrap_or(Vec2::ZERO),
            size: node
                .value()
                .and_then(NodeValue::as_canvas_size)
                .unwrap_or(Vec2::ZERO),
            depth: node.get::<i64>("z").unwrap_or(0),
        }
    }
}

type PendingMetadata = Shared<BoxFuture<'static, AssetMetadata>>;

/// Memo of resolved metadata keyed by fully-qualified node path.
///
/// Entries hold shared futures, so a path requested by several sprites at once is
/// fetched a single time and every caller receives the same result.
///
/// A cache belongs to one compilation. Cloning it shares the entries.
#[derive(Clone, Default)]
pub struct MetadataCache(Arc<Mutex<HashMap<String, PendingMetadata>>>);

impl MetadataCache {
    /// Number of distinct paths requested through this cache.
    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Already-resolved metadata for a node path, without fetching.
    pub fn peek(&self, node_path: &str) -> Option<AssetMetadata> {
        let entries = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(node_path).and_then(|pending| pending.peek().copied())
    }
}

impl core::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("entries", &self.len())
            .finish()
    }
}

/// Resolves [`AssetMetadata`] for resource paths through an [`AssetSource`].
pub struct MetadataResolver<S> {
    source: Arc<S>,
    cache: MetadataCache,
}

impl<S: AssetSource> MetadataResolver<S> {
    /// A resolver with a fresh, empty cache.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_cache(source, MetadataCache::default())
    }

    pub fn with_cache(source: Arc<S>, cache: MetadataCache) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Metadata for `path` of the given kind.
    ///
    /// Never fails: unresolvable resources come back as [`AssetMetadata::default`].
    pub async fn resolve(&self, path: &str, kind: AssetKind) -> AssetMetadata {
        let node_path = kind.node_path(path);
        let pending = {
            let mut entries = self.cache.0.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(node_path.clone())
                .or_insert_with(|| {
                    let source = Arc::clone(&self.source);
                    async move { fetch_metadata(&*source, &node_path).await }
                        .boxed()
                        .shared()
                })
                .clone()
        };
        pending.await
    }
}

async fn fetch_metadata<S: AssetSource>(source: &S, node_path: &str) -> AssetMetadata {
    match source.fetch_node(node_path).await {
        Ok(Some(node)) => AssetMetadata::from_node(&node),
        Ok(None) => {
            warn!("Asset '{}' not found, using default metadata", node_path);
            AssetMetadata::default()
        }
        Err(e) => {
            warn!("Failed to resolve asset '{}': {}", node_path, e);
            AssetMetadata::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use bevy::tasks::block_on;
    use futures::future::join_all;
    use serde_json::json;

    fn canvas_source() -> MemorySource {
        let mut source = MemorySource::default();
        source
            .insert_json(
                "Map/Obj/acc1.img/grassySoil/nature/0/0",
                &json!({
                    "data": { "width": 20, "height": 30 },
                    "children": {
                        "origin": { "data": { "x": 10, "y": 10 } },
                        "z": { "data": 3 }
                    }
                }),
            )
            .unwrap();
        source
    }

    #[test]
    fn test_node_paths_by_kind() {
        assert_eq!(AssetKind::Object.node_path("a.img/b/c/d"), "Map/Obj/a.img/b/c/d/0");
        assert_eq!(AssetKind::Tile.node_path("t.img/bsc/0"), "Map/Tile/t.img/bsc/0");
        assert_eq!(AssetKind::Background.node_path("b.img/back/2"), "Map/Back/b.img/back/2");
        assert_eq!(
            AssetKind::AnimatedBackground.node_path("b.img/ani/2"),
            "Map/Back/b.img/ani/2/0"
        );
    }

    #[test]
    fn test_resolve_reads_canvas() {
        let resolver = MetadataResolver::new(Arc::new(canvas_source()));
        let meta = block_on(resolver.resolve("acc1.img/grassySoil/nature/0", AssetKind::Object));
        assert_eq!(meta.origin, Vec2::new(10.0, 10.0));
        assert_eq!(meta.size, Vec2::new(20.0, 30.0));
        assert_eq!(meta.depth, 3);
    }

    #[test]
    fn test_resolve_is_memoized() {
        let source = Arc::new(canvas_source());
        let resolver = MetadataResolver::new(Arc::clone(&source));

        let first = block_on(resolver.resolve("acc1.img/grassySoil/nature/0", AssetKind::Object));
        let second = block_on(resolver.resolve("acc1.img/grassySoil/nature/0", AssetKind::Object));

        assert_eq!(first, second);
        assert_eq!(source.requests(), 1);
        assert_eq!(
            resolver.cache().peek("Map/Obj/acc1.img/grassySoil/nature/0/0"),
            Some(first)
        );
    }

    #[test]
    fn test_concurrent_requests_fetch_once() {
        let source = Arc::new(canvas_source());
        let resolver = MetadataResolver::new(Arc::clone(&source));

        let results = block_on(join_all(
            (0..5).map(|_| resolver.resolve("acc1.img/grassySoil/nature/0", AssetKind::Object)),
        ));

        assert!(results.iter().all(|meta| meta.size == Vec2::new(20.0, 30.0)));
        assert_eq!(source.requests(), 1);
        assert_eq!(resolver.cache().len(), 1);
    }

    #[test]
    fn test_failures_degrade_to_defaults() {
        let mut source = canvas_source();
        source.fail_path("Map/Tile/broken.img/bsc/0");
        let resolver = MetadataResolver::new(Arc::new(source));

        let missing = block_on(resolver.resolve("nothing.img/a/b/c", AssetKind::Object));
        let broken = block_on(resolver.resolve("broken.img/bsc/0", AssetKind::Tile));

        assert_eq!(missing, AssetMetadata::default());
        assert_eq!(broken, AssetMetadata::default());
    }

    #[test]
    fn test_caches_are_independent() {
        let source = Arc::new(canvas_source());
        let first = MetadataResolver::new(Arc::clone(&source));
        let second = MetadataResolver::new(Arc::clone(&source));

        block_on(first.resolve("acc1.img/grassySoil/nature/0", AssetKind::Object));
        block_on(second.resolve("acc1.img/grassySoil/nature/0", AssetKind::Object));

        assert_eq!(source.requests(), 2);
    }
}
