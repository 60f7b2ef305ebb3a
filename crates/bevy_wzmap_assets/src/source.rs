//! Asset backend abstraction.
//!
//! The compiler only needs two things from a backend: a node tree for a hierarchical
//! path, and a URL a client can fetch an image from. [`AssetSource`] captures exactly
//! that, so a live HTTP backend ([`crate::http::HttpSource`]) and preloaded dumps
//! ([`MemorySource`]) are interchangeable.

use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use bevy::tasks::ConditionalSendFuture;
use serde_json::Value;
use thiserror::Error;

use crate::node::{DataNode, NodeError};

/// Port the reference backend listens on.
pub const DEFAULT_BASE_URL: &str = "http://localhost:12258";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request for '{path}' failed: {reason}")]
    Transport { path: String, reason: String },

    #[error("Backend answered {status} for '{path}'")]
    Status { path: String, status: u16 },

    #[error("Invalid JSON for '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed node tree: {0}")]
    Node(#[from] NodeError),
}

/// Backend that serves map data as node trees.
///
/// `fetch_node` distinguishes "does not exist" (`Ok(None)`) from "could not ask"
/// (`Err`). Callers decide which of the two is fatal.
pub trait AssetSource: Send + Sync + 'static {
    /// Fetch the node tree rooted at `path` (e.g. `Map/Tile/woodMarble.img/bsc/0`).
    fn fetch_node(
        &self,
        path: &str,
    ) -> impl ConditionalSendFuture<Output = Result<Option<DataNode>, SourceError>>;

    /// URL a client can load the bitmap at `path` from.
    fn image_url(&self, path: &str) -> String;

    /// Ask the backend to materialize `path` before it is fetched.
    ///
    /// Backends that parse archives lazily use this to warm up; the default does nothing.
    fn prepare(&self, _path: &str) -> impl ConditionalSendFuture<Output = Result<(), SourceError>> {
        async { Ok(()) }
    }
}

/// Location of the asset backend.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint returning the full (non-simplified) JSON tree of a node.
    pub fn json_url(&self, path: &str) -> String {
        format!("{}/node/json/{}?simple=false", self.base_url, path)
    }

    pub fn image_url(&self, path: &str) -> String {
        format!("{}/node/image/{}", self.base_url, path)
    }

    /// Endpoint that makes the backend parse an archive ahead of the first read.
    pub fn parse_url(&self, path: &str) -> String {
        format!("{}/node/parse/{}", self.base_url, path)
    }
}

/// Hierarchical path of the document describing `map_id`.
///
/// Ids are zero-padded to nine digits and bucketed by their first digit:
/// `100000000` lives at `Map/Map/Map1/100000000.img`, `10000` at
/// `Map/Map/Map0/000010000.img`.
pub fn map_document_path(map_id: u32) -> String {
    let padded = format!("{map_id:09}");
    let bucket = &padded[..1];
    format!("Map/Map/Map{bucket}/{padded}.img")
}

/// In-memory backend keyed by node path.
///
/// Useful for preloaded dumps and tests. Counts every `fetch_node` call so cache
/// behavior can be observed, and can be told to fail specific paths.
#[derive(Debug, Default)]
pub struct MemorySource {
    config: SourceConfig,
    nodes: HashMap<String, DataNode>,
    failing: HashSet<String>,
    requests: AtomicUsize,
}

impl MemorySource {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn insert(&mut self, path: impl Into<String>, node: DataNode) -> &mut Self {
        self.nodes.insert(path.into(), node);
        self
    }

    /// Validate and store a JSON node tree.
    pub fn insert_json(&mut self, path: impl Into<String>, json: &Value) -> Result<&mut Self, NodeError> {
        let node = DataNode::from_json(json)?;
        Ok(self.insert(path, node))
    }

    /// Make every fetch of `path` fail with a transport error.
    pub fn fail_path(&mut self, path: impl Into<String>) -> &mut Self {
        self.failing.insert(path.into());
        self
    }

    /// Number of `fetch_node` calls served so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl AssetSource for MemorySource {
    fn fetch_node(
        &self,
        path: &str,
    ) -> impl ConditionalSendFuture<Output = Result<Option<DataNode>, SourceError>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let result = if self.failing.contains(path) {
            Err(SourceError::Transport {
                path: path.to_string(),
                reason: "simulated failure".to_string(),
            })
        } else {
            Ok(self.nodes.get(path).cloned())
        };
        async move { result }
    }

    fn image_url(&self, path: &str) -> String {
        self.config.image_url(path)
    }
}
