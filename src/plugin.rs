//! Unified plugin for bevy_wzmap.

use bevy::prelude::*;
use bevy_wzmap_assets::{WzAssetsPlugin, http::HttpSource, source::SourceConfig};
use bevy_wzmap_core::{WzMapCoreConfig, WzMapCorePlugin};

/// Unified plugin that compiles maps served by an HTTP asset backend.
///
/// This plugin automatically includes:
/// - Backend access ([`WzAssetsPlugin`]) with an [`HttpSource`]
/// - Map compilation ([`WzMapCorePlugin`])
///
/// For other backends add the two plugins yourself with your own `AssetSource`.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_wzmap::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(
///         BevyWzMapPlugin::default()
///             .with_source(SourceConfig::new("http://127.0.0.1:9000"))
///             .with_core(WzMapCoreConfig {
///                 dedup_ground_chains: true,
///                 ..Default::default()
///             }),
///     )
///     .run();
/// ```
#[derive(Default)]
pub struct BevyWzMapPlugin {
    /// Backend location
    pub source: SourceConfig,

    /// Core configuration
    pub core: WzMapCoreConfig,
}

impl BevyWzMapPlugin {
    /// Create with a custom backend location
    pub fn with_source(mut self, config: SourceConfig) -> Self {
        self.source = config;
        self
    }

    /// Create with custom core configuration
    pub fn with_core(mut self, config: WzMapCoreConfig) -> Self {
        self.core = config;
        self
    }
}

impl Plugin for BevyWzMapPlugin {
    fn build(&self, app: &mut App) {
        // Layer 1: backend access
        app.insert_resource(self.source.clone());
        app.add_plugins(WzAssetsPlugin::new(HttpSource::new(self.source.clone())));

        // Layer 2: compilation
        app.add_plugins(WzMapCorePlugin::<HttpSource>::new(self.core.clone()));

        info!("BevyWzMapPlugin initialized ({})", self.source.base_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_wzmap_assets::plugin::WzAssetSource;

    #[test]
    fn test_plugin_installs_layers() {
        let mut app = App::new();
        app.add_plugins(
            BevyWzMapPlugin::default().with_source(SourceConfig::new("http://127.0.0.1:9000/")),
        );

        let world = app.world();
        assert_eq!(
            world.resource::<SourceConfig>().base_url,
            "http://127.0.0.1:9000"
        );
        assert_eq!(
            world.resource::<WzAssetSource<HttpSource>>().0.config().base_url,
            "http://127.0.0.1:9000"
        );
        assert!(!world.resource::<WzMapCoreConfig>().dedup_ground_chains);
    }
}
