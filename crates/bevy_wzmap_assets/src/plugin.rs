use std::sync::Arc;

use bevy::prelude::*;

use crate::source::AssetSource;

/// Shared handle to the backend maps are compiled from.
///
/// Compilations clone the inner `Arc`, so the source outlives any task still using it.
#[derive(Resource)]
pub struct WzAssetSource<S: AssetSource>(pub Arc<S>);

impl<S: AssetSource> Clone for WzAssetSource<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// Plugin that makes an [`AssetSource`] available to the rest of the app
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_wzmap_assets::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(WzAssetsPlugin::new(MemorySource::default()))
///     .run();
/// ```
///
/// This is a **Layer 1** plugin: backend access only. Compiling maps into scenes
/// is Layer 2 (`bevy_wzmap_core`).
pub struct WzAssetsPlugin<S: AssetSource> {
    source: Arc<S>,
}

impl<S: AssetSource> WzAssetsPlugin<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Share an existing source instead of taking ownership of a new one.
    pub fn from_arc(source: Arc<S>) -> Self {
        Self { source }
    }
}

impl<S: AssetSource> Plugin for WzAssetsPlugin<S> {
    fn build(&self, app: &mut App) {
        app.insert_resource(WzAssetSource(Arc::clone(&self.source)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_plugin_inserts_source() {
        let mut app = App::new();
        app.add_plugins(WzAssetsPlugin::new(MemorySource::default()));

        let source = app.world().resource::<WzAssetSource<MemorySource>>();
        assert_eq!(source.0.requests(), 0);
    }

    #[test]
    fn test_plugin_shares_existing_source() {
        let shared = Arc::new(MemorySource::default());
        let mut app = App::new();
        app.add_plugins(WzAssetsPlugin::from_arc(Arc::clone(&shared)));

        let source = app.world().resource::<WzAssetSource<MemorySource>>();
        assert!(Arc::ptr_eq(&source.0, &shared));
    }
}
