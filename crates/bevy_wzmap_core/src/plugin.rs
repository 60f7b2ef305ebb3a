//! Plugin for `bevy_wzmap_core`.

use core::marker::PhantomData;

use bevy::prelude::*;
use bevy_wzmap_assets::prelude::AssetSource;

use crate::debug::{DebugGroundChains, draw_ground_debug};
use crate::systems::{poll_map_compilation, start_map_compilation};

/// Configuration for sprite Z values.
///
/// Z value = offset + (rank * multiplier), where rank is the sprite's position in
/// draw order across the whole map.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LayerZConfig {
    /// Base Z offset for all sprites
    pub offset: f32,
    /// Spacing between consecutive sprites
    pub multiplier: f32,
}

impl Default for LayerZConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            multiplier: 1.0,
        }
    }
}

impl LayerZConfig {
    #[inline]
    pub fn z_for(&self, rank: usize) -> f32 {
        self.offset + rank as f32 * self.multiplier
    }
}

/// Configuration for [`WzMapCorePlugin`], also available as a resource.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_wzmap_assets::prelude::MemorySource;
/// use bevy_wzmap_core::{LayerZConfig, WzMapCoreConfig, WzMapCorePlugin};
///
/// App::new().add_plugins(WzMapCorePlugin::<MemorySource>::new(WzMapCoreConfig {
///     layer_z: LayerZConfig { offset: 1.0, multiplier: 0.01 },
///     dedup_ground_chains: true,
/// }));
/// ```
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct WzMapCoreConfig {
    pub layer_z: LayerZConfig,

    /// Drop ground chains that are a contiguous run of a longer chain.
    ///
    /// Some maps declare the same ground twice; with this set only the longest copy is
    /// listed in the logical scene. Ground snapping still sees every segment.
    pub dedup_ground_chains: bool,
}

/// Plugin compiling maps for entities carrying a [`WzMap`](crate::components::WzMap).
///
/// Add this plugin after `WzAssetsPlugin` for the same source type.
///
/// # Example
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_wzmap_assets::prelude::*;
/// use bevy_wzmap_core::prelude::*;
///
/// fn app() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(WzAssetsPlugin::new(MemorySource::default()))
///         .add_plugins(WzMapCorePlugin::<MemorySource>::default())
///         .add_systems(Startup, |mut commands: Commands| {
///             commands.spawn(WzMap::new(100000000));
///         })
///         .run();
/// }
/// ```
pub struct WzMapCorePlugin<S: AssetSource> {
    config: WzMapCoreConfig,
    _source: PhantomData<fn() -> S>,
}

impl<S: AssetSource> Default for WzMapCorePlugin<S> {
    fn default() -> Self {
        Self::new(WzMapCoreConfig::default())
    }
}

impl<S: AssetSource> WzMapCorePlugin<S> {
    /// Create a new plugin with custom configuration.
    pub fn new(config: WzMapCoreConfig) -> Self {
        Self {
            config,
            _source: PhantomData,
        }
    }
}

impl<S: AssetSource> Plugin for WzMapCorePlugin<S> {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());

        // Runs in PreUpdate before user systems
        app.add_systems(
            PreUpdate,
            (start_map_compilation::<S>, poll_map_compilation).chain(),
        );

        // Only runs when DebugGroundChains resource is present
        app.add_systems(
            PostUpdate,
            draw_ground_debug.run_if(resource_exists::<DebugGroundChains>),
        );
    }
}
