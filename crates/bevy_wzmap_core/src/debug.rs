//! Debug visualization for compiled ground.

use bevy::prelude::*;

use crate::scene::CompiledMap;

/// Resource to enable ground-chain debug drawing.
///
/// Insert this resource to draw every ground chain and the map bounds as gizmos.
///
/// # Example
///
/// ```rust,no_run
/// # use bevy::prelude::*;
/// # use bevy_wzmap_core::debug::DebugGroundChains;
/// fn enable_debug(mut commands: Commands) {
///     commands.insert_resource(DebugGroundChains::default());
/// }
/// ```
#[derive(Resource, Debug, Clone)]
pub struct DebugGroundChains {
    /// Color for ground polylines
    pub ground_color: Color,
    /// Color for the combined map bounds
    pub bounds_color: Color,
}

impl Default for DebugGroundChains {
    fn default() -> Self {
        Self {
            ground_color: Color::srgba(1.0, 0.5, 0.0, 0.9), // Orange
            bounds_color: Color::srgba(0.0, 1.0, 0.0, 0.8), // Green
        }
    }
}

/// Map space is y-down; world space is y-up.
#[inline]
fn to_world(map_origin: Vec2, point: Vec2) -> Vec2 {
    map_origin + Vec2::new(point.x, -point.y)
}

/// System that draws ground chains and bounds of each compiled map.
///
/// Only runs when `DebugGroundChains` resource is present.
pub fn draw_ground_debug(
    config: Res<DebugGroundChains>,
    map_query: Query<(&CompiledMap, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    for (compiled, global_transform) in &map_query {
        let map_origin = global_transform.translation().truncate();

        for chain in &compiled.logical.footholds {
            gizmos.linestrip_2d(
                chain.points.iter().map(|&point| to_world(map_origin, point)),
                config.ground_color,
            );
        }

        if let Some(bounds) = compiled.logical.bounds.combined() {
            let min = to_world(map_origin, bounds.min);
            let max = to_world(map_origin, bounds.max);
            gizmos.rect_2d(
                Isometry2d::from_translation((min + max) / 2.0),
                (max - min).abs(),
                config.bounds_color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_world_flips_y() {
        assert_eq!(
            to_world(Vec2::new(10.0, 0.0), Vec2::new(5.0, 600.0)),
            Vec2::new(15.0, -600.0)
        );
    }
}
