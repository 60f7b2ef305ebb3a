//! Ray casts against ground segments.

use bevy::prelude::*;
use serde::Serialize;

use super::footholds::GroundSegment;

/// Map space is y-down, so "down" is +y.
pub const DOWN: Vec2 = Vec2::Y;

/// Nearest ground point under a ray origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundHit {
    pub point: Vec2,
    /// Layer of the segment that was hit
    pub layer: u32,
}

/// Intersection of the ray `origin + t * direction` with `segment`.
///
/// Rejects segments parallel to the ray, hits behind the origin (`t < 0`) and hits
/// outside the segment (`u` not in `[0, 1]`).
pub fn intersect(origin: Vec2, direction: Vec2, segment: &GroundSegment) -> Option<Vec2> {
    let edge = segment.end - segment.start;
    let denominator = direction.perp_dot(edge);
    if denominator == 0.0 {
        return None;
    }

    let offset = segment.start - origin;
    let t = offset.perp_dot(edge) / denominator;
    let u = offset.perp_dot(direction) / denominator;

    (t >= 0.0 && (0.0..=1.0).contains(&u)).then(|| origin + direction * t)
}

/// Cast a ray straight down from `origin` and return the closest hit.
///
/// Every segment is tested; on equal distances the earlier segment wins.
pub fn cast_down(origin: Vec2, segments: &[GroundSegment]) -> Option<GroundHit> {
    let mut nearest: Option<(f32, GroundHit)> = None;

    for segment in segments {
        let Some(point) = intersect(origin, DOWN, segment) else {
            continue;
        };
        let distance = origin.distance(point);
        if nearest.is_none_or(|(best, _)| distance < best) {
            nearest = Some((
                distance,
                GroundHit {
                    point,
                    layer: segment.layer,
                },
            ));
        }
    }

    nearest.map(|(_, hit)| hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(x1: f32, y1: f32, x2: f32, y2: f32, layer: u32) -> GroundSegment {
        GroundSegment {
            start: Vec2::new(x1, y1),
            end: Vec2::new(x2, y2),
            layer,
        }
    }

    #[test]
    fn test_horizontal_segment_below() {
        let hit = cast_down(Vec2::new(500.0, 500.0), &[segment(400.0, 600.0, 600.0, 600.0, 2)]);
        assert_eq!(
            hit,
            Some(GroundHit {
                point: Vec2::new(500.0, 600.0),
                layer: 2
            })
        );
    }

    #[test]
    fn test_no_qualifying_segment() {
        let origin = Vec2::new(0.0, 0.0);
        // Above the origin
        assert_eq!(cast_down(origin, &[segment(-10.0, -5.0, 10.0, -5.0, 1)]), None);
        // Beside the ray
        assert_eq!(cast_down(origin, &[segment(5.0, 10.0, 20.0, 10.0, 1)]), None);
        // Parallel to the ray
        assert_eq!(cast_down(origin, &[segment(0.0, 10.0, 0.0, 20.0, 1)]), None);
        assert_eq!(cast_down(origin, &[]), None);
    }

    #[test]
    fn test_nearest_segment_wins() {
        let origin = Vec2::new(0.0, 0.0);
        let far = segment(-50.0, 300.0, 50.0, 300.0, 1);
        let near = segment(-50.0, 100.0, 50.0, 100.0, 3);

        for segments in [[far, near], [near, far]] {
            let hit = cast_down(origin, &segments).unwrap();
            assert_eq!(hit.point, Vec2::new(0.0, 100.0));
            assert_eq!(hit.layer, 3);
        }
    }

    #[test]
    fn test_sloped_segment_and_endpoints() {
        let origin = Vec2::new(50.0, 0.0);
        let hit = cast_down(origin, &[segment(0.0, 100.0, 100.0, 200.0, 1)]).unwrap();
        assert_eq!(hit.point, Vec2::new(50.0, 150.0));

        // Endpoints are inclusive
        let hit = cast_down(origin, &[segment(50.0, 40.0, 90.0, 40.0, 1)]).unwrap();
        assert_eq!(hit.point, Vec2::new(50.0, 40.0));
    }

    #[test]
    fn test_origin_on_segment() {
        let hit = cast_down(Vec2::new(10.0, 20.0), &[segment(0.0, 20.0, 30.0, 20.0, 4)]).unwrap();
        assert_eq!(hit.point, Vec2::new(10.0, 20.0));
    }
}
