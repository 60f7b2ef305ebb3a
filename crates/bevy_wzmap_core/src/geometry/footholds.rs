//! Foothold graph traversal.
//!
//! Footholds link to each other through `prev`/`next` ids. Those links come straight
//! from the map file, so they can dangle or loop. Traversal is iterative and guarded by
//! a visited set; every foothold ends up in exactly one chain.

use std::collections::{BTreeMap, HashSet};

use bevy::prelude::*;
use bevy_wzmap_assets::prelude::Foothold;
use serde::Serialize;

use super::matcher::contains_sequence;

/// A resolved ground line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundSegment {
    pub start: Vec2,
    pub end: Vec2,
    /// One-based layer
    pub layer: u32,
}

impl GroundSegment {
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }
}

/// Footholds reached by one traversal, in walk order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundChain {
    /// One-based layer, taken from the foothold the traversal started at
    pub layer: u32,
    /// Every foothold this traversal visited, degenerate ones included
    pub foothold_ids: Vec<u32>,
    /// Polyline through the non-degenerate footholds
    pub points: Vec<Vec2>,
}

impl GroundChain {
    /// Has at least one non-degenerate segment.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Output of [`build_chains`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroundGeometry {
    pub chains: Vec<GroundChain>,
    /// All non-degenerate segments of all chains, in chain order
    pub segments: Vec<GroundSegment>,
    /// Bounding box of `segments`
    pub extents: Option<Rect>,
}

impl GroundGeometry {
    fn push_chain(&mut self, start: &Foothold, walked: &[&Foothold]) {
        let layer = start.layer + 1;
        let drawable: Vec<&Foothold> = walked
            .iter()
            .copied()
            .filter(|fh| !fh.is_degenerate())
            .collect();

        let mut points = Vec::with_capacity(drawable.len() + 1);
        if let Some(first) = drawable.first() {
            points.push(first.start);
        }
        for fh in &drawable {
            points.push(fh.end);

            let segment = GroundSegment {
                start: fh.start,
                end: fh.end,
                layer,
            };
            self.extents = Some(match self.extents {
                Some(extents) => extents.union(segment.bounds()),
                None => segment.bounds(),
            });
            self.segments.push(segment);
        }

        self.chains.push(GroundChain {
            layer,
            foothold_ids: walked.iter().map(|fh| fh.id).collect(),
            points,
        });
    }
}

/// Decompose the foothold graph into ground chains.
///
/// Chains are started first from every root foothold (`prev == 0`), then from every
/// foothold still unvisited (orphans and cycles), each pass in ascending id order.
pub fn build_chains(footholds: &BTreeMap<u32, Foothold>) -> GroundGeometry {
    let mut visited = HashSet::with_capacity(footholds.len());
    let mut geometry = GroundGeometry::default();

    let roots = footholds.values().filter(|fh| fh.is_root());
    for start in roots.chain(footholds.values()) {
        if visited.contains(&start.id) {
            continue;
        }
        let walked = walk(start, footholds, &mut visited);
        geometry.push_chain(start, &walked);
    }

    geometry
}

/// Follow `next` links from `start` until they run out, dangle or revisit.
///
/// `next == 0` ends a chain even when a foothold with id 0 exists.
fn walk<'a>(
    start: &'a Foothold,
    footholds: &'a BTreeMap<u32, Foothold>,
    visited: &mut HashSet<u32>,
) -> Vec<&'a Foothold> {
    let mut walked = Vec::new();
    let mut current = start;

    loop {
        visited.insert(current.id);
        walked.push(current);

        let Some(next) = current
            .next
            .filter(|&id| id != Foothold::ROOT)
            .and_then(|id| footholds.get(&id))
        else {
            break;
        };
        if visited.contains(&next.id) {
            break;
        }
        current = next;
    }

    walked
}

/// Drop chains whose polyline is a contiguous run of another chain on the same layer.
///
/// Of two identical chains the first is kept. Chains without segments are left alone.
pub fn dedup_contained_chains(chains: Vec<GroundChain>) -> Vec<GroundChain> {
    let contained: Vec<bool> = chains
        .iter()
        .enumerate()
        .map(|(i, chain)| {
            chain.is_drawable()
                && chains.iter().enumerate().any(|(j, other)| {
                    let covers = other.points.len() > chain.points.len()
                        || (other.points.len() == chain.points.len() && j < i);
                    j != i
                        && other.layer == chain.layer
                        && covers
                        && contains_sequence(&chain.points, &other.points)
                })
        })
        .collect();

    chains
        .into_iter()
        .zip(contained)
        .filter_map(|(chain, contained)| {
            if contained {
                debug!("Dropping ground chain {:?}: covered by another chain", chain.foothold_ids);
                None
            } else {
                Some(chain)
            }
        })
        .collect()
}
