//! Proximity clustering of panels within each roof plane.
//!
//! Panels closer than a roof-specific threshold are linked; clusters are the
//! connected components (single linkage). The threshold scales with the
//! roof's own panel pitch, so tightly and loosely packed roofs split the same
//! way.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::ClusteringConfig;
use crate::model::Layout;

/// Distance thresholds derived for one roof.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoofReach {
    /// Two panels closer than this belong to the same cluster.
    pub link_threshold: f64,
    /// Farthest hop the chain builder may take between neighbours.
    pub chain_radius: f64,
}

impl RoofReach {
    /// Reach of a roof with fewer than two panels.
    pub const NONE: RoofReach = RoofReach {
        link_threshold: 0.0,
        chain_radius: 0.0,
    };
}

/// A connected group of panels on one roof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub roof: usize,
    /// Panel indices in input order.
    pub panels: Vec<usize>,
}

/// Median distance from each panel to its nearest neighbour.
///
/// Returns `None` for fewer than two panels.
pub fn median_neighbour_distance(layout: &Layout, panels: &[usize]) -> Option<f64> {
    if panels.len() < 2 {
        return None;
    }
    let mut nearest: Vec<f64> = panels
        .iter()
        .map(|&a| {
            panels
                .iter()
                .filter(|&&b| b != a)
                .map(|&b| layout.distance(a, b))
                .fold(f64::INFINITY, f64::min)
        })
        .collect();
    nearest.sort_by(f64::total_cmp);
    let mid = nearest.len() / 2;
    Some(if nearest.len() % 2 == 0 {
        (nearest[mid - 1] + nearest[mid]) / 2.0
    } else {
        nearest[mid]
    })
}

/// Link threshold and chain radius for a set of panels.
pub fn roof_reach(layout: &Layout, panels: &[usize], config: &ClusteringConfig) -> RoofReach {
    match median_neighbour_distance(layout, panels) {
        Some(median) => {
            let link_threshold = median * config.gap_factor;
            RoofReach {
                link_threshold,
                chain_radius: link_threshold * config.chain_radius_factor,
            }
        }
        None => RoofReach::NONE,
    }
}

/// Single-linkage components of `panels` under `threshold`.
///
/// Components come out in order of their first panel in `panels`; each
/// component lists its panels in input order.
pub fn link_components(layout: &Layout, panels: &[usize], threshold: f64) -> Vec<Vec<usize>> {
    let mut visited = vec![false; panels.len()];
    let mut components = Vec::new();
    for start in 0..panels.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut members = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(cur) = queue.pop_front() {
            for next in 0..panels.len() {
                if !visited[next] && layout.distance(panels[cur], panels[next]) <= threshold {
                    visited[next] = true;
                    members.push(next);
                    queue.push_back(next);
                }
            }
        }
        members.sort_unstable();
        components.push(members.into_iter().map(|i| panels[i]).collect());
    }
    components
}

/// Clusters every roof of the layout.
///
/// Returns the per-roof reach (indexed like [`Layout::roofs`]) and all
/// clusters ordered by size descending, then by smallest panel id.
pub fn cluster_layout(layout: &Layout, config: &ClusteringConfig) -> (Vec<RoofReach>, Vec<Cluster>) {
    let mut reaches = Vec::with_capacity(layout.roofs().len());
    let mut clusters = Vec::new();
    for (roof, slot) in layout.roofs().iter().enumerate() {
        let reach = roof_reach(layout, &slot.panels, config);
        reaches.push(reach);
        for panels in link_components(layout, &slot.panels, reach.link_threshold) {
            clusters.push(Cluster { roof, panels });
        }
    }
    clusters.sort_by(|a, b| {
        b.panels
            .len()
            .cmp(&a.panels.len())
            .then_with(|| smallest_id(layout, &a.panels).cmp(smallest_id(layout, &b.panels)))
    });
    (reaches, clusters)
}

fn smallest_id<'a>(layout: &'a Layout, panels: &[usize]) -> &'a str {
    panels
        .iter()
        .map(|&p| layout.panel(p).id.as_str())
        .min()
        .unwrap_or_default()
}
