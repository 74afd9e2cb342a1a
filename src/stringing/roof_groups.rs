//! Merge groups of similarly oriented roof planes.
//!
//! Strings may only span roofs in the same group. Similarity is not
//! transitive on its own, so groups are the connected components of the
//! pairwise relation.

use petgraph::unionfind::UnionFind;

use crate::config::GroupingConfig;
use crate::model::{Layout, RoofPlane};

/// Roof index to merge-group mapping, fixed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoofGroups {
    group_of_roof: Vec<usize>,
    members: Vec<Vec<usize>>,
}

impl RoofGroups {
    /// Merge group of the roof at `roof`.
    pub fn group_of(&self, roof: usize) -> usize {
        self.group_of_roof[roof]
    }

    /// Roof indices in each group, in roof order.
    pub fn members(&self) -> &[Vec<usize>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn same_group(&self, a: usize, b: usize) -> bool {
        self.group_of_roof[a] == self.group_of_roof[b]
    }
}

/// Smallest angle between two compass bearings, in degrees.
pub fn azimuth_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// Returns `true` when two planes face nearly the same way at nearly the
/// same tilt.
pub fn similar(a: &RoofPlane, b: &RoofPlane, config: &GroupingConfig) -> bool {
    azimuth_difference(a.azimuth, b.azimuth) <= config.azimuth_tolerance_deg
        && (a.pitch - b.pitch).abs() <= config.pitch_tolerance_deg
}

/// Partitions the layout's roofs into merge groups.
///
/// Groups are numbered by the first roof that belongs to them. A roof
/// without a plane record is only ever in a group of its own.
pub fn group_roofs(layout: &Layout, config: &GroupingConfig) -> RoofGroups {
    let roofs = layout.roofs();
    let mut sets = UnionFind::<usize>::new(roofs.len());
    for (i, a) in roofs.iter().enumerate() {
        let Some(plane_a) = &a.plane else { continue };
        for (j, b) in roofs.iter().enumerate().skip(i + 1) {
            if let Some(plane_b) = &b.plane {
                if similar(plane_a, plane_b, config) {
                    sets.union(i, j);
                }
            }
        }
    }

    let labels = sets.into_labeling();
    let mut group_of_label: Vec<Option<usize>> = vec![None; roofs.len()];
    let mut group_of_roof = Vec::with_capacity(roofs.len());
    let mut members: Vec<Vec<usize>> = Vec::new();
    for (roof, &label) in labels.iter().enumerate() {
        let group = match group_of_label[label] {
            Some(g) => g,
            None => {
                let g = members.len();
                group_of_label[label] = Some(g);
                members.push(Vec::new());
                g
            }
        };
        members[group].push(roof);
        group_of_roof.push(group);
    }

    RoofGroups {
        group_of_roof,
        members,
    }
}
