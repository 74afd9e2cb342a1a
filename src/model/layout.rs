//! Panel layout arena.
//!
//! [`Layout`] owns every panel and roof plane of a project. The stringing
//! passes refer to panels and roofs by index into this arena and only turn
//! indices back into ids when the result is assembled.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StringingError};

/// Panel centre in roof-plane pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One physical panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub roof_plane_id: String,
    pub center: Point,
}

impl Panel {
    pub fn new(id: impl Into<String>, roof_plane_id: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            roof_plane_id: roof_plane_id.into(),
            center: Point::new(x, y),
        }
    }
}

/// A planar roof section with a single orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoofPlane {
    pub id: String,
    /// Compass direction the plane faces (degrees).
    pub azimuth: f64,
    /// Tilt from horizontal (degrees).
    pub pitch: f64,
    /// Free-text orientation tag ("south", "east", ...).
    #[serde(default)]
    pub orientation: Option<String>,
}

impl RoofPlane {
    pub fn new(id: impl Into<String>, azimuth: f64, pitch: f64) -> Self {
        Self {
            id: id.into(),
            azimuth,
            pitch,
            orientation: None,
        }
    }
}

/// A roof referenced by the layout, with or without a plane record.
#[derive(Debug, Clone, PartialEq)]
pub struct RoofSlot {
    pub id: String,
    pub plane: Option<RoofPlane>,
    /// Indices of the panels on this roof, in input order.
    pub panels: Vec<usize>,
}

/// Validated arena of panels and roofs.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    panels: Vec<Panel>,
    roofs: Vec<RoofSlot>,
    panel_roof: Vec<usize>,
    index_by_id: HashMap<String, usize>,
}

impl Layout {
    /// Builds the arena from raw panels and roof-plane records.
    ///
    /// Roofs are ordered as the plane records are given, followed by roofs
    /// that only appear on panels (first appearance). Roof planes without
    /// any panel are kept so grouping stays stable, but they never hold a
    /// string.
    ///
    /// # Errors
    ///
    /// Returns [`StringingError::Layout`] for an empty panel list, duplicate
    /// panel or roof ids, and non-finite coordinates or angles.
    pub fn new(panels: Vec<Panel>, roof_planes: Vec<RoofPlane>) -> Result<Self> {
        if panels.is_empty() {
            return Err(StringingError::Layout("no panels in layout".to_string()));
        }

        let mut roofs: Vec<RoofSlot> = Vec::new();
        let mut roof_index: HashMap<String, usize> = HashMap::new();
        for plane in roof_planes {
            if !plane.azimuth.is_finite() || !plane.pitch.is_finite() {
                return Err(StringingError::Layout(format!(
                    "roof plane {} has a non-finite azimuth or pitch",
                    plane.id
                )));
            }
            if roof_index.contains_key(&plane.id) {
                return Err(StringingError::Layout(format!(
                    "duplicate roof plane id {}",
                    plane.id
                )));
            }
            roof_index.insert(plane.id.clone(), roofs.len());
            roofs.push(RoofSlot {
                id: plane.id.clone(),
                plane: Some(plane),
                panels: Vec::new(),
            });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut panel_roof = Vec::with_capacity(panels.len());
        let mut index_by_id = HashMap::with_capacity(panels.len());
        for (idx, panel) in panels.iter().enumerate() {
            if !seen.insert(panel.id.as_str()) {
                return Err(StringingError::Layout(format!(
                    "duplicate panel id {}",
                    panel.id
                )));
            }
            if !panel.center.x.is_finite() || !panel.center.y.is_finite() {
                return Err(StringingError::Layout(format!(
                    "panel {} has non-finite coordinates",
                    panel.id
                )));
            }
            let roof = match roof_index.get(&panel.roof_plane_id) {
                Some(&r) => r,
                None => {
                    let r = roofs.len();
                    roof_index.insert(panel.roof_plane_id.clone(), r);
                    roofs.push(RoofSlot {
                        id: panel.roof_plane_id.clone(),
                        plane: None,
                        panels: Vec::new(),
                    });
                    r
                }
            };
            roofs[roof].panels.push(idx);
            panel_roof.push(roof);
            index_by_id.insert(panel.id.clone(), idx);
        }

        Ok(Self {
            panels,
            roofs,
            panel_roof,
            index_by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, idx: usize) -> &Panel {
        &self.panels[idx]
    }

    pub fn roofs(&self) -> &[RoofSlot] {
        &self.roofs
    }

    pub fn roof(&self, roof: usize) -> &RoofSlot {
        &self.roofs[roof]
    }

    /// Roof index of the panel at `idx`.
    pub fn roof_of(&self, idx: usize) -> usize {
        self.panel_roof[idx]
    }

    /// Arena index of the panel with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// Distance between two panel centres.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.panels[a].center.distance(&self.panels[b].center)
    }

    /// Orders panels by id, the tie-break used throughout stringing.
    pub fn cmp_ids(&self, a: usize, b: usize) -> Ordering {
        self.panels[a].id.cmp(&self.panels[b].id)
    }

    /// Converts arena indices to panel ids.
    pub fn ids(&self, indices: &[usize]) -> Vec<String> {
        indices.iter().map(|&i| self.panels[i].id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roofs_follow_plane_order_then_panel_order() {
        let layout = Layout::new(
            vec![
                Panel::new("a", "orphan", 0.0, 0.0),
                Panel::new("b", "r2", 1.0, 0.0),
                Panel::new("c", "r1", 2.0, 0.0),
            ],
            vec![RoofPlane::new("r1", 180.0, 30.0), RoofPlane::new("r2", 90.0, 20.0)],
        )
        .unwrap();
        let ids: Vec<&str> = layout.roofs().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "orphan"]);
        assert!(layout.roof(2).plane.is_none());
        assert_eq!(layout.roof_of(0), 2);
        assert_eq!(layout.roof(0).panels, vec![2]);
    }

    #[test]
    fn empty_layout_rejected() {
        let err = Layout::new(vec![], vec![]).unwrap_err();
        assert!(matches!(err, StringingError::Layout(_)));
    }

    #[test]
    fn duplicate_panel_id_rejected() {
        let err = Layout::new(
            vec![Panel::new("a", "r", 0.0, 0.0), Panel::new("a", "r", 1.0, 0.0)],
            vec![],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate panel id a"));
    }

    #[test]
    fn duplicate_roof_id_rejected() {
        let err = Layout::new(
            vec![Panel::new("a", "r", 0.0, 0.0)],
            vec![RoofPlane::new("r", 0.0, 0.0), RoofPlane::new("r", 10.0, 0.0)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate roof plane id r"));
    }

    #[test]
    fn non_finite_coordinates_rejected() {
        let err = Layout::new(vec![Panel::new("a", "r", f64::NAN, 0.0)], vec![]).unwrap_err();
        assert!(matches!(err, StringingError::Layout(_)));
    }

    #[test]
    fn distance_and_lookup() {
        let layout = Layout::new(
            vec![Panel::new("a", "r", 0.0, 0.0), Panel::new("b", "r", 3.0, 4.0)],
            vec![],
        )
        .unwrap();
        assert_eq!(layout.index_of("b"), Some(1));
        assert_eq!(layout.index_of("z"), None);
        assert!((layout.distance(0, 1) - 5.0).abs() < 1e-12);
        assert_eq!(layout.cmp_ids(0, 1), Ordering::Less);
        assert_eq!(layout.ids(&[1, 0]), vec!["b".to_string(), "a".to_string()]);
    }
}
