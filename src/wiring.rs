//! Finalised wiring plan: strings, MPPT inputs and inverter instances.
//!
//! Entities refer to each other by id so the plan serialises flat.

use serde::Serialize;

use crate::electrical::{InverterProperties, MpptProperties, StringProperties};

/// Series-connected panels, in connection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PvString {
    /// `s<n>`, numbered in build order.
    pub id: String,
    /// Roof the string was seeded on.
    pub roof_plane_id: String,
    pub merge_group: usize,
    pub panel_ids: Vec<String>,
    pub properties: StringProperties,
    pub mppt_id: Option<String>,
    pub inverter_id: Option<String>,
}

impl PvString {
    pub fn len(&self) -> usize {
        self.panel_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panel_ids.is_empty()
    }
}

/// One MPPT input with its parallel strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mppt {
    /// `mppt<n>`, numbered in assignment order.
    pub id: String,
    pub merge_group: usize,
    pub string_ids: Vec<String>,
    /// `None` when no inverter instance was left to host it.
    pub inverter_id: Option<String>,
    pub properties: MpptProperties,
}

/// One inverter instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inverter {
    /// `inv<n>`, numbered in assignment order.
    pub id: String,
    pub mppt_ids: Vec<String>,
    pub properties: InverterProperties,
}

pub(crate) fn string_id(n: usize) -> String {
    format!("s{}", n + 1)
}

pub(crate) fn mppt_id(n: usize) -> String {
    format!("mppt{}", n + 1)
}

pub(crate) fn inverter_id(n: usize) -> String {
    format!("inv{}", n + 1)
}
