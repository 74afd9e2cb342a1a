//! Run summary and its console rendering.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::stringing::stragglers::StragglerWarning;
use crate::wiring::{Inverter, Mppt, PvString};

/// Headline figures of one optimisation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_panels: usize,
    pub stringed_panels: usize,
    pub straggler_panels: usize,
    pub total_strings: usize,
    pub total_mppts: usize,
    pub total_inverters: usize,
    pub unassigned_mppts: usize,
    /// Stringed panels as a percentage of all panels.
    pub stringing_efficiency_pct: f64,
    /// DC power of all stringed panels (W).
    pub total_dc_power_w: f64,
    /// String length to number of strings with that length.
    pub string_lengths: BTreeMap<usize, usize>,
    /// String ids of every MPPT that holds more than one string.
    pub parallel_groups: Vec<Vec<String>>,
}

impl Summary {
    pub fn new(
        total_panels: usize,
        strings: &[PvString],
        mppts: &[Mppt],
        inverters: &[Inverter],
        unassigned_mppts: usize,
        stragglers: &[StragglerWarning],
    ) -> Self {
        let stringed_panels: usize = strings.iter().map(PvString::len).sum();
        let mut string_lengths = BTreeMap::new();
        for s in strings {
            *string_lengths.entry(s.len()).or_insert(0) += 1;
        }
        let stringing_efficiency_pct = if total_panels == 0 {
            0.0
        } else {
            stringed_panels as f64 / total_panels as f64 * 100.0
        };
        Self {
            total_panels,
            stringed_panels,
            straggler_panels: stragglers.iter().map(|w| w.panel_count).sum(),
            total_strings: strings.len(),
            total_mppts: mppts.len(),
            total_inverters: inverters.len(),
            unassigned_mppts,
            stringing_efficiency_pct,
            total_dc_power_w: strings.iter().map(|s| s.properties.power_w).sum(),
            string_lengths,
            parallel_groups: mppts
                .iter()
                .filter(|m| m.string_ids.len() > 1)
                .map(|m| m.string_ids.clone())
                .collect(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Stringing Summary ---")?;
        writeln!(
            f,
            "Panels stringed:       {} / {} ({:.1}%)",
            self.stringed_panels, self.total_panels, self.stringing_efficiency_pct
        )?;
        writeln!(f, "Straggler panels:      {}", self.straggler_panels)?;
        let lengths: Vec<String> = self
            .string_lengths
            .iter()
            .map(|(len, count)| format!("{count}x{len}"))
            .collect();
        writeln!(
            f,
            "Strings:               {} [{}]",
            self.total_strings,
            lengths.join(", ")
        )?;
        writeln!(
            f,
            "MPPTs:                 {} ({} with parallel strings)",
            self.total_mppts,
            self.parallel_groups.len()
        )?;
        writeln!(f, "Inverters:             {}", self.total_inverters)?;
        if self.unassigned_mppts > 0 {
            writeln!(f, "Unassigned MPPTs:      {}", self.unassigned_mppts)?;
        }
        write!(f, "DC power:              {:.2} kW", self.total_dc_power_w / 1000.0)
    }
}
