//! First-fit packing of strings onto MPPT inputs.

use tracing::debug;

use crate::decision::{DecisionLog, Phase};
use crate::electrical::ElectricalModel;

/// What the packer needs to know about one string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringKey {
    pub merge_group: usize,
    pub panel_count: usize,
}

/// Strings sharing one MPPT input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpptSlot {
    pub merge_group: usize,
    pub panel_count: usize,
    /// Indices into the packed string list, in arrival order.
    pub strings: Vec<usize>,
}

/// Packs strings onto MPPTs in order, without backtracking.
///
/// A string joins the first MPPT holding strings of its merge group and
/// length when the summed operating current, the summed safety current and,
/// if given, the summed power stay within limits and the shared voltage fits
/// the MPPT window. Otherwise it opens a new MPPT.
pub fn assign_strings(
    strings: &[StringKey],
    model: &ElectricalModel<'_>,
    power_ceiling_w: Option<f64>,
    log: &mut DecisionLog,
) -> Vec<MpptSlot> {
    let inverter = model.inverter;
    let sc_limit = inverter.short_circuit_limit_per_mppt();
    let mut slots: Vec<MpptSlot> = Vec::new();

    for (idx, key) in strings.iter().enumerate() {
        let props = model.string_properties(key.panel_count);
        let fits = |slot: &MpptSlot| {
            let k = (slot.strings.len() + 1) as f64;
            slot.merge_group == key.merge_group
                && slot.panel_count == key.panel_count
                && k * props.operating_current <= inverter.max_dc_input_current_per_mppt
                && k * props.safety_current <= sc_limit
                && inverter.in_mppt_window(props.operating_voltage)
                && power_ceiling_w.is_none_or(|c| k * props.power_w <= c)
        };

        match slots.iter().position(fits) {
            Some(s) => {
                slots[s].strings.push(idx);
                log.accept(
                    Phase::Mppt,
                    format!(
                        "string {} parallel on MPPT {} ({} strings)",
                        idx + 1,
                        s + 1,
                        slots[s].strings.len()
                    ),
                );
            }
            None => {
                slots.push(MpptSlot {
                    merge_group: key.merge_group,
                    panel_count: key.panel_count,
                    strings: vec![idx],
                });
                log.accept(
                    Phase::Mppt,
                    format!("string {} opens MPPT {}", idx + 1, slots.len()),
                );
            }
        }
    }

    debug!(strings = strings.len(), mppts = slots.len(), "strings packed onto MPPTs");
    slots
}
