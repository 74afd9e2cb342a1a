//! Electrical properties of strings, MPPTs and inverters.
//!
//! All figures use the temperature-adjusted voltages: operating values at the
//! hottest recorded temperature, maximum voltage at the coldest.

use serde::Serialize;

use crate::config::{RatioConfig, SafetyConfig};
use crate::model::{InverterSpecs, PanelSpecs};
use crate::stringing::constraints::StringLimits;

/// DC/AC ratio classification of an inverter or a whole system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SizingStatus {
    Optimal,
    Acceptable,
    Undersized,
    Oversized,
}

/// Classifies a DC/AC ratio against the configured bands.
///
/// The optimal band is checked first; anything else inside
/// `[undersized_below, oversized_above]` is acceptable.
pub fn classify_ratio(ratio: f64, bands: &RatioConfig) -> SizingStatus {
    if ratio >= bands.optimal_min && ratio <= bands.optimal_max {
        SizingStatus::Optimal
    } else if ratio < bands.undersized_below {
        SizingStatus::Undersized
    } else if ratio > bands.oversized_above {
        SizingStatus::Oversized
    } else {
        SizingStatus::Acceptable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StringProperties {
    pub panel_count: usize,
    /// Hot Vmpp × panels (V).
    pub operating_voltage: f64,
    /// Cold Voc × panels (V).
    pub max_voltage: f64,
    /// Imp (A).
    pub operating_current: f64,
    /// Isc × safety factor (A).
    pub safety_current: f64,
    pub power_w: f64,
    /// Imp exceeds the inverter's per-string current limit.
    pub will_clip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MpptProperties {
    pub string_count: usize,
    pub operating_voltage: f64,
    pub max_voltage: f64,
    pub operating_current: f64,
    pub safety_current: f64,
    pub power_w: f64,
    /// Hot voltage inside the MPPT window and cold voltage under the DC limit.
    pub within_range: bool,
    /// Summed current exceeds the per-MPPT limit.
    pub will_clip: bool,
    /// Summed safety current within the short-circuit limit.
    pub is_safe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InverterProperties {
    pub mppt_count: usize,
    pub dc_power_w: f64,
    pub rated_ac_power_w: f64,
    pub dc_ac_ratio: f64,
    pub status: SizingStatus,
    pub all_mppts_safe: bool,
    pub any_will_clip: bool,
    /// DC power does not exceed rated AC × the oversized bound.
    pub within_dc_power_limit: bool,
}

/// Derives properties from a project's specs and string limits.
#[derive(Debug, Clone, Copy)]
pub struct ElectricalModel<'a> {
    pub panel: &'a PanelSpecs,
    pub inverter: &'a InverterSpecs,
    pub limits: &'a StringLimits,
    pub safety: &'a SafetyConfig,
    pub ratio: &'a RatioConfig,
}

impl ElectricalModel<'_> {
    /// Safety current of a single string (A).
    pub fn string_safety_current(&self) -> f64 {
        self.panel.isc * self.safety.isc_safety_factor
    }

    pub fn string_properties(&self, panel_count: usize) -> StringProperties {
        let n = panel_count as f64;
        let operating_voltage = self.limits.hot_vmpp * n;
        StringProperties {
            panel_count,
            operating_voltage,
            max_voltage: self.limits.cold_voc * n,
            operating_current: self.panel.imp,
            safety_current: self.string_safety_current(),
            power_w: operating_voltage * self.panel.imp,
            will_clip: self.panel.imp > self.inverter.max_dc_input_current_per_string,
        }
    }

    pub fn mppt_properties(&self, strings: &[StringProperties]) -> MpptProperties {
        let operating_voltage = strings
            .iter()
            .map(|s| s.operating_voltage)
            .fold(0.0, f64::max);
        let max_voltage = strings.iter().map(|s| s.max_voltage).fold(0.0, f64::max);
        let operating_current: f64 = strings.iter().map(|s| s.operating_current).sum();
        let safety_current: f64 = strings.iter().map(|s| s.safety_current).sum();
        MpptProperties {
            string_count: strings.len(),
            operating_voltage,
            max_voltage,
            operating_current,
            safety_current,
            power_w: strings.iter().map(|s| s.power_w).sum(),
            within_range: self.inverter.in_mppt_window(operating_voltage)
                && max_voltage <= self.inverter.max_dc_input_voltage,
            will_clip: operating_current > self.inverter.max_dc_input_current_per_mppt,
            is_safe: safety_current <= self.inverter.short_circuit_limit_per_mppt(),
        }
    }

    pub fn inverter_properties(&self, mppts: &[MpptProperties]) -> InverterProperties {
        let dc_power_w: f64 = mppts.iter().map(|m| m.power_w).sum();
        let rated = self.inverter.rated_ac_power_w;
        let dc_ac_ratio = dc_power_w / rated;
        InverterProperties {
            mppt_count: mppts.len(),
            dc_power_w,
            rated_ac_power_w: rated,
            dc_ac_ratio,
            status: classify_ratio(dc_ac_ratio, self.ratio),
            all_mppts_safe: mppts.iter().all(|m| m.is_safe),
            any_will_clip: mppts.iter().any(|m| m.will_clip),
            within_dc_power_limit: dc_power_w <= rated * self.ratio.oversized_above,
        }
    }
}
