//! Temperature-adjusted panel voltages.
//!
//! Panel voltage falls as cells heat up. The highest voltage a string ever
//! sees is its open-circuit voltage on the coldest recorded day; the lowest
//! operating voltage is its max-power-point voltage on the hottest day.

use serde::Serialize;

use crate::error::{Result, StringingError};
use crate::model::{PanelSpecs, TemperatureData};

/// Reference cell temperature of the datasheet ratings (°C).
pub const STC_TEMP_C: f64 = 25.0;

/// Per-panel values at the site's temperature extremes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustedVoltages {
    /// Voc at the minimum recorded temperature (V).
    pub cold_voc: f64,
    /// Vmpp at the maximum recorded temperature (V).
    pub hot_vmpp: f64,
    /// Hot Vmpp × Imp (W).
    pub power_per_panel: f64,
}

/// Open-circuit voltage at `temp_c`.
pub fn voc_at(panel: &PanelSpecs, temp_c: f64) -> f64 {
    panel.voc * (1.0 + panel.temp_coeff_voc * (temp_c - STC_TEMP_C))
}

/// Max-power-point voltage at `temp_c`.
pub fn vmpp_at(panel: &PanelSpecs, temp_c: f64) -> f64 {
    panel.vmp * (1.0 + panel.temp_coeff_vmpp * (temp_c - STC_TEMP_C))
}

/// Computes cold Voc, hot Vmpp and per-panel power for a site.
///
/// # Errors
///
/// Returns a configuration error when the specs or temperatures are invalid,
/// or when the coefficients drive a voltage to zero or below.
pub fn adjusted_voltages(
    panel: &PanelSpecs,
    temperature: &TemperatureData,
) -> Result<AdjustedVoltages> {
    panel.validate()?;
    temperature.validate()?;

    let cold_voc = voc_at(panel, temperature.min_recorded_temp_c);
    let hot_vmpp = vmpp_at(panel, temperature.max_recorded_temp_c);
    if !(cold_voc.is_finite() && cold_voc > 0.0) {
        return Err(StringingError::config(
            "panel.temp_coeff_voc",
            format!("cold Voc evaluates to {cold_voc:.3} V"),
        ));
    }
    if !(hot_vmpp.is_finite() && hot_vmpp > 0.0) {
        return Err(StringingError::config(
            "panel.temp_coeff_vmpp",
            format!("hot Vmpp evaluates to {hot_vmpp:.3} V"),
        ));
    }

    Ok(AdjustedVoltages {
        cold_voc,
        hot_vmpp,
        power_per_panel: hot_vmpp * panel.imp,
    })
}
