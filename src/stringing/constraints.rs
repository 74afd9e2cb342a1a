//! Panels-per-string limits derived from the inverter window.

use serde::Serialize;
use tracing::debug;

use crate::config::OptimizerConfig;
use crate::error::{Result, StringingError};
use crate::model::InverterSpecs;
use crate::stringing::temperature::AdjustedVoltages;

/// Slack for floor/ceil so that exact ratios are not lost to rounding.
const EPS: f64 = 1e-9;

/// Series-length bounds for one project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StringLimits {
    /// Fewest panels that reach the start-up voltage on a hot day.
    pub min_panels: usize,
    /// Most panels that stay under the DC input limit on a cold day.
    pub max_panels: usize,
    /// Most panels whose hot operating voltage fits the MPPT window.
    pub mppt_max_panels: usize,
    /// Most panels per string under the DC/AC ceiling, when power-aware.
    pub power_max_panels: Option<usize>,
    /// Target string length used by the builder.
    pub ideal_panels: usize,
    /// Target length from the MPPT window alone, before any power cap.
    pub voltage_ideal_panels: usize,
    /// Set when the power cap shortened the target length.
    pub power_capped: bool,
    pub cold_voc: f64,
    pub hot_vmpp: f64,
    pub power_per_panel: f64,
}

impl StringLimits {
    /// Longest string any growth pass may produce.
    pub fn upper(&self) -> usize {
        let mut upper = self.max_panels.min(self.mppt_max_panels);
        if let Some(cap) = self.power_max_panels {
            upper = upper.min(cap);
        }
        upper.max(self.min_panels)
    }

    /// Returns `true` when a string of `len` panels is within bounds.
    pub fn admits(&self, len: usize) -> bool {
        len >= self.min_panels && len <= self.upper()
    }
}

/// Derives the string-length bounds.
///
/// `validate_power` additionally caps the target length so one string stays
/// under `rated_ac_power_w × ratio.optimal_max`.
///
/// # Errors
///
/// Returns [`StringingError::Incompatible`] when the start-up minimum exceeds
/// either voltage maximum.
pub fn derive_limits(
    voltages: &AdjustedVoltages,
    inverter: &InverterSpecs,
    config: &OptimizerConfig,
    validate_power: bool,
) -> Result<StringLimits> {
    let AdjustedVoltages {
        cold_voc,
        hot_vmpp,
        power_per_panel,
    } = *voltages;

    let startup_panels = (inverter.start_up_voltage / hot_vmpp - EPS).ceil().max(0.0) as usize;
    let min_panels = startup_panels.max(config.safety.hard_min_panels);
    let max_panels = (inverter.max_dc_input_voltage / cold_voc + EPS).floor() as usize;
    let mppt_max_panels = (inverter.mppt_operating_voltage_max_range / hot_vmpp + EPS).floor() as usize;

    if min_panels > max_panels {
        return Err(StringingError::Incompatible {
            min_panels,
            max_panels,
            reason: format!(
                "start-up voltage {:.1} V needs {} panels but max DC input {:.1} V allows {}",
                inverter.start_up_voltage, min_panels, inverter.max_dc_input_voltage, max_panels
            ),
        });
    }
    if min_panels > mppt_max_panels {
        return Err(StringingError::Incompatible {
            min_panels,
            max_panels: mppt_max_panels,
            reason: format!(
                "MPPT window tops out at {:.1} V, {} panels",
                inverter.mppt_operating_voltage_max_range, mppt_max_panels
            ),
        });
    }

    let mut limits = StringLimits {
        min_panels,
        max_panels,
        mppt_max_panels,
        power_max_panels: None,
        ideal_panels: min_panels,
        voltage_ideal_panels: min_panels,
        power_capped: false,
        cold_voc,
        hot_vmpp,
        power_per_panel,
    };

    let mid_window = (inverter.mppt_operating_voltage_min_range
        + inverter.mppt_operating_voltage_max_range)
        / 2.0;
    let voltage_ideal = ((mid_window / hot_vmpp).round() as usize).clamp(min_panels, limits.upper());
    limits.voltage_ideal_panels = voltage_ideal;
    limits.ideal_panels = voltage_ideal;

    if validate_power {
        let ceiling_w = inverter.rated_ac_power_w * config.ratio.optimal_max;
        let cap = (ceiling_w / power_per_panel + EPS).floor() as usize;
        limits.power_max_panels = Some(cap);
        limits.ideal_panels = voltage_ideal.min(cap).clamp(min_panels, limits.upper());
        limits.power_capped = limits.ideal_panels < voltage_ideal;
    }

    debug!(
        min = limits.min_panels,
        max = limits.max_panels,
        mppt_max = limits.mppt_max_panels,
        ideal = limits.ideal_panels,
        power_capped = limits.power_capped,
        "string limits derived"
    );
    Ok(limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PanelSpecs, TemperatureData};
    use crate::stringing::temperature::adjusted_voltages;

    fn voltages() -> AdjustedVoltages {
        adjusted_voltages(
            &PanelSpecs::new(50.0, 10.0, 40.0, 9.5),
            &TemperatureData::new(-10.0, 45.0),
        )
        .unwrap()
    }

    fn inverter() -> InverterSpecs {
        InverterSpecs {
            model: None,
            max_dc_input_voltage: 600.0,
            number_of_mppts: 2,
            start_up_voltage: 100.0,
            max_dc_input_current_per_mppt: 20.0,
            max_dc_input_current_per_string: 12.0,
            mppt_operating_voltage_min_range: 100.0,
            mppt_operating_voltage_max_range: 480.0,
            max_short_circuit_current_per_mppt: None,
            rated_ac_power_w: 5000.0,
        }
    }

    #[test]
    fn voltage_limits() {
        let l = derive_limits(&voltages(), &inverter(), &OptimizerConfig::default(), false).unwrap();
        assert_eq!(l.min_panels, 3);
        assert_eq!(l.max_panels, 10);
        assert_eq!(l.mppt_max_panels, 13);
        assert_eq!(l.upper(), 10);
        assert_eq!(l.ideal_panels, 8);
        assert_eq!(l.voltage_ideal_panels, 8);
        assert!(!l.power_capped);
        assert_eq!(l.power_max_panels, None);
    }

    #[test]
    fn startup_voltage_raises_minimum() {
        let mut inv = inverter();
        inv.start_up_voltage = 200.0;
        let l = derive_limits(&voltages(), &inv, &OptimizerConfig::default(), false).unwrap();
        // 200 / 36.432 = 5.49
        assert_eq!(l.min_panels, 6);
        assert!(l.admits(6));
        assert!(!l.admits(5));
    }

    #[test]
    fn startup_above_max_is_incompatible() {
        let mut inv = inverter();
        inv.start_up_voltage = 400.0;
        let err = derive_limits(&voltages(), &inv, &OptimizerConfig::default(), false).unwrap_err();
        assert!(matches!(
            err,
            StringingError::Incompatible {
                min_panels: 11,
                max_panels: 10,
                ..
            }
        ));
        assert!(err.to_string().contains("start-up voltage"));
    }

    #[test]
    fn narrow_mppt_window_is_incompatible() {
        let mut inv = inverter();
        inv.mppt_operating_voltage_max_range = 250.0;
        inv.start_up_voltage = 260.0;
        let err = derive_limits(&voltages(), &inv, &OptimizerConfig::default(), false).unwrap_err();
        assert!(matches!(
            err,
            StringingError::Incompatible {
                min_panels: 8,
                max_panels: 6,
                ..
            }
        ));
    }

    #[test]
    fn power_cap_shrinks_ideal() {
        let mut inv = inverter();
        inv.rated_ac_power_w = 1200.0;
        let l = derive_limits(&voltages(), &inv, &OptimizerConfig::default(), true).unwrap();
        // 1200 * 1.3 / 346.104 = 4.5
        assert_eq!(l.power_max_panels, Some(4));
        assert_eq!(l.ideal_panels, 4);
        assert_eq!(l.voltage_ideal_panels, 8);
        assert_eq!(l.upper(), 4);
        assert!(l.power_capped);
    }

    #[test]
    fn power_cap_never_drops_below_minimum() {
        let mut inv = inverter();
        inv.rated_ac_power_w = 500.0;
        let l = derive_limits(&voltages(), &inv, &OptimizerConfig::default(), true).unwrap();
        assert_eq!(l.ideal_panels, 3);
        assert_eq!(l.upper(), 3);
    }

    #[test]
    fn generous_inverter_is_not_capped() {
        let l = derive_limits(&voltages(), &inverter(), &OptimizerConfig::default(), true).unwrap();
        assert_eq!(l.ideal_panels, 8);
        assert!(!l.power_capped);
    }
}
