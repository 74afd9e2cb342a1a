//! Electrical datasheets and site temperature extremes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StringingError};

/// Fractional Voc change per °C for crystalline silicon.
pub const DEFAULT_TEMP_COEFF_VOC: f64 = -0.00279;
/// Fractional Vmpp change per °C for crystalline silicon.
pub const DEFAULT_TEMP_COEFF_VMPP: f64 = -0.00446;

/// Panel datasheet values at Standard Test Conditions.
///
/// One model is shared by every panel of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSpecs {
    /// Open-circuit voltage (V).
    pub voc: f64,
    /// Short-circuit current (A).
    pub isc: f64,
    /// Max-power-point voltage (V).
    pub vmp: f64,
    /// Max-power-point current (A).
    pub imp: f64,
    /// Voc change as a fraction per °C (negative for silicon).
    #[serde(default = "default_coeff_voc")]
    pub temp_coeff_voc: f64,
    /// Vmpp change as a fraction per °C (negative for silicon).
    #[serde(default = "default_coeff_vmpp")]
    pub temp_coeff_vmpp: f64,
}

fn default_coeff_voc() -> f64 {
    DEFAULT_TEMP_COEFF_VOC
}

fn default_coeff_vmpp() -> f64 {
    DEFAULT_TEMP_COEFF_VMPP
}

impl PanelSpecs {
    /// Creates panel specs with the default silicon temperature coefficients.
    pub fn new(voc: f64, isc: f64, vmp: f64, imp: f64) -> Self {
        Self {
            voc,
            isc,
            vmp,
            imp,
            temp_coeff_voc: DEFAULT_TEMP_COEFF_VOC,
            temp_coeff_vmpp: DEFAULT_TEMP_COEFF_VMPP,
        }
    }

    /// Checks that every rating is a finite positive number.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("panel.voc", self.voc),
            ("panel.isc", self.isc),
            ("panel.vmp", self.vmp),
            ("panel.imp", self.imp),
        ] {
            require_positive(field, value)?;
        }
        for (field, value) in [
            ("panel.temp_coeff_voc", self.temp_coeff_voc),
            ("panel.temp_coeff_vmpp", self.temp_coeff_vmpp),
        ] {
            if !value.is_finite() {
                return Err(StringingError::config(field, "must be finite"));
            }
        }
        if self.vmp > self.voc {
            return Err(StringingError::config("panel.vmp", "must be <= panel.voc"));
        }
        Ok(())
    }
}

/// Inverter datasheet, used as a template for every inverter instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InverterSpecs {
    /// Optional model name, echoed in reports.
    #[serde(default)]
    pub model: Option<String>,
    /// Absolute DC input voltage limit (V).
    pub max_dc_input_voltage: f64,
    /// MPPT inputs per inverter instance.
    pub number_of_mppts: usize,
    /// Voltage needed for the inverter to start (V).
    pub start_up_voltage: f64,
    /// Usable DC current per MPPT (A).
    pub max_dc_input_current_per_mppt: f64,
    /// Usable DC current per string (A).
    pub max_dc_input_current_per_string: f64,
    /// Lower bound of the MPPT operating window (V).
    pub mppt_operating_voltage_min_range: f64,
    /// Upper bound of the MPPT operating window (V).
    pub mppt_operating_voltage_max_range: f64,
    /// Short-circuit current limit per MPPT (A).
    #[serde(default)]
    pub max_short_circuit_current_per_mppt: Option<f64>,
    /// Rated AC output power (W).
    pub rated_ac_power_w: f64,
}

impl InverterSpecs {
    /// Short-circuit limit per MPPT, falling back to 1.5x the usable current.
    pub fn short_circuit_limit_per_mppt(&self) -> f64 {
        self.max_short_circuit_current_per_mppt
            .unwrap_or(self.max_dc_input_current_per_mppt * 1.5)
    }

    /// Returns `true` when `voltage` lies inside the MPPT operating window.
    pub fn in_mppt_window(&self, voltage: f64) -> bool {
        voltage >= self.mppt_operating_voltage_min_range
            && voltage <= self.mppt_operating_voltage_max_range
    }

    /// Checks that the datasheet is physically consistent.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("inverter.max_dc_input_voltage", self.max_dc_input_voltage),
            ("inverter.start_up_voltage", self.start_up_voltage),
            (
                "inverter.max_dc_input_current_per_mppt",
                self.max_dc_input_current_per_mppt,
            ),
            (
                "inverter.max_dc_input_current_per_string",
                self.max_dc_input_current_per_string,
            ),
            (
                "inverter.mppt_operating_voltage_min_range",
                self.mppt_operating_voltage_min_range,
            ),
            (
                "inverter.mppt_operating_voltage_max_range",
                self.mppt_operating_voltage_max_range,
            ),
            ("inverter.rated_ac_power_w", self.rated_ac_power_w),
        ] {
            require_positive(field, value)?;
        }
        if let Some(limit) = self.max_short_circuit_current_per_mppt {
            require_positive("inverter.max_short_circuit_current_per_mppt", limit)?;
        }
        if self.number_of_mppts == 0 {
            return Err(StringingError::config(
                "inverter.number_of_mppts",
                "must be > 0",
            ));
        }
        if self.mppt_operating_voltage_min_range > self.mppt_operating_voltage_max_range {
            return Err(StringingError::config(
                "inverter.mppt_operating_voltage_min_range",
                "must be <= inverter.mppt_operating_voltage_max_range",
            ));
        }
        if self.mppt_operating_voltage_max_range > self.max_dc_input_voltage {
            return Err(StringingError::config(
                "inverter.mppt_operating_voltage_max_range",
                "must be <= inverter.max_dc_input_voltage",
            ));
        }
        Ok(())
    }
}

/// Recorded ambient temperature extremes for one site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureData {
    /// Lowest recorded temperature (°C); drives the cold Voc limit.
    pub min_recorded_temp_c: f64,
    /// Highest recorded temperature (°C); drives the hot Vmpp limit.
    pub max_recorded_temp_c: f64,
}

/// Fallback record extremes keyed by lower-case state name or postal code.
const STATE_EXTREMES: &[(&str, &str, f64, f64)] = &[
    ("california", "ca", -42.8, 56.7),
    ("texas", "tx", -23.3, 48.9),
    ("florida", "fl", -18.9, 43.3),
    ("new york", "ny", -37.2, 42.2),
    ("arizona", "az", -25.6, 53.3),
];

impl TemperatureData {
    /// Creates temperature extremes from recorded minimum and maximum.
    pub fn new(min_recorded_temp_c: f64, max_recorded_temp_c: f64) -> Self {
        Self {
            min_recorded_temp_c,
            max_recorded_temp_c,
        }
    }

    /// Looks up the built-in record extremes for a US state.
    ///
    /// Accepts full names or postal codes, case-insensitively. Returns
    /// `None` for states without a built-in record.
    pub fn for_state(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        STATE_EXTREMES
            .iter()
            .find(|(full, code, _, _)| *full == key || *code == key)
            .map(|&(_, _, min, max)| Self::new(min, max))
    }

    /// Checks that both extremes are present and ordered.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for non-finite or inverted extremes.
    pub fn validate(&self) -> Result<()> {
        if !self.min_recorded_temp_c.is_finite() {
            return Err(StringingError::config(
                "temperature.min_recorded_temp_c",
                "must be a finite number",
            ));
        }
        if !self.max_recorded_temp_c.is_finite() {
            return Err(StringingError::config(
                "temperature.max_recorded_temp_c",
                "must be a finite number",
            ));
        }
        if self.min_recorded_temp_c > self.max_recorded_temp_c {
            return Err(StringingError::config(
                "temperature.min_recorded_temp_c",
                "must be <= temperature.max_recorded_temp_c",
            ));
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(StringingError::config(field, "must be a finite number > 0"))
    }
}
