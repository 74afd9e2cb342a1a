//! TOML-based optimizer configuration and preset definitions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level optimizer configuration parsed from TOML.
///
/// All fields have defaults matching the `default` preset. Load from TOML
/// with [`OptimizerConfig::from_toml_file`] or start from
/// [`OptimizerConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Roof-plane similarity tolerances.
    #[serde(default)]
    pub grouping: GroupingConfig,
    /// Proximity clustering and chaining distances.
    #[serde(default)]
    pub clustering: ClusteringConfig,
    /// DC/AC ratio bands.
    #[serde(default)]
    pub ratio: RatioConfig,
    /// Electrical safety margins.
    #[serde(default)]
    pub safety: SafetyConfig,
}

/// Roof-plane similarity tolerances.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupingConfig {
    /// Maximum azimuth difference (degrees, circular) for similar roofs.
    pub azimuth_tolerance_deg: f64,
    /// Maximum pitch difference (degrees) for similar roofs.
    pub pitch_tolerance_deg: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            azimuth_tolerance_deg: 5.0,
            pitch_tolerance_deg: 3.0,
        }
    }
}

/// Proximity clustering and chaining distances.
///
/// Both factors scale the median nearest-neighbour distance of a roof, so
/// they are unit-free and work for pixel or metre coordinates alike.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Cluster link threshold as a multiple of the median neighbour distance.
    pub gap_factor: f64,
    /// Chaining radius as a multiple of the cluster link threshold.
    pub chain_radius_factor: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            gap_factor: 2.0,
            chain_radius_factor: 1.5,
        }
    }
}

/// DC/AC ratio bands used for inverter status and power-aware sizing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatioConfig {
    /// Ratios below this are `UNDERSIZED`.
    pub undersized_below: f64,
    /// Lower bound (inclusive) of the optimal band.
    pub optimal_min: f64,
    /// Upper bound (inclusive) of the optimal band; also the power-aware ceiling.
    pub optimal_max: f64,
    /// Ratios above this are `OVERSIZED`.
    pub oversized_above: f64,
    /// Ratio used when recommending an inverter size.
    pub target: f64,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            undersized_below: 1.0,
            optimal_min: 1.1,
            optimal_max: 1.3,
            oversized_above: 1.5,
            target: 1.25,
        }
    }
}

/// Electrical safety margins.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SafetyConfig {
    /// Multiplier applied to Isc before comparing against MPPT limits.
    pub isc_safety_factor: f64,
    /// Absolute lower bound on panels per string.
    pub hard_min_panels: usize,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            isc_safety_factor: 1.25,
            hard_min_panels: 3,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"grouping.azimuth_tolerance_deg"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl OptimizerConfig {
    /// Tighter roof grouping and shorter chaining reach.
    pub fn tight() -> Self {
        Self {
            grouping: GroupingConfig {
                azimuth_tolerance_deg: 2.0,
                pitch_tolerance_deg: 1.0,
            },
            clustering: ClusteringConfig {
                gap_factor: 1.6,
                chain_radius_factor: 1.2,
            },
            ..Self::default()
        }
    }

    /// Looser roof grouping for irregular layouts.
    pub fn loose() -> Self {
        Self {
            grouping: GroupingConfig {
                azimuth_tolerance_deg: 15.0,
                pitch_tolerance_deg: 8.0,
            },
            clustering: ClusteringConfig {
                gap_factor: 3.0,
                chain_radius_factor: 1.5,
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "tight", "loose"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default()),
            "tight" => Ok(Self::tight()),
            "loose" => Ok(Self::loose()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let g = &self.grouping;
        if !(g.azimuth_tolerance_deg >= 0.0 && g.azimuth_tolerance_deg <= 180.0) {
            errors.push(ConfigError::new(
                "grouping.azimuth_tolerance_deg",
                "must be in [0, 180]",
            ));
        }
        if !(g.pitch_tolerance_deg >= 0.0 && g.pitch_tolerance_deg <= 90.0) {
            errors.push(ConfigError::new(
                "grouping.pitch_tolerance_deg",
                "must be in [0, 90]",
            ));
        }

        let c = &self.clustering;
        if !(c.gap_factor >= 1.0 && c.gap_factor.is_finite()) {
            errors.push(ConfigError::new("clustering.gap_factor", "must be >= 1.0"));
        }
        if !(c.chain_radius_factor >= 1.0 && c.chain_radius_factor.is_finite()) {
            errors.push(ConfigError::new(
                "clustering.chain_radius_factor",
                "must be >= 1.0",
            ));
        }

        let r = &self.ratio;
        let ordered = r.undersized_below > 0.0
            && r.undersized_below <= r.optimal_min
            && r.optimal_min <= r.optimal_max
            && r.optimal_max <= r.oversized_above;
        if !ordered {
            errors.push(ConfigError::new(
                "ratio",
                "must satisfy 0 < undersized_below <= optimal_min <= optimal_max <= oversized_above",
            ));
        }
        if !(r.target > 0.0 && r.target.is_finite()) {
            errors.push(ConfigError::new("ratio.target", "must be > 0"));
        }

        let s = &self.safety;
        if !(s.isc_safety_factor >= 1.0 && s.isc_safety_factor.is_finite()) {
            errors.push(ConfigError::new(
                "safety.isc_safety_factor",
                "must be >= 1.0",
            ));
        }
        if s.hard_min_panels == 0 {
            errors.push(ConfigError::new("safety.hard_min_panels", "must be > 0"));
        }

        errors
    }
}
