//! Project JSON loader.
//!
//! Accepts the auto-design request shape: panels with pixel centres under
//! `autoDesign.solar_panels`, roof planes keyed by id under
//! `autoDesign.roof_planes`, camelCase datasheets, and either a `state` name
//! or explicit temperature extremes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::StringingError;
use crate::model::{InverterSpecs, Panel, PanelSpecs, Project, RoofPlane, TemperatureData};
use crate::model::specs::{DEFAULT_TEMP_COEFF_VMPP, DEFAULT_TEMP_COEFF_VOC};
use crate::optimizer::RunOptions;

/// State used when a request names neither a state nor temperatures.
pub const DEFAULT_STATE: &str = "California";

/// Failure to turn a project file into core inputs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed project JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] StringingError),
}

/// Panel or roof id given as a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Int(i64),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            IdValue::Text(s) => s,
            IdValue::Int(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PixCoords {
    c0: Option<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct PanelInput {
    panel_id: IdValue,
    roof_plane_id: IdValue,
    #[serde(default)]
    pix_coords: Option<PixCoords>,
}

#[derive(Debug, Deserialize)]
struct RoofPlaneInput {
    azimuth: f64,
    pitch: f64,
    #[serde(default)]
    orientation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AutoDesign {
    #[serde(default)]
    solar_panels: Vec<PanelInput>,
    #[serde(default)]
    roof_planes: BTreeMap<String, RoofPlaneInput>,
    #[serde(default)]
    auto_system_design: Option<Box<AutoDesign>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PanelSpecsInput {
    voc: f64,
    isc: f64,
    vmp: f64,
    imp: f64,
    #[serde(default = "coeff_voc", alias = "temp_coeff_voc")]
    temp_coeff_voc: f64,
    #[serde(default = "coeff_vmpp", alias = "temp_coeff_vmpp")]
    temp_coeff_vmpp: f64,
}

fn coeff_voc() -> f64 {
    DEFAULT_TEMP_COEFF_VOC
}

fn coeff_vmpp() -> f64 {
    DEFAULT_TEMP_COEFF_VMPP
}

#[derive(Debug, Deserialize)]
struct InverterSpecsInput {
    #[serde(default)]
    model: Option<String>,
    #[serde(rename = "maxDCInputVoltage", alias = "max_dc_input_voltage")]
    max_dc_input_voltage: f64,
    #[serde(rename = "numberOfMPPTs", alias = "number_of_mppts")]
    number_of_mppts: usize,
    #[serde(
        rename = "startUpVoltage",
        alias = "start_up_voltage",
        alias = "startup_voltage"
    )]
    start_up_voltage: f64,
    #[serde(
        rename = "maxDCInputCurrentPerMPPT",
        alias = "max_dc_input_current_per_mppt"
    )]
    max_dc_input_current_per_mppt: f64,
    #[serde(
        rename = "maxDCInputCurrentPerString",
        alias = "max_dc_input_current_per_string"
    )]
    max_dc_input_current_per_string: f64,
    #[serde(
        rename = "mpptOperatingVoltageMinRange",
        alias = "mppt_operating_voltage_min_range"
    )]
    mppt_operating_voltage_min_range: f64,
    #[serde(
        rename = "mpptOperatingVoltageMaxRange",
        alias = "mppt_operating_voltage_max_range"
    )]
    mppt_operating_voltage_max_range: f64,
    #[serde(
        default,
        rename = "maxShortCircuitCurrentPerMPPT",
        alias = "max_short_circuit_current_per_mppt"
    )]
    max_short_circuit_current_per_mppt: Option<f64>,
    #[serde(default, rename = "ratedACPowerW", alias = "rated_ac_power_w")]
    rated_ac_power_w: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TemperatureInput {
    #[serde(alias = "minRecordedTempC")]
    min_recorded_temp_c: f64,
    #[serde(alias = "maxRecordedTempC")]
    max_recorded_temp_c: f64,
}

#[derive(Debug, Deserialize)]
struct ProjectFile {
    #[serde(rename = "autoDesign", alias = "auto_design")]
    auto_design: AutoDesign,
    #[serde(rename = "solarPanelSpecs")]
    solar_panel_specs: PanelSpecsInput,
    #[serde(rename = "inverterSpecs")]
    inverter_specs: InverterSpecsInput,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    temperature: Option<TemperatureInput>,
    #[serde(default, alias = "validatePower")]
    validate_power: bool,
    #[serde(default, alias = "overrideInvQuantity")]
    override_inv_quantity: bool,
    #[serde(default, alias = "inverterQuantity")]
    inverter_quantity: Option<u32>,
    #[serde(default, alias = "outputFrontend")]
    output_frontend: bool,
}

/// Reads and converts a project file.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be read, is not valid JSON
/// of the expected shape, or describes an invalid project.
pub fn load_project(path: &Path) -> Result<(Project, RunOptions), InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_project(&text)
}

/// Converts project JSON text into core inputs and run options.
///
/// # Errors
///
/// See [`load_project`].
pub fn parse_project(json: &str) -> Result<(Project, RunOptions), InputError> {
    let file: ProjectFile = serde_json::from_str(json)?;

    let mut design = file.auto_design;
    if let Some(inner) = design.auto_system_design.take() {
        design = *inner;
    }

    let roof_planes: Vec<RoofPlane> = design
        .roof_planes
        .into_iter()
        .map(|(id, r)| RoofPlane {
            id,
            azimuth: r.azimuth,
            pitch: r.pitch,
            orientation: r.orientation,
        })
        .collect();

    let mut panels = Vec::with_capacity(design.solar_panels.len());
    for p in design.solar_panels {
        let id = p.panel_id.into_string();
        let Some([x, y]) = p.pix_coords.and_then(|c| c.c0) else {
            return Err(StringingError::Layout(format!(
                "panel {id} has no centre coordinate (pix_coords.c0)"
            ))
            .into());
        };
        panels.push(Panel::new(id, p.roof_plane_id.into_string(), x, y));
    }

    let s = file.solar_panel_specs;
    let panel = PanelSpecs {
        voc: s.voc,
        isc: s.isc,
        vmp: s.vmp,
        imp: s.imp,
        temp_coeff_voc: s.temp_coeff_voc,
        temp_coeff_vmpp: s.temp_coeff_vmpp,
    };

    let i = file.inverter_specs;
    let Some(rated_ac_power_w) = i.rated_ac_power_w else {
        return Err(StringingError::config("inverter.rated_ac_power_w", "is required").into());
    };
    let inverter = InverterSpecs {
        model: i.model,
        max_dc_input_voltage: i.max_dc_input_voltage,
        number_of_mppts: i.number_of_mppts,
        start_up_voltage: i.start_up_voltage,
        max_dc_input_current_per_mppt: i.max_dc_input_current_per_mppt,
        max_dc_input_current_per_string: i.max_dc_input_current_per_string,
        mppt_operating_voltage_min_range: i.mppt_operating_voltage_min_range,
        mppt_operating_voltage_max_range: i.mppt_operating_voltage_max_range,
        max_short_circuit_current_per_mppt: i.max_short_circuit_current_per_mppt,
        rated_ac_power_w,
    };

    let temperature = match (file.temperature, file.state) {
        (Some(t), _) => TemperatureData::new(t.min_recorded_temp_c, t.max_recorded_temp_c),
        (None, state) => {
            let name = state.unwrap_or_else(|| DEFAULT_STATE.to_string());
            TemperatureData::for_state(&name).ok_or_else(|| {
                StringingError::config("state", format!("no built-in temperature record for {name}"))
            })?
        }
    };

    let options = RunOptions {
        validate_power: file.validate_power,
        override_inv_quantity: file.override_inv_quantity,
        inverter_quantity: file.inverter_quantity,
        output_frontend: file.output_frontend,
    };
    let project = Project::new(panels, roof_planes, panel, inverter, temperature)?;
    Ok((project, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "autoDesign": {
            "solar_panels": [
                {"panel_id": "p1", "roof_plane_id": "1", "pix_coords": {"c0": [100, 200], "c1": [120, 180]}},
                {"panel_id": "p2", "roof_plane_id": 1, "pix_coords": {"c0": [150, 200]}}
            ],
            "roof_planes": {
                "1": {"azimuth": 180, "orientation": "south", "pitch": 30, "polygon": "POLYGON (...)"}
            }
        },
        "solarPanelSpecs": {"voc": 49.5, "isc": 13.9, "vmp": 41.6, "imp": 13.2},
        "inverterSpecs": {
            "model": "SE7600H",
            "maxDCInputVoltage": 600,
            "numberOfMPPTs": 2,
            "startUpVoltage": 100,
            "maxDCInputCurrentPerMPPT": 26,
            "maxDCInputCurrentPerString": 13.5,
            "mpptOperatingVoltageMinRange": 120,
            "mpptOperatingVoltageMaxRange": 480,
            "ratedACPowerW": 7600
        },
        "state": "Texas",
        "validate_power": true
    }"#;

    #[test]
    fn parses_request_shape() {
        let (project, options) = parse_project(SAMPLE).unwrap();
        assert_eq!(project.layout.len(), 2);
        assert_eq!(project.layout.panel(1).roof_plane_id, "1");
        assert_eq!(project.layout.panel(1).center.x, 150.0);
        assert_eq!(project.layout.roofs().len(), 1);
        assert_eq!(
            project.layout.roof(0).plane.as_ref().and_then(|p| p.orientation.as_deref()),
            Some("south")
        );
        assert_eq!(project.inverter.model.as_deref(), Some("SE7600H"));
        assert_eq!(project.inverter.rated_ac_power_w, 7600.0);
        assert_eq!(project.panel.temp_coeff_voc, DEFAULT_TEMP_COEFF_VOC);
        assert_eq!(project.temperature, TemperatureData::new(-23.3, 48.9));
        assert!(options.validate_power);
        assert!(!options.output_frontend);
    }

    #[test]
    fn explicit_temperatures_win_over_state() {
        let json = SAMPLE.replace(
            r#""state": "Texas","#,
            r#""state": "Texas", "temperature": {"min_recorded_temp_c": -5, "max_recorded_temp_c": 40},"#,
        );
        let (project, _) = parse_project(&json).unwrap();
        assert_eq!(project.temperature, TemperatureData::new(-5.0, 40.0));
    }

    #[test]
    fn unknown_state_is_a_config_error() {
        let json = SAMPLE.replace("Texas", "Atlantis");
        let err = parse_project(&json).unwrap_err();
        assert!(matches!(err, InputError::Invalid(StringingError::Config(_))));
    }

    #[test]
    fn missing_rated_ac_power_is_rejected() {
        let json = SAMPLE.replace(r#""ratedACPowerW": 7600"#, r#""unusedKey": 0"#);
        let err = parse_project(&json).unwrap_err();
        assert!(err.to_string().contains("rated_ac_power_w"));
    }

    #[test]
    fn panel_without_centre_is_rejected() {
        let json = SAMPLE.replace(r#""pix_coords": {"c0": [150, 200]}"#, r#""pix_coords": {}"#);
        let err = parse_project(&json).unwrap_err();
        assert!(err.to_string().contains("pix_coords.c0"));
    }

    #[test]
    fn nested_system_design_is_unwrapped() {
        let json = r#"{
            "autoDesign": {"auto_system_design": {
                "solar_panels": [{"panel_id": "a", "roof_plane_id": "r", "pix_coords": {"c0": [0, 0]}}],
                "roof_planes": {}
            }},
            "solarPanelSpecs": {"voc": 50, "isc": 10, "vmp": 40, "imp": 9.5},
            "inverterSpecs": {
                "maxDCInputVoltage": 600, "numberOfMPPTs": 1, "startUpVoltage": 100,
                "maxDCInputCurrentPerMPPT": 20, "maxDCInputCurrentPerString": 12,
                "mpptOperatingVoltageMinRange": 100, "mpptOperatingVoltageMaxRange": 480,
                "ratedACPowerW": 3000
            },
            "inverterQuantity": 2,
            "override_inv_quantity": true
        }"#;
        let (project, options) = parse_project(json).unwrap();
        assert_eq!(project.layout.len(), 1);
        assert_eq!(project.temperature, TemperatureData::new(-42.8, 56.7));
        assert_eq!(options.inverter_quantity, Some(2));
        assert!(options.override_inv_quantity);
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = parse_project("{ not json").unwrap_err();
        assert!(matches!(err, InputError::Json(_)));
    }
}
