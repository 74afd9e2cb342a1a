//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use pv_stringer::Project;
use pv_stringer::model::{InverterSpecs, Panel, PanelSpecs, RoofPlane, TemperatureData};

/// 50 V / 10 A panel; hot Vmpp 36.432 V and 346.104 W at the default site.
pub fn default_panel() -> PanelSpecs {
    PanelSpecs::new(50.0, 10.0, 40.0, 9.5)
}

/// 5 kW, two-MPPT inverter with a 100–480 V window and 100 V start-up.
pub fn default_inverter() -> InverterSpecs {
    InverterSpecs {
        model: Some("test-5k".to_string()),
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

/// Site extremes of -10 °C and 45 °C.
pub fn default_temperature() -> TemperatureData {
    TemperatureData::new(-10.0, 45.0)
}

/// `n` panels in a horizontal row at unit spacing, ids `{prefix}00..`.
pub fn row(roof: &str, prefix: &str, n: usize, x0: f64, y: f64) -> Vec<Panel> {
    (0..n)
        .map(|i| Panel::new(format!("{prefix}{i:02}"), roof, x0 + i as f64, y))
        .collect()
}

/// `rows` x `cols` grid at unit spacing with row-major ids.
pub fn grid(roof: &str, prefix: &str, rows: usize, cols: usize, x0: f64, y0: f64) -> Vec<Panel> {
    let mut panels = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            panels.push(Panel::new(
                format!("{prefix}{:02}", r * cols + c),
                roof,
                x0 + c as f64,
                y0 + r as f64,
            ));
        }
    }
    panels
}

/// Builds a project with the default datasheets and site.
pub fn project(panels: Vec<Panel>, roof_planes: Vec<RoofPlane>) -> Project {
    project_with(panels, roof_planes, default_inverter())
}

/// Builds a project with the default panel and site and a custom inverter.
pub fn project_with(panels: Vec<Panel>, roof_planes: Vec<RoofPlane>, inverter: InverterSpecs) -> Project {
    Project::new(panels, roof_planes, default_panel(), inverter, default_temperature())
        .expect("fixture layout should be valid")
}

/// Four roofs: two similar south faces, an east face and a lone west panel.
///
/// `r1` holds a 2x8 grid, `r2` a row of 9, `r3` a row of 8 and `r4` a single
/// panel, 34 panels in all.
pub fn four_roofs() -> (Vec<Panel>, Vec<RoofPlane>) {
    let mut panels = grid("r1", "a", 2, 8, 0.0, 0.0);
    panels.extend(row("r2", "b", 9, 0.0, 10.0));
    panels.extend(row("r3", "c", 8, 0.0, 20.0));
    panels.push(Panel::new("d00", "r4", 50.0, 50.0));
    let planes = vec![
        RoofPlane::new("r1", 180.0, 30.0),
        RoofPlane::new("r2", 182.0, 31.0),
        RoofPlane::new("r3", 90.0, 30.0),
        RoofPlane::new("r4", 270.0, 30.0),
    ];
    (panels, planes)
}
