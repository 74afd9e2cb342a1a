//! Invariants checked over seeded random layouts.

mod common;

use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};

use pv_stringer::config::OptimizerConfig;
use pv_stringer::model::{Panel, RoofPlane};
use pv_stringer::{Project, RunOptions, StringingResult, optimize};

const SEEDS: [u64; 6] = [1, 7, 42, 99, 2024, 31337];
const AZIMUTHS: [f64; 4] = [90.0, 180.0, 183.0, 270.0];

/// Up to four roofs of randomly thinned grids, spaced well apart.
fn random_project(seed: u64) -> Project {
    let mut rng = StdRng::seed_from_u64(seed);
    let roofs = rng.random_range(1..=4);
    let mut panels = Vec::new();
    let mut planes = Vec::new();
    for r in 0..roofs {
        let roof = format!("r{r}");
        planes.push(RoofPlane::new(
            roof.clone(),
            AZIMUTHS[rng.random_range(0..AZIMUTHS.len())],
            rng.random_range(15.0..35.0),
        ));
        let rows = rng.random_range(1..=4);
        let cols = rng.random_range(1..=10);
        let y0 = r as f64 * 100.0;
        for row in 0..rows {
            for col in 0..cols {
                if rng.random_bool(0.8) {
                    panels.push(Panel::new(
                        format!("r{r}p{:03}", row * cols + col),
                        roof.as_str(),
                        col as f64,
                        y0 + row as f64,
                    ));
                }
            }
        }
    }
    if panels.is_empty() {
        panels.push(Panel::new("r0p000", "r0", 0.0, 0.0));
    }
    common::project(panels, planes)
}

fn run(project: &Project, validate_power: bool) -> StringingResult {
    let options = RunOptions {
        validate_power,
        ..RunOptions::default()
    };
    optimize(project, &options, &OptimizerConfig::default()).expect("run should succeed")
}

#[test]
fn every_panel_is_stringed_or_reported_once() {
    for seed in SEEDS {
        let project = random_project(seed);
        for validate_power in [false, true] {
            let result = run(&project, validate_power);
            let mut seen = HashSet::new();
            let placed = result
                .strings
                .iter()
                .flat_map(|s| s.panel_ids.iter())
                .chain(result.straggler_warnings.iter().flat_map(|w| w.panel_ids.iter()));
            for id in placed {
                assert!(seen.insert(id.clone()), "seed {seed}: panel {id} placed twice");
            }
            assert_eq!(seen.len(), project.layout.len(), "seed {seed}: panels lost");
            assert_eq!(
                result.summary.stringed_panels + result.summary.straggler_panels,
                result.summary.total_panels
            );
        }
    }
}

#[test]
fn string_lengths_stay_within_limits() {
    for seed in SEEDS {
        let project = random_project(seed);
        for validate_power in [false, true] {
            let result = run(&project, validate_power);
            let min = result.limits.min_panels;
            let upper = result.limits.upper();
            for s in &result.strings {
                assert!(
                    (min..=upper).contains(&s.len()),
                    "seed {seed}: string {} has {} panels outside [{min}, {upper}]",
                    s.id,
                    s.len()
                );
                assert!(s.properties.max_voltage <= project.inverter.max_dc_input_voltage);
            }
        }
    }
}

#[test]
fn strings_never_leave_their_merge_group() {
    for seed in SEEDS {
        let project = random_project(seed);
        let result = run(&project, false);
        for s in &result.strings {
            let roofs: HashSet<String> = s
                .panel_ids
                .iter()
                .filter_map(|id| project.layout.index_of(id))
                .map(|p| project.layout.panel(p).roof_plane_id.clone())
                .collect();
            let azimuths: Vec<f64> = roofs
                .iter()
                .filter_map(|r| {
                    project
                        .layout
                        .roofs()
                        .iter()
                        .find(|slot| &slot.id == r)
                        .and_then(|slot| slot.plane.as_ref())
                        .map(|p| p.azimuth)
                })
                .collect();
            let spread = azimuths.iter().cloned().fold(f64::MIN, f64::max)
                - azimuths.iter().cloned().fold(f64::MAX, f64::min);
            assert!(spread <= 5.0, "seed {seed}: string {} spans dissimilar roofs", s.id);
        }
    }
}

#[test]
fn mppts_hold_equal_strings_within_current_limits() {
    for seed in SEEDS {
        let project = random_project(seed);
        let inverter = &project.inverter;
        let result = run(&project, false);
        for m in &result.mppts {
            let lens: HashSet<usize> = m
                .string_ids
                .iter()
                .filter_map(|id| result.strings.iter().find(|s| &s.id == id))
                .map(|s| s.len())
                .collect();
            assert_eq!(lens.len(), 1, "seed {seed}: {} mixes string lengths", m.id);
            assert!(m.properties.operating_current <= inverter.max_dc_input_current_per_mppt);
            assert!(m.properties.is_safe);
        }
        for inv in &result.inverters {
            assert!(inv.mppt_ids.len() <= inverter.number_of_mppts);
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    for seed in SEEDS {
        let project = random_project(seed);
        let mut a = run(&project, true);
        let mut b = run(&project, true);
        a.metadata.elapsed_seconds = 0.0;
        b.metadata.elapsed_seconds = 0.0;
        assert_eq!(a, b, "seed {seed}: runs differ");
    }
}
