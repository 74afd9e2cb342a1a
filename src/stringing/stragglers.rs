//! Leftover panels: salvage, absorption and straggler warnings.
//!
//! Panels the builder could not place get three chances before they are
//! reported: re-clustering among themselves, joining a string on their own
//! roof, and joining a string on a similar roof.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::decision::{DecisionLog, Phase};
use crate::stringing::builder::{ChainBounds, string_cluster};
use crate::stringing::clustering::link_components;
use crate::stringing::{Chain, PassContext};

/// Why a group of panels could not be stringed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StragglerReason {
    /// Too few panels to reach the inverter start-up voltage.
    LowVoltageStartup,
}

/// A proximity group of unstringed panels on one roof.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StragglerWarning {
    pub roof_plane_id: String,
    /// 1-based group number within the roof.
    pub group_number: usize,
    pub panel_ids: Vec<String>,
    pub panel_count: usize,
    /// Hot operating voltage if the group were wired as one string (V).
    pub estimated_voltage: f64,
    pub min_required_voltage: f64,
    pub voltage_deficit: f64,
    pub reason: StragglerReason,
}

/// Places leftover panels into strings where possible.
///
/// New strings from the salvage step are appended to `chains`. Returns a
/// warning for every group of panels that still has no string.
pub fn absorb_stragglers(
    ctx: &PassContext<'_>,
    chains: &mut Vec<Chain>,
    leftovers: Vec<usize>,
    log: &mut DecisionLog,
) -> Vec<StragglerWarning> {
    let layout = ctx.layout;
    let mut rest = salvage(ctx, chains, leftovers, log);
    rest.sort_by(|&a, &b| {
        layout
            .roof_of(a)
            .cmp(&layout.roof_of(b))
            .then_with(|| layout.cmp_ids(a, b))
    });

    let rest = absorb_pass(ctx, chains, rest, Phase::SameRoof, log);
    let rest = absorb_pass(ctx, chains, rest, Phase::SimilarRoof, log);
    straggler_warnings(ctx, &rest, log)
}

/// Re-clusters leftovers per roof and rebuilds any group large enough.
fn salvage(
    ctx: &PassContext<'_>,
    chains: &mut Vec<Chain>,
    leftovers: Vec<usize>,
    log: &mut DecisionLog,
) -> Vec<usize> {
    let min = ctx.limits.min_panels;
    let mut by_roof: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for p in leftovers {
        by_roof.entry(ctx.layout.roof_of(p)).or_default().push(p);
    }

    let mut rest = Vec::new();
    for (roof, mut panels) in by_roof {
        panels.sort_unstable();
        let threshold = ctx.reaches[roof].link_threshold;
        for group in link_components(ctx.layout, &panels, threshold) {
            if group.len() < min {
                rest.extend(group);
                continue;
            }
            let mut outcome = string_cluster(
                ctx.layout,
                roof,
                &group,
                ctx.bounds(roof),
                Phase::Salvage,
                log,
            );
            // a linked group must not be reported while it still holds a string
            if outcome.leftovers.len() >= min {
                let unbounded = ChainBounds {
                    radius: f64::INFINITY,
                    ..ctx.bounds(roof)
                };
                let retry = string_cluster(
                    ctx.layout,
                    roof,
                    &outcome.leftovers,
                    unbounded,
                    Phase::Salvage,
                    log,
                );
                outcome.chains.extend(retry.chains);
                outcome.leftovers = retry.leftovers;
            }
            chains.extend(outcome.chains);
            rest.extend(outcome.leftovers);
        }
    }
    rest
}

/// Attaches each panel to the nearest eligible string end.
///
/// [`Phase::SameRoof`] considers strings seeded on the panel's roof,
/// [`Phase::SimilarRoof`] strings on other roofs of its merge group. Returns
/// the panels that found no string.
fn absorb_pass(
    ctx: &PassContext<'_>,
    chains: &mut [Chain],
    panels: Vec<usize>,
    phase: Phase,
    log: &mut DecisionLog,
) -> Vec<usize> {
    let layout = ctx.layout;
    let upper = ctx.limits.upper();
    let mut unplaced = Vec::new();
    for p in panels {
        let roof = layout.roof_of(p);
        let best = chains
            .iter()
            .enumerate()
            .filter(|(_, c)| c.len() < upper)
            .filter(|(_, c)| match phase {
                Phase::SameRoof => c.roof == roof,
                _ => c.roof != roof && ctx.groups.same_group(c.roof, roof),
            })
            .filter_map(|(i, c)| c.nearest_end(layout, p).map(|(end, d)| (i, end, d)))
            .min_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)));

        match best {
            Some((i, end, _)) => {
                chains[i].attach(end, p);
                log.accept(
                    phase,
                    format!(
                        "{} joins string {} ({} panels)",
                        layout.panel(p).id,
                        i + 1,
                        chains[i].len()
                    ),
                );
            }
            None => {
                log.reject(
                    phase,
                    format!("{}: no string with room below {upper}", layout.panel(p).id),
                );
                unplaced.push(p);
            }
        }
    }
    unplaced
}

fn straggler_warnings(
    ctx: &PassContext<'_>,
    panels: &[usize],
    log: &mut DecisionLog,
) -> Vec<StragglerWarning> {
    let layout = ctx.layout;
    let mut by_roof: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &p in panels {
        by_roof.entry(layout.roof_of(p)).or_default().push(p);
    }

    let mut warnings = Vec::new();
    for (roof, mut members) in by_roof {
        members.sort_unstable();
        let threshold = ctx.reaches[roof].link_threshold;
        for (n, group) in link_components(layout, &members, threshold)
            .into_iter()
            .enumerate()
        {
            let estimated_voltage = group.len() as f64 * ctx.limits.hot_vmpp;
            let warning = StragglerWarning {
                roof_plane_id: layout.roof(roof).id.clone(),
                group_number: n + 1,
                panel_ids: layout.ids(&group),
                panel_count: group.len(),
                estimated_voltage,
                min_required_voltage: ctx.start_up_voltage,
                voltage_deficit: (ctx.start_up_voltage - estimated_voltage).max(0.0),
                reason: StragglerReason::LowVoltageStartup,
            };
            warn!(
                roof = %warning.roof_plane_id,
                panels = warning.panel_count,
                deficit_v = warning.voltage_deficit,
                "straggler group left unstringed"
            );
            log.reject(
                Phase::Straggler,
                format!(
                    "{} panel(s) on roof {} reach {:.1} V of {:.1} V",
                    warning.panel_count,
                    warning.roof_plane_id,
                    warning.estimated_voltage,
                    warning.min_required_voltage
                ),
            );
            warnings.push(warning);
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OptimizerConfig;
    use crate::model::{Layout, Panel, RoofPlane};
    use crate::stringing::clustering::cluster_layout;
    use crate::stringing::constraints::StringLimits;
    use crate::stringing::roof_groups::group_roofs;

    fn limits(min: usize, ideal: usize, upper: usize) -> StringLimits {
        StringLimits {
            min_panels: min,
            max_panels: upper,
            mppt_max_panels: upper,
            power_max_panels: None,
            ideal_panels: ideal,
            voltage_ideal_panels: ideal,
            power_capped: false,
            cold_voc: 55.0,
            hot_vmpp: 36.0,
            power_per_panel: 342.0,
        }
    }

    fn run(
        layout: &Layout,
        limits: &StringLimits,
        chains: &mut Vec<Chain>,
        leftovers: Vec<usize>,
    ) -> (Vec<StragglerWarning>, DecisionLog) {
        let config = OptimizerConfig::default();
        let groups = group_roofs(layout, &config.grouping);
        let (reaches, _) = cluster_layout(layout, &config.clustering);
        let ctx = PassContext {
            layout,
            limits,
            groups: &groups,
            reaches: &reaches,
            start_up_voltage: 150.0,
        };
        let mut log = DecisionLog::new();
        let warnings = absorb_stragglers(&ctx, chains, leftovers, &mut log);
        (warnings, log)
    }

    fn row(roof: &str, prefix: &str, xs: &[f64], y: f64) -> Vec<Panel> {
        xs.iter()
            .enumerate()
            .map(|(i, &x)| Panel::new(format!("{prefix}{i:02}"), roof, x, y))
            .collect()
    }

    #[test]
    fn leftover_joins_nearer_end_on_same_roof() {
        let layout = Layout::new(row("r", "p", &[0.0, 1.0, 2.0, 3.0, 4.0], 0.0), vec![]).unwrap();
        let mut chains = vec![Chain {
            roof: 0,
            panels: vec![1, 2, 3, 4],
        }];
        let (warnings, log) = run(&layout, &limits(3, 4, 6), &mut chains, vec![0]);
        assert!(warnings.is_empty());
        assert_eq!(chains[0].panels, vec![0, 1, 2, 3, 4]);
        assert_eq!(log.by_phase(Phase::SameRoof).count(), 1);
    }

    fn two_roofs() -> Layout {
        let mut panels = row("a", "a", &[0.0, 1.0, 2.0, 3.0, 4.0], 0.0);
        panels.extend(row("b", "b", &[0.0, 1.0, 2.0], 5.0));
        Layout::new(
            panels,
            vec![RoofPlane::new("a", 180.0, 30.0), RoofPlane::new("b", 182.0, 31.0)],
        )
        .unwrap()
    }

    #[test]
    fn leftover_crosses_to_similar_roof_when_own_is_full() {
        let layout = two_roofs();
        let mut chains = vec![
            Chain {
                roof: 0,
                panels: vec![0, 1, 2, 3],
            },
            Chain {
                roof: 1,
                panels: vec![5, 6, 7],
            },
        ];
        let (warnings, log) = run(&layout, &limits(3, 3, 4), &mut chains, vec![4]);
        assert!(warnings.is_empty());
        assert_eq!(chains[0].len(), 4);
        assert_eq!(chains[1].panels, vec![5, 6, 7, 4]);
        assert_eq!(log.by_phase(Phase::SameRoof).count(), 1);
        assert_eq!(log.by_phase(Phase::SimilarRoof).count(), 1);
    }

    #[test]
    fn no_room_anywhere_leaves_straggler() {
        let layout = two_roofs();
        let mut chains = vec![
            Chain {
                roof: 0,
                panels: vec![0, 1, 2, 3],
            },
            Chain {
                roof: 1,
                panels: vec![5, 6, 7],
            },
        ];
        let (warnings, _) = run(&layout, &limits(3, 3, 3), &mut chains, vec![4]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].panel_ids, vec!["a04".to_string()]);
        assert_eq!(chains[1].len(), 3);
    }

    #[test]
    fn isolated_panel_on_unrelated_roof_becomes_straggler() {
        let mut panels = row("a", "a", &[0.0, 1.0, 2.0], 0.0);
        panels.push(Panel::new("z", "b", 50.0, 50.0));
        let layout = Layout::new(
            panels,
            vec![RoofPlane::new("a", 180.0, 30.0), RoofPlane::new("b", 90.0, 30.0)],
        )
        .unwrap();
        let mut chains = vec![Chain {
            roof: 0,
            panels: vec![0, 1, 2],
        }];
        let (warnings, _) = run(&layout, &limits(3, 3, 6), &mut chains, vec![3]);
        assert_eq!(chains[0].len(), 3);
        assert_eq!(warnings.len(), 1);
        let w = &warnings[0];
        assert_eq!(w.roof_plane_id, "b");
        assert_eq!(w.group_number, 1);
        assert_eq!(w.panel_ids, vec!["z".to_string()]);
        assert_eq!(w.reason, StragglerReason::LowVoltageStartup);
        assert!((w.estimated_voltage - 36.0).abs() < 1e-9);
        assert!((w.voltage_deficit - 114.0).abs() < 1e-9);
    }

    #[test]
    fn leftovers_large_enough_are_salvaged() {
        let layout = Layout::new(
            row("r", "p", &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0, 13.0], 0.0),
            vec![],
        )
        .unwrap();
        let mut chains = vec![Chain {
            roof: 0,
            panels: vec![3, 4, 5, 6],
        }];
        let (warnings, log) = run(&layout, &limits(3, 4, 4), &mut chains, vec![0, 1, 2]);
        assert!(warnings.is_empty());
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[1].panels, vec![0, 1, 2]);
        assert_eq!(log.by_phase(Phase::Salvage).count(), 1);
    }

    #[test]
    fn bent_group_is_salvaged_not_reported() {
        let mut panels = row("r", "p", &(0..10u8).map(f64::from).collect::<Vec<_>>(), 0.0);
        panels.extend([
            Panel::new("x0", "r", -1.8, 100.5),
            Panel::new("x1", "r", 0.0, 100.0),
            Panel::new("x2", "r", 1.8, 100.5),
        ]);
        let layout = Layout::new(panels, vec![]).unwrap();
        let mut chains = vec![Chain {
            roof: 0,
            panels: (0..10).collect(),
        }];
        let (warnings, _) = run(&layout, &limits(3, 10, 10), &mut chains, vec![10, 11, 12]);
        assert!(warnings.is_empty());
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[1].panels, vec![12, 11, 10]);
    }

    #[test]
    fn forked_group_is_rebuilt_without_hop_limit() {
        let mut panels = row("r", "p", &(0..10u8).map(f64::from).collect::<Vec<_>>(), 0.0);
        panels.extend([
            Panel::new("y0", "r", 0.0, 96.2),
            Panel::new("y1", "r", 0.0, 98.1),
            Panel::new("y2", "r", 0.0, 100.0),
            Panel::new("y3", "r", -1.9, 100.0),
            Panel::new("y4", "r", 1.9, 100.0),
        ]);
        let layout = Layout::new(panels, vec![]).unwrap();
        let mut chains = vec![
            Chain {
                roof: 0,
                panels: (0..5).collect(),
            },
            Chain {
                roof: 0,
                panels: (5..10).collect(),
            },
        ];
        // y3 and y4 sit 3.8 apart, beyond the 3.0 hop radius of either end
        let (warnings, log) = run(&layout, &limits(5, 5, 6), &mut chains, (10..15).collect());
        assert!(warnings.is_empty());
        assert_eq!(chains.len(), 3);
        assert_eq!(chains[2].panels, vec![10, 11, 12, 13, 14]);
        assert!(
            log.by_phase(Phase::Salvage)
                .any(|d| d.verdict == crate::decision::Verdict::Rejected)
        );
    }

    #[test]
    fn warning_serializes_reason_in_caps() {
        let w = StragglerWarning {
            roof_plane_id: "r".into(),
            group_number: 1,
            panel_ids: vec!["p".into()],
            panel_count: 1,
            estimated_voltage: 36.0,
            min_required_voltage: 150.0,
            voltage_deficit: 114.0,
            reason: StragglerReason::LowVoltageStartup,
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["reason"], "LOW_VOLTAGE_STARTUP");
    }
}
