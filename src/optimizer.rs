//! End-to-end optimisation pipeline.
//!
//! [`optimize`] is the crate's single entry point: it validates inputs,
//! derives string limits, runs the stringing passes, packs strings onto
//! MPPTs and inverters, and assembles the report.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assignment::{InverterRules, StringKey, assign_mppts, assign_strings};
use crate::config::OptimizerConfig;
use crate::decision::DecisionLog;
use crate::electrical::{ElectricalModel, MpptProperties, StringProperties};
use crate::error::{Result, StringingError};
use crate::model::Project;
use crate::report::Summary;
use crate::sizing::{SizingCheck, check_sizing};
use crate::stringing::constraints::{StringLimits, derive_limits};
use crate::stringing::plan_strings;
use crate::stringing::stragglers::StragglerWarning;
use crate::stringing::temperature::adjusted_voltages;
use crate::suggestions::{SuggestionInputs, any_undersized, suggest};
use crate::wiring::{Inverter, Mppt, PvString, inverter_id, mppt_id, string_id};

/// Per-run switches, independent of the tuning configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Cap string length and inverter loading by the AC rating.
    pub validate_power: bool,
    /// Allow more inverter instances than `inverter_quantity`.
    pub override_inv_quantity: bool,
    /// Requested number of inverter instances.
    pub inverter_quantity: Option<u32>,
    /// Emit the nested inverter-centric report shape.
    pub output_frontend: bool,
}

impl RunOptions {
    /// Hard cap on inverter instances, if any.
    pub fn instance_cap(&self) -> Option<usize> {
        match (self.inverter_quantity, self.override_inv_quantity) {
            (Some(q), false) => Some(q as usize),
            _ => None,
        }
    }
}

/// Run bookkeeping echoed in the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub elapsed_seconds: f64,
    pub options: RunOptions,
    pub inverter_model: Option<String>,
    pub roof_planes: usize,
    pub merge_groups: usize,
}

/// Complete wiring plan and advisory output of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringingResult {
    pub strings: Vec<PvString>,
    pub mppts: Vec<Mppt>,
    pub inverters: Vec<Inverter>,
    /// Ids of MPPTs no inverter instance could host.
    pub unassigned_mppts: Vec<String>,
    pub straggler_warnings: Vec<StragglerWarning>,
    pub sizing_check: SizingCheck,
    pub suggestions: Vec<String>,
    pub limits: StringLimits,
    pub summary: Summary,
    pub decisions: DecisionLog,
    pub metadata: RunMetadata,
}

/// Computes a wiring plan for `project`.
///
/// # Errors
///
/// Returns [`StringingError::Config`] for invalid specs or configuration and
/// [`StringingError::Incompatible`] when no string length satisfies both the
/// start-up and maximum voltage limits. No partial plan is produced.
pub fn optimize(
    project: &Project,
    options: &RunOptions,
    config: &OptimizerConfig,
) -> Result<StringingResult> {
    let started = Instant::now();
    if let Some(err) = config.validate().into_iter().next() {
        return Err(StringingError::Config(err));
    }
    project.validate()?;

    let layout = &project.layout;
    let inverter = &project.inverter;
    let voltages = adjusted_voltages(&project.panel, &project.temperature)?;
    let limits = derive_limits(&voltages, inverter, config, options.validate_power)?;
    info!(
        panels = layout.len(),
        min = limits.min_panels,
        ideal = limits.ideal_panels,
        upper = limits.upper(),
        "optimising layout"
    );

    let mut log = DecisionLog::new();
    let plan = plan_strings(layout, &limits, inverter.start_up_voltage, config, &mut log);

    let model = ElectricalModel {
        panel: &project.panel,
        inverter,
        limits: &limits,
        safety: &config.safety,
        ratio: &config.ratio,
    };
    let power_ceiling_w = options
        .validate_power
        .then(|| inverter.rated_ac_power_w * config.ratio.optimal_max);

    let keys: Vec<StringKey> = plan
        .chains
        .iter()
        .map(|c| StringKey {
            merge_group: plan.groups.group_of(c.roof),
            panel_count: c.len(),
        })
        .collect();
    let slots = assign_strings(&keys, &model, power_ceiling_w, &mut log);

    let string_props: Vec<StringProperties> = keys
        .iter()
        .map(|k| model.string_properties(k.panel_count))
        .collect();
    let mppt_props: Vec<MpptProperties> = slots
        .iter()
        .map(|slot| {
            let members: Vec<StringProperties> =
                slot.strings.iter().map(|&s| string_props[s]).collect();
            model.mppt_properties(&members)
        })
        .collect();
    let mppt_power: Vec<f64> = mppt_props.iter().map(|m| m.power_w).collect();
    let rules = InverterRules {
        mppts_per_inverter: inverter.number_of_mppts,
        max_instances: options.instance_cap(),
        power_ceiling_w,
    };
    let inverter_plan = assign_mppts(&mppt_power, &rules, &mut log);

    let mut strings: Vec<PvString> = plan
        .chains
        .iter()
        .enumerate()
        .map(|(i, chain)| PvString {
            id: string_id(i),
            roof_plane_id: layout.roof(chain.roof).id.clone(),
            merge_group: keys[i].merge_group,
            panel_ids: layout.ids(&chain.panels),
            properties: string_props[i],
            mppt_id: None,
            inverter_id: None,
        })
        .collect();

    let mut mppts: Vec<Mppt> = slots
        .iter()
        .enumerate()
        .map(|(m, slot)| {
            for &s in &slot.strings {
                strings[s].mppt_id = Some(mppt_id(m));
            }
            Mppt {
                id: mppt_id(m),
                merge_group: slot.merge_group,
                string_ids: slot.strings.iter().map(|&s| string_id(s)).collect(),
                inverter_id: None,
                properties: mppt_props[m],
            }
        })
        .collect();

    let mut inverters = Vec::with_capacity(inverter_plan.inverters.len());
    for (n, members) in inverter_plan.inverters.iter().enumerate() {
        let id = inverter_id(n);
        for &m in members {
            mppts[m].inverter_id = Some(id.clone());
            for &s in &slots[m].strings {
                strings[s].inverter_id = Some(id.clone());
            }
        }
        let props: Vec<MpptProperties> = members.iter().map(|&m| mppt_props[m]).collect();
        inverters.push(Inverter {
            id,
            mppt_ids: members.iter().map(|&m| mppt_id(m)).collect(),
            properties: model.inverter_properties(&props),
        });
    }
    let unassigned_mppts: Vec<String> = inverter_plan
        .unassigned
        .iter()
        .map(|&m| mppt_id(m))
        .collect();

    let fleet = inverters
        .len()
        .max(options.inverter_quantity.unwrap_or(0) as usize);
    let sizing_check = check_sizing(
        layout.len() as f64 * limits.power_per_panel,
        inverter.rated_ac_power_w,
        fleet,
        unassigned_mppts.len(),
        &config.ratio,
    );

    let summary = Summary::new(
        layout.len(),
        &strings,
        &mppts,
        &inverters,
        unassigned_mppts.len(),
        &plan.stragglers,
    );
    let suggestions = suggest(&SuggestionInputs {
        straggler_panels: summary.straggler_panels,
        unassigned_mppts: unassigned_mppts.len(),
        inverter_quantity: options.inverter_quantity,
        any_inverter_undersized: any_undersized(inverters.iter().map(|i| &i.properties.status)),
        power_capped: limits.power_capped,
        min_panels: limits.min_panels,
        ideal_panels: limits.ideal_panels,
        voltage_ideal_panels: limits.voltage_ideal_panels,
        power_per_panel: limits.power_per_panel,
        target_ratio: config.ratio.target,
    });

    let metadata = RunMetadata {
        elapsed_seconds: started.elapsed().as_secs_f64(),
        options: *options,
        inverter_model: inverter.model.clone(),
        roof_planes: layout.roofs().len(),
        merge_groups: plan.groups.len(),
    };
    info!(
        strings = summary.total_strings,
        mppts = summary.total_mppts,
        inverters = summary.total_inverters,
        efficiency_pct = summary.stringing_efficiency_pct,
        elapsed_s = metadata.elapsed_seconds,
        "optimisation finished"
    );

    Ok(StringingResult {
        strings,
        mppts,
        inverters,
        unassigned_mppts,
        straggler_warnings: plan.stragglers,
        sizing_check,
        suggestions,
        limits,
        summary,
        decisions: log,
        metadata,
    })
}
