//! Sequential filling of inverter instances with MPPT inputs.

use tracing::{debug, warn};

use crate::decision::{DecisionLog, Phase};

/// Limits on how MPPTs are spread over inverter instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverterRules {
    /// MPPT inputs per instance.
    pub mppts_per_inverter: usize,
    /// Instance cap; `None` mints instances on demand.
    pub max_instances: Option<usize>,
    /// DC power an instance may not exceed, when power-aware.
    pub power_ceiling_w: Option<f64>,
}

/// MPPT indices per inverter instance, plus the MPPTs left without one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InverterPlan {
    pub inverters: Vec<Vec<usize>>,
    pub unassigned: Vec<usize>,
}

/// Fills instances in order with the given MPPT powers.
///
/// An instance closes when it is full or, with a power ceiling, when the
/// next MPPT would push it over. An empty instance always takes the next
/// MPPT. Once the instance cap is reached, every remaining MPPT is reported
/// as unassigned.
pub fn assign_mppts(
    mppt_power_w: &[f64],
    rules: &InverterRules,
    log: &mut DecisionLog,
) -> InverterPlan {
    let mut plan = InverterPlan::default();
    let mut open: Vec<usize> = Vec::new();
    let mut open_power = 0.0;

    for (idx, &power) in mppt_power_w.iter().enumerate() {
        if !open.is_empty() {
            let full = open.len() >= rules.mppts_per_inverter;
            let over = rules
                .power_ceiling_w
                .is_some_and(|c| open_power + power > c);
            if full || over {
                if over && !full {
                    log.reject(
                        Phase::Inverter,
                        format!(
                            "MPPT {} would lift inverter {} to {:.0} W",
                            idx + 1,
                            plan.inverters.len() + 1,
                            open_power + power
                        ),
                    );
                }
                plan.inverters.push(std::mem::take(&mut open));
                open_power = 0.0;
            }
        }
        if open.is_empty() && rules.max_instances.is_some_and(|m| plan.inverters.len() >= m) {
            log.reject(
                Phase::Inverter,
                format!("MPPT {} left unassigned: inverter cap reached", idx + 1),
            );
            plan.unassigned.push(idx);
            continue;
        }
        open.push(idx);
        open_power += power;
        log.accept(
            Phase::Inverter,
            format!("MPPT {} on inverter {}", idx + 1, plan.inverters.len() + 1),
        );
    }
    if !open.is_empty() {
        plan.inverters.push(open);
    }

    if !plan.unassigned.is_empty() {
        warn!(
            unassigned = plan.unassigned.len(),
            cap = ?rules.max_instances,
            "inverter quantity too small for all MPPTs"
        );
    }
    debug!(inverters = plan.inverters.len(), "MPPTs assigned to inverters");
    plan
}
