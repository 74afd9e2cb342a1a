//! Series stringing: from a panel layout to validated chains of panels.
//!
//! The passes run in a fixed order, each taking the previous snapshot:
//!
//! 1. [`roof_groups`]: merge similarly oriented roofs.
//! 2. [`clustering`]: split each roof into proximity clusters.
//! 3. [`builder`]: cut clusters into nearest-neighbour chains.
//! 4. [`stragglers`]: salvage and absorb leftover panels.
//! 5. [`rebalance`]: even out lengths so strings can share an MPPT.

pub mod builder;
pub mod clustering;
pub mod constraints;
pub mod rebalance;
pub mod roof_groups;
pub mod stragglers;
pub mod temperature;

use tracing::{debug, info};

use crate::config::OptimizerConfig;
use crate::decision::{DecisionLog, Phase};
use crate::model::Layout;

use builder::{ChainBounds, string_cluster};
use clustering::{RoofReach, cluster_layout};
use constraints::StringLimits;
use roof_groups::{RoofGroups, group_roofs};
use stragglers::StragglerWarning;

/// An ordered series connection of panels under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    /// Roof the chain was seeded on.
    pub roof: usize,
    /// Panel indices in connection order.
    pub panels: Vec<usize>,
}

/// One of the two open ends of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Head,
    Tail,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Panel at the given end.
    pub fn end(&self, end: End) -> Option<usize> {
        match end {
            End::Head => self.panels.first().copied(),
            End::Tail => self.panels.last().copied(),
        }
    }

    /// Closer end to `panel` and its distance. Ties go to the tail.
    pub fn nearest_end(&self, layout: &Layout, panel: usize) -> Option<(End, f64)> {
        let head = layout.distance(self.end(End::Head)?, panel);
        let tail = layout.distance(self.end(End::Tail)?, panel);
        Some(if head < tail {
            (End::Head, head)
        } else {
            (End::Tail, tail)
        })
    }

    /// Connects `panel` at the given end.
    pub fn attach(&mut self, end: End, panel: usize) {
        match end {
            End::Head => self.panels.insert(0, panel),
            End::Tail => self.panels.push(panel),
        }
    }

    /// Disconnects the panel at the given end.
    pub fn detach(&mut self, end: End) -> Option<usize> {
        match end {
            End::Head if !self.panels.is_empty() => Some(self.panels.remove(0)),
            End::Head => None,
            End::Tail => self.panels.pop(),
        }
    }
}

/// Read-only state shared by the passes after clustering.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub layout: &'a Layout,
    pub limits: &'a StringLimits,
    pub groups: &'a RoofGroups,
    pub reaches: &'a [RoofReach],
    pub start_up_voltage: f64,
}

impl PassContext<'_> {
    /// Builder bounds for panels on `roof`.
    pub fn bounds(&self, roof: usize) -> ChainBounds {
        ChainBounds {
            min_len: self.limits.min_panels,
            target_len: self.limits.ideal_panels,
            max_len: self.limits.upper(),
            radius: self.reaches[roof].chain_radius,
        }
    }

    /// Largest chain radius of two roofs.
    pub fn radius_between(&self, a: usize, b: usize) -> f64 {
        self.reaches[a].chain_radius.max(self.reaches[b].chain_radius)
    }
}

/// Strings and stragglers of one layout, before MPPT assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct StringingPlan {
    pub groups: RoofGroups,
    pub reaches: Vec<RoofReach>,
    pub chains: Vec<Chain>,
    pub stragglers: Vec<StragglerWarning>,
}

impl StringingPlan {
    /// Panels placed in a chain.
    pub fn stringed_panels(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }

    /// Panels reported as stragglers.
    pub fn straggler_panels(&self) -> usize {
        self.stragglers.iter().map(|w| w.panel_count).sum()
    }
}

/// Runs every stringing pass over the layout.
pub fn plan_strings(
    layout: &Layout,
    limits: &StringLimits,
    start_up_voltage: f64,
    config: &OptimizerConfig,
    log: &mut DecisionLog,
) -> StringingPlan {
    let groups = group_roofs(layout, &config.grouping);
    let (reaches, clusters) = cluster_layout(layout, &config.clustering);
    debug!(
        roofs = layout.roofs().len(),
        groups = groups.len(),
        clusters = clusters.len(),
        "layout partitioned"
    );

    let ctx = PassContext {
        layout,
        limits,
        groups: &groups,
        reaches: &reaches,
        start_up_voltage,
    };

    let mut chains = Vec::new();
    let mut leftovers = Vec::new();
    for cluster in &clusters {
        let outcome = string_cluster(
            layout,
            cluster.roof,
            &cluster.panels,
            ctx.bounds(cluster.roof),
            Phase::Build,
            log,
        );
        chains.extend(outcome.chains);
        leftovers.extend(outcome.leftovers);
    }
    debug!(
        chains = chains.len(),
        leftovers = leftovers.len(),
        "initial strings built"
    );

    let stragglers = stragglers::absorb_stragglers(&ctx, &mut chains, leftovers, log);
    rebalance::rebalance_for_parallel(&ctx, &mut chains, log);

    let plan = StringingPlan {
        chains,
        stragglers,
        groups,
        reaches,
    };
    info!(
        strings = plan.chains.len(),
        stringed = plan.stringed_panels(),
        stragglers = plan.straggler_panels(),
        "stringing complete"
    );
    plan
}
