//! Greedy nearest-neighbour string construction inside one cluster.

use std::cmp::Ordering;

use crate::decision::{DecisionLog, Phase};
use crate::model::Layout;
use crate::stringing::{Chain, End};

/// Length target and hop radius for one build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainBounds {
    pub min_len: usize,
    pub target_len: usize,
    /// Longest string a later pass may extend a chain to.
    pub max_len: usize,
    pub radius: f64,
}

/// Strings built from a cluster plus the panels that did not make one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    pub chains: Vec<Chain>,
    pub leftovers: Vec<usize>,
}

/// Top-left panel: smallest y, then smallest x, then smallest id.
pub fn seed_panel(layout: &Layout, candidates: &[usize]) -> Option<usize> {
    candidates.iter().copied().min_by(|&a, &b| {
        let pa = layout.panel(a).center;
        let pb = layout.panel(b).center;
        pa.y.total_cmp(&pb.y)
            .then(pa.x.total_cmp(&pb.x))
            .then_with(|| layout.cmp_ids(a, b))
    })
}

/// Nearest panel of `candidates` to `from` within `radius`, ties to the
/// smallest id.
pub fn nearest_within(
    layout: &Layout,
    from: usize,
    candidates: &[usize],
    radius: f64,
) -> Option<usize> {
    candidates
        .iter()
        .copied()
        .map(|c| (c, layout.distance(from, c)))
        .filter(|&(_, d)| d <= radius)
        .min_by(|&(a, da), &(b, db)| by_distance_then_id(layout, (a, da), (b, db)))
        .map(|(c, _)| c)
}

fn by_distance_then_id(layout: &Layout, a: (usize, f64), b: (usize, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| layout.cmp_ids(a.0, b.0))
}

/// Grows a chain from `seed`, taking panels out of `remaining`.
///
/// The tail grows first; once no remaining panel lies within `radius` of
/// the tail, the head takes over. Stops at `target_len` panels or when
/// neither end can reach another panel.
pub fn grow_chain(
    layout: &Layout,
    roof: usize,
    seed: usize,
    remaining: &mut Vec<usize>,
    target_len: usize,
    radius: f64,
) -> Chain {
    remaining.retain(|&p| p != seed);
    let mut chain = Chain {
        roof,
        panels: vec![seed],
    };
    while chain.len() < target_len {
        let next = [End::Tail, End::Head].into_iter().find_map(|end| {
            let from = chain.end(end)?;
            nearest_within(layout, from, remaining, radius).map(|p| (end, p))
        });
        let Some((end, panel)) = next else {
            break;
        };
        remaining.retain(|&p| p != panel);
        chain.attach(end, panel);
    }
    chain
}

/// Number of strings to spread `n` panels over evenly, if cutting at the
/// target would strand panels.
///
/// Cutting at the target leaves a remainder. When that remainder is too
/// short for a string and the full strings have no room to take it in,
/// the panels are shared out over the same number of strings instead, as
/// long as each keeps at least the minimum. Returns `None` when plain
/// cutting at the target is fine.
pub fn balanced_strings(n: usize, bounds: &ChainBounds) -> Option<usize> {
    let target = bounds.target_len.max(1);
    if n <= target {
        return None;
    }
    let strings = n.div_ceil(target);
    let remainder = n - (strings - 1) * target;
    let room = (strings - 1) * bounds.max_len.saturating_sub(target);
    if remainder >= bounds.min_len || remainder <= room || n / strings < bounds.min_len {
        return None;
    }
    Some(strings)
}

/// Cuts one cluster into strings of up to `target_len` panels, evened out
/// per [`balanced_strings`] when a short remainder would be stranded.
///
/// Chains shorter than `min_len` are set aside as leftovers and building
/// continues with the rest of the cluster.
pub fn string_cluster(
    layout: &Layout,
    roof: usize,
    cluster: &[usize],
    bounds: ChainBounds,
    phase: Phase,
    log: &mut DecisionLog,
) -> BuildOutcome {
    let ChainBounds {
        min_len,
        target_len,
        radius,
        ..
    } = bounds;
    let balanced = balanced_strings(cluster.len(), &bounds);
    let mut remaining = cluster.to_vec();
    let mut outcome = BuildOutcome::default();
    while remaining.len() >= min_len {
        let Some(seed) = seed_panel(layout, &remaining) else {
            break;
        };
        let len = match balanced {
            Some(k) => remaining
                .len()
                .div_ceil(k.saturating_sub(outcome.chains.len()).max(1))
                .min(target_len),
            None => target_len,
        };
        let chain = grow_chain(layout, roof, seed, &mut remaining, len, radius);
        if chain.len() >= min_len {
            log.accept(
                phase,
                format!(
                    "chain of {} from {} on roof {}",
                    chain.len(),
                    layout.panel(seed).id,
                    layout.roof(roof).id
                ),
            );
            outcome.chains.push(chain);
        } else {
            log.reject(
                phase,
                format!(
                    "chain of {} from {} is below minimum {}",
                    chain.len(),
                    layout.panel(seed).id,
                    min_len
                ),
            );
            outcome.leftovers.extend(chain.panels);
        }
    }
    outcome.leftovers.extend(remaining);
    outcome
}
