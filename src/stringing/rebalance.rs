//! Length rebalancing so more strings can share an MPPT.
//!
//! Parallel strings must have equal length. Within each merge group, end
//! panels move from the longest string to a nearby string at least two
//! panels shorter. Every such move strictly lowers the sum of squared string
//! lengths, so the loop terminates.

use tracing::debug;

use crate::decision::{DecisionLog, Phase};
use crate::stringing::{Chain, End, PassContext};

const ENDS: [End; 2] = [End::Head, End::Tail];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Move {
    donor: usize,
    donor_end: End,
    receiver: usize,
    receiver_end: End,
    distance: f64,
}

/// Rebalances string lengths inside each merge group.
///
/// Returns the number of panels moved.
pub fn rebalance_for_parallel(
    ctx: &PassContext<'_>,
    chains: &mut [Chain],
    log: &mut DecisionLog,
) -> usize {
    let mut moves = 0;
    for group in 0..ctx.groups.len() {
        let members: Vec<usize> = (0..chains.len())
            .filter(|&i| ctx.groups.group_of(chains[i].roof) == group)
            .collect();
        if members.len() < 2 {
            continue;
        }
        loop {
            let mut rejected = Vec::new();
            match find_move(ctx, chains, &members, &mut rejected) {
                Some(m) => {
                    apply(chains, m);
                    moves += 1;
                    log.accept(
                        Phase::Rebalance,
                        format!(
                            "panel from string {} to string {} ({} / {} panels)",
                            m.donor + 1,
                            m.receiver + 1,
                            chains[m.donor].len(),
                            chains[m.receiver].len()
                        ),
                    );
                }
                None => {
                    for detail in rejected {
                        log.reject(Phase::Rebalance, detail);
                    }
                    break;
                }
            }
        }
    }
    if moves > 0 {
        debug!(moves, "strings rebalanced");
    }
    moves
}

fn find_move(
    ctx: &PassContext<'_>,
    chains: &[Chain],
    members: &[usize],
    rejected: &mut Vec<String>,
) -> Option<Move> {
    let min = ctx.limits.min_panels;
    let upper = ctx.limits.upper();

    let mut donors = members.to_vec();
    donors.sort_by(|&a, &b| chains[b].len().cmp(&chains[a].len()).then(a.cmp(&b)));

    for &donor in &donors {
        let donor_len = chains[donor].len();
        let mut best: Option<Move> = None;
        for &receiver in members {
            if receiver == donor || chains[receiver].len() + 2 > donor_len {
                continue;
            }
            let Some(m) = closest_ends(ctx, chains, donor, receiver) else {
                continue;
            };
            if m.distance > ctx.radius_between(chains[donor].roof, chains[receiver].roof) {
                continue;
            }
            let admitted = ctx.limits.admits(donor_len - 1)
                && ctx.limits.admits(chains[receiver].len() + 1);
            if !admitted {
                rejected.push(format!(
                    "string {} to string {} would leave lengths outside [{min}, {upper}]",
                    donor + 1,
                    receiver + 1
                ));
                continue;
            }
            let better = best.is_none_or(|b| {
                m.distance
                    .total_cmp(&b.distance)
                    .then(m.receiver.cmp(&b.receiver))
                    .is_lt()
            });
            if better {
                best = Some(m);
            }
        }
        if best.is_some() {
            return best;
        }
    }
    None
}

fn closest_ends(ctx: &PassContext<'_>, chains: &[Chain], donor: usize, receiver: usize) -> Option<Move> {
    let mut best: Option<Move> = None;
    for donor_end in ENDS {
        let d = chains[donor].end(donor_end)?;
        for receiver_end in ENDS {
            let r = chains[receiver].end(receiver_end)?;
            let distance = ctx.layout.distance(d, r);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Move {
                    donor,
                    donor_end,
                    receiver,
                    receiver_end,
                    distance,
                });
            }
        }
    }
    best
}

fn apply(chains: &mut [Chain], m: Move) {
    if let Some(panel) = chains[m.donor].detach(m.donor_end) {
        chains[m.receiver].attach(m.receiver_end, panel);
    }
}
