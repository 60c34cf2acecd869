//! Round-budget allocation across a formation.

use serde::{Deserialize, Serialize};

use fdc_core::constants::PHASE_INTERVAL_SECS;
use fdc_core::enums::DistributionMethod;
use fdc_core::errors::{FdcError, FdcResult};

/// Rounds assigned to one emitter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitterAssignment {
    /// Index into the formation's emitter list.
    pub emitter_index: usize,
    pub rounds: u32,
    /// 1-based firing order.
    pub firing_order: u32,
    /// Why this emitter received this share.
    pub rationale: String,
}

/// One phase of the firing sequence: the named emitters fire together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiringPhase {
    /// 1-based phase number.
    pub number: u32,
    pub emitter_indices: Vec<usize>,
    pub rounds_per_emitter: u32,
    /// Pause before the next phase, seconds.
    pub interval_secs: f64,
}

/// A full allocation of a round budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundAllocation {
    pub total_rounds: u32,
    pub method: DistributionMethod,
    pub assignments: Vec<EmitterAssignment>,
    pub sequence: Vec<FiringPhase>,
}

/// Distribute `total_rounds` across `emitter_count` emitters.
///
/// `priorities` (higher = more important) feeds the weighted and priority
/// methods; when absent, every emitter weighs the same and priority follows
/// list order.
pub fn allocate(
    emitter_count: usize,
    total_rounds: u32,
    method: DistributionMethod,
    priorities: Option<&[u32]>,
) -> FdcResult<RoundAllocation> {
    if emitter_count == 0 {
        return Err(FdcError::InvalidFormation {
            violations: vec!["cannot allocate rounds to zero emitters".to_string()],
        });
    }
    if let Some(p) = priorities {
        if p.len() != emitter_count {
            return Err(FdcError::InvalidFormation {
                violations: vec![format!(
                    "priority list has {} entries for {} emitters",
                    p.len(),
                    emitter_count
                )],
            });
        }
    }

    let (shares, note): (Vec<u32>, Option<&str>) = match method {
        DistributionMethod::Equal => (equal_shares(emitter_count, total_rounds), None),
        DistributionMethod::Weighted => (
            weighted_shares(emitter_count, total_rounds, priorities),
            None,
        ),
        DistributionMethod::Priority => (
            priority_shares(emitter_count, total_rounds, priorities),
            None,
        ),
        DistributionMethod::Custom => {
            tracing::warn!("custom round distribution not implemented, using equal split");
            (
                equal_shares(emitter_count, total_rounds),
                Some("custom distribution not implemented, using equal split"),
            )
        }
    };

    let assignments = shares
        .iter()
        .enumerate()
        .map(|(i, &rounds)| EmitterAssignment {
            emitter_index: i,
            rounds,
            firing_order: i as u32 + 1,
            rationale: match note {
                Some(n) => format!("{n}: {rounds} rounds"),
                None => rationale(method, i, rounds, priorities),
            },
        })
        .collect();

    Ok(RoundAllocation {
        total_rounds,
        method,
        assignments,
        sequence: firing_sequence(&shares),
    })
}

/// Floor division with the remainder going to the first emitters; shares
/// sum exactly to the total and differ by at most one.
fn equal_shares(emitter_count: usize, total_rounds: u32) -> Vec<u32> {
    let base = total_rounds / emitter_count as u32;
    let remainder = total_rounds as usize % emitter_count;
    (0..emitter_count)
        .map(|i| base + u32::from(i < remainder))
        .collect()
}

/// Priority-weighted proportional shares, minimum one round each where the
/// budget allows. Rounding drift is settled against the weight order so the
/// shares sum exactly to the total.
fn weighted_shares(emitter_count: usize, total_rounds: u32, priorities: Option<&[u32]>) -> Vec<u32> {
    let weights: Vec<f64> = match priorities {
        Some(p) => p.iter().map(|&w| w.max(1) as f64).collect(),
        None => vec![1.0; emitter_count],
    };
    let weight_sum: f64 = weights.iter().sum();

    // Budget smaller than the formation: one round each down the weight order.
    if (total_rounds as usize) < emitter_count {
        let mut order: Vec<usize> = (0..emitter_count).collect();
        order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));
        let mut shares = vec![0u32; emitter_count];
        for &i in order.iter().take(total_rounds as usize) {
            shares[i] = 1;
        }
        return shares;
    }

    let mut shares: Vec<u32> = weights
        .iter()
        .map(|w| ((total_rounds as f64 * w / weight_sum).floor() as u32).max(1))
        .collect();

    let mut assigned: u32 = shares.iter().sum();
    // Hand out any shortfall by descending weight, trim any overshoot by
    // ascending weight (never below the one-round minimum).
    let mut order: Vec<usize> = (0..emitter_count).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));
    let mut cursor = 0usize;
    while assigned < total_rounds {
        shares[order[cursor % emitter_count]] += 1;
        assigned += 1;
        cursor += 1;
    }
    cursor = 0;
    while assigned > total_rounds {
        let i = order[emitter_count - 1 - (cursor % emitter_count)];
        if shares[i] > 1 {
            shares[i] -= 1;
            assigned -= 1;
        }
        cursor += 1;
    }
    shares
}

/// Rank-ordered greedy assignment: the highest-priority emitter takes half
/// of what remains (minimum one), down the ranking, with the last emitter
/// absorbing the remainder. Exhausts the total exactly.
fn priority_shares(emitter_count: usize, total_rounds: u32, priorities: Option<&[u32]>) -> Vec<u32> {
    let mut order: Vec<usize> = (0..emitter_count).collect();
    if let Some(p) = priorities {
        order.sort_by(|&a, &b| p[b].cmp(&p[a]).then(a.cmp(&b)));
    }

    let mut shares = vec![0u32; emitter_count];
    let mut remaining = total_rounds;
    for (rank, &i) in order.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let take = if rank == emitter_count - 1 {
            remaining
        } else {
            remaining.div_ceil(2).max(1)
        };
        shares[i] = take;
        remaining -= take;
    }
    shares
}

/// Phase k fires one round from every emitter still holding at least k
/// rounds, with a fixed pause between phases.
fn firing_sequence(shares: &[u32]) -> Vec<FiringPhase> {
    let max_share = shares.iter().copied().max().unwrap_or(0);
    (1..=max_share)
        .map(|phase| FiringPhase {
            number: phase,
            emitter_indices: shares
                .iter()
                .enumerate()
                .filter(|(_, &s)| s >= phase)
                .map(|(i, _)| i)
                .collect(),
            rounds_per_emitter: 1,
            interval_secs: PHASE_INTERVAL_SECS,
        })
        .collect()
}

fn rationale(
    method: DistributionMethod,
    index: usize,
    rounds: u32,
    priorities: Option<&[u32]>,
) -> String {
    match method {
        DistributionMethod::Equal | DistributionMethod::Custom => {
            format!("equal split: {rounds} rounds")
        }
        DistributionMethod::Weighted => match priorities {
            Some(p) => format!("weighted share for priority {}: {rounds} rounds", p[index]),
            None => format!("uniform weight: {rounds} rounds"),
        },
        DistributionMethod::Priority => match priorities {
            Some(p) => format!(
                "greedy share at priority {}: {rounds} rounds",
                p[index]
            ),
            None => format!("greedy share by list order: {rounds} rounds"),
        },
    }
}
