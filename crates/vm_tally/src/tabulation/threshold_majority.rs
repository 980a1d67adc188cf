//! Threshold Majority: sort by mention count, boundary tie-break. This
//! engine never reads the ballot buffer directly — it is
//! handed the already-filtered candidate list and mention tally by the
//! dispatcher.

use crate::tabulation::boundary::{resolve_boundary, BoundaryOutcome};
use std::collections::BTreeMap;
use vm_core::{CandidateId, TieBreaker};

#[derive(Clone, Debug)]
pub enum ThresholdMajorityResult {
    Winners { winners: Vec<CandidateId>, mentions: BTreeMap<CandidateId, u32> },
    TieBreakerNeeded { tied: Vec<CandidateId> },
    IncompleteTieBreaker { missing: Vec<CandidateId> },
}

/// Sorts `candidates` descending by mention count and returns the top
/// `max_winners`, resolving a boundary tie with `tie_breaker` when one
/// exists.
pub fn tabulate_threshold_majority(
    candidates: &[CandidateId],
    mentions: &BTreeMap<CandidateId, u32>,
    max_winners: usize,
    tie_breaker: Option<&TieBreaker>,
) -> ThresholdMajorityResult {
    let count_of = |c: &CandidateId| mentions.get(c).copied().unwrap_or(0);

    let mut sorted: Vec<CandidateId> = candidates.to_vec();
    sorted.sort_by(|a, b| count_of(b).cmp(&count_of(a)).then(a.cmp(b)));

    match resolve_boundary(&sorted, |c| count_of(&c), max_winners, tie_breaker) {
        BoundaryOutcome::Resolved(winners) => {
            ThresholdMajorityResult::Winners { winners, mentions: mentions.clone() }
        }
        BoundaryOutcome::TieBreakerNeeded { tied } => ThresholdMajorityResult::TieBreakerNeeded { tied },
        BoundaryOutcome::IncompleteTieBreaker { missing } => {
            ThresholdMajorityResult::IncompleteTieBreaker { missing }
        }
    }
}
