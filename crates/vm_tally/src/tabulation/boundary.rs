//! The boundary tie-break shared by Threshold Majority and STV's
//! quota-election overflow boundary.
//!
//! `sorted` must already be sorted descending by the score `value_of`
//! returns, with a tie-break-independent secondary key (id ascending) so
//! that candidates sharing a score form one contiguous band. Equality is
//! checked with `==`, which is exact for both integer mention counts and
//! the `f64` vote values STV produces.

use vm_core::tie_breaker::BandResolution;
use vm_core::{CandidateId, TieBreaker};

#[derive(Clone, Debug)]
pub enum BoundaryOutcome {
    /// `take` candidates, in descending-score order with the boundary tie
    /// (if any) resolved by the tie-breaker.
    Resolved(Vec<CandidateId>),
    TieBreakerNeeded { tied: Vec<CandidateId> },
    IncompleteTieBreaker { missing: Vec<CandidateId> },
}

pub fn resolve_boundary<V: PartialEq + Copy>(
    sorted: &[CandidateId],
    value_of: impl Fn(CandidateId) -> V,
    take: usize,
    tie_breaker: Option<&TieBreaker>,
) -> BoundaryOutcome {
    if take >= sorted.len() {
        return BoundaryOutcome::Resolved(sorted.to_vec());
    }
    let keep_val = value_of(sorted[take - 1]);
    let drop_val = value_of(sorted[take]);
    if keep_val != drop_val {
        return BoundaryOutcome::Resolved(sorted[..take].to_vec());
    }

    // `sorted` groups equal scores contiguously, so the tied band is one slice.
    let start = sorted.iter().position(|&c| value_of(c) == keep_val).unwrap();
    let end = sorted.iter().rposition(|&c| value_of(c) == keep_val).unwrap() + 1;
    let tied_band = sorted[start..end].to_vec();

    let Some(tb) = tie_breaker else {
        return BoundaryOutcome::TieBreakerNeeded { tied: tied_band };
    };

    match tb.resolve_band(&tied_band) {
        BandResolution::Incomplete(missing) => BoundaryOutcome::IncompleteTieBreaker { missing },
        BandResolution::Resolved(ordered_band) => {
            let mut resolved = sorted.to_vec();
            resolved[start..end].clone_from_slice(&ordered_band);
            BoundaryOutcome::Resolved(resolved[..take].to_vec())
        }
    }
}
