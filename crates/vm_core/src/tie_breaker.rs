//! The external tie-breaker: a total preorder over candidate ids, supplied
//! once per tabulation and consulted only for the ambiguous subset.

use crate::ids::CandidateId;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// An ordered sequence of candidate ids, most preferred first. Lower index
/// means more preferred.
#[derive(Clone, Debug)]
pub struct TieBreaker {
    order: Vec<CandidateId>,
    rank: BTreeMap<CandidateId, usize>,
}

impl TieBreaker {
    pub fn new(order: Vec<CandidateId>) -> Self {
        let rank = order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        Self { order, rank }
    }

    pub fn order(&self) -> &[CandidateId] {
        &self.order
    }

    /// Preference rank of `id`, or `None` if it is absent from the sequence.
    pub fn rank_of(&self, id: CandidateId) -> Option<usize> {
        self.rank.get(&id).copied()
    }

    /// Every id in `ids` that is absent from this tie-breaker, in input order.
    /// Empty iff the tie-breaker can resolve the whole set.
    pub fn missing<'a>(&self, ids: impl IntoIterator<Item = &'a CandidateId>) -> Vec<CandidateId> {
        ids.into_iter()
            .copied()
            .filter(|id| self.rank_of(*id).is_none())
            .collect()
    }

    /// Sort `ids` ascending by preference rank (most preferred first).
    ///
    /// Panics if any id is absent — callers must check [`TieBreaker::missing`]
    /// first and surface `IncompleteTieBreaker` rather than call this.
    pub fn sort_by_preference(&self, ids: &mut [CandidateId]) {
        ids.sort_by_key(|id| {
            self.rank_of(*id)
                .expect("sort_by_preference requires every id to be present; check missing() first")
        });
    }

    /// The least-preferred (highest rank index) id among `ids`.
    pub fn least_preferred(&self, ids: &[CandidateId]) -> Option<CandidateId> {
        ids.iter()
            .copied()
            .max_by_key(|id| self.rank_of(*id).unwrap_or(usize::MAX))
    }

    /// The most-preferred (lowest rank index) id among `ids`.
    pub fn most_preferred(&self, ids: &[CandidateId]) -> Option<CandidateId> {
        ids.iter()
            .copied()
            .min_by_key(|id| self.rank_of(*id).unwrap_or(usize::MAX))
    }

    /// Resolve a band of candidates tied at a cutoff boundary (shared by
    /// Threshold Majority's boundary tie-break and STV's election-overflow
    /// boundary tie-break).
    pub fn resolve_band(&self, tied_band: &[CandidateId]) -> BandResolution {
        let missing = self.missing(tied_band);
        if !missing.is_empty() {
            return BandResolution::Incomplete(missing);
        }
        let mut band = tied_band.to_vec();
        self.sort_by_preference(&mut band);
        BandResolution::Resolved(band)
    }
}

/// Outcome of [`TieBreaker::resolve_band`].
#[derive(Clone, Debug)]
pub enum BandResolution {
    /// The tied band, sorted most-preferred first.
    Resolved(Vec<CandidateId>),
    /// Some members of the tied band have no rank in the tie-breaker.
    Incomplete(Vec<CandidateId>),
}
