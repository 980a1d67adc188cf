//! The unified `VoteResult` tagged union and its payloads.

use std::collections::BTreeMap;
use vm_core::CandidateId;
use vm_tally::config::MentionFilter;
use vm_tally::tabulation::ranked_pairs::RoundRecord;
use vm_tally::tabulation::stv::StvEvent;
use vm_tally::yesno::YesNoTally;

/// `{submitted, blank, eligible}`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BallotCounts {
    pub submitted: u32,
    pub blank: u32,
    pub eligible: u32,
}

/// The ambiguous subset a `TieBreakerNeeded` result carries: either a set
/// of tied candidates (Threshold Majority boundary, STV boundary/
/// elimination) or a set of tied pairs (Ranked Pairs pair-ordering/root
/// resolution).
#[derive(Clone, Debug)]
pub enum TiedAmbiguity {
    Candidates(Vec<CandidateId>),
    Pairs(Vec<(CandidateId, CandidateId)>),
}

#[derive(Clone, Debug)]
pub enum SuccessPayload {
    YesNo {
        tally: YesNoTally,
        passed: bool,
    },
    ThresholdMajority {
        winners: Vec<CandidateId>,
        mentions: BTreeMap<CandidateId, u32>,
        filter: MentionFilter,
    },
    RankedPairs {
        winners: Vec<CandidateId>,
        rounds: Vec<RoundRecord>,
        mentions: BTreeMap<CandidateId, u32>,
    },
    Stv {
        winners: Vec<CandidateId>,
        events: Vec<StvEvent>,
    },
}

/// The dispatcher's unified result: either a successful
/// tabulation, a request for more tie-breaker information, or one of the
/// quorum/blank/mention failure conditions. Every variant carries the
/// ballot counts computed by the dispatcher's gates.
#[derive(Clone, Debug)]
pub enum VoteResult {
    Success { payload: SuccessPayload, counts: BallotCounts },
    TieBreakerNeeded { tied: TiedAmbiguity, counts: BallotCounts },
    IncompleteTieBreaker { missing: Vec<CandidateId>, counts: BallotCounts },
    MajorityEmpty { counts: BallotCounts },
    NoQuorum { counts: BallotCounts },
    TooManyBlanks { counts: BallotCounts },
}
