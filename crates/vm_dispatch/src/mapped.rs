//! The generic mapped entry point: accepts arbitrary equality-comparable
//! candidate values, maps them onto dense
//! internal ids, encodes the ballots, runs [`dispatch`], and remaps every
//! id in the result back to the caller's values.

use crate::config::MethodConfig;
use crate::dispatch::dispatch;
use crate::errors::DispatchError;
use crate::result::{BallotCounts, SuccessPayload, TiedAmbiguity, VoteResult};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use vm_core::ids::{NO_ID, YES_ID};
use vm_core::{CandidateId, TieBreaker};
use vm_tally::tabulation::ranked_pairs::RoundRecord;
use vm_tally::tabulation::stv::StvEvent;
use vm_tally::yesno::YesNoTally;
use vm_tally::BallotEncoder;

#[derive(Clone, Debug)]
pub struct MappedRoundRecord<T> {
    pub winner: T,
    pub ordered_pairs: Vec<(T, T)>,
    pub lock_graph_edges: Vec<(T, T)>,
}

#[derive(Clone, Debug)]
pub enum MappedStvEvent<T> {
    ElectWithQuota { elected: Vec<T>, values: Vec<(T, f64)>, quota: f64 },
    Eliminate { candidate: T, values: Vec<(T, f64)> },
    ElectRest { elected: Vec<T> },
}

#[derive(Clone, Debug)]
pub enum MappedTiedAmbiguity<T> {
    Candidates(Vec<T>),
    Pairs(Vec<(T, T)>),
}

#[derive(Clone, Debug)]
pub enum MappedSuccessPayload<T> {
    YesNo {
        tally: YesNoTally,
        passed: bool,
    },
    ThresholdMajority {
        winners: Vec<T>,
        mentions: Vec<(T, u32)>,
        included: Vec<T>,
        excluded: Vec<T>,
    },
    RankedPairs {
        winners: Vec<T>,
        rounds: Vec<MappedRoundRecord<T>>,
        mentions: Vec<(T, u32)>,
    },
    Stv {
        winners: Vec<T>,
        events: Vec<MappedStvEvent<T>>,
    },
}

#[derive(Clone, Debug)]
pub enum MappedVoteResult<T> {
    Success { payload: MappedSuccessPayload<T>, counts: BallotCounts },
    TieBreakerNeeded { tied: MappedTiedAmbiguity<T>, counts: BallotCounts },
    IncompleteTieBreaker { missing: Vec<T>, counts: BallotCounts },
    MajorityEmpty { counts: BallotCounts },
    NoQuorum { counts: BallotCounts },
    TooManyBlanks { counts: BallotCounts },
}

/// Maps `candidates`/`ballots`/`tie_breaker_order` onto dense internal ids,
/// runs the full gate-then-engine pipeline, and remaps the result back to
/// `T`.
///
/// `candidates` must have exactly 2 entries for `YesNo`/`YesNoBlank`
/// configs — `candidates[0]` is "No", `candidates[1]` is "Yes" — which is a
/// programmer error to get wrong. For every other method,
/// candidates are mapped to dense ids `1..` in the order given.
pub fn run_mapped<T>(
    config: &MethodConfig,
    eligible: u32,
    candidates: &[T],
    ballots: &[Vec<Vec<T>>],
    tie_breaker_order: Option<&[T]>,
) -> Result<MappedVoteResult<T>, DispatchError>
where
    T: Eq + Hash + Clone,
{
    let is_yes_no = matches!(config, MethodConfig::YesNo { .. } | MethodConfig::YesNoBlank { .. });
    if is_yes_no && candidates.len() != 2 {
        return Err(DispatchError::YesNoCandidateCount { got: candidates.len() });
    }

    let mut forward: HashMap<T, CandidateId> = HashMap::with_capacity(candidates.len());
    let mut backward: HashMap<CandidateId, T> = HashMap::with_capacity(candidates.len());
    if is_yes_no {
        forward.insert(candidates[0].clone(), NO_ID);
        forward.insert(candidates[1].clone(), YES_ID);
        backward.insert(NO_ID, candidates[0].clone());
        backward.insert(YES_ID, candidates[1].clone());
    } else {
        for (i, c) in candidates.iter().enumerate() {
            let cid = CandidateId::new((i + 1) as u16).expect("dense ids start at 1 and fit in u16");
            forward.insert(c.clone(), cid);
            backward.insert(cid, c.clone());
        }
    }

    let mut mapped_candidates: Vec<CandidateId> = backward.keys().copied().collect();
    mapped_candidates.sort();

    let mut encoder = BallotEncoder::new(ballots.len() as u32);
    for ranks in ballots {
        let mapped_ranks: Vec<Vec<CandidateId>> = ranks
            .iter()
            .map(|rank| rank.iter().filter_map(|v| forward.get(v).copied()).collect())
            .collect();
        encoder.add_ballot(mapped_ranks)?;
    }
    let buffer = encoder.finish();

    let tie_breaker = tie_breaker_order
        .map(|order| TieBreaker::new(order.iter().filter_map(|v| forward.get(v).copied()).collect()));

    let result = dispatch(config, &buffer, eligible, &mapped_candidates, tie_breaker.as_ref());
    Ok(remap(result, &backward))
}

fn map_id<T: Clone>(id: CandidateId, backward: &HashMap<CandidateId, T>) -> T {
    backward.get(&id).cloned().expect("engine never returns an id outside the mapped candidate set")
}

fn map_mentions<T: Clone>(mentions: BTreeMap<CandidateId, u32>, backward: &HashMap<CandidateId, T>) -> Vec<(T, u32)> {
    mentions.into_iter().map(|(c, n)| (map_id(c, backward), n)).collect()
}

fn map_round_record<T: Clone>(r: RoundRecord, backward: &HashMap<CandidateId, T>) -> MappedRoundRecord<T> {
    MappedRoundRecord {
        winner: map_id(r.winner, backward),
        ordered_pairs: r.ordered_pairs.into_iter().map(|(a, b)| (map_id(a, backward), map_id(b, backward))).collect(),
        lock_graph_edges: r
            .lock_graph_edges
            .into_iter()
            .map(|(a, b)| (map_id(a, backward), map_id(b, backward)))
            .collect(),
    }
}

fn map_stv_event<T: Clone>(e: StvEvent, backward: &HashMap<CandidateId, T>) -> MappedStvEvent<T> {
    match e {
        StvEvent::ElectWithQuota { elected, values, quota } => MappedStvEvent::ElectWithQuota {
            elected: elected.into_iter().map(|c| map_id(c, backward)).collect(),
            values: values.into_iter().map(|(c, v)| (map_id(c, backward), v)).collect(),
            quota,
        },
        StvEvent::Eliminate { candidate, values } => MappedStvEvent::Eliminate {
            candidate: map_id(candidate, backward),
            values: values.into_iter().map(|(c, v)| (map_id(c, backward), v)).collect(),
        },
        StvEvent::ElectRest { elected } => {
            MappedStvEvent::ElectRest { elected: elected.into_iter().map(|c| map_id(c, backward)).collect() }
        }
    }
}

fn remap<T: Clone>(result: VoteResult, backward: &HashMap<CandidateId, T>) -> MappedVoteResult<T> {
    match result {
        VoteResult::Success { payload, counts } => MappedVoteResult::Success {
            payload: match payload {
                SuccessPayload::YesNo { tally, passed } => MappedSuccessPayload::YesNo { tally, passed },
                SuccessPayload::ThresholdMajority { winners, mentions, filter } => {
                    MappedSuccessPayload::ThresholdMajority {
                        winners: winners.into_iter().map(|c| map_id(c, backward)).collect(),
                        mentions: map_mentions(mentions, backward),
                        included: filter.included.into_iter().map(|c| map_id(c, backward)).collect(),
                        excluded: filter.excluded.into_iter().map(|c| map_id(c, backward)).collect(),
                    }
                }
                SuccessPayload::RankedPairs { winners, rounds, mentions } => MappedSuccessPayload::RankedPairs {
                    winners: winners.into_iter().map(|c| map_id(c, backward)).collect(),
                    rounds: rounds.into_iter().map(|r| map_round_record(r, backward)).collect(),
                    mentions: map_mentions(mentions, backward),
                },
                SuccessPayload::Stv { winners, events } => MappedSuccessPayload::Stv {
                    winners: winners.into_iter().map(|c| map_id(c, backward)).collect(),
                    events: events.into_iter().map(|e| map_stv_event(e, backward)).collect(),
                },
            },
            counts,
        },
        VoteResult::TieBreakerNeeded { tied, counts } => MappedVoteResult::TieBreakerNeeded {
            tied: match tied {
                TiedAmbiguity::Candidates(v) => {
                    MappedTiedAmbiguity::Candidates(v.into_iter().map(|c| map_id(c, backward)).collect())
                }
                TiedAmbiguity::Pairs(v) => MappedTiedAmbiguity::Pairs(
                    v.into_iter().map(|(a, b)| (map_id(a, backward), map_id(b, backward))).collect(),
                ),
            },
            counts,
        },
        VoteResult::IncompleteTieBreaker { missing, counts } => MappedVoteResult::IncompleteTieBreaker {
            missing: missing.into_iter().map(|c| map_id(c, backward)).collect(),
            counts,
        },
        VoteResult::MajorityEmpty { counts } => MappedVoteResult::MajorityEmpty { counts },
        VoteResult::NoQuorum { counts } => MappedVoteResult::NoQuorum { counts },
        VoteResult::TooManyBlanks { counts } => MappedVoteResult::TooManyBlanks { counts },
    }
}
