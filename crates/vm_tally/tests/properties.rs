//! Property-based tests covering round-trip mention counting, blank
//! determinism, Ranked Pairs acyclicity, STV vote-value conservation, and
//! tie-breaker-rerun determinism.

use proptest::prelude::*;
use std::collections::BTreeMap;
use vm_core::{CandidateId, TieBreaker};
use vm_tally::buffer::{BallotEncoder, Rank};
use vm_tally::scan::{candidate_mentions, count_blanks};
use vm_tally::tabulation::ranked_pairs::{tabulate_ranked_pairs, RankedPairsResult};
use vm_tally::tabulation::stv::{tabulate_stv, StvEvent, StvResult};

const CANDIDATES: [u16; 5] = [1, 2, 3, 4, 5];

fn id(v: u16) -> CandidateId {
    CandidateId::new(v).unwrap()
}

/// One ballot over a fixed candidate universe: a shuffled subset of
/// candidates partitioned into non-empty ranks, or blank.
fn ballot_strategy() -> impl Strategy<Value = Vec<Vec<u16>>> {
    let n = CANDIDATES.len();
    (
        proptest::collection::vec(any::<u16>(), n),
        proptest::collection::vec(any::<bool>(), n - 1),
        any::<bool>(),
        0usize..=n,
    )
        .prop_map(move |(priorities, seps, blank, keep)| {
            if blank || keep == 0 {
                return Vec::new();
            }
            let mut order: Vec<(u16, u16)> =
                priorities.into_iter().zip(CANDIDATES.iter().copied()).collect();
            order.sort_by_key(|&(p, _)| p);
            let ids: Vec<u16> = order.into_iter().take(keep).map(|(_, c)| c).collect();
            let mut ranks: Vec<Vec<u16>> = vec![vec![ids[0]]];
            for (i, &cand) in ids.iter().enumerate().skip(1) {
                if seps[i - 1] {
                    ranks.push(vec![cand]);
                } else {
                    ranks.last_mut().unwrap().push(cand);
                }
            }
            ranks
        })
}

fn ballots_strategy() -> impl Strategy<Value = Vec<Vec<Vec<u16>>>> {
    proptest::collection::vec(ballot_strategy(), 1..24)
}

fn encode(ballots: &[Vec<Vec<u16>>]) -> vm_tally::BallotBuffer {
    let mut enc = BallotEncoder::new(ballots.len() as u32);
    for ballot in ballots {
        let ranks: Vec<Rank> = ballot.iter().map(|r| r.iter().map(|&v| id(v)).collect()).collect();
        enc.add_ballot(ranks).unwrap();
    }
    enc.finish()
}

fn raw_mention_counts(ballots: &[Vec<Vec<u16>>]) -> BTreeMap<u16, u32> {
    let mut counts = BTreeMap::new();
    for ballot in ballots {
        for rank in ballot {
            for &c in rank {
                *counts.entry(c).or_insert(0) += 1;
            }
        }
    }
    counts
}

proptest! {
    /// Round-trip: `candidate_mentions` reports exactly the number of
    /// nonzero occurrences of every id across all input ballots.
    #[test]
    fn round_trip_mention_counts(ballots in ballots_strategy()) {
        let buf = encode(&ballots);
        let expected = raw_mention_counts(&ballots);
        let actual = candidate_mentions(&buf);
        for (&c, &count) in &expected {
            prop_assert_eq!(actual.get(&id(c)).copied(), Some(count));
        }
        for (&c, &count) in &actual {
            prop_assert_eq!(expected.get(&c.get()).copied().unwrap_or(0), count);
        }
    }

    /// Blank determinism: `count_blanks` equals the number of ballots whose
    /// rank list is empty.
    #[test]
    fn blank_count_matches_input(ballots in ballots_strategy()) {
        let buf = encode(&ballots);
        let expected = ballots.iter().filter(|b| b.is_empty()).count() as u32;
        prop_assert_eq!(count_blanks(&buf), expected);
    }

    /// Ranked Pairs acyclicity: whenever a full tie-breaker lets the
    /// tabulation complete, every inserted lock-graph edge's reverse was
    /// unreachable at insertion time.
    #[test]
    fn ranked_pairs_lock_graph_never_cycles(ballots in ballots_strategy()) {
        let buf = encode(&ballots);
        let candidates: Vec<CandidateId> = CANDIDATES.iter().map(|&v| id(v)).collect();
        let mentions = candidate_mentions(&buf);
        let tb = TieBreaker::new(candidates.clone());

        if let RankedPairsResult::Winners { winners, rounds } =
            tabulate_ranked_pairs(&buf, &candidates, &mentions, candidates.len(), Some(&tb))
        {
            // Each round's own lock graph must be acyclic: replaying its
            // edges in the order they were inserted must never require
            // adding an edge whose reverse is already reachable.
            for round in &rounds {
                let mut adj: BTreeMap<CandidateId, Vec<CandidateId>> = BTreeMap::new();
                for &(w, l) in &round.lock_graph_edges {
                    let reachable = {
                        let mut stack = vec![l];
                        let mut seen = std::collections::BTreeSet::new();
                        let mut found = false;
                        while let Some(n) = stack.pop() {
                            if n == w {
                                found = true;
                                break;
                            }
                            if !seen.insert(n) {
                                continue;
                            }
                            if let Some(next) = adj.get(&n) {
                                stack.extend(next.iter().copied());
                            }
                        }
                        found
                    };
                    prop_assert!(!reachable, "edge {:?}->{:?} closes a cycle within its round", w, l);
                    adj.entry(w).or_default().push(l);
                }
            }
            // Candidate conservation: no duplicates, all real ids.
            let mut w = winners.clone();
            w.sort();
            w.dedup();
            prop_assert_eq!(w.len(), winners.len());
            prop_assert!(winners.iter().all(|c| candidates.contains(c)));
        }
    }

    /// STV value conservation: at every event with a `values` snapshot, the
    /// sum of every original candidate's vote value equals the number of
    /// ballots that had some first preference among the candidate set.
    #[test]
    fn stv_conserves_vote_value(ballots in ballots_strategy(), max_winners in 1usize..5) {
        let buf = encode(&ballots);
        let candidates: Vec<CandidateId> = CANDIDATES.iter().map(|&v| id(v)).collect();
        let tb = TieBreaker::new(candidates.clone());

        let total_first_pref = ballots
            .iter()
            .filter(|b| b.iter().flatten().next().is_some())
            .count() as f64;

        if let StvResult::Winners { events, .. } =
            tabulate_stv(&buf, &candidates, max_winners, Some(&tb))
        {
            for event in &events {
                let values = match event {
                    StvEvent::ElectWithQuota { values, .. } => Some(values),
                    StvEvent::Eliminate { values, .. } => Some(values),
                    StvEvent::ElectRest { .. } => None,
                };
                if let Some(values) = values {
                    let sum: f64 = values.values().sum();
                    prop_assert!(
                        (sum - total_first_pref).abs() < 1e-6,
                        "vote value {} != conserved total {}", sum, total_first_pref
                    );
                }
            }
        }
    }

    /// Tie-breaker stability: rerunning Ranked Pairs with the same ballots
    /// and tie-breaker produces an identical result.
    #[test]
    fn ranked_pairs_is_deterministic(ballots in ballots_strategy()) {
        let buf = encode(&ballots);
        let candidates: Vec<CandidateId> = CANDIDATES.iter().map(|&v| id(v)).collect();
        let mentions = candidate_mentions(&buf);
        let tb = TieBreaker::new(candidates.clone());

        let first = format!(
            "{:?}",
            tabulate_ranked_pairs(&buf, &candidates, &mentions, candidates.len(), Some(&tb))
        );
        let second = format!(
            "{:?}",
            tabulate_ranked_pairs(&buf, &candidates, &mentions, candidates.len(), Some(&tb))
        );
        prop_assert_eq!(first, second);
    }
}
