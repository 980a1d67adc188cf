//! Ranked Pairs (Tideman method): pairwise majority graph, two-layer
//! tie-break ordering, cycle-avoiding lock graph, round-by-round winner
//! extraction.

use crate::buffer::BallotBuffer;
use crate::scan::{compare_by_ballot, ONLY_A_PRESENT, ONLY_B_PRESENT};
use std::collections::{BTreeMap, BTreeSet};
use vm_core::tie_breaker::BandResolution;
use vm_core::{CandidateId, TieBreaker};

/// `{a, b}` with `right` the numerically smaller id.
type PairKey = (CandidateId, CandidateId);

fn pair_key(a: CandidateId, b: CandidateId) -> PairKey {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct PairState {
    ballots: u32,
    diff: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeWinner {
    Left,
    Right,
}

fn winner_loser(key: PairKey, edge: EdgeWinner) -> (CandidateId, CandidateId) {
    let (right, left) = key;
    match edge {
        EdgeWinner::Left => (left, right),
        EdgeWinner::Right => (right, left),
    }
}

/// One completed round: the winner, the Tideman-ordered pairs considered,
/// and the lock-graph edges actually inserted (in `(winner, loser)` form).
#[derive(Clone, Debug)]
pub struct RoundRecord {
    pub winner: CandidateId,
    pub ordered_pairs: Vec<(CandidateId, CandidateId)>,
    pub lock_graph_edges: Vec<(CandidateId, CandidateId)>,
}

#[derive(Clone, Debug)]
pub enum RankedPairsResult {
    Winners { winners: Vec<CandidateId>, rounds: Vec<RoundRecord> },
    MajorityEmpty,
    TieBreakerNeeded { tied_pairs: Vec<(CandidateId, CandidateId)> },
    IncompleteTieBreaker { missing: Vec<CandidateId> },
}

/// Candidates whose mention count is at least half the ballot count. This
/// is a fixed domain rule, independent of any configured mention
/// threshold.
fn mention_filtered(
    candidates: &[CandidateId],
    mentions: &BTreeMap<CandidateId, u32>,
    ballot_count: u32,
) -> Vec<CandidateId> {
    let mut kept: Vec<CandidateId> = candidates
        .iter()
        .copied()
        .filter(|c| {
            let m = mentions.get(c).copied().unwrap_or(0) as u64;
            m * 2 >= ballot_count as u64
        })
        .collect();
    kept.sort();
    kept
}

struct LockGraph {
    out_edges: BTreeMap<CandidateId, Vec<CandidateId>>,
}

impl LockGraph {
    fn new(nodes: &BTreeSet<CandidateId>) -> Self {
        Self { out_edges: nodes.iter().map(|&n| (n, Vec::new())).collect() }
    }

    fn reachable(&self, from: CandidateId, to: CandidateId) -> bool {
        let mut stack = vec![from];
        let mut seen = BTreeSet::new();
        while let Some(n) = stack.pop() {
            if n == to {
                return true;
            }
            if !seen.insert(n) {
                continue;
            }
            if let Some(next) = self.out_edges.get(&n) {
                stack.extend(next.iter().copied());
            }
        }
        false
    }

    fn insert(&mut self, from: CandidateId, to: CandidateId) {
        self.out_edges.entry(from).or_default().push(to);
    }

    fn roots(&self) -> Vec<CandidateId> {
        let mut has_incoming: BTreeSet<CandidateId> = BTreeSet::new();
        for outs in self.out_edges.values() {
            has_incoming.extend(outs.iter().copied());
        }
        self.out_edges.keys().copied().filter(|n| !has_incoming.contains(n)).collect()
    }
}

pub fn tabulate_ranked_pairs(
    buffer: &BallotBuffer,
    candidates: &[CandidateId],
    mentions: &BTreeMap<CandidateId, u32>,
    max_winners: usize,
    tie_breaker: Option<&TieBreaker>,
) -> RankedPairsResult {
    let ballot_count = buffer.ballot_count();
    let mentioned = mention_filtered(candidates, mentions, ballot_count);

    let mut pairs: BTreeMap<PairKey, PairState> = BTreeMap::new();
    for i in 0..mentioned.len() {
        for j in (i + 1)..mentioned.len() {
            pairs.insert(pair_key(mentioned[i], mentioned[j]), PairState::default());
        }
    }

    let mut empty_ballots: u32 = 0;
    for b in 0..ballot_count {
        let mut touched_any = false;
        for (&(right, left), state) in pairs.iter_mut() {
            let diff = compare_by_ballot(buffer, b, left, right);
            if diff == ONLY_A_PRESENT || diff == ONLY_B_PRESENT {
                // Only one of the pair is ranked on this ballot; the pair is
                // not ordered and the ballot doesn't touch it.
                continue;
            }
            if diff != 0 {
                touched_any = true;
                state.ballots += 1;
                state.diff += diff.signum();
            }
        }
        if !touched_any {
            empty_ballots += 1;
        }
    }
    if (empty_ballots as u64) * 2 >= ballot_count as u64 {
        return RankedPairsResult::MajorityEmpty;
    }

    // Per-edge winners. Collect every zero-diff edge before failing, so a
    // missing tie-breaker is reported with the full ambiguous set.
    let tied_edges: Vec<PairKey> =
        pairs.iter().filter(|(_, s)| s.ballots > 0 && s.diff == 0).map(|(&k, _)| k).collect();
    if !tied_edges.is_empty() && tie_breaker.is_none() {
        return RankedPairsResult::TieBreakerNeeded { tied_pairs: tied_edges.clone() };
    }
    let mut missing_ids: Vec<CandidateId> = Vec::new();
    if let Some(tb) = tie_breaker {
        for &(right, left) in &tied_edges {
            if let BandResolution::Incomplete(m) = tb.resolve_band(&[left, right]) {
                for id in m {
                    if !missing_ids.contains(&id) {
                        missing_ids.push(id);
                    }
                }
            }
        }
    }
    if !missing_ids.is_empty() {
        missing_ids.sort();
        return RankedPairsResult::IncompleteTieBreaker { missing: missing_ids };
    }

    let mut winner_of: BTreeMap<PairKey, EdgeWinner> = BTreeMap::new();
    for (&key @ (right, left), state) in pairs.iter() {
        if state.ballots == 0 {
            continue;
        }
        let edge = if state.diff > 0 {
            EdgeWinner::Left
        } else if state.diff < 0 {
            EdgeWinner::Right
        } else {
            let tb = tie_breaker.expect("tie-breaker completeness already checked above");
            match tb.resolve_band(&[left, right]) {
                BandResolution::Resolved(ordered) => {
                    if ordered[0] == left {
                        EdgeWinner::Left
                    } else {
                        EdgeWinner::Right
                    }
                }
                BandResolution::Incomplete(_) => unreachable!("completeness already checked above"),
            }
        };
        winner_of.insert(key, edge);
    }

    let mut active: BTreeSet<CandidateId> = mentioned.iter().copied().collect();
    let target = max_winners.min(mentioned.len());
    let mut winners = Vec::new();
    let mut rounds = Vec::new();

    while winners.len() < target {
        tracing::debug!(round = winners.len() + 1, active = active.len(), "ranked pairs round starting");
        let active_pairs: Vec<PairKey> = pairs
            .iter()
            .filter(|(&(r, l), s)| s.ballots > 0 && active.contains(&r) && active.contains(&l))
            .map(|(&k, _)| k)
            .collect();

        let ordered = match order_pairs(&active_pairs, &winner_of, &pairs, tie_breaker) {
            Ok(o) => o,
            Err(early_result) => return early_result,
        };

        let mut lock = LockGraph::new(&active);
        let mut lock_edges = Vec::new();
        for &key in &ordered {
            let (winner, loser) = winner_loser(key, winner_of[&key]);
            if !lock.reachable(loser, winner) {
                lock.insert(winner, loser);
                lock_edges.push((winner, loser));
            }
        }

        let mut roots = lock.roots();
        if roots.len() > 1 {
            roots.sort();
            let Some(tb) = tie_breaker else {
                let mut pairs_listed = Vec::new();
                for i in 0..roots.len() {
                    for j in (i + 1)..roots.len() {
                        pairs_listed.push((roots[i], roots[j]));
                    }
                }
                return RankedPairsResult::TieBreakerNeeded { tied_pairs: pairs_listed };
            };
            let missing = tb.missing(&roots);
            if !missing.is_empty() {
                return RankedPairsResult::IncompleteTieBreaker { missing };
            }
            for i in 0..roots.len() {
                for j in (i + 1)..roots.len() {
                    let (p, q) = (roots[i], roots[j]);
                    let (more, less) =
                        if tb.rank_of(p).unwrap() < tb.rank_of(q).unwrap() { (p, q) } else { (q, p) };
                    lock.insert(more, less);
                    lock_edges.push((more, less));
                }
            }
            roots = lock.roots();
            assert_eq!(roots.len(), 1, "more than one root survives tie-breaker insertion");
        }

        let winner = roots[0];
        tracing::debug!(?winner, "ranked pairs round winner");
        rounds.push(RoundRecord {
            winner,
            ordered_pairs: ordered.clone(),
            lock_graph_edges: lock_edges,
        });
        winners.push(winner);
        active.remove(&winner);
    }

    RankedPairsResult::Winners { winners, rounds }
}

fn order_pairs(
    active_pairs: &[PairKey],
    winner_of: &BTreeMap<PairKey, EdgeWinner>,
    pairs: &BTreeMap<PairKey, PairState>,
    tie_breaker: Option<&TieBreaker>,
) -> Result<Vec<PairKey>, RankedPairsResult> {
    struct Item {
        key: PairKey,
        abs_diff: i64,
        winner: CandidateId,
        loser: CandidateId,
    }

    let mut remaining: Vec<Item> = active_pairs
        .iter()
        .map(|&key| {
            let state = &pairs[&key];
            let (winner, loser) = winner_loser(key, winner_of[&key]);
            Item { key, abs_diff: state.diff.abs(), winner, loser }
        })
        .collect();

    let mut ordered = Vec::with_capacity(remaining.len());
    let mut emitted_losers: BTreeSet<CandidateId> = BTreeSet::new();
    let mut emitted_winners: BTreeSet<CandidateId> = BTreeSet::new();

    while !remaining.is_empty() {
        let max_abs = remaining.iter().map(|it| it.abs_diff).max().unwrap();
        let mut pool: Vec<usize> = (0..remaining.len()).filter(|&i| remaining[i].abs_diff == max_abs).collect();

        if pool.len() > 1 {
            let tier1: Vec<usize> =
                pool.iter().copied().filter(|&i| emitted_losers.contains(&remaining[i].loser)).collect();
            if !tier1.is_empty() {
                pool = tier1;
            }
        }
        if pool.len() > 1 {
            let tier2: Vec<usize> =
                pool.iter().copied().filter(|&i| emitted_winners.contains(&remaining[i].winner)).collect();
            if !tier2.is_empty() {
                pool = tier2;
            }
        }

        let chosen = if pool.len() == 1 {
            pool[0]
        } else {
            let Some(tb) = tie_breaker else {
                let tied_pairs = pool.iter().map(|&i| remaining[i].key).collect();
                return Err(RankedPairsResult::TieBreakerNeeded { tied_pairs });
            };
            let losers: Vec<CandidateId> = pool.iter().map(|&i| remaining[i].loser).collect();
            let missing = tb.missing(&losers);
            if !missing.is_empty() {
                return Err(RankedPairsResult::IncompleteTieBreaker { missing });
            }
            *pool.iter().max_by_key(|&&i| tb.rank_of(remaining[i].loser).unwrap()).unwrap()
        };

        let item = remaining.remove(chosen);
        emitted_losers.insert(item.loser);
        emitted_winners.insert(item.winner);
        ordered.push(item.key);
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BallotEncoder;
    use crate::scan::candidate_mentions;

    fn id(v: u16) -> CandidateId {
        CandidateId::new(v).unwrap()
    }

    fn buffer_from_groups(groups: &[(u32, &[u16])]) -> BallotBuffer {
        let total: u32 = groups.iter().map(|(n, _)| n).sum();
        let mut enc = BallotEncoder::new(total);
        for &(n, row) in groups {
            for _ in 0..n {
                let ranks: Vec<Vec<CandidateId>> = row.iter().map(|&v| vec![id(v)]).collect();
                enc.add_ballot(ranks).unwrap();
            }
        }
        enc.finish()
    }

    #[test]
    fn scenario_normal_case_single_round() {
        let buf = buffer_from_groups(&[(7, &[1, 2, 3]), (5, &[2, 1, 3]), (4, &[3, 1, 2]), (2, &[2, 3, 1])]);
        let candidates = vec![id(1), id(2), id(3)];
        let mentions = candidate_mentions(&buf);
        match tabulate_ranked_pairs(&buf, &candidates, &mentions, 1, None) {
            RankedPairsResult::Winners { winners, rounds } => {
                assert_eq!(winners, vec![id(1)]);
                assert_eq!(rounds.len(), 1);
                assert_eq!(rounds[0].ordered_pairs, vec![(id(2), id(3)), (id(1), id(3)), (id(1), id(2))]);
            }
            other => panic!("expected Winners, got {other:?}"),
        }
    }

    #[test]
    fn scenario_disjoint_roots_needs_tie_breaker() {
        let buf = buffer_from_groups(&[(2, &[1, 2]), (2, &[3, 4])]);
        let candidates = vec![id(1), id(2), id(3), id(4)];
        let mentions = candidate_mentions(&buf);
        match tabulate_ranked_pairs(&buf, &candidates, &mentions, 1, None) {
            RankedPairsResult::TieBreakerNeeded { tied_pairs } => {
                assert_eq!(tied_pairs, vec![(id(1), id(3))]);
            }
            other => panic!("expected TieBreakerNeeded, got {other:?}"),
        }

        let tb = TieBreaker::new(vec![id(1), id(3), id(2), id(4)]);
        match tabulate_ranked_pairs(&buf, &candidates, &mentions, 1, Some(&tb)) {
            RankedPairsResult::Winners { winners, .. } => assert_eq!(winners, vec![id(1)]),
            other => panic!("expected Winners, got {other:?}"),
        }
    }

    #[test]
    fn scenario_majority_empty() {
        let mut enc = BallotEncoder::new(5);
        for _ in 0..3 {
            enc.add_ballot(Vec::<Vec<CandidateId>>::new()).unwrap();
        }
        enc.add_ballot(vec![vec![id(1)], vec![id(2)], vec![id(3)]]).unwrap();
        enc.add_ballot(vec![vec![id(1)], vec![id(2)], vec![id(3)]]).unwrap();
        let buf = enc.finish();
        let candidates = vec![id(1), id(2), id(3)];
        let mentions = candidate_mentions(&buf);
        match tabulate_ranked_pairs(&buf, &candidates, &mentions, 1, None) {
            RankedPairsResult::MajorityEmpty => {}
            other => panic!("expected MajorityEmpty, got {other:?}"),
        }
    }

    #[test]
    fn lock_graph_never_cycles() {
        let buf = buffer_from_groups(&[(7, &[1, 2, 3]), (5, &[2, 1, 3]), (4, &[3, 1, 2]), (2, &[2, 3, 1])]);
        let candidates = vec![id(1), id(2), id(3)];
        let mentions = candidate_mentions(&buf);
        if let RankedPairsResult::Winners { rounds, .. } =
            tabulate_ranked_pairs(&buf, &candidates, &mentions, 1, None)
        {
            let mut lock = LockGraph::new(&candidates.iter().copied().collect());
            for round in rounds {
                for (w, l) in round.lock_graph_edges {
                    assert!(!lock.reachable(l, w), "inserted edge would have closed a cycle");
                    lock.insert(w, l);
                }
            }
        }
    }
}
