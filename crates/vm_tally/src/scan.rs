//! Scan primitives: read a [`BallotBuffer`] without allocating per ballot.

use crate::buffer::BallotBuffer;
use std::collections::{BTreeMap, BTreeSet};
use vm_core::CandidateId;

/// Sentinel returned by [`compare_by_ballot`] when only `a` appears on the
/// ballot. Only the sign is meaningful to callers.
pub const ONLY_A_PRESENT: i64 = i64::MIN;
/// Sentinel returned by [`compare_by_ballot`] when only `b` appears.
pub const ONLY_B_PRESENT: i64 = i64::MAX;

/// Number of ballots carrying zero ranks.
pub fn count_blanks(buffer: &BallotBuffer) -> u32 {
    (0..buffer.ballot_count()).filter(|&i| buffer.is_blank(i)).count() as u32
}

/// The mentions table as a map.
pub fn candidate_mentions(buffer: &BallotBuffer) -> BTreeMap<CandidateId, u32> {
    buffer.mention_entries().collect()
}

fn nonzero_id(word: u16) -> Option<CandidateId> {
    if word == 0 {
        None
    } else {
        Some(CandidateId::new(word).expect("buffer never encodes id 0 outside separators"))
    }
}

/// Walks ballot `i`, locating the rank at which `a` and `b` first appear
/// (rank 0 = most preferred; a `0` row word advances the rank counter).
///
/// Returns `0` if neither appears, [`ONLY_A_PRESENT`] if only `a` appears,
/// [`ONLY_B_PRESENT`] if only `b` appears, and `rank(b) - rank(a)`
/// otherwise. Positive means `a` is preferred.
pub fn compare_by_ballot(buffer: &BallotBuffer, i: u32, a: CandidateId, b: CandidateId) -> i64 {
    let mut rank: i64 = 0;
    let mut rank_a = None;
    let mut rank_b = None;
    for word in buffer.ballot_rows(i) {
        if word == 0 {
            rank += 1;
            continue;
        }
        let Some(id) = nonzero_id(word) else { continue };
        if id == a && rank_a.is_none() {
            rank_a = Some(rank);
        }
        if id == b && rank_b.is_none() {
            rank_b = Some(rank);
        }
        if rank_a.is_some() && rank_b.is_some() {
            break;
        }
    }
    match (rank_a, rank_b) {
        (None, None) => 0,
        (Some(_), None) => ONLY_A_PRESENT,
        (None, Some(_)) => ONLY_B_PRESENT,
        (Some(ra), Some(rb)) => rb - ra,
    }
}

/// For each ballot, the `(n+1)`-th distinct id belonging to `active_set`
/// (skipping separators and ids outside the set), plus the aggregate tally.
pub fn scan_nth_preferences(
    buffer: &BallotBuffer,
    active_set: &BTreeSet<CandidateId>,
    n: u32,
) -> (BTreeMap<CandidateId, u32>, Vec<Option<CandidateId>>) {
    let mut tally = BTreeMap::new();
    let mut assignment = Vec::with_capacity(buffer.ballot_count() as usize);
    for i in 0..buffer.ballot_count() {
        let mut seen = 0u32;
        let mut found = None;
        for word in buffer.ballot_rows(i) {
            let Some(id) = nonzero_id(word) else { continue };
            if !active_set.contains(&id) {
                continue;
            }
            if seen == n {
                found = Some(id);
                break;
            }
            seen += 1;
        }
        if let Some(id) = found {
            *tally.entry(id).or_insert(0) += 1;
        }
        assignment.push(found);
    }
    (tally, assignment)
}

/// For each ballot, the first id in `active_set` appearing strictly after
/// `given`, plus the aggregate tally.
pub fn scan_next_preferences(
    buffer: &BallotBuffer,
    active_set: &BTreeSet<CandidateId>,
    given: CandidateId,
) -> (BTreeMap<CandidateId, u32>, Vec<Option<CandidateId>>) {
    let mut tally = BTreeMap::new();
    let mut assignment = Vec::with_capacity(buffer.ballot_count() as usize);
    for i in 0..buffer.ballot_count() {
        let mut past_given = false;
        let mut found = None;
        for word in buffer.ballot_rows(i) {
            let Some(id) = nonzero_id(word) else { continue };
            if past_given {
                if active_set.contains(&id) {
                    found = Some(id);
                    break;
                }
            } else if id == given {
                past_given = true;
            }
        }
        if let Some(id) = found {
            *tally.entry(id).or_insert(0) += 1;
        }
        assignment.push(found);
    }
    (tally, assignment)
}
