//! Single Transferable Vote: Hagenbach-Bischoff quota, fractional Gregory
//! transfer, elimination by n-th preference descent then external
//! tie-breaker.

use crate::buffer::BallotBuffer;
use crate::scan::{scan_next_preferences, scan_nth_preferences};
use crate::tabulation::boundary::{resolve_boundary, BoundaryOutcome};
use std::collections::{BTreeMap, BTreeSet};
use vm_core::{CandidateId, TieBreaker};

/// One step of the tabulation, in chronological order. `values` snapshots
/// are deep copies of every original candidate's current vote value at the
/// moment of the event.
#[derive(Clone, Debug)]
pub enum StvEvent {
    ElectWithQuota { elected: Vec<CandidateId>, values: BTreeMap<CandidateId, f64>, quota: f64 },
    Eliminate { candidate: CandidateId, values: BTreeMap<CandidateId, f64> },
    ElectRest { elected: Vec<CandidateId> },
}

#[derive(Clone, Debug)]
pub enum StvResult {
    /// Winners in the order they were elected (or, for the final
    /// `ElectRest` batch, in the order inherited from `remaining`).
    Winners { winners: Vec<CandidateId>, events: Vec<StvEvent> },
    TieBreakerNeeded { tied: Vec<CandidateId> },
    IncompleteTieBreaker { missing: Vec<CandidateId> },
}

struct State<'a> {
    buffer: &'a BallotBuffer,
    original: Vec<CandidateId>,
    idx: BTreeMap<CandidateId, usize>,
    values: Vec<Vec<f64>>,
    remaining: BTreeSet<CandidateId>,
    eliminated: BTreeSet<CandidateId>,
    elected: Vec<CandidateId>,
    quota: f64,
    max_winners: usize,
    tie_breaker: Option<&'a TieBreaker>,
    events: Vec<StvEvent>,
}

impl<'a> State<'a> {
    fn candidate_value(&self, c: CandidateId) -> f64 {
        self.values[self.idx[&c]].iter().sum()
    }

    fn snapshot(&self) -> BTreeMap<CandidateId, f64> {
        self.original.iter().map(|&c| (c, self.candidate_value(c))).collect()
    }

    fn still_present(&self) -> BTreeSet<CandidateId> {
        self.original.iter().copied().filter(|c| !self.eliminated.contains(c)).collect()
    }

    /// Step 1 / step 4: remaining candidates strictly over quota, truncated
    /// to the available seats with the shared boundary tie-break.
    fn elect_by_quota(&self) -> Result<Vec<CandidateId>, StvResult> {
        let mut over: Vec<CandidateId> =
            self.remaining.iter().copied().filter(|&c| self.candidate_value(c) > self.quota).collect();
        if over.is_empty() {
            return Ok(Vec::new());
        }
        over.sort_by(|&a, &b| {
            self.candidate_value(b)
                .partial_cmp(&self.candidate_value(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let available = self.max_winners - self.elected.len();
        if over.len() <= available {
            return Ok(over);
        }
        match resolve_boundary(&over, |c| self.candidate_value(c), available, self.tie_breaker) {
            BoundaryOutcome::Resolved(v) => Ok(v),
            BoundaryOutcome::TieBreakerNeeded { tied } => Err(StvResult::TieBreakerNeeded { tied }),
            BoundaryOutcome::IncompleteTieBreaker { missing } => Err(StvResult::IncompleteTieBreaker { missing }),
        }
    }

    /// Moves `newly_elected` from `remaining` to `elected`, in the given order.
    fn confirm_elected(&mut self, newly_elected: &[CandidateId]) {
        for &c in newly_elected {
            self.remaining.remove(&c);
            self.elected.push(c);
        }
    }

    /// Step 3: Gregory transfer of the surplus of a just-elected candidate.
    fn transfer_surplus(&mut self, c: CandidateId) {
        let v_total = self.candidate_value(c);
        if v_total <= self.quota {
            return;
        }
        let surplus = v_total - self.quota;
        let f = surplus / v_total;
        let (_, next) = scan_next_preferences(self.buffer, &self.remaining, c);
        let c_idx = self.idx[&c];
        for i in 0..self.buffer.ballot_count() as usize {
            let v = self.values[c_idx][i];
            if v <= 0.0 {
                continue;
            }
            if let Some(next_c) = next[i] {
                let next_idx = self.idx[&next_c];
                self.values[next_idx][i] += f * v;
                self.values[c_idx][i] = (1.0 - f) * v;
            }
            // else: no next preference among remaining; the value stays on
            // `c` in full, inert.
        }
    }

    /// Step 5's vote transfer: the eliminated candidate's full value moves
    /// to each ballot's next remaining preference.
    fn transfer_elimination(&mut self, c: CandidateId) {
        let (_, next) = scan_next_preferences(self.buffer, &self.remaining, c);
        let c_idx = self.idx[&c];
        for i in 0..self.buffer.ballot_count() as usize {
            let v = self.values[c_idx][i];
            if v <= 0.0 {
                continue;
            }
            if let Some(next_c) = next[i] {
                let next_idx = self.idx[&next_c];
                self.values[next_idx][i] += v;
                self.values[c_idx][i] = 0.0;
            }
            // else: exhausted; the value stays on the eliminated candidate's
            // row, inert, and is still counted for value conservation.
        }
    }

    /// Step 5: the candidate to eliminate, resolving ties by n-th
    /// preference descent over the still-present original candidates, then
    /// by the external tie-breaker (highest index = least preferred).
    fn resolve_elimination(&self) -> Result<CandidateId, StvResult> {
        let min_val = self
            .remaining
            .iter()
            .map(|&c| self.candidate_value(c))
            .fold(f64::INFINITY, f64::min);
        let mut tied: Vec<CandidateId> =
            self.remaining.iter().copied().filter(|&c| self.candidate_value(c) == min_val).collect();
        tied.sort();

        if tied.len() > 1 {
            let still_present = self.still_present();
            let mut n = 0u32;
            loop {
                let (tally, _) = scan_nth_preferences(self.buffer, &still_present, n);
                let counts: Vec<u32> =
                    tied.iter().map(|c| tally.get(c).copied().unwrap_or(0)).collect();
                if counts.iter().all(|&c| c == 0) {
                    // Nobody in the tied band has an n-th preference left to
                    // count; descending further can't discriminate them.
                    break;
                }
                let band_min = *counts.iter().min().unwrap();
                tied = tied
                    .iter()
                    .copied()
                    .zip(counts.iter())
                    .filter(|&(_, &c)| c == band_min)
                    .map(|(c, _)| c)
                    .collect();
                if tied.len() <= 1 {
                    break;
                }
                n += 1;
            }
        }

        if tied.len() == 1 {
            return Ok(tied[0]);
        }

        let Some(tb) = self.tie_breaker else {
            return Err(StvResult::TieBreakerNeeded { tied });
        };
        let missing = tb.missing(&tied);
        if !missing.is_empty() {
            return Err(StvResult::IncompleteTieBreaker { missing });
        }
        Ok(tb.least_preferred(&tied).expect("tied is non-empty"))
    }
}

pub fn tabulate_stv(
    buffer: &BallotBuffer,
    candidates: &[CandidateId],
    max_winners: usize,
    tie_breaker: Option<&TieBreaker>,
) -> StvResult {
    if max_winners >= candidates.len() {
        let mut all = candidates.to_vec();
        all.sort();
        return StvResult::Winners { winners: all.clone(), events: vec![StvEvent::ElectRest { elected: all }] };
    }

    let mut original = candidates.to_vec();
    original.sort();
    let idx: BTreeMap<CandidateId, usize> = original.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let ballot_count = buffer.ballot_count();
    let quota = ballot_count as f64 / (max_winners as f64 + 1.0);

    let remaining: BTreeSet<CandidateId> = original.iter().copied().collect();
    let mut values = vec![vec![0.0f64; ballot_count as usize]; original.len()];
    let (_, first_pref) = scan_nth_preferences(buffer, &remaining, 0);
    for (i, assigned) in first_pref.into_iter().enumerate() {
        if let Some(c) = assigned {
            values[idx[&c]][i] = 1.0;
        }
    }

    let mut st = State {
        buffer,
        original,
        idx,
        values,
        remaining,
        eliminated: BTreeSet::new(),
        elected: Vec::new(),
        quota,
        max_winners,
        tie_breaker,
        events: Vec::new(),
    };

    macro_rules! try_or_return {
        ($e:expr) => {
            match $e {
                Ok(v) => v,
                Err(early) => return early,
            }
        };
    }

    // Step 1: initial quota election.
    let mut newly_elected = try_or_return!(st.elect_by_quota());
    if !newly_elected.is_empty() {
        tracing::debug!(?newly_elected, quota = st.quota, "stv: initial quota election");
        st.events.push(StvEvent::ElectWithQuota {
            elected: newly_elected.clone(),
            values: st.snapshot(),
            quota: st.quota,
        });
        st.confirm_elected(&newly_elected);
    }

    let mut round = 0u32;
    loop {
        round += 1;
        tracing::debug!(round, elected = st.elected.len(), remaining = st.remaining.len(), "stv round starting");

        // Step 2: termination.
        if st.elected.len() + st.remaining.len() <= st.max_winners {
            let mut rest: Vec<CandidateId> = st.remaining.iter().copied().collect();
            rest.sort();
            st.events.push(StvEvent::ElectRest { elected: rest.clone() });
            st.elected.extend(rest);
            st.remaining.clear();
            break;
        }
        if st.elected.len() >= st.max_winners {
            break;
        }

        if !newly_elected.is_empty() {
            // Step 3: transfer surpluses of everyone elected last round.
            for &c in &newly_elected {
                st.transfer_surplus(c);
            }
            // Step 4: re-elect by quota.
            newly_elected = try_or_return!(st.elect_by_quota());
            if !newly_elected.is_empty() {
                tracing::debug!(?newly_elected, "stv: quota election after surplus transfer");
                st.events.push(StvEvent::ElectWithQuota {
                    elected: newly_elected.clone(),
                    values: st.snapshot(),
                    quota: st.quota,
                });
                st.confirm_elected(&newly_elected);
            }
        } else {
            // Step 5: nobody newly elected — eliminate the weakest candidate.
            let elim = try_or_return!(st.resolve_elimination());
            tracing::debug!(?elim, "stv: eliminating weakest candidate");
            st.transfer_elimination(elim);
            st.remaining.remove(&elim);
            st.eliminated.insert(elim);
            st.events.push(StvEvent::Eliminate { candidate: elim, values: st.snapshot() });

            newly_elected = try_or_return!(st.elect_by_quota());
            if !newly_elected.is_empty() {
                tracing::debug!(?newly_elected, "stv: quota election after elimination");
                st.events.push(StvEvent::ElectWithQuota {
                    elected: newly_elected.clone(),
                    values: st.snapshot(),
                    quota: st.quota,
                });
                st.confirm_elected(&newly_elected);
            }
        }
    }

    StvResult::Winners { winners: st.elected, events: st.events }
}
