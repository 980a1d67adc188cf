//! The gate sequence and engine routing: quorum, then blank-limit, then a
//! dispatch to whichever tabulation engine the configuration names.

use crate::config::MethodConfig;
use crate::result::{BallotCounts, SuccessPayload, TiedAmbiguity, VoteResult};
use vm_core::{CandidateId, TieBreaker};
use vm_tally::config::{filter_by_mentions, passes_blank_limit, passes_quorum};
use vm_tally::scan::{candidate_mentions, count_blanks};
use vm_tally::tabulation::ranked_pairs::{tabulate_ranked_pairs, RankedPairsResult};
use vm_tally::tabulation::stv::{tabulate_stv, StvResult};
use vm_tally::tabulation::threshold_majority::{tabulate_threshold_majority, ThresholdMajorityResult};
use vm_tally::yesno::tabulate_yesno;
use vm_tally::BallotBuffer;

/// Runs the gate sequence for `config` against `buffer`, then routes to the
/// method's engine and folds its tagged result into a [`VoteResult`].
///
/// `candidates` is ignored by the Yes/No variants (which use the two
/// reserved ids) and is required for Threshold Majority, Ranked Pairs and
/// STV.
pub fn dispatch(
    config: &MethodConfig,
    buffer: &BallotBuffer,
    eligible: u32,
    candidates: &[CandidateId],
    tie_breaker: Option<&TieBreaker>,
) -> VoteResult {
    let submitted = buffer.ballot_count();
    let blank = count_blanks(buffer);
    let counts = BallotCounts { submitted, blank, eligible };

    let quorum = config.quorum();
    if !passes_quorum(submitted, eligible, quorum.quorum, quorum.inclusive) {
        tracing::warn!(submitted, eligible, "quorum gate failed");
        return VoteResult::NoQuorum { counts };
    }

    if let Some(blank_limit) = config.blank_limit() {
        if !passes_blank_limit(blank, submitted, blank_limit.limit, blank_limit.inclusive) {
            tracing::warn!(blank, submitted, "blank-limit gate failed");
            return VoteResult::TooManyBlanks { counts };
        }
    }

    match config {
        MethodConfig::YesNo { majority, .. } | MethodConfig::YesNoBlank { majority, .. } => {
            let outcome = tabulate_yesno(buffer, eligible, majority);
            VoteResult::Success {
                payload: SuccessPayload::YesNo { tally: outcome.tally, passed: outcome.passed },
                counts,
            }
        }

        MethodConfig::ThresholdMajority { max_choices, mention_threshold, .. } => {
            let mentions = candidate_mentions(buffer);
            let filter = filter_by_mentions(
                candidates,
                &mentions,
                submitted,
                mention_threshold.threshold,
                mention_threshold.inclusive,
            );
            if filter.included.is_empty() {
                tracing::warn!("threshold majority: no candidate passed the mention threshold");
                return VoteResult::MajorityEmpty { counts };
            }
            let result = tabulate_threshold_majority(
                &filter.included,
                &mentions,
                max_choices.num_chosen,
                tie_breaker,
            );
            match result {
                ThresholdMajorityResult::Winners { winners, mentions } => VoteResult::Success {
                    payload: SuccessPayload::ThresholdMajority { winners, mentions, filter },
                    counts,
                },
                ThresholdMajorityResult::TieBreakerNeeded { tied } => {
                    tracing::warn!(?tied, "threshold majority boundary needs a tie-breaker");
                    VoteResult::TieBreakerNeeded { tied: TiedAmbiguity::Candidates(tied), counts }
                }
                ThresholdMajorityResult::IncompleteTieBreaker { missing } => {
                    VoteResult::IncompleteTieBreaker { missing, counts }
                }
            }
        }

        MethodConfig::RankedPairs { max_choices, mention_threshold, .. } => {
            let mentions = candidate_mentions(buffer);
            let filter = filter_by_mentions(
                candidates,
                &mentions,
                submitted,
                mention_threshold.threshold,
                mention_threshold.inclusive,
            );
            if filter.included.len() < 2 {
                tracing::warn!("ranked pairs: fewer than two candidates passed the mention threshold");
                return VoteResult::MajorityEmpty { counts };
            }
            let result = tabulate_ranked_pairs(
                buffer,
                &filter.included,
                &mentions,
                max_choices.num_chosen,
                tie_breaker,
            );
            match result {
                RankedPairsResult::Winners { winners, rounds } => VoteResult::Success {
                    payload: SuccessPayload::RankedPairs { winners, rounds, mentions },
                    counts,
                },
                RankedPairsResult::MajorityEmpty => {
                    tracing::warn!("ranked pairs: majority of ballots touched no pair");
                    VoteResult::MajorityEmpty { counts }
                }
                RankedPairsResult::TieBreakerNeeded { tied_pairs } => {
                    tracing::warn!(?tied_pairs, "ranked pairs needs a tie-breaker");
                    VoteResult::TieBreakerNeeded { tied: TiedAmbiguity::Pairs(tied_pairs), counts }
                }
                RankedPairsResult::IncompleteTieBreaker { missing } => {
                    VoteResult::IncompleteTieBreaker { missing, counts }
                }
            }
        }

        MethodConfig::Stv { max_choices, .. } => {
            let mentions = candidate_mentions(buffer);
            let any_mentioned = candidates.iter().any(|c| mentions.get(c).copied().unwrap_or(0) > 0);
            if !any_mentioned {
                tracing::warn!("stv: no candidate received any mention");
                return VoteResult::MajorityEmpty { counts };
            }
            let result = tabulate_stv(buffer, candidates, max_choices.num_chosen, tie_breaker);
            match result {
                StvResult::Winners { winners, events } => {
                    VoteResult::Success { payload: SuccessPayload::Stv { winners, events }, counts }
                }
                StvResult::TieBreakerNeeded { tied } => {
                    tracing::warn!(?tied, "stv needs a tie-breaker");
                    VoteResult::TieBreakerNeeded { tied: TiedAmbiguity::Candidates(tied), counts }
                }
                StvResult::IncompleteTieBreaker { missing } => {
                    VoteResult::IncompleteTieBreaker { missing, counts }
                }
            }
        }
    }
}
