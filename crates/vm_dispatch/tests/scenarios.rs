//! End-to-end scenarios driven through the public dispatcher rather than
//! any single engine in isolation.

use vm_core::ratio::Threshold;
use vm_core::{CandidateId, TieBreaker};
use vm_dispatch::config::{
    BlankLimitConfig, MaxChoicesConfig, MentionThresholdConfig, MethodConfig, QuorumConfig,
};
use vm_dispatch::{dispatch, SuccessPayload, VoteResult};
use vm_tally::tabulation::stv::StvEvent;
use vm_tally::{BallotBuffer, BallotEncoder};

fn id(v: u16) -> CandidateId {
    CandidateId::new(v).unwrap()
}

fn no_quorum_no_blank_limit() -> (QuorumConfig, BlankLimitConfig) {
    (
        QuorumConfig { quorum: Threshold::Fraction { num: 0, den: 1 }, inclusive: true },
        BlankLimitConfig { limit: Threshold::Fraction { num: 1, den: 1 }, inclusive: true },
    )
}

fn buffer_of_singleton_ballots(rows: &[&[u16]]) -> BallotBuffer {
    let mut enc = BallotEncoder::new(rows.len() as u32);
    for row in rows {
        let ranks: Vec<Vec<CandidateId>> = row.iter().map(|&v| vec![id(v)]).collect();
        enc.add_ballot(ranks).unwrap();
    }
    enc.finish()
}

#[test]
fn scenario_1_threshold_majority_success() {
    let (quorum, blank_limit) = no_quorum_no_blank_limit();
    let config = MethodConfig::ThresholdMajority {
        quorum,
        blank_limit,
        max_choices: MaxChoicesConfig { num_chosen: 2 },
        mention_threshold: MentionThresholdConfig { threshold: Threshold::Fraction { num: 1, den: 4 }, inclusive: false },
    };
    let buf = buffer_of_singleton_ballots(&[&[1, 2, 3], &[2, 3, 4], &[2, 3, 5], &[1, 3, 4]]);
    let candidates: Vec<_> = (1..=5).map(id).collect();
    match dispatch(&config, &buf, 4, &candidates, None) {
        VoteResult::Success { payload: SuccessPayload::ThresholdMajority { winners, filter, .. }, .. } => {
            let mut included = filter.included;
            included.sort();
            assert_eq!(included, vec![id(1), id(2), id(3), id(4)]);
            assert_eq!(filter.excluded, vec![id(5)]);
            let mut w = winners;
            w.sort();
            assert_eq!(w, vec![id(2), id(3)]);
        }
        other => panic!("expected Success(ThresholdMajority), got {other:?}"),
    }
}

#[test]
fn scenario_2_threshold_majority_boundary_tie() {
    let (quorum, blank_limit) = no_quorum_no_blank_limit();
    let config = MethodConfig::ThresholdMajority {
        quorum,
        blank_limit,
        max_choices: MaxChoicesConfig { num_chosen: 2 },
        mention_threshold: MentionThresholdConfig { threshold: Threshold::Fraction { num: 1, den: 2 }, inclusive: false },
    };
    let buf = buffer_of_singleton_ballots(&[&[1, 2, 3], &[2, 3, 4], &[1, 2, 3], &[1, 3, 4]]);
    let candidates: Vec<_> = (1..=4).map(id).collect();
    match dispatch(&config, &buf, 4, &candidates, None) {
        VoteResult::TieBreakerNeeded { tied: vm_dispatch::TiedAmbiguity::Candidates(mut tied), .. } => {
            tied.sort();
            assert_eq!(tied, vec![id(1), id(2)]);
        }
        other => panic!("expected TieBreakerNeeded, got {other:?}"),
    }
}

#[test]
fn scenario_3_ranked_pairs_normal_case() {
    let (quorum, blank_limit) = no_quorum_no_blank_limit();
    let config = MethodConfig::RankedPairs {
        quorum,
        blank_limit,
        max_choices: MaxChoicesConfig { num_chosen: 1 },
        mention_threshold: MentionThresholdConfig { threshold: Threshold::Fraction { num: 0, den: 1 }, inclusive: true },
    };
    let mut enc = BallotEncoder::new(18);
    let groups: &[(u32, &[u16])] = &[(7, &[1, 2, 3]), (5, &[2, 1, 3]), (4, &[3, 1, 2]), (2, &[2, 3, 1])];
    for &(n, row) in groups {
        for _ in 0..n {
            let ranks: Vec<Vec<CandidateId>> = row.iter().map(|&v| vec![id(v)]).collect();
            enc.add_ballot(ranks).unwrap();
        }
    }
    let buf = enc.finish();
    let candidates = vec![id(1), id(2), id(3)];
    match dispatch(&config, &buf, 18, &candidates, None) {
        VoteResult::Success { payload: SuccessPayload::RankedPairs { winners, rounds, .. }, .. } => {
            assert_eq!(winners, vec![id(1)]);
            assert_eq!(rounds.len(), 1);
        }
        other => panic!("expected Success(RankedPairs), got {other:?}"),
    }
}

#[test]
fn scenario_4_ranked_pairs_disjoint_roots() {
    let (quorum, blank_limit) = no_quorum_no_blank_limit();
    let config = MethodConfig::RankedPairs {
        quorum,
        blank_limit,
        max_choices: MaxChoicesConfig { num_chosen: 1 },
        mention_threshold: MentionThresholdConfig { threshold: Threshold::Fraction { num: 0, den: 1 }, inclusive: true },
    };
    let mut enc = BallotEncoder::new(4);
    for _ in 0..2 {
        enc.add_ballot(vec![vec![id(1)], vec![id(2)]]).unwrap();
    }
    for _ in 0..2 {
        enc.add_ballot(vec![vec![id(3)], vec![id(4)]]).unwrap();
    }
    let buf = enc.finish();
    let candidates = vec![id(1), id(2), id(3), id(4)];

    match dispatch(&config, &buf, 4, &candidates, None) {
        VoteResult::TieBreakerNeeded { tied: vm_dispatch::TiedAmbiguity::Pairs(pairs), .. } => {
            assert_eq!(pairs, vec![(id(1), id(3))]);
        }
        other => panic!("expected TieBreakerNeeded, got {other:?}"),
    }

    let tb = TieBreaker::new(vec![id(1), id(3), id(2), id(4)]);
    match dispatch(&config, &buf, 4, &candidates, Some(&tb)) {
        VoteResult::Success { payload: SuccessPayload::RankedPairs { winners, .. }, .. } => {
            assert_eq!(winners, vec![id(1)]);
        }
        other => panic!("expected Success(RankedPairs), got {other:?}"),
    }
}

#[test]
fn scenario_5_ranked_pairs_majority_empty() {
    let (quorum, blank_limit) = no_quorum_no_blank_limit();
    let config = MethodConfig::RankedPairs {
        quorum,
        blank_limit,
        max_choices: MaxChoicesConfig { num_chosen: 1 },
        mention_threshold: MentionThresholdConfig { threshold: Threshold::Fraction { num: 0, den: 1 }, inclusive: true },
    };
    let mut enc = BallotEncoder::new(5);
    for _ in 0..3 {
        enc.add_ballot(Vec::<Vec<CandidateId>>::new()).unwrap();
    }
    for _ in 0..2 {
        enc.add_ballot(vec![vec![id(1)], vec![id(2)], vec![id(3)]]).unwrap();
    }
    let buf = enc.finish();
    let candidates = vec![id(1), id(2), id(3)];
    match dispatch(&config, &buf, 5, &candidates, None) {
        VoteResult::MajorityEmpty { .. } => {}
        other => panic!("expected MajorityEmpty, got {other:?}"),
    }
}

#[test]
fn scenario_stv_elimination_then_quota() {
    let (quorum, blank_limit) = no_quorum_no_blank_limit();
    let config = MethodConfig::Stv {
        quorum,
        blank_limit,
        max_choices: MaxChoicesConfig { num_chosen: 2 },
    };
    // 6 ballots: 2x[1,2], 2x[2,3], 2x[3,1]. Quota = 6/3 = 2. Every
    // candidate's first-preference value is exactly 2 (== quota, not over
    // it) and every second-preference count is also 2, so the elimination
    // tie falls to the tie-breaker, which removes candidate 3. Its two
    // ballots both transfer their full value to candidate 1, putting it
    // over quota.
    let mut enc = BallotEncoder::new(6);
    for _ in 0..2 {
        enc.add_ballot(vec![vec![id(1)], vec![id(2)]]).unwrap();
    }
    for _ in 0..2 {
        enc.add_ballot(vec![vec![id(2)], vec![id(3)]]).unwrap();
    }
    for _ in 0..2 {
        enc.add_ballot(vec![vec![id(3)], vec![id(1)]]).unwrap();
    }
    let buf = enc.finish();
    let candidates = vec![id(1), id(2), id(3)];
    let tb = TieBreaker::new(vec![id(1), id(2), id(3)]);
    match dispatch(&config, &buf, 6, &candidates, Some(&tb)) {
        VoteResult::Success { payload: SuccessPayload::Stv { winners, events }, .. } => {
            let mut w = winners;
            w.sort();
            assert_eq!(w, vec![id(1), id(2)]);
            assert!(events
                .iter()
                .any(|e| matches!(e, StvEvent::Eliminate { candidate, .. } if *candidate == id(3))));
        }
        other => panic!("expected Success(Stv), got {other:?}"),
    }
}

#[test]
fn no_quorum_short_circuits_before_routing() {
    let config = MethodConfig::ThresholdMajority {
        quorum: QuorumConfig { quorum: Threshold::Fraction { num: 1, den: 2 }, inclusive: true },
        blank_limit: BlankLimitConfig { limit: Threshold::Fraction { num: 1, den: 1 }, inclusive: true },
        max_choices: MaxChoicesConfig { num_chosen: 1 },
        mention_threshold: MentionThresholdConfig { threshold: Threshold::Fraction { num: 0, den: 1 }, inclusive: true },
    };
    let buf = buffer_of_singleton_ballots(&[&[1]]);
    let candidates = vec![id(1)];
    match dispatch(&config, &buf, 100, &candidates, None) {
        VoteResult::NoQuorum { counts } => {
            assert_eq!(counts.submitted, 1);
            assert_eq!(counts.eligible, 100);
        }
        other => panic!("expected NoQuorum, got {other:?}"),
    }
}

#[test]
fn too_many_blanks_short_circuits_before_routing() {
    let config = MethodConfig::ThresholdMajority {
        quorum: QuorumConfig { quorum: Threshold::Fraction { num: 0, den: 1 }, inclusive: true },
        blank_limit: BlankLimitConfig { limit: Threshold::Fraction { num: 0, den: 1 }, inclusive: false },
        max_choices: MaxChoicesConfig { num_chosen: 1 },
        mention_threshold: MentionThresholdConfig { threshold: Threshold::Fraction { num: 0, den: 1 }, inclusive: true },
    };
    let mut enc = BallotEncoder::new(2);
    enc.add_ballot(Vec::<Vec<CandidateId>>::new()).unwrap();
    enc.add_ballot(vec![vec![id(1)]]).unwrap();
    let buf = enc.finish();
    let candidates = vec![id(1)];
    match dispatch(&config, &buf, 2, &candidates, None) {
        VoteResult::TooManyBlanks { counts } => assert_eq!(counts.blank, 1),
        other => panic!("expected TooManyBlanks, got {other:?}"),
    }
}
