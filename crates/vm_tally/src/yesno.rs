//! Yes/No(/Blank) engine: two reserved candidate ids, two majority tests.

use crate::buffer::BallotBuffer;
use vm_core::ratio::{self, Threshold};
use vm_core::ratio::Ratio;
use vm_core::ids::{NO_ID, YES_ID};

/// The `Majority` configuration sub-record.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MajorityConfig {
    pub ballots: Threshold,
    pub ballots_inclusive: bool,
    pub voters: Threshold,
    pub voters_inclusive: bool,
    pub must_reach_both: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct YesNoTally {
    pub yes: u32,
    pub no: u32,
    pub blank: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct YesNoOutcome {
    pub tally: YesNoTally,
    pub passed: bool,
}

/// Tallies `Yes`/`No`/blank and evaluates both majority tests, combined by
/// `must_reach_both`.
pub fn tabulate_yesno(buffer: &BallotBuffer, eligible: u32, majority: &MajorityConfig) -> YesNoOutcome {
    let mut tally = YesNoTally::default();
    for i in 0..buffer.ballot_count() {
        if buffer.is_blank(i) {
            tally.blank += 1;
            continue;
        }
        let mut voted_yes = false;
        let mut voted_no = false;
        for word in buffer.ballot_rows(i) {
            if word == 0 {
                continue;
            }
            if word == YES_ID.get() {
                voted_yes = true;
            } else if word == NO_ID.get() {
                voted_no = true;
            }
        }
        if voted_yes {
            tally.yes += 1;
        } else if voted_no {
            tally.no += 1;
        }
    }

    let cast = tally.yes + tally.no;
    let ballot_ratio = Ratio::new(tally.yes as i128, cast as i128).unwrap_or_else(|_| Ratio::whole(0));
    let voter_ratio = Ratio::new(tally.yes as i128, eligible as i128).unwrap_or_else(|_| Ratio::whole(0));
    let ballot_pass = ratio::passes(ballot_ratio, majority.ballots, majority.ballots_inclusive);
    let voter_pass = ratio::passes(voter_ratio, majority.voters, majority.voters_inclusive);
    let passed = if majority.must_reach_both {
        ballot_pass && voter_pass
    } else {
        ballot_pass || voter_pass
    };

    YesNoOutcome { tally, passed }
}
