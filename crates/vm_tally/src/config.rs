//! Configuration predicates: quorum, blank-ratio and mention-threshold
//! checks against a rational threshold.

use std::collections::BTreeMap;
use vm_core::ratio::{self, Ratio, Threshold};
use vm_core::CandidateId;

/// `count/eligible` passes the configured quorum.
pub fn passes_quorum(count: u32, eligible: u32, quorum: Threshold, inclusive: bool) -> bool {
    let v = Ratio::new(count as i128, eligible as i128).unwrap_or_else(|_| Ratio::whole(0));
    ratio::passes(v, quorum, inclusive)
}

/// `blank/count` is within the configured blank limit.
pub fn passes_blank_limit(blank: u32, count: u32, limit: Threshold, inclusive: bool) -> bool {
    let v = Ratio::new(blank as i128, count as i128).unwrap_or_else(|_| Ratio::whole(0));
    ratio::within(v, limit, inclusive)
}

/// The result of partitioning a candidate list by mention ratio.
#[derive(Clone, Debug, Default)]
pub struct MentionFilter {
    pub included: Vec<CandidateId>,
    pub excluded: Vec<CandidateId>,
}

/// Partitions `candidates` into `included`/`excluded` according to whether
/// `mentions(c)/count` passes the mention threshold. Candidates with no
/// entry in `mentions` are treated as zero mentions.
pub fn filter_by_mentions(
    candidates: &[CandidateId],
    mentions: &BTreeMap<CandidateId, u32>,
    count: u32,
    threshold: Threshold,
    inclusive: bool,
) -> MentionFilter {
    let mut out = MentionFilter::default();
    for &c in candidates {
        let m = mentions.get(&c).copied().unwrap_or(0);
        let v = Ratio::new(m as i128, count as i128).unwrap_or_else(|_| Ratio::whole(0));
        if ratio::passes(v, threshold, inclusive) {
            out.included.push(c);
        } else {
            out.excluded.push(c);
        }
    }
    out
}
