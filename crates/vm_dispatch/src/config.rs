//! `MethodConfig`: the tagged configuration record, one variant per
//! supported voting method, carrying exactly the sub-records that method
//! requires.

use vm_core::ratio::Threshold;
pub use vm_tally::yesno::MajorityConfig;

/// Required on every method.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuorumConfig {
    pub quorum: Threshold,
    pub inclusive: bool,
}

/// Required on every non-Yes/No method.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlankLimitConfig {
    pub limit: Threshold,
    pub inclusive: bool,
}

/// Threshold Majority, Ranked Pairs, STV.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxChoicesConfig {
    pub num_chosen: usize,
}

/// Threshold Majority, Ranked Pairs.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MentionThresholdConfig {
    pub threshold: Threshold,
    pub inclusive: bool,
}

/// The configuration the dispatcher runs a tabulation against. Each
/// variant names one of the five supported methods and carries only the
/// sub-records that method uses.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MethodConfig {
    YesNo {
        quorum: QuorumConfig,
        majority: MajorityConfig,
    },
    YesNoBlank {
        quorum: QuorumConfig,
        blank_limit: BlankLimitConfig,
        majority: MajorityConfig,
    },
    ThresholdMajority {
        quorum: QuorumConfig,
        blank_limit: BlankLimitConfig,
        max_choices: MaxChoicesConfig,
        mention_threshold: MentionThresholdConfig,
    },
    RankedPairs {
        quorum: QuorumConfig,
        blank_limit: BlankLimitConfig,
        max_choices: MaxChoicesConfig,
        mention_threshold: MentionThresholdConfig,
    },
    Stv {
        quorum: QuorumConfig,
        blank_limit: BlankLimitConfig,
        max_choices: MaxChoicesConfig,
    },
}

impl MethodConfig {
    pub fn quorum(&self) -> QuorumConfig {
        match self {
            MethodConfig::YesNo { quorum, .. }
            | MethodConfig::YesNoBlank { quorum, .. }
            | MethodConfig::ThresholdMajority { quorum, .. }
            | MethodConfig::RankedPairs { quorum, .. }
            | MethodConfig::Stv { quorum, .. } => *quorum,
        }
    }

    /// `None` for `YesNo`, which is exempt from the blank-limit gate.
    pub fn blank_limit(&self) -> Option<BlankLimitConfig> {
        match self {
            MethodConfig::YesNo { .. } => None,
            MethodConfig::YesNoBlank { blank_limit, .. }
            | MethodConfig::ThresholdMajority { blank_limit, .. }
            | MethodConfig::RankedPairs { blank_limit, .. }
            | MethodConfig::Stv { blank_limit, .. } => Some(*blank_limit),
        }
    }
}
