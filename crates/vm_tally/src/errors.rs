//! Programmer errors: conditions that indicate a caller bug rather than a
//! property of the ballots. These are always fatal; they are never folded
//! into a result variant.

use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TallyError {
    /// `add_ballot` was called more times than the encoder's declared capacity.
    #[error("encoder declared capacity for {declared} ballots; add_ballot exceeded it")]
    BallotCountExceeded { declared: u32 },
}
