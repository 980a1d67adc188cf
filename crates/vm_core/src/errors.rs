//! Minimal error set for core-domain validation.

use core::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoreError {
    /// A candidate id of zero was supplied (zero is the ballot row separator).
    ZeroCandidateId,
    /// A rational threshold had a zero denominator.
    InvalidRatio,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::ZeroCandidateId => write!(f, "candidate id 0 is reserved as a row separator"),
            CoreError::InvalidRatio => write!(f, "rational threshold has a zero denominator"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}
