//! Candidate identifiers.
//!
//! A candidate id is a positive integer; the buffer representation reserves
//! the full `u16` range (1..=65535) and uses `0` as the ballot-row
//! separator. Two ids are further reserved by convention for the
//! Yes/No family: `1` = No, `2` = Yes. Non-Yes/No elections are free to use
//! `1` as an ordinary candidate id — there is no collision because those
//! elections never consult the Yes/No reservation.

use crate::errors::CoreError;
use core::fmt;

/// A candidate id in the range `1..=65535`. `0` is never a valid value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub struct CandidateId(u16);

/// Reserved id for "No" in the Yes/No family.
pub const NO_ID: CandidateId = CandidateId(1);
/// Reserved id for "Yes" in the Yes/No family.
pub const YES_ID: CandidateId = CandidateId(2);

impl CandidateId {
    /// Build a candidate id, rejecting `0`.
    pub fn new(v: u16) -> Result<Self, CoreError> {
        if v == 0 {
            Err(CoreError::ZeroCandidateId)
        } else {
            Ok(Self(v))
        }
    }

    #[inline]
    pub fn get(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for CandidateId {
    type Error = CoreError;
    fn try_from(v: u16) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl From<CandidateId> for u16 {
    fn from(id: CandidateId) -> u16 {
        id.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
