//! Programmer errors surfaced by the mapped entry point.

use thiserror::Error;
use vm_tally::TallyError;

#[derive(Clone, Debug, Error)]
pub enum DispatchError {
    /// The mapped Yes/No(/Blank) entry was given a candidate list whose
    /// length isn't exactly 2 (the "No" / "Yes" pair).
    #[error("Yes/No methods require exactly 2 candidates (No, Yes); got {got}")]
    YesNoCandidateCount { got: usize },
    /// A ballot-encoding error bubbled up from `vm_tally`.
    #[error("ballot encoding failed: {0}")]
    Tally(#[from] TallyError),
}
