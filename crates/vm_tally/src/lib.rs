//! vm_tally — the binary ballot buffer, the scan primitives that read it,
//! the configuration predicates, and the five tabulation engines (Yes/No,
//! Threshold Majority, Ranked Pairs, STV).
//!
//! Every engine here is pure and single-threaded: given a buffer, a
//! candidate list, and (when needed) a tie-breaker, it returns a tagged
//! result. None of them touch I/O, and none of them reach for randomness —
//! ambiguity that can't be resolved deterministically is returned to the
//! caller as a result variant.

pub mod buffer;
pub mod config;
pub mod errors;
pub mod scan;
pub mod tabulation;
pub mod yesno;

pub use buffer::{BallotBuffer, BallotEncoder};
pub use errors::TallyError;
