//! vm_core — candidate ids, exact rational thresholds, and the tie-breaker
//! shared by every tabulation engine.
//!
//! This crate is algorithm-free: it defines the stable vocabulary used by
//! `vm_tally` and `vm_dispatch`, nothing else. No I/O. No RNG — every
//! ambiguity this engine can't resolve on its own is surfaced to the caller
//! as a result variant, never guessed at with randomness.
//!
//! Serialization derives are gated behind the `serde` feature.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod errors;
pub mod ids;
pub mod ratio;
pub mod tie_breaker;

pub use errors::CoreError;
pub use ids::CandidateId;
pub use ratio::{Ratio, Threshold};
pub use tie_breaker::TieBreaker;
