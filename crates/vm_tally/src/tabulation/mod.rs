//! The three substantial tabulation engines. Each is gated behind its own
//! feature so a caller that only needs, say, Ranked Pairs doesn't pull in
//! the STV vote-value machinery.

pub mod boundary;

#[cfg(feature = "tab_threshold_majority")]
pub mod threshold_majority;

#[cfg(feature = "tab_ranked_pairs")]
pub mod ranked_pairs;

#[cfg(feature = "tab_stv")]
pub mod stv;
