//! vm_dispatch — configuration, the gate sequence, engine routing, and the
//! generic candidate-id mapping entry point.
//!
//! This is the only crate in the workspace that knows about all five
//! methods at once; `vm_tally` exposes each engine independently and has
//! no notion of a unified `Config`/`VoteResult`.

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod mapped;
pub mod result;

pub use config::MethodConfig;
pub use dispatch::dispatch;
pub use errors::DispatchError;
pub use mapped::{run_mapped, MappedRoundRecord, MappedStvEvent, MappedSuccessPayload, MappedTiedAmbiguity, MappedVoteResult};
pub use result::{BallotCounts, SuccessPayload, TiedAmbiguity, VoteResult};
