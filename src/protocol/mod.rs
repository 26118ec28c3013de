//! The synchronization protocol: JSON wire envelopes plus the replica-side
//! dispatch, echo suppression, and bootstrap logic.

pub mod message;
pub mod sync;

pub use message::{Inbound, Outbound, decode, encode};
pub use sync::{KEEP_ALIVE_INTERVAL, Replica};
