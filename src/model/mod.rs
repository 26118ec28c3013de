//! Replica-local state: the line sequence, identity tokens, typing presence,
//! and the chat log.
//!
//! Everything in this module is plain owned data mutated by exactly one
//! event-processing context; there is no interior locking.

pub mod chat;
pub mod document;
pub mod identity;
pub mod line;
pub mod presence;

pub use chat::{ChatEntry, ChatLog};
pub use document::{Document, MAX_LINES};
pub use identity::Identity;
pub use line::{Line, LineId, MAX_LINE_ID, SENTINEL_ID};
pub use presence::PresenceTracker;
