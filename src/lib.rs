//! # line-sync - replicated line-sequence document client
//!
//! The client-side core of a multi-user collaborative line editor: a
//! document modeled as an ordered sequence of independently addressable
//! text lines, synchronized across replicas through a JSON relay, with
//! live typing indicators and an ephemeral chat sidebar.
//!
//! ## Design
//!
//! - **Last-writer-wins per line**: operations are applied in delivery
//!   order with no merge of concurrent edits to the same line; replicas
//!   that see different orders can diverge until the next bootstrap
//! - **Echo suppression**: the relay rebroadcasts every frame to all
//!   replicas including the sender, so each frame carries a per-instance
//!   page token and a replica drops frames carrying its own
//! - **Single-owner state**: one event loop owns the document, presence
//!   map, and chat log; no locks, no shared mutation
//!
//! ## Example
//!
//! ```rust
//! use line_sync::{Client, ClientEvent, UiEvent, SENTINEL_ID};
//!
//! let mut client = Client::new();
//! client.handle(ClientEvent::Ui(UiEvent::Select {
//!     id: SENTINEL_ID,
//!     pending: String::new(),
//! }));
//! let frames = client.handle(ClientEvent::Ui(UiEvent::Split {
//!     text: "hello".to_string(),
//!     offset: 5,
//! }));
//! assert!(!frames.is_empty()); // ready to broadcast
//! ```

pub mod client;
pub mod events;
pub mod model;
pub mod protocol;
pub mod session;

// Re-export the main public API
pub use client::{Client, ClientEvent, TransportError, UiEvent};
pub use events::Change;
pub use model::{ChatEntry, ChatLog, Document, Identity, Line, LineId, PresenceTracker};
pub use model::{MAX_LINES, SENTINEL_ID};
pub use protocol::{Inbound, KEEP_ALIVE_INTERVAL, Outbound, Replica};
pub use session::EditSession;
