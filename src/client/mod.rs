//! The async client runtime: the event loop that owns the replica, and the
//! WebSocket transport that feeds it.

pub mod runtime;
pub mod transport;

pub use runtime::{Client, ClientEvent, UiEvent};
pub use transport::{TransportError, run};
