//! Change notifications for the rendering layer.
//!
//! Every observable mutation of the replica state, whether it came from a
//! local edit or a remote frame, surfaces as one of these values. The client
//! runtime publishes them on a broadcast channel; the (external) rendering
//! layer subscribes and redraws what changed.

use crate::model::line::LineId;

/// One observable state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Bootstrap applied: document and chat were replaced wholesale.
    Bootstrapped,
    /// A line was inserted.
    LineInserted { id: LineId },
    /// A line's text changed.
    LineUpdated { id: LineId },
    /// A line was removed.
    LineDeleted { id: LineId },
    /// A writer's typing indicator moved or cleared.
    TypingChanged {
        writer: String,
        line: Option<LineId>,
    },
    /// A chat message was appended.
    ChatAppended,
    /// The local edit focus moved.
    FocusChanged { line: Option<LineId> },
}
