//! The single-threaded client event loop.
//!
//! [`Client`] owns the replica and edit session exclusively and consumes
//! typed events to completion, one at a time: UI gestures, raw frames from
//! the relay, and keep-alive ticks. No other component touches the model,
//! so no locking is needed anywhere in the state path.
//!
//! Each handled event yields the frames to send and publishes the resulting
//! [`Change`] notifications on a broadcast channel for the rendering layer.

use tokio::sync::broadcast;

use crate::events::Change;
use crate::model::line::LineId;
use crate::protocol::message::Outbound;
use crate::protocol::sync::Replica;
use crate::session::EditSession;

/// A gesture from the rendering layer, carrying the current contents of the
/// edit box where the transition needs it.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Click on a line: commit the pending edit, focus the clicked line.
    Select { id: LineId, pending: String },
    /// Enter key: split the focused line at the cursor.
    Split { text: String, offset: usize },
    /// Arrow up: commit, focus the line above.
    FocusUp { pending: String },
    /// Arrow down: commit, focus the line below.
    FocusDown { pending: String },
    /// Backspace at offset 0: merge the focused line into its predecessor.
    MergeWithPrevious { pending: String },
    /// The line under the local cursor changed (or editing stopped).
    TypingChanged { line: Option<LineId> },
    /// Send a chat message. The input is cleared by the caller; the entry
    /// appears when the relay echoes it back.
    ChatPost { message: String },
}

/// One unit of work for the client loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Ui(UiEvent),
    /// A raw text frame delivered by the relay.
    Frame(String),
    /// Time to send the liveness ping.
    KeepAlive,
}

/// Capacity of the change-notification channel; a rendering layer that lags
/// further than this behind simply observes a `Lagged` error and redraws.
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// The replica, its edit session, and the change-notification fan-out.
#[derive(Debug)]
pub struct Client {
    replica: Replica,
    session: EditSession,
    changes: broadcast::Sender<Change>,
}

impl Client {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Client {
            replica: Replica::new(),
            session: EditSession::new(),
            changes,
        }
    }

    /// Subscribes to change notifications. Rendering-layer entry point.
    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.changes.subscribe()
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// The bootstrap request the transport sends on connection open.
    pub fn bootstrap_request(&self) -> Outbound {
        self.replica.bootstrap_request()
    }

    /// Handles one event to completion and returns the frames to send.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<Outbound> {
        let frames = match event {
            ClientEvent::Ui(gesture) => self.handle_ui(gesture),
            ClientEvent::Frame(text) => {
                self.replica.apply_frame(&text);
                Vec::new()
            }
            ClientEvent::KeepAlive => vec![self.replica.keep_alive()],
        };

        for change in self.replica.drain_changes() {
            // A send error only means nobody is rendering right now.
            let _ = self.changes.send(change);
        }
        frames
    }

    fn handle_ui(&mut self, gesture: UiEvent) -> Vec<Outbound> {
        match gesture {
            UiEvent::Select { id, pending } => {
                self.session.select(&mut self.replica, id, &pending)
            }
            UiEvent::Split { text, offset } => {
                self.session.split(&mut self.replica, &text, offset)
            }
            UiEvent::FocusUp { pending } => self.session.focus_up(&mut self.replica, &pending),
            UiEvent::FocusDown { pending } => {
                self.session.focus_down(&mut self.replica, &pending)
            }
            UiEvent::MergeWithPrevious { pending } => {
                self.session.merge_with_previous(&mut self.replica, &pending)
            }
            UiEvent::TypingChanged { line } => {
                self.session.typing_changed(&mut self.replica, line)
            }
            UiEvent::ChatPost { message } => vec![self.replica.chat_post(message)],
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Client::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::line::SENTINEL_ID;

    #[test]
    fn test_keep_alive_produces_ping() {
        let mut client = Client::new();
        let frames = client.handle(ClientEvent::KeepAlive);
        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], Outbound::KeepAlive { .. }));
    }

    #[test]
    fn test_inbound_frame_publishes_changes() {
        let mut client = Client::new();
        let mut changes = client.subscribe();

        let frame = format!(
            r#"{{"action":"insert","pageToken":{},"userToken":"u-2","prevId":0,"id":7,"text":"hi"}}"#,
            client.replica().identity().page_token() + 1
        );
        let outbound = client.handle(ClientEvent::Frame(frame));

        // Remote frames are applied, never re-broadcast.
        assert!(outbound.is_empty());
        assert_eq!(changes.try_recv().unwrap(), Change::LineInserted { id: 7 });
    }

    #[test]
    fn test_chat_post_is_not_applied_locally() {
        let mut client = Client::new();
        let frames = client.handle(ClientEvent::Ui(UiEvent::ChatPost {
            message: "hello".to_string(),
        }));

        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], Outbound::ChatPost { .. }));
        // The local log stays empty until the relay echoes the frame back.
        assert!(client.replica().chat().is_empty());
    }

    #[test]
    fn test_ui_gesture_yields_frames_and_changes() {
        let mut client = Client::new();
        let mut changes = client.subscribe();

        client.handle(ClientEvent::Ui(UiEvent::Select {
            id: SENTINEL_ID,
            pending: String::new(),
        }));
        assert_eq!(
            changes.try_recv().unwrap(),
            Change::FocusChanged {
                line: Some(SENTINEL_ID)
            }
        );

        let frames = client.handle(ClientEvent::Ui(UiEvent::Split {
            text: "hi".to_string(),
            offset: 0,
        }));
        assert_eq!(frames.len(), 1);
        assert!(matches!(
            changes.try_recv().unwrap(),
            Change::LineInserted { .. }
        ));
        assert_eq!(client.replica().document().len(), 2);
    }
}
