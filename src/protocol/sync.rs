//! Replica state plus the dispatch and filtering logic around it.
//!
//! [`Replica`] owns the document, identity, presence map, and chat log, and
//! is the only place they are mutated. Local edits go through the `local_*`
//! methods, which apply the mutation immediately and hand back the frame to
//! broadcast (or `None` when the edit turned out to be a no-op). Remote
//! frames go through [`Replica::apply_frame`], which performs echo
//! suppression and dispatches to the model operations.
//!
//! Echo suppression is the crux: the relay rebroadcasts every frame to all
//! replicas including the sender, so every non-bootstrap, non-chat frame
//! carries the sender's page token and is dropped when it matches our own.
//! Chat is the deliberate exception: the sender does not append locally on
//! send, so its own rebroadcast is the moment the entry materializes.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::events::Change;
use crate::model::chat::ChatLog;
use crate::model::document::Document;
use crate::model::identity::Identity;
use crate::model::line::LineId;
use crate::model::presence::PresenceTracker;
use crate::protocol::message::{Inbound, Outbound, decode};

/// How often a keep-alive frame is sent to stave off server-side session
/// expiry.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// One replica of the shared document and its sidecar state.
#[derive(Debug)]
pub struct Replica {
    identity: Identity,
    document: Document,
    presence: PresenceTracker,
    chat: ChatLog,
    changes: Vec<Change>,
}

impl Replica {
    /// Creates a replica with a fresh page token and a sentinel-only
    /// document.
    pub fn new() -> Self {
        Replica {
            identity: Identity::new(),
            document: Document::new(),
            presence: PresenceTracker::new(),
            chat: ChatLog::new(),
            changes: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Draws a line id unused in the current document.
    pub fn fresh_line_id(&self) -> LineId {
        self.document.fresh_line_id()
    }

    /// Takes the change notifications accumulated since the last drain.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    /// Records a local edit-focus move for the rendering layer. Focus is
    /// replica-local state; nothing goes on the wire for it.
    pub(crate) fn push_focus_change(&mut self, line: Option<LineId>) {
        self.changes.push(Change::FocusChanged { line });
    }

    fn user_token_owned(&self) -> Option<String> {
        self.identity.user_token().map(str::to_string)
    }

    /// The bootstrap request sent on connection open.
    pub fn bootstrap_request(&self) -> Outbound {
        Outbound::GetAll {
            page_token: self.identity.page_token(),
            user_token: self.user_token_owned(),
        }
    }

    /// The liveness ping; identity only, no payload.
    pub fn keep_alive(&self) -> Outbound {
        Outbound::KeepAlive {
            page_token: self.identity.page_token(),
            user_token: self.user_token_owned(),
        }
    }

    /// The frame for a chat message.
    ///
    /// Deliberately no local append: the entry shows up when the relay
    /// rebroadcasts it back to us.
    pub fn chat_post(&self, message: impl Into<String>) -> Outbound {
        Outbound::ChatPost {
            page_token: self.identity.page_token(),
            user_token: self.user_token_owned(),
            message: message.into(),
        }
    }

    /// The frame announcing the local typing indicator's target line.
    pub fn typing_frame(&self, line: Option<LineId>) -> Outbound {
        Outbound::Typing {
            page_token: self.identity.page_token(),
            user_token: self.user_token_owned(),
            id: line,
        }
    }

    /// Applies a local insert and returns the frame to broadcast, or `None`
    /// when the document refused it (capacity or duplicate id).
    pub fn local_insert(&mut self, prev_id: LineId, id: LineId, text: &str) -> Option<Outbound> {
        let applied = self.document.insert(
            prev_id,
            id,
            text,
            self.user_token_owned(),
            Some(Utc::now()),
        );
        if !applied {
            debug!(id, "local insert refused by document");
            return None;
        }
        self.changes.push(Change::LineInserted { id });
        Some(Outbound::Insert {
            page_token: self.identity.page_token(),
            user_token: self.user_token_owned(),
            prev_id,
            id,
            text: text.to_string(),
        })
    }

    /// Applies a local update and returns the frame to broadcast, or `None`
    /// when nothing changed. The `None` path is what keeps no-op edits off
    /// the network.
    pub fn local_update(&mut self, id: LineId, text: &str) -> Option<Outbound> {
        let changed = self
            .document
            .update(id, text, self.user_token_owned(), Some(Utc::now()));
        if !changed {
            return None;
        }
        self.changes.push(Change::LineUpdated { id });
        Some(Outbound::Update {
            page_token: self.identity.page_token(),
            user_token: self.user_token_owned(),
            id,
            text: text.to_string(),
        })
    }

    /// Applies a local delete and returns the frame to broadcast, or `None`
    /// when the line was already gone.
    pub fn local_delete(&mut self, id: LineId) -> Option<Outbound> {
        if !self.document.delete(id) {
            return None;
        }
        self.changes.push(Change::LineDeleted { id });
        Some(Outbound::Delete {
            page_token: self.identity.page_token(),
            user_token: self.user_token_owned(),
            id,
        })
    }

    /// Moves the local typing indicator. Whether to broadcast is the edit
    /// session's call; this only maintains the presence map.
    pub fn local_typing(&mut self, line: Option<LineId>) {
        let Some(writer) = self.user_token_owned() else {
            // No user token yet, nothing to attribute the indicator to.
            return;
        };
        self.presence.set_typing(line, &writer);
        self.changes.push(Change::TypingChanged { writer, line });
    }

    /// Decodes and applies one raw text frame from the relay.
    ///
    /// Malformed or unrecognized frames are logged and dropped; nothing in
    /// this path is fatal.
    pub fn apply_frame(&mut self, text: &str) {
        match decode(text) {
            Ok(frame) => self.apply(frame),
            Err(error) => warn!(%error, frame = text, "dropping undecodable frame"),
        }
    }

    /// Applies one decoded inbound frame.
    pub fn apply(&mut self, frame: Inbound) {
        match frame {
            Inbound::GetAll { token, lines, chats } => {
                // Applied unconditionally: this is the base state every
                // replica converges on.
                self.identity.record_user_token(token);
                self.document.replace_all(lines);
                self.chat.bootstrap(chats);
                self.changes.push(Change::Bootstrapped);
            }
            Inbound::Insert {
                page_token,
                user_token,
                prev_id,
                id,
                text,
            } => {
                if self.is_echo(page_token) {
                    return;
                }
                if self
                    .document
                    .insert(prev_id, id, text, user_token, Some(Utc::now()))
                {
                    self.changes.push(Change::LineInserted { id });
                }
            }
            Inbound::Update {
                page_token,
                user_token,
                id,
                text,
            } => {
                if self.is_echo(page_token) {
                    return;
                }
                if self.document.update(id, &text, user_token, Some(Utc::now())) {
                    self.changes.push(Change::LineUpdated { id });
                }
            }
            Inbound::Delete { page_token, id, .. } => {
                if self.is_echo(page_token) {
                    return;
                }
                if self.document.delete(id) {
                    self.changes.push(Change::LineDeleted { id });
                }
            }
            Inbound::Typing {
                page_token,
                user_token,
                id,
            } => {
                if self.is_echo(page_token) {
                    return;
                }
                let Some(writer) = user_token else {
                    debug!("typing frame without user token, nothing to show");
                    return;
                };
                self.presence.set_typing(id, &writer);
                self.changes.push(Change::TypingChanged { writer, line: id });
            }
            Inbound::ChatPost {
                user_token, message, ..
            } => {
                // No echo suppression: the sender's own rebroadcast is the
                // append.
                self.chat.append(message, user_token, Some(Utc::now()));
                self.changes.push(Change::ChatAppended);
            }
        }
    }

    fn is_echo(&self, page_token: u32) -> bool {
        let echo = page_token == self.identity.page_token();
        if echo {
            debug!(page_token, "suppressing echoed frame");
        }
        echo
    }
}

impl Default for Replica {
    fn default() -> Self {
        Replica::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::line::SENTINEL_ID;

    fn remote_insert(page_token: u32, prev_id: LineId, id: LineId, text: &str) -> Inbound {
        Inbound::Insert {
            page_token,
            user_token: Some("remote".to_string()),
            prev_id,
            id,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_bootstrap_applied_unconditionally() {
        let mut replica = Replica::new();
        replica.apply(Inbound::GetAll {
            token: "u-1".to_string(),
            lines: vec![
                crate::model::line::Line::sentinel(),
                crate::model::line::Line::new(9, "from server", None, None),
            ],
            chats: vec![crate::model::chat::ChatEntry {
                message: "welcome".to_string(),
                writer: None,
                date: None,
            }],
        });

        assert_eq!(replica.identity().user_token(), Some("u-1"));
        assert_eq!(replica.document().len(), 2);
        assert_eq!(replica.chat().len(), 1);
        assert_eq!(replica.drain_changes(), vec![Change::Bootstrapped]);
    }

    #[test]
    fn test_echo_suppressed_for_document_ops() {
        let mut replica = Replica::new();
        let own_token = replica.identity().page_token();

        replica.apply(remote_insert(own_token, SENTINEL_ID, 10, "echo"));
        assert_eq!(replica.document().len(), 1);
        assert!(replica.drain_changes().is_empty());

        replica.apply(remote_insert(own_token + 1, SENTINEL_ID, 10, "real"));
        assert_eq!(replica.document().len(), 2);
        assert_eq!(
            replica.drain_changes(),
            vec![Change::LineInserted { id: 10 }]
        );
    }

    #[test]
    fn test_echo_suppressed_for_typing() {
        let mut replica = Replica::new();
        let own_token = replica.identity().page_token();

        replica.apply(Inbound::Typing {
            page_token: own_token,
            user_token: Some("me".to_string()),
            id: Some(5),
        });
        assert!(replica.presence().is_empty());
    }

    #[test]
    fn test_chat_post_applied_even_for_own_token() {
        let mut replica = Replica::new();
        let own_token = replica.identity().page_token();

        replica.apply(Inbound::ChatPost {
            page_token: own_token,
            user_token: Some("me".to_string()),
            message: "hello all".to_string(),
        });

        assert_eq!(replica.chat().len(), 1);
        assert_eq!(replica.chat().entries()[0].message, "hello all");
        assert_eq!(replica.drain_changes(), vec![Change::ChatAppended]);
    }

    #[test]
    fn test_undecodable_frame_is_dropped() {
        let mut replica = Replica::new();
        replica.apply_frame(r#"{"action":"rollback","pageToken":1}"#);
        replica.apply_frame("garbage");

        assert_eq!(replica.document().len(), 1);
        assert!(replica.drain_changes().is_empty());
    }

    #[test]
    fn test_remote_ops_on_missing_ids_are_noops() {
        let mut replica = Replica::new();
        replica.apply(Inbound::Update {
            page_token: 777,
            user_token: None,
            id: 42,
            text: "ghost".to_string(),
        });
        replica.apply(Inbound::Delete {
            page_token: 777,
            user_token: None,
            id: 42,
        });

        assert_eq!(replica.document().len(), 1);
        assert!(replica.drain_changes().is_empty());
    }

    #[test]
    fn test_local_update_noop_produces_no_frame() {
        let mut replica = Replica::new();
        assert!(replica.local_insert(SENTINEL_ID, 10, "same").is_some());
        assert!(replica.local_update(10, "same").is_none());
        assert!(replica.local_update(10, "different").is_some());
    }

    #[test]
    fn test_local_ops_stamp_identity() {
        let mut replica = Replica::new();
        let frame = replica.local_insert(SENTINEL_ID, 10, "hi").unwrap();

        match frame {
            Outbound::Insert {
                page_token,
                prev_id,
                id,
                text,
                ..
            } => {
                assert_eq!(page_token, replica.identity().page_token());
                assert_eq!(prev_id, SENTINEL_ID);
                assert_eq!(id, 10);
                assert_eq!(text, "hi");
            }
            other => panic!("expected insert frame, got {other:?}"),
        }
    }

    #[test]
    fn test_typing_without_user_token_attributes_nothing() {
        let mut replica = Replica::new();
        replica.apply(Inbound::Typing {
            page_token: 777,
            user_token: None,
            id: Some(5),
        });
        assert!(replica.presence().is_empty());
        assert!(replica.drain_changes().is_empty());
    }
}
