//! Wire envelopes for the synchronization protocol.
//!
//! One JSON object per text frame, discriminated by the `action` field.
//! Field names on the wire are camelCase (`pageToken`, `prevId`, ...);
//! actions are kebab-case (`get-all`, `chat-post`, `keep-alive`).
//!
//! Outbound and inbound frames are separate enums because the `get-all`
//! action is asymmetric: the request carries the identity tokens, while the
//! response carries the assigned user token plus the full line and chat
//! history.

use serde::{Deserialize, Serialize};

use crate::model::chat::ChatEntry;
use crate::model::line::{Line, LineId};

/// Frames this replica sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Outbound {
    /// Bootstrap request, sent once on connection open.
    GetAll {
        page_token: u32,
        user_token: Option<String>,
    },
    Insert {
        page_token: u32,
        user_token: Option<String>,
        prev_id: LineId,
        id: LineId,
        text: String,
    },
    Update {
        page_token: u32,
        user_token: Option<String>,
        id: LineId,
        text: String,
    },
    Delete {
        page_token: u32,
        user_token: Option<String>,
        id: LineId,
    },
    Typing {
        page_token: u32,
        user_token: Option<String>,
        id: Option<LineId>,
    },
    ChatPost {
        page_token: u32,
        user_token: Option<String>,
        message: String,
    },
    /// Session liveness ping; carries identity only, produces no state change.
    KeepAlive {
        page_token: u32,
        user_token: Option<String>,
    },
}

/// Frames the relay delivers to this replica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Inbound {
    /// Bootstrap response: the assigned user token and the authoritative
    /// line and chat history.
    GetAll {
        token: String,
        lines: Vec<Line>,
        chats: Vec<ChatEntry>,
    },
    Insert {
        page_token: u32,
        #[serde(default)]
        user_token: Option<String>,
        prev_id: LineId,
        id: LineId,
        text: String,
    },
    Update {
        page_token: u32,
        #[serde(default)]
        user_token: Option<String>,
        id: LineId,
        text: String,
    },
    Delete {
        page_token: u32,
        #[serde(default)]
        user_token: Option<String>,
        id: LineId,
    },
    Typing {
        page_token: u32,
        #[serde(default)]
        user_token: Option<String>,
        #[serde(default)]
        id: Option<LineId>,
    },
    ChatPost {
        page_token: u32,
        #[serde(default)]
        user_token: Option<String>,
        message: String,
    },
}

/// Encodes an outbound frame as a single JSON text frame.
pub fn encode(frame: &Outbound) -> serde_json::Result<String> {
    serde_json::to_string(frame)
}

/// Decodes one inbound text frame.
///
/// Unknown actions and malformed frames come back as errors; the caller
/// logs and drops them, never more.
pub fn decode(text: &str) -> serde_json::Result<Inbound> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_request_wire_shape() {
        let frame = Outbound::GetAll {
            page_token: 123,
            user_token: None,
        };
        let json: serde_json::Value =
            serde_json::from_str(&encode(&frame).unwrap()).unwrap();

        assert_eq!(json["action"], "get-all");
        assert_eq!(json["pageToken"], 123);
        // Null until assigned, and present on the wire.
        assert!(json["userToken"].is_null());
    }

    #[test]
    fn test_insert_wire_shape() {
        let frame = Outbound::Insert {
            page_token: 1,
            user_token: Some("u-9".to_string()),
            prev_id: 0,
            id: 42,
            text: "hi".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&encode(&frame).unwrap()).unwrap();

        assert_eq!(json["action"], "insert");
        assert_eq!(json["prevId"], 0);
        assert_eq!(json["id"], 42);
        assert_eq!(json["text"], "hi");
        assert_eq!(json["userToken"], "u-9");
    }

    #[test]
    fn test_kebab_case_actions() {
        let chat = Outbound::ChatPost {
            page_token: 1,
            user_token: None,
            message: "hey".to_string(),
        };
        let keep_alive = Outbound::KeepAlive {
            page_token: 1,
            user_token: None,
        };

        assert!(encode(&chat).unwrap().contains(r#""action":"chat-post""#));
        assert!(
            encode(&keep_alive)
                .unwrap()
                .contains(r#""action":"keep-alive""#)
        );
    }

    #[test]
    fn test_decode_bootstrap_response() {
        let frame = decode(
            r#"{
                "action": "get-all",
                "token": "u-7",
                "lines": [{"id": 0, "text": ""}, {"id": 9, "text": "hello", "writer": "u-2"}],
                "chats": [{"message": "hi", "writer": "u-2"}]
            }"#,
        )
        .unwrap();

        match frame {
            Inbound::GetAll { token, lines, chats } => {
                assert_eq!(token, "u-7");
                assert_eq!(lines.len(), 2);
                assert_eq!(lines[1].text, "hello");
                assert_eq!(chats[0].message, "hi");
            }
            other => panic!("expected get-all, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_typing_with_null_id() {
        let frame =
            decode(r#"{"action":"typing","pageToken":5,"userToken":"u-1","id":null}"#).unwrap();
        assert_eq!(
            frame,
            Inbound::Typing {
                page_token: 5,
                user_token: Some("u-1".to_string()),
                id: None,
            }
        );
    }

    #[test]
    fn test_decode_unknown_action_is_an_error() {
        assert!(decode(r#"{"action":"rewind","pageToken":5}"#).is_err());
        assert!(decode("not json at all").is_err());
    }
}
