//! The ephemeral chat sidebar: an append-only message sequence.
//!
//! No deletion and no size cap; the log lives only as long as the replica
//! process and is replaced wholesale on bootstrap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chat message with attribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Append-only ordered sequence of chat messages.
#[derive(Debug, Default)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    pub fn new() -> Self {
        ChatLog::default()
    }

    /// Appends one message to the end of the log.
    pub fn append(
        &mut self,
        message: impl Into<String>,
        writer: Option<String>,
        date: Option<DateTime<Utc>>,
    ) {
        self.entries.push(ChatEntry {
            message: message.into(),
            writer,
            date,
        });
    }

    /// Replaces the log with the server-provided history, replayed in order
    /// through [`append`](Self::append).
    pub fn bootstrap(&mut self, entries: Vec<ChatEntry>) {
        self.entries.clear();
        for entry in entries {
            self.append(entry.message, entry.writer, entry.date);
        }
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
