//! The typing-presence map: which writer is editing which line.
//!
//! Both directions are exclusive: a writer points at no more than one line,
//! and a line shows no more than one writer. The two maps are kept in
//! lockstep so the rendering layer can query either way in O(1).

use std::collections::HashMap;

use crate::model::line::LineId;

/// Exclusive writer-to-line typing indicator.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    by_writer: HashMap<String, LineId>,
    by_line: HashMap<LineId, String>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        PresenceTracker::default()
    }

    /// Points `writer` at `line`, or clears the writer's indicator when
    /// `line` is `None`.
    ///
    /// The writer's previous entry is cleared first, and claiming a line
    /// evicts whoever was shown on it, so the forward and reverse maps never
    /// disagree.
    pub fn set_typing(&mut self, line: Option<LineId>, writer: &str) {
        if let Some(previous) = self.by_writer.remove(writer) {
            self.by_line.remove(&previous);
        }
        if let Some(id) = line {
            if let Some(evicted) = self.by_line.insert(id, writer.to_string()) {
                self.by_writer.remove(&evicted);
            }
            self.by_writer.insert(writer.to_string(), id);
        }
    }

    /// The line `writer` is currently typing on, if any.
    pub fn line_of(&self, writer: &str) -> Option<LineId> {
        self.by_writer.get(writer).copied()
    }

    /// The writer currently typing on `line`, if any.
    pub fn writer_at(&self, line: LineId) -> Option<&str> {
        self.by_line.get(&line).map(String::as_str)
    }

    /// Number of writers currently showing a typing indicator.
    pub fn len(&self) -> usize {
        self.by_writer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_writer.is_empty()
    }
}
