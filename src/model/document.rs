//! The ordered line sequence and its mutation operations.
//!
//! Order is determined purely by insertion position relative to a named
//! predecessor id, never by id value or text content. All lookups are linear
//! scans, which is acceptable under the hard capacity guard.
//!
//! Conflict policy is last-writer-wins per line, applied in whatever order
//! operations are delivered to this replica. Two replicas that receive the
//! same operations in different orders can diverge until the next bootstrap;
//! nothing here detects or repairs that.

use chrono::{DateTime, Utc};

use crate::model::line::{Line, LineId, random_token};

/// Hard capacity guard: inserts are rejected once the document holds this
/// many lines.
pub const MAX_LINES: usize = 2000;

/// An ordered sequence of [`Line`]s, anchored by the sentinel line.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<Line>,
}

impl Document {
    /// Creates a document holding only the sentinel line.
    pub fn new() -> Self {
        Document {
            lines: vec![Line::sentinel()],
        }
    }

    /// Returns the position of `id`, or `None` if no such line exists.
    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    /// Returns the line with the given id, if present.
    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// The full ordered sequence.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Number of lines, sentinel included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Inserts a new line immediately after `prev_id`.
    ///
    /// An unknown `prev_id` degrades to a head insertion rather than failing.
    /// Returns false without mutating when the document is at capacity or
    /// when `id` is already present (uniqueness guard).
    pub fn insert(
        &mut self,
        prev_id: LineId,
        id: LineId,
        text: impl Into<String>,
        writer: Option<String>,
        date: Option<DateTime<Utc>>,
    ) -> bool {
        if self.lines.len() >= MAX_LINES {
            return false;
        }
        if self.index_of(id).is_some() {
            return false;
        }
        let position = self.index_of(prev_id).map(|i| i + 1).unwrap_or(0);
        self.lines
            .insert(position, Line::new(id, text, writer, date));
        true
    }

    /// Replaces the text of `id`, returning whether a mutation occurred.
    ///
    /// A missing id or unchanged text is a no-op; the false return is what
    /// keeps no-op edits from ever reaching the network.
    pub fn update(
        &mut self,
        id: LineId,
        text: &str,
        writer: Option<String>,
        date: Option<DateTime<Utc>>,
    ) -> bool {
        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) if line.text != text => {
                line.text = text.to_string();
                line.writer = writer;
                line.date = date;
                true
            }
            _ => false,
        }
    }

    /// Removes the line with the given id, returning whether it was present.
    ///
    /// No special case for the sentinel here; the edit session never asks
    /// for it.
    pub fn delete(&mut self, id: LineId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.lines.remove(index);
                true
            }
            None => false,
        }
    }

    /// Discards current content and installs the server-provided sequence
    /// verbatim. Bootstrap path only.
    pub fn replace_all(&mut self, lines: Vec<Line>) {
        self.lines = lines;
    }

    /// Draws a fresh line id that is not present in the current document.
    pub fn fresh_line_id(&self) -> LineId {
        loop {
            let id = random_token();
            if self.index_of(id).is_none() {
                return id;
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}
