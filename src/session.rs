//! The per-user edit-session state machine.
//!
//! Tracks which line holds the local edit focus and turns UI gestures into
//! document operations plus the frames to broadcast. Every focus transition
//! first commits the pending edit of the previously focused line, so text
//! sitting in the edit box is never lost by clicking elsewhere or moving
//! with the arrow keys.
//!
//! The caller (the rendering layer) supplies the current contents of the
//! edit box with each gesture; this module owns no text of its own.

use crate::model::line::{LineId, SENTINEL_ID};
use crate::protocol::message::Outbound;
use crate::protocol::sync::Replica;

/// Local edit focus and typing-broadcast state.
///
/// `editing` is `None` at start; there is no terminal state, the session
/// lives as long as the connection.
#[derive(Debug, Default)]
pub struct EditSession {
    editing: Option<LineId>,
    last_typing_broadcast: Option<LineId>,
}

impl EditSession {
    pub fn new() -> Self {
        EditSession::default()
    }

    /// The line currently holding the local edit focus.
    pub fn editing(&self) -> Option<LineId> {
        self.editing
    }

    /// Commits the pending edit of the focused line, if any text changed.
    fn commit_pending(&mut self, replica: &mut Replica, pending: &str) -> Vec<Outbound> {
        match self.editing {
            Some(id) => replica.local_update(id, pending).into_iter().collect(),
            None => Vec::new(),
        }
    }

    fn focus(&mut self, replica: &mut Replica, line: Option<LineId>) {
        if self.editing != line {
            self.editing = line;
            replica.push_focus_change(line);
        }
    }

    /// Moves focus to `id`, committing the previous line's pending text
    /// first.
    pub fn select(&mut self, replica: &mut Replica, id: LineId, pending: &str) -> Vec<Outbound> {
        let frames = self.commit_pending(replica, pending);
        self.focus(replica, Some(id));
        frames
    }

    /// Splits the focused line at a character offset into `text`.
    ///
    /// The focused line keeps the text before the cursor; a fresh-id line
    /// holding the text after the cursor is inserted directly below and
    /// takes the focus. The truncation broadcast is suppressed when the
    /// text did not actually change.
    pub fn split(&mut self, replica: &mut Replica, text: &str, offset: usize) -> Vec<Outbound> {
        let Some(current) = self.editing else {
            return Vec::new();
        };

        let cut = text
            .char_indices()
            .nth(offset)
            .map(|(byte, _)| byte)
            .unwrap_or(text.len());
        let (before, after) = text.split_at(cut);

        let mut frames = Vec::new();
        frames.extend(replica.local_update(current, before));

        let new_id = replica.fresh_line_id();
        if let Some(frame) = replica.local_insert(current, new_id, after) {
            frames.push(frame);
            self.focus(replica, Some(new_id));
        }
        frames
    }

    /// Commits the pending edit, then moves focus to the line above
    /// (clamped at the top).
    pub fn focus_up(&mut self, replica: &mut Replica, pending: &str) -> Vec<Outbound> {
        self.focus_adjacent(replica, pending, -1)
    }

    /// Commits the pending edit, then moves focus to the line below
    /// (clamped at the bottom).
    pub fn focus_down(&mut self, replica: &mut Replica, pending: &str) -> Vec<Outbound> {
        self.focus_adjacent(replica, pending, 1)
    }

    fn focus_adjacent(
        &mut self,
        replica: &mut Replica,
        pending: &str,
        direction: isize,
    ) -> Vec<Outbound> {
        let frames = self.commit_pending(replica, pending);

        if let Some(current) = self.editing {
            // The focused line can have been deleted remotely; then there is
            // no position to move from and focus stays put.
            if let Some(index) = replica.document().index_of(current) {
                let neighbor = index
                    .checked_add_signed(direction)
                    .filter(|&i| i < replica.document().len())
                    .map(|i| replica.document().lines()[i].id);
                if let Some(id) = neighbor {
                    self.focus(replica, Some(id));
                }
            }
        }
        frames
    }

    /// Merges the focused line into its predecessor.
    ///
    /// Only meaningful when the cursor sits at offset 0 of a non-sentinel
    /// line (the caller checks the cursor). Deletes the focused line,
    /// appends `pending` to the previous line's text with no separator, and
    /// moves focus there.
    pub fn merge_with_previous(&mut self, replica: &mut Replica, pending: &str) -> Vec<Outbound> {
        let Some(current) = self.editing else {
            return Vec::new();
        };
        if current == SENTINEL_ID {
            // The sentinel anchors the document and is never deleted.
            return Vec::new();
        }
        let Some(index) = replica.document().index_of(current) else {
            return Vec::new();
        };
        if index == 0 {
            return Vec::new();
        }

        let previous = &replica.document().lines()[index - 1];
        let (prev_id, merged) = (previous.id, format!("{}{}", previous.text, pending));

        let mut frames = Vec::new();
        frames.extend(replica.local_delete(current));
        frames.extend(replica.local_update(prev_id, &merged));
        self.focus(replica, Some(prev_id));
        frames
    }

    /// Forwards a typing-target change to the presence map and broadcasts
    /// it, debounced by identity of the target line: repeated keystrokes on
    /// the same line produce at most one frame until focus moves.
    pub fn typing_changed(&mut self, replica: &mut Replica, line: Option<LineId>) -> Vec<Outbound> {
        replica.local_typing(line);
        if self.last_typing_broadcast == line {
            return Vec::new();
        }
        self.last_typing_broadcast = line;
        vec![replica.typing_frame(line)]
    }
}
