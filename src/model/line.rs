//! Line value types for the replicated document.
//!
//! A line is the unit of addressing in the document: a stable id, the text
//! content, and attribution metadata (who wrote it last, and when). Ids are
//! drawn from a sparse 28-bit space; id 0 is reserved for the sentinel line
//! that permanently anchors the head of every document.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A stable identifier for one line of the document.
///
/// Ids are random draws from the 28-bit space, so position in the document
/// carries no relation to id value. Uniqueness within a document is enforced
/// by the document's insert guard and by re-drawing fresh ids against the
/// current content.
pub type LineId = u32;

/// The id of the sentinel line that anchors the head of the document.
pub const SENTINEL_ID: LineId = 0;

/// Largest assignable line id (inclusive); ids live in `1..=MAX_LINE_ID`,
/// with 0 reserved for the sentinel.
pub const MAX_LINE_ID: LineId = 0x0FFF_FFFF;

/// One addressable unit of document text.
///
/// `writer` and `date` record the last writer to touch the line and when;
/// both are absent on the sentinel and on lines the server has no
/// attribution for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl Line {
    /// Creates a new line with the given id, text, and attribution.
    pub fn new(
        id: LineId,
        text: impl Into<String>,
        writer: Option<String>,
        date: Option<DateTime<Utc>>,
    ) -> Self {
        Line {
            id,
            text: text.into(),
            writer,
            date,
        }
    }

    /// Creates the sentinel line: id 0, empty, unattributed.
    pub fn sentinel() -> Self {
        Line::new(SENTINEL_ID, "", None, None)
    }

    /// Returns true if this is the sentinel line.
    pub fn is_sentinel(&self) -> bool {
        self.id == SENTINEL_ID
    }
}

/// Draws a random token from the non-sentinel 28-bit id space.
///
/// Used both for fresh line ids and for the per-replica page token.
pub(crate) fn random_token() -> u32 {
    rand::thread_rng().gen_range(1..=MAX_LINE_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_line() {
        let sentinel = Line::sentinel();
        assert_eq!(sentinel.id, SENTINEL_ID);
        assert_eq!(sentinel.text, "");
        assert!(sentinel.writer.is_none());
        assert!(sentinel.date.is_none());
        assert!(sentinel.is_sentinel());
    }

    #[test]
    fn test_random_token_range() {
        for _ in 0..1000 {
            let token = random_token();
            assert!(token >= 1);
            assert!(token <= MAX_LINE_ID);
        }
    }

    #[test]
    fn test_line_wire_shape() {
        let line = Line::new(42, "hello", Some("alice".to_string()), None);
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["text"], "hello");
        assert_eq!(json["writer"], "alice");
        // Absent attribution is omitted, not serialized as null
        assert!(json.get("date").is_none());
    }

    #[test]
    fn test_line_decodes_without_attribution() {
        let line: Line = serde_json::from_str(r#"{"id":0,"text":""}"#).unwrap();
        assert!(line.is_sentinel());
        assert!(line.writer.is_none());
        assert!(line.date.is_none());
    }
}
