//! Replica identity: page token and user token.
//!
//! The page token is a random draw made once per replica instance and is
//! used solely for echo suppression; it is never persisted. The user token
//! is issued by the server on first bootstrap and attributes edits to a
//! durable user for the life of the connection.

use tracing::warn;

use crate::model::line::random_token;

/// The identity tokens a replica carries.
#[derive(Debug)]
pub struct Identity {
    page_token: u32,
    user_token: Option<String>,
}

impl Identity {
    /// Creates a fresh identity with a random page token and no user token.
    pub fn new() -> Self {
        Identity {
            page_token: random_token(),
            user_token: None,
        }
    }

    /// The per-instance token used for echo suppression.
    pub fn page_token(&self) -> u32 {
        self.page_token
    }

    /// The server-assigned user token, once the bootstrap response arrived.
    pub fn user_token(&self) -> Option<&str> {
        self.user_token.as_deref()
    }

    /// Records the server-assigned user token from the bootstrap response.
    ///
    /// Invoked once per connection; a second assignment is refused so the
    /// attribution of already-applied edits cannot shift mid-session.
    pub fn record_user_token(&mut self, token: String) {
        if self.user_token.is_some() {
            warn!(%token, "user token already assigned, ignoring reassignment");
            return;
        }
        self.user_token = Some(token);
    }
}

impl Default for Identity {
    fn default() -> Self {
        Identity::new()
    }
}
