//! Session-scoped conversation memory
//!
//! A session is an opaque client-chosen identifier owning an ordered list of
//! role-tagged turns, persisted as one JSON document per session. Sessions
//! are created implicitly on first message and never explicitly deleted.

pub mod store;

pub use store::{BlobStore, FsBlobStore, SessionStore};

use serde::{Deserialize, Serialize};

/// One role-tagged message in a session's chat history
///
/// Only the last turn of a history may carry feedback, attached after the
/// fact by the feedback recorder; the optional fields stay out of the JSON
/// document until then.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// "user" or "assistant"
    pub role: String,
    /// The message text
    pub chat: String,
    /// Binary rating: 0 = bad, 1 = good
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_good_or_not: Option<u8>,
    /// Optional free-text comment accompanying the rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
}

impl Turn {
    /// Create a user turn
    pub fn user(chat: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            chat: chat.into(),
            feedback_good_or_not: None,
            feedback_text: None,
        }
    }

    /// Create an assistant turn
    pub fn assistant(chat: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            chat: chat.into(),
            feedback_good_or_not: None,
            feedback_text: None,
        }
    }
}

/// The persisted per-session document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionHistory {
    /// The owning session identifier
    pub session_id: String,
    /// Ordered turn sequence, oldest first
    pub chat_history: Vec<Turn>,
}

/// Drops turns with empty text, preserving the order of the rest
///
/// Invariant of the orchestrator's history-extraction step: empty turns are
/// never re-serialized into the session document.
pub fn retain_non_empty(turns: Vec<Turn>) -> Vec<Turn> {
    turns.into_iter().filter(|t| !t.chat.is_empty()).collect()
}
