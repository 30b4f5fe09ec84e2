//! Conversation turns and the active session.

use crate::error::Result;
use crate::storage::{KeyValueStore, SESSION_KEY};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Author of a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing.
    User,

    /// The model.
    Assistant,
}

impl Role {
    /// Wire name used by the completion endpoint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Label used in exported transcripts.
    #[must_use]
    pub fn export_label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "AI",
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    /// Who wrote it.
    pub role: Role,

    /// What was written.
    pub content: String,
}

impl Turn {
    /// Create a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The in-progress, append-only turn sequence.
///
/// Growth is unbounded for the lifetime of one conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ConversationSession {
    turns: Vec<Turn>,
}

impl ConversationSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn.
    pub fn append_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    /// Append an assistant turn.
    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::assistant(text));
    }

    /// Drop every turn ("new chat").
    pub fn reset(&mut self) {
        self.turns.clear();
    }

    /// Replace all turns wholesale.
    pub fn replace(&mut self, turns: Vec<Turn>) {
        self.turns = turns;
    }

    /// Owned copy of the turns, unaffected by later mutation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Borrow the turns in order.
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The first user turn of the whole conversation.
    #[must_use]
    pub fn first_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }

    /// Number of turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the session has no turns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Plain-text transcript: `You: ...` / `AI: ...` blocks, each followed
    /// by a blank line.
    #[must_use]
    pub fn export_text(&self) -> String {
        self.turns.iter().fold(String::new(), |mut out, t| {
            let _ = write!(out, "{}: {}\n\n", t.role.export_label(), t.content);
            out
        })
    }

    /// Load the persisted active session.
    ///
    /// Missing or malformed data yields an empty session.
    #[must_use]
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read active session, starting empty");
                return Self::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring malformed active session");
            Self::new()
        })
    }

    /// Persist the session, overwriting the stored copy.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.put(SESSION_KEY, &json)
    }
}
