//! Note documents as stored in the remote document store

use crate::config::NotesConfig;
use crate::utils::{iso_now, text};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a note by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A persisted note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Serialized rich text; never parsed by the sync layer
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
    pub status: String,
}

impl Note {
    /// Attach a store-assigned id to an insert payload
    pub fn from_new(id: NoteId, new: NewNote) -> Self {
        Self {
            id,
            title: new.title,
            content: new.content,
            created_at: new.created_at,
            updated_at: new.updated_at,
            user_id: new.user_id,
            status: new.status,
        }
    }

    /// Label for the note list: title, else first line of the content
    pub fn display_title(&self) -> String {
        if !self.title.trim().is_empty() {
            return self.title.clone();
        }
        let plain = text::plain_text(&self.content);
        text::first_line(&plain)
            .map(|l| text::truncate(l, 60))
            .unwrap_or_else(|| crate::config::PLACEHOLDER_TITLE.to_string())
    }

    /// Merge a partial update into this note
    pub fn apply(&mut self, update: &NoteUpdate) {
        self.title = update.title.clone();
        self.content = update.content.clone();
        self.updated_at = update.updated_at.clone();
    }
}

/// Insert payload for a new note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
    pub status: String,
}

impl NewNote {
    /// Placeholder note for the given user
    pub fn placeholder(user_id: &str, config: &NotesConfig) -> Self {
        let now = iso_now();
        Self {
            title: config.placeholder_title.clone(),
            content: String::new(),
            created_at: now.clone(),
            updated_at: now,
            user_id: user_id.to_string(),
            status: config.initial_status.clone(),
        }
    }
}

/// Partial field merge written by autosave
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    pub title: String,
    pub content: String,
    pub updated_at: String,
}
