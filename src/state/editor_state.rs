//! Editor session state
//!
//! Holds the title and content the user is editing for the selected note,
//! together with the snapshot of what was last written successfully.
//! Dirty checking is plain string equality against that snapshot.

use super::{Note, NoteId};
use serde::{Deserialize, Serialize};

/// Tri-state autosave indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Saved,
    Saving,
    Error,
}

impl SaveStatus {
    /// Label shown next to the title field
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Saved => "Saved",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Error => "Error saving",
        }
    }
}

impl std::fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Buffered title and content for the selected note
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    note_id: Option<NoteId>,
    title: String,
    content: String,
    saved_title: String,
    saved_content: String,
    /// Bumped on every buffered change
    revision: u64,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffered title
    pub fn on_title_change(&mut self, text: impl Into<String>) {
        self.title = text.into();
        self.revision += 1;
    }

    /// Replace the buffered content
    pub fn on_content_change(&mut self, serialized: impl Into<String>) {
        self.content = serialized.into();
        self.revision += 1;
    }

    /// Load a note (or nothing) into the buffer and reset the saved snapshot
    /// to match, so the next timer firing sees a clean buffer.
    pub fn select_note(&mut self, note: Option<&Note>) {
        match note {
            Some(note) => {
                self.note_id = Some(note.id.clone());
                self.title = note.title.clone();
                self.content = note.content.clone();
            }
            None => {
                self.note_id = None;
                self.title.clear();
                self.content.clear();
            }
        }
        self.saved_title = self.title.clone();
        self.saved_content = self.content.clone();
        self.revision = 0;
    }

    /// Show values not yet confirmed by the store. The saved snapshot is
    /// left alone, so the buffer stays dirty until a write succeeds.
    pub fn load_unsaved(&mut self, title: &str, content: &str) {
        self.title = title.to_string();
        self.content = content.to_string();
    }

    /// Whether the buffer differs from the last successful write
    pub fn needs_save(&self) -> bool {
        self.note_id.is_some()
            && (self.title != self.saved_title || self.content != self.saved_content)
    }

    /// Record a successful write of these values
    pub fn mark_saved(&mut self, title: &str, content: &str) {
        self.saved_title = title.to_string();
        self.saved_content = content.to_string();
    }

    pub fn note_id(&self) -> Option<&NoteId> {
        self.note_id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn saved_title(&self) -> &str {
        &self.saved_title
    }

    pub fn saved_content(&self) -> &str {
        &self.saved_content
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NewNote;

    fn note(id: &str, title: &str, content: &str) -> Note {
        Note::from_new(
            NoteId::from(id),
            NewNote {
                title: title.to_string(),
                content: content.to_string(),
                created_at: String::new(),
                updated_at: String::new(),
                user_id: "u1".to_string(),
                status: "pending".to_string(),
            },
        )
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(SaveStatus::default(), SaveStatus::Saved);
        assert_eq!(SaveStatus::Saving.to_string(), "Saving...");
        assert_eq!(SaveStatus::Error.label(), "Error saving");
    }

    #[test]
    fn test_edits_make_dirty() {
        let mut session = EditorSession::new();
        session.select_note(Some(&note("a", "Untitled Note", "")));
        assert!(!session.needs_save());

        session.on_content_change("Hello");
        assert!(session.needs_save());
        assert_eq!(session.revision(), 1);

        session.on_content_change("");
        assert!(!session.needs_save());
    }

    #[test]
    fn test_select_resets_snapshot() {
        let mut session = EditorSession::new();
        session.select_note(Some(&note("a", "A", "alpha")));
        session.on_title_change("A edited");
        assert!(session.needs_save());

        session.select_note(Some(&note("b", "B", "beta")));
        assert!(!session.needs_save());
        assert_eq!(session.title(), "B");
        assert_eq!(session.saved_content(), "beta");
    }

    #[test]
    fn test_no_selection_never_dirty() {
        let mut session = EditorSession::new();
        session.select_note(None);
        session.on_title_change("typed into nothing");
        assert!(!session.needs_save());
        assert!(session.note_id().is_none());
    }

    #[test]
    fn test_load_unsaved_stays_dirty() {
        let mut session = EditorSession::new();
        session.select_note(Some(&note("a", "A", "")));
        session.load_unsaved("A", "first draft");
        assert_eq!(session.content(), "first draft");
        assert_eq!(session.saved_content(), "");
        assert!(session.needs_save());
    }

    #[test]
    fn test_mark_saved() {
        let mut session = EditorSession::new();
        session.select_note(Some(&note("a", "A", "")));
        session.on_content_change("Hello world");
        session.mark_saved("A", "Hello world");
        assert!(!session.needs_save());
    }
}
