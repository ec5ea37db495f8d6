//! Note collection state
//!
//! The locally rendered list of the signed-in user's notes plus the current
//! selection. Remote snapshots replace the list wholesale and always win;
//! local create/delete/save patches only hide latency until the next snapshot.

use super::{Note, NoteId, NoteUpdate};

/// Result of applying a remote snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotOutcome {
    /// The selected note was missing from the snapshot and got deselected
    pub selection_cleared: bool,
}

/// Ordered list of notes and the selection
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    /// Notes in display order (most recently updated first, as delivered)
    notes: Vec<Note>,

    /// Currently selected note
    selected: Option<NoteId>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with a full snapshot. Idempotent: applying the same
    /// snapshot twice yields the same state.
    pub fn replace_all(&mut self, snapshot: Vec<Note>) -> SnapshotOutcome {
        self.notes = snapshot;

        let mut outcome = SnapshotOutcome::default();
        if let Some(selected) = &self.selected {
            if !self.contains(selected) {
                log::debug!("Selected note {} vanished from snapshot", selected);
                self.selected = None;
                outcome.selection_cleared = true;
            }
        }
        outcome
    }

    /// Append a newly created note unless a snapshot already delivered it
    pub fn append(&mut self, note: Note) -> bool {
        if self.contains(&note.id) {
            return false;
        }
        self.notes.push(note);
        true
    }

    /// Remove a note, returning its former position for rollback.
    /// Clears the selection if it pointed at the removed note.
    pub fn remove(&mut self, id: &NoteId) -> Option<(usize, Note)> {
        let index = self.index_of(id)?;
        let note = self.notes.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some((index, note))
    }

    /// Put a removed note back at its former position. No-op if a snapshot
    /// already brought it back.
    pub fn restore(&mut self, index: usize, note: Note) -> bool {
        if self.contains(&note.id) {
            return false;
        }
        let index = index.min(self.notes.len());
        self.notes.insert(index, note);
        true
    }

    /// Patch the cached entry after a successful autosave
    pub fn apply_saved(&mut self, id: &NoteId, update: &NoteUpdate) -> bool {
        match self.notes.iter_mut().find(|n| &n.id == id) {
            Some(note) => {
                note.apply(update);
                true
            }
            None => false,
        }
    }

    /// Select a note by id. Returns the note if it exists.
    pub fn select(&mut self, id: &NoteId) -> Option<&Note> {
        let index = self.index_of(id)?;
        self.selected = Some(id.clone());
        self.notes.get(index)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Drop all notes and the selection
    pub fn clear(&mut self) {
        self.notes.clear();
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<&NoteId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Note> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: &NoteId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|n| &n.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
