//! Root application state container
//!
//! Contains the central state for the entire application: the signed-in
//! user, the note list and selection, the editor buffer, autosave
//! bookkeeping, themes and the notification queue.

use super::{EditorSession, NoteCollection, NoteId};
use crate::backend::User;
use crate::config::Config;
use crate::editor::{AutosaveCoordinator, EditorCommand};
use crate::theme::ThemeManager;
use crate::utils::WritingStats;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Root application state
pub struct AppState {
    /// Signed-in user, if any
    pub user: Option<User>,

    /// Note list and selection
    pub notes: NoteCollection,

    /// Buffer for the selected note
    pub editor: EditorSession,

    /// Debounce and write bookkeeping
    pub autosave: AutosaveCoordinator,

    /// Theme catalog and active theme
    pub themes: ThemeManager,

    /// Typing statistics for the selected note
    pub stats: WritingStats,

    /// Transient user-visible messages, oldest first
    notifications: VecDeque<Notification>,
    notification_capacity: usize,

    /// Commands for the rich-text surface not yet picked up
    editor_commands: Vec<EditorCommand>,
}

impl AppState {
    pub fn new(config: &Config, themes: ThemeManager) -> Self {
        Self {
            user: None,
            notes: NoteCollection::new(),
            editor: EditorSession::new(),
            autosave: AutosaveCoordinator::new(config.autosave.delay(), config.autosave.enabled),
            themes,
            stats: WritingStats::new(),
            notifications: VecDeque::new(),
            notification_capacity: config.notifications.capacity.max(1),
            editor_commands: Vec::new(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.uid.as_str())
    }

    /// Select a note (or nothing) and load it into the editor. A pending
    /// debounce for the previous selection is dropped. If the note still has
    /// a write in flight, the buffer shows the values being written.
    pub fn select_note(&mut self, id: Option<&NoteId>) {
        let note = match id {
            Some(id) => self.notes.select(id),
            None => {
                self.notes.clear_selection();
                None
            }
        };
        self.editor.select_note(note);
        self.autosave.reset();
        if let Some(id) = self.editor.note_id().cloned() {
            if let Some(update) = self.autosave.resume(&id) {
                self.editor.load_unsaved(&update.title, &update.content);
            }
        }
        self.stats.reset();
        self.editor_commands
            .push(EditorCommand::SetContent(self.editor.content().to_string()));
    }

    /// Bring the editor in line with a selection cleared behind its back
    /// (delete, snapshot, sign-out)
    pub fn sync_cleared_selection(&mut self) {
        if self.notes.selected_id().is_none() && self.editor.note_id().is_some() {
            self.select_note(None);
        }
    }

    /// Queue a notification, dropping the oldest beyond capacity
    pub fn notify(&mut self, text: impl Into<String>, level: NotificationLevel) {
        let notification = Notification {
            text: text.into(),
            level,
            timestamp: Utc::now(),
        };
        match level {
            NotificationLevel::Error => log::error!("{}", notification.text),
            NotificationLevel::Warning => log::warn!("{}", notification.text),
            NotificationLevel::Info => log::info!("{}", notification.text),
        }
        self.notifications.push_back(notification);
        while self.notifications.len() > self.notification_capacity {
            self.notifications.pop_front();
        }
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }

    /// Dismiss all notifications
    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    pub fn push_command(&mut self, command: EditorCommand) {
        self.editor_commands.push(command);
    }

    /// Hand pending commands to the rich-text surface
    pub fn drain_commands(&mut self) -> Vec<EditorCommand> {
        std::mem::take(&mut self.editor_commands)
    }

    /// Forget everything tied to the signed-in user
    pub fn reset_session(&mut self) {
        self.user = None;
        self.notes.clear();
        self.select_note(None);
    }
}

/// Transient, non-fatal message for the user
#[derive(Debug, Clone)]
pub struct Notification {
    /// Message text
    pub text: String,

    /// Message level (info, warning, error)
    pub level: NotificationLevel,

    /// When the message was raised
    pub timestamp: DateTime<Utc>,
}

/// Notification level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}
