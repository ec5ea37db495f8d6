//! Application message types
//!
//! Defines all messages that can be sent to the application's update function.
//! Messages are organized by category for clear handling and routing.

use crate::backend::User;
use crate::editor::SaveRequest;
use crate::error::{AuthError, StoreError, StoreResult};
use crate::media::ImageUpload;
use crate::state::{Note, NoteId};
use crate::theme::{Theme, ThemeDraft};

/// Main application message enum
#[derive(Debug, Clone)]
pub enum Message {
    /// Sign-in and sign-out
    Auth(AuthMessage),

    /// Note list operations
    Note(NoteMessage),

    /// Change notifications from the rich-text surface
    Editor(EditorMessage),

    /// Theme operations
    Theme(ThemeMessage),

    /// Image uploads
    Media(MediaMessage),

    /// Internal async operation results
    Internal(InternalMessage),

    /// No-op message
    None,
}

/// Authentication messages
#[derive(Debug, Clone)]
pub enum AuthMessage {
    /// Start the provider's sign-in flow
    SignIn,

    /// Sign out and drop all user data
    SignOut,
}

/// Note list messages
#[derive(Debug, Clone)]
pub enum NoteMessage {
    /// Create a placeholder note
    Create,

    /// Select a note for editing
    Select(NoteId),

    /// Clear the selection
    Deselect,

    /// Delete a note
    Delete(NoteId),
}

/// Editor messages
#[derive(Debug, Clone)]
pub enum EditorMessage {
    /// Title field changed
    TitleChanged(String),

    /// Document changed; carries the serialized content
    ContentChanged(String),

    /// Save immediately, bypassing the debounce
    SaveNow,

    /// Periodic tick for writing statistics
    StatsTick,

    /// Dismiss all notifications
    DismissNotifications,
}

/// Theme messages
#[derive(Debug, Clone)]
pub enum ThemeMessage {
    /// Activate a catalog theme by name
    Select(String),

    /// Validate and store a custom theme
    AddCustom(ThemeDraft),

    /// Re-fetch custom themes from the remote store
    Refresh,
}

/// Media messages
#[derive(Debug, Clone)]
pub enum MediaMessage {
    /// Upload an image into the selected note
    Upload(ImageUpload),
}

/// Internal messages for async operation results
#[derive(Debug, Clone)]
pub enum InternalMessage {
    /// Sign-in flow finished
    SignedIn(Result<User, AuthError>),

    /// Sign-out finished
    SignedOut(Result<(), AuthError>),

    /// One-shot note fetch finished
    NotesFetched {
        session: u64,
        result: StoreResult<Vec<Note>>,
    },

    /// Live query delivered a full snapshot
    Snapshot { session: u64, notes: Vec<Note> },

    /// Live query ended
    SubscriptionEnded { session: u64, error: StoreError },

    /// Debounce timer expired
    AutosaveTimer(u64),

    /// Autosave write settled
    SaveFinished {
        request: SaveRequest,
        result: StoreResult<()>,
    },

    /// Remote insert settled
    NoteCreated {
        session: u64,
        result: StoreResult<Note>,
    },

    /// Remote delete settled; carries what is needed for rollback
    NoteDeleted {
        session: u64,
        index: usize,
        note: Note,
        result: StoreResult<()>,
    },

    /// Custom theme fetch finished
    ThemesLoaded(StoreResult<Vec<Theme>>),

    /// Custom theme insert settled
    ThemeAdded {
        theme: Theme,
        result: StoreResult<String>,
    },

    /// Image upload settled
    UploadFinished {
        note_id: NoteId,
        epoch: u64,
        result: StoreResult<String>,
    },
}

impl From<AuthMessage> for Message {
    fn from(msg: AuthMessage) -> Self {
        Message::Auth(msg)
    }
}

impl From<NoteMessage> for Message {
    fn from(msg: NoteMessage) -> Self {
        Message::Note(msg)
    }
}

impl From<EditorMessage> for Message {
    fn from(msg: EditorMessage) -> Self {
        Message::Editor(msg)
    }
}

impl From<ThemeMessage> for Message {
    fn from(msg: ThemeMessage) -> Self {
        Message::Theme(msg)
    }
}

impl From<MediaMessage> for Message {
    fn from(msg: MediaMessage) -> Self {
        Message::Media(msg)
    }
}

impl From<InternalMessage> for Message {
    fn from(msg: InternalMessage) -> Self {
        Message::Internal(msg)
    }
}
