//! Editor integration
//!
//! The rich-text surface itself lives outside this crate. It reports title
//! and content changes as messages and receives `EditorCommand`s back.
//! - `autosave`: debounced, serialized saving of the buffered note

pub mod autosave;

pub use autosave::{AutosaveCoordinator, SaveOutcome, SaveRequest, TimerArm};

/// Instruction for the external rich-text surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    /// Replace the whole document with serialized content
    SetContent(String),

    /// Insert an image at the cursor
    InsertImage { url: String },
}
