//! State management module for Tinted Notes
//!
//! This module contains all application state types organized by concern:
//! - `app_state`: Root application state container
//! - `note`: Note documents and write payloads
//! - `notes_state`: The note list and the current selection
//! - `editor_state`: Buffered title/content and the saved snapshot

mod app_state;
mod editor_state;
mod note;
mod notes_state;

pub use app_state::*;
pub use editor_state::*;
pub use note::*;
pub use notes_state::*;
