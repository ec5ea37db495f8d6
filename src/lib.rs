//! Tinted Notes - note-taking client core
//!
//! Debounced autosave of a rich-text note over a remote document store,
//! a live note list, themes mirrored to style variables and durable
//! storage, and image uploads. Remote collaborators are traits in
//! `backend`; `backend::memory` implements all of them in-process.

pub mod app;
pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod media;
pub mod message;
pub mod state;
pub mod theme;
pub mod utils;

pub use app::NotesApp;
pub use error::{AppError, AppResult};
pub use message::Message;
