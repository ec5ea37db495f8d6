//! Collaborator interfaces
//!
//! Everything the application delegates to the outside world:
//! - `NoteStore`: remote document store for notes (live snapshots + point writes)
//! - `ThemeStore`: remote collection of custom themes
//! - `AuthProvider`: current user and sign-in/out
//! - `ObjectStorage`: binary blobs for embedded images
//! - `LocalStorage`: small synchronous key/value store that survives restarts
//!
//! `memory` provides in-process implementations of all of them and
//! `local_storage` a JSON-file-backed `LocalStorage`.

pub mod local_storage;
pub mod memory;

pub use local_storage::*;
pub use memory::*;

use crate::error::{AuthError, StorageResult, StoreError, StoreResult};
use crate::state::{NewNote, Note, NoteId, NoteUpdate};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::mpsc;

/// The signed-in user as reported by the auth provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

/// Live query over a user's notes. Each item is a complete snapshot ordered
/// by `updated_at`, newest first.
#[derive(Debug)]
pub struct NoteSubscription {
    receiver: mpsc::UnboundedReceiver<Vec<Note>>,
}

impl NoteSubscription {
    pub fn new(receiver: mpsc::UnboundedReceiver<Vec<Note>>) -> Self {
        Self { receiver }
    }

    /// Next snapshot, or `SubscriptionClosed` once the store drops the query
    pub async fn next_snapshot(&mut self) -> StoreResult<Vec<Note>> {
        self.receiver
            .recv()
            .await
            .ok_or(StoreError::SubscriptionClosed)
    }
}

/// Remote document store holding notes
pub trait NoteStore: Send + Sync + 'static {
    /// Live query filtered by owner, newest first
    fn subscribe(
        &self,
        user_id: &str,
    ) -> impl Future<Output = StoreResult<NoteSubscription>> + Send;

    /// One-shot query filtered by owner, newest first
    fn fetch(&self, user_id: &str) -> impl Future<Output = StoreResult<Vec<Note>>> + Send;

    /// Insert a note, returning the assigned id
    fn insert(&self, note: NewNote) -> impl Future<Output = StoreResult<NoteId>> + Send;

    /// Merge fields into an existing note
    fn update(
        &self,
        id: &NoteId,
        update: NoteUpdate,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Delete a note
    fn delete(&self, id: &NoteId) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Remote collection of custom themes
pub trait ThemeStore: Send + Sync + 'static {
    fn fetch_themes(&self) -> impl Future<Output = StoreResult<Vec<Theme>>> + Send;

    /// Insert a theme, returning the assigned id
    fn insert_theme(&self, theme: Theme) -> impl Future<Output = StoreResult<String>> + Send;
}

/// Authentication provider
pub trait AuthProvider: Send + Sync + 'static {
    fn current_user(&self) -> Option<User>;

    fn sign_in(&self) -> impl Future<Output = Result<User, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Blob storage for embedded images
pub trait ObjectStorage: Send + Sync + 'static {
    /// Store bytes under `path`, returning a retrievable URL
    fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = StoreResult<String>> + Send;
}

/// Durable key/value storage, read synchronously at startup
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Bundle of remote collaborators the application talks to
pub trait Backend: NoteStore + ThemeStore + AuthProvider + ObjectStorage {}

impl<T: NoteStore + ThemeStore + AuthProvider + ObjectStorage> Backend for T {}
