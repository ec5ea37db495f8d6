//! In-process implementations of every collaborator
//!
//! Used by the demo binary and the test suite. Notes are kept per process,
//! snapshots are pushed to subscribers after every mutation, and failures
//! and latency can be injected per operation.

use super::{
    AuthProvider, LocalStorage, NoteStore, NoteSubscription, ObjectStorage, ThemeStore, User,
};
use crate::error::{AuthError, StorageResult, StoreError, StoreResult};
use crate::state::{NewNote, Note, NoteId, NoteUpdate};
use crate::theme::Theme;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

/// Operations that can be made to fail or slowed down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Subscribe,
    Fetch,
    Insert,
    Update,
    Delete,
    FetchThemes,
    InsertTheme,
    Upload,
}

/// A write the backend received, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Insert(NewNote),
    Update { id: NoteId, update: NoteUpdate },
    Delete(NoteId),
    InsertTheme(Theme),
    Upload { path: String, size: usize },
}

#[derive(Default)]
struct Inner {
    notes: Vec<Note>,
    themes: Vec<Theme>,
    blobs: HashMap<String, (Vec<u8>, String)>,
    subscribers: Vec<(String, mpsc::UnboundedSender<Vec<Note>>)>,
    failures: HashMap<Operation, VecDeque<StoreError>>,
    latency: HashMap<Operation, Duration>,
    calls: Vec<StoreCall>,
}

impl Inner {
    fn snapshot(&self, user_id: &str) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        notes
    }

    fn broadcast(&mut self, user_id: &str) {
        let snapshot = self.snapshot(user_id);
        self.subscribers.retain(|(owner, tx)| {
            if owner != user_id {
                return !tx.is_closed();
            }
            tx.send(snapshot.clone()).is_ok()
        });
    }

    fn take_failure(&mut self, op: Operation) -> StoreResult<()> {
        match self.failures.get_mut(&op).and_then(|q| q.pop_front()) {
            Some(err) => {
                log::debug!("Injected failure for {:?}: {}", op, err);
                Err(err)
            }
            None => Ok(()),
        }
    }
}

/// Remote store, auth provider and object storage living in memory
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    account: Option<User>,
    current: RwLock<Option<User>>,
}

impl MemoryBackend {
    /// Backend whose sign-in flow yields `account`
    pub fn new(account: User) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            account: Some(account),
            current: RwLock::new(None),
        }
    }

    /// Backend whose sign-in flow is always cancelled
    pub fn without_account() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            account: None,
            current: RwLock::new(None),
        }
    }

    /// Demo account used by the binary and tests
    pub fn demo_user() -> User {
        User {
            uid: "demo-user".to_string(),
            display_name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
            photo_url: None,
        }
    }

    /// Make the next call of `op` fail with `err`. Calls queue up.
    pub async fn fail_next(&self, op: Operation, err: StoreError) {
        self.inner
            .lock()
            .await
            .failures
            .entry(op)
            .or_default()
            .push_back(err);
    }

    /// Delay every call of `op` by `latency`
    pub async fn set_latency(&self, op: Operation, latency: Duration) {
        self.inner.lock().await.latency.insert(op, latency);
    }

    /// Seed a note directly, bypassing failure injection
    pub async fn seed_note(&self, note: Note) {
        let mut inner = self.inner.lock().await;
        let owner = note.user_id.clone();
        inner.notes.push(note);
        inner.broadcast(&owner);
    }

    /// Seed a custom theme directly
    pub async fn seed_theme(&self, theme: Theme) {
        self.inner.lock().await.themes.push(theme);
    }

    /// All writes received so far
    pub async fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.clone()
    }

    /// Only the note updates received so far
    pub async fn updates(&self) -> Vec<(NoteId, NoteUpdate)> {
        self.inner
            .lock()
            .await
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::Update { id, update } => Some((id.clone(), update.clone())),
                _ => None,
            })
            .collect()
    }

    /// Current stored version of a note
    pub async fn note(&self, id: &NoteId) -> Option<Note> {
        self.inner
            .lock()
            .await
            .notes
            .iter()
            .find(|n| &n.id == id)
            .cloned()
    }

    /// Bytes stored under a path
    pub async fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.inner
            .lock()
            .await
            .blobs
            .get(path)
            .map(|(bytes, _)| bytes.clone())
    }

    async fn delay(&self, op: Operation) {
        let latency = self.inner.lock().await.latency.get(&op).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl NoteStore for MemoryBackend {
    async fn subscribe(&self, user_id: &str) -> StoreResult<NoteSubscription> {
        self.delay(Operation::Subscribe).await;
        let mut inner = self.inner.lock().await;
        inner.take_failure(Operation::Subscribe)?;

        let (tx, rx) = mpsc::unbounded_channel();
        // The first snapshot is delivered right away.
        let _ = tx.send(inner.snapshot(user_id));
        inner.subscribers.push((user_id.to_string(), tx));
        Ok(NoteSubscription::new(rx))
    }

    async fn fetch(&self, user_id: &str) -> StoreResult<Vec<Note>> {
        self.delay(Operation::Fetch).await;
        let mut inner = self.inner.lock().await;
        inner.take_failure(Operation::Fetch)?;
        Ok(inner.snapshot(user_id))
    }

    async fn insert(&self, note: NewNote) -> StoreResult<NoteId> {
        self.delay(Operation::Insert).await;
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Insert(note.clone()));
        inner.take_failure(Operation::Insert)?;

        let id = NoteId::new(Self::new_id());
        let owner = note.user_id.clone();
        inner.notes.push(Note::from_new(id.clone(), note));
        inner.broadcast(&owner);
        Ok(id)
    }

    async fn update(&self, id: &NoteId, update: NoteUpdate) -> StoreResult<()> {
        self.delay(Operation::Update).await;
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Update {
            id: id.clone(),
            update: update.clone(),
        });
        inner.take_failure(Operation::Update)?;

        let note = inner
            .notes
            .iter_mut()
            .find(|n| &n.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        note.apply(&update);
        let owner = note.user_id.clone();
        inner.broadcast(&owner);
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> StoreResult<()> {
        self.delay(Operation::Delete).await;
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Delete(id.clone()));
        inner.take_failure(Operation::Delete)?;

        let index = inner
            .notes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let note = inner.notes.remove(index);
        inner.broadcast(&note.user_id);
        Ok(())
    }
}

impl ThemeStore for MemoryBackend {
    async fn fetch_themes(&self) -> StoreResult<Vec<Theme>> {
        self.delay(Operation::FetchThemes).await;
        let mut inner = self.inner.lock().await;
        inner.take_failure(Operation::FetchThemes)?;
        Ok(inner.themes.clone())
    }

    async fn insert_theme(&self, theme: Theme) -> StoreResult<String> {
        self.delay(Operation::InsertTheme).await;
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::InsertTheme(theme.clone()));
        inner.take_failure(Operation::InsertTheme)?;

        let id = Self::new_id();
        inner.themes.push(Theme {
            id: Some(id.clone()),
            ..theme
        });
        Ok(id)
    }
}

impl AuthProvider for MemoryBackend {
    fn current_user(&self) -> Option<User> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn sign_in(&self) -> Result<User, AuthError> {
        let user = self.account.clone().ok_or(AuthError::Cancelled)?;
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

impl ObjectStorage for MemoryBackend {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<String> {
        self.delay(Operation::Upload).await;
        let mut inner = self.inner.lock().await;
        inner.calls.push(StoreCall::Upload {
            path: path.to_string(),
            size: bytes.len(),
        });
        inner.take_failure(Operation::Upload)?;

        inner
            .blobs
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(format!("memory://{}", path))
    }
}

/// `LocalStorage` kept in a map; lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .values
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.values
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotesConfig;

    fn backend() -> MemoryBackend {
        MemoryBackend::new(MemoryBackend::demo_user())
    }

    #[tokio::test]
    async fn test_insert_then_fetch() {
        let backend = backend();
        let id = backend
            .insert(NewNote::placeholder("demo-user", &NotesConfig::default()))
            .await
            .unwrap();
        let notes = backend.fetch("demo-user").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, id);
        assert!(backend.fetch("someone-else").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscription_receives_snapshots() {
        let backend = backend();
        let mut sub = backend.subscribe("demo-user").await.unwrap();
        assert!(sub.next_snapshot().await.unwrap().is_empty());

        let id = backend
            .insert(NewNote::placeholder("demo-user", &NotesConfig::default()))
            .await
            .unwrap();
        let snapshot = sub.next_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);

        backend.delete(&id).await.unwrap();
        assert!(sub.next_snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_newest_first() {
        let backend = backend();
        for (id, ts) in [("a", "2024-01-01T00:00:00.000Z"), ("b", "2024-02-01T00:00:00.000Z")] {
            let mut new = NewNote::placeholder("demo-user", &NotesConfig::default());
            new.updated_at = ts.to_string();
            backend.seed_note(Note::from_new(NoteId::from(id), new)).await;
        }
        let notes = backend.fetch("demo-user").await.unwrap();
        assert_eq!(notes[0].id, NoteId::from("b"));
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed() {
        let backend = backend();
        backend
            .fail_next(Operation::Fetch, StoreError::Network("down".to_string()))
            .await;
        assert!(backend.fetch("demo-user").await.is_err());
        assert!(backend.fetch("demo-user").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_note() {
        let backend = backend();
        let update = NoteUpdate {
            title: String::new(),
            content: String::new(),
            updated_at: String::new(),
        };
        assert!(matches!(
            backend.update(&NoteId::from("nope"), update).await,
            Err(StoreError::NotFound { .. })
        ));
        assert_eq!(backend.updates().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_and_out() {
        let backend = backend();
        assert!(backend.current_user().is_none());
        let user = backend.sign_in().await.unwrap();
        assert_eq!(backend.current_user(), Some(user));
        backend.sign_out().await.unwrap();
        assert!(backend.current_user().is_none());

        let nobody = MemoryBackend::without_account();
        assert_eq!(nobody.sign_in().await, Err(AuthError::Cancelled));
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }
}
