//! Main application module
//!
//! This is the central hub of the application. Every user action, timer
//! firing and async completion arrives as a `Message` and is routed to a
//! `handle_*` method. Remote work is spawned on the tokio runtime and
//! reports back through the application's message channel, so state is
//! only ever touched from `update`.

use crate::backend::{Backend, LocalStorage, User};
use crate::config::Config;
use crate::editor::{EditorCommand, SaveOutcome, SaveRequest};
use crate::error::{AuthError, StoreError, UploadError};
use crate::media::prepare_upload;
use crate::message::{
    AuthMessage, EditorMessage, InternalMessage, MediaMessage, Message, NoteMessage,
    ThemeMessage,
};
use crate::state::{AppState, Note, NoteId, NewNote, NotificationLevel, SaveStatus};
use crate::theme::ThemeManager;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Note-taking client core, generic over its remote collaborators
pub struct NotesApp<B: Backend> {
    /// Application state
    pub state: AppState,

    /// User configuration
    pub config: Config,

    backend: Arc<B>,
    storage: Arc<dyn LocalStorage>,

    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,

    /// Pending debounce timer
    timer: Option<JoinHandle<()>>,

    /// Live query for the signed-in user's notes
    subscription: Option<JoinHandle<()>>,

    /// Bumped on every sign-in and sign-out; results of older sessions
    /// are dropped
    session: u64,

    /// Whether the live query delivered anything this session
    snapshot_seen: bool,
}

impl<B: Backend> NotesApp<B> {
    /// Create the application. The active theme is read from durable
    /// storage right away; nothing remote happens until `start`.
    pub fn new(config: Config, backend: Arc<B>, storage: Arc<dyn LocalStorage>) -> Self {
        let themes = ThemeManager::load(storage.as_ref(), &config.theme.storage_key);
        let state = AppState::new(&config, themes);
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            state,
            config,
            backend,
            storage,
            sender,
            receiver,
            timer: None,
            subscription: None,
            session: 0,
            snapshot_seen: false,
        }
    }

    /// Kick off startup work: fetch custom themes and resume an existing
    /// sign-in. Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        log::info!("Starting with theme {:?}", self.state.themes.active().name);
        self.fetch_themes();
        if let Some(user) = self.backend.current_user() {
            self.start_session(user);
        }
    }

    /// Sender for messages from the outside (editor surface, UI)
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.sender.clone()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.state.autosave.status()
    }

    /// Hand pending commands to the rich-text surface
    pub fn drain_editor_commands(&mut self) -> Vec<EditorCommand> {
        self.state.drain_commands()
    }

    /// Process messages for `duration` of (tokio) time
    pub async fn run_for(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            let message = tokio::select! {
                biased;
                message = self.receiver.recv() => message,
                _ = tokio::time::sleep_until(deadline) => None,
            };
            match message {
                Some(message) => self.update(message),
                None => break,
            }
        }
    }

    /// Handle incoming messages
    pub fn update(&mut self, message: impl Into<Message>) {
        match message.into() {
            Message::Auth(msg) => self.handle_auth_message(msg),
            Message::Note(msg) => self.handle_note_message(msg),
            Message::Editor(msg) => self.handle_editor_message(msg),
            Message::Theme(msg) => self.handle_theme_message(msg),
            Message::Media(msg) => self.handle_media_message(msg),
            Message::Internal(msg) => self.handle_internal_message(msg),
            Message::None => {}
        }
    }

    /// Run `future` on the runtime and feed its mapped output back as a message
    fn perform<F, T>(
        &self,
        future: F,
        map: impl FnOnce(T) -> Message + Send + 'static,
    ) where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            let output = future.await;
            let _ = sender.send(map(output));
        });
    }

    fn handle_auth_message(&mut self, msg: AuthMessage) {
        match msg {
            AuthMessage::SignIn => {
                let backend = Arc::clone(&self.backend);
                self.perform(async move { backend.sign_in().await }, |result| {
                    InternalMessage::SignedIn(result).into()
                });
            }

            AuthMessage::SignOut => {
                self.end_session();
                let backend = Arc::clone(&self.backend);
                self.perform(async move { backend.sign_out().await }, |result| {
                    InternalMessage::SignedOut(result).into()
                });
            }
        }
    }

    fn start_session(&mut self, user: User) {
        self.end_session();
        log::info!("Signed in as {}", user.uid);

        let session = self.session;
        let uid = user.uid.clone();
        self.state.user = Some(user);

        let backend = Arc::clone(&self.backend);
        let fetch_uid = uid.clone();
        self.perform(async move { backend.fetch(&fetch_uid).await }, move |result| {
            InternalMessage::NotesFetched { session, result }.into()
        });

        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();
        self.subscription = Some(tokio::spawn(async move {
            let mut subscription = match backend.subscribe(&uid).await {
                Ok(subscription) => subscription,
                Err(error) => {
                    let ended = InternalMessage::SubscriptionEnded { session, error };
                    let _ = sender.send(ended.into());
                    return;
                }
            };
            loop {
                match subscription.next_snapshot().await {
                    Ok(notes) => {
                        if sender
                            .send(InternalMessage::Snapshot { session, notes }.into())
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(error) => {
                        let _ = sender
                            .send(InternalMessage::SubscriptionEnded { session, error }.into());
                        break;
                    }
                }
            }
        }));
    }

    /// Stop everything tied to the current user
    fn end_session(&mut self) {
        self.session += 1;
        self.snapshot_seen = false;
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
        self.cancel_timer();
        if self.state.is_signed_in() {
            self.state.reset_session();
        }
    }

    fn handle_note_message(&mut self, msg: NoteMessage) {
        let Some(uid) = self.state.user_id().map(str::to_string) else {
            log::debug!("Ignoring {:?}: not signed in", msg);
            return;
        };

        match msg {
            NoteMessage::Create => {
                let new = NewNote::placeholder(&uid, &self.config.notes);
                let backend = Arc::clone(&self.backend);
                let session = self.session;
                self.perform(
                    async move {
                        let id = backend.insert(new.clone()).await?;
                        Ok::<_, StoreError>(Note::from_new(id, new))
                    },
                    move |result| InternalMessage::NoteCreated { session, result }.into(),
                );
            }

            NoteMessage::Select(id) => {
                if self.state.notes.is_selected(&id) {
                    return;
                }
                if !self.state.notes.contains(&id) {
                    log::warn!("Cannot select unknown note {}", id);
                    return;
                }
                self.cancel_timer();
                self.state.select_note(Some(&id));
            }

            NoteMessage::Deselect => {
                self.cancel_timer();
                self.state.select_note(None);
            }

            NoteMessage::Delete(id) => {
                let Some((index, note)) = self.state.notes.remove(&id) else {
                    log::warn!("Cannot delete unknown note {}", id);
                    return;
                };
                if self.state.editor.note_id() == Some(&id) {
                    self.cancel_timer();
                    self.state.sync_cleared_selection();
                }

                let backend = Arc::clone(&self.backend);
                let session = self.session;
                self.perform(async move { backend.delete(&id).await }, move |result| {
                    InternalMessage::NoteDeleted {
                        session,
                        index,
                        note,
                        result,
                    }
                    .into()
                });
            }
        }
    }

    fn handle_editor_message(&mut self, msg: EditorMessage) {
        match msg {
            EditorMessage::TitleChanged(title) => {
                self.state.editor.on_title_change(title);
                self.schedule_autosave();
            }

            EditorMessage::ContentChanged(content) => {
                self.state.stats.record(&content, Instant::now());
                self.state.editor.on_content_change(content);
                self.schedule_autosave();
            }

            EditorMessage::SaveNow => {
                self.cancel_timer();
                let signed_in = self.state.is_signed_in();
                if let Some(request) = self.state.autosave.flush(&self.state.editor, signed_in) {
                    self.spawn_save(request);
                }
            }

            EditorMessage::StatsTick => {
                let saving = self.state.autosave.is_saving();
                self.state.stats.tick(Instant::now(), saving);
            }

            EditorMessage::DismissNotifications => self.state.clear_notifications(),
        }
    }

    /// Restart the debounce timer
    fn schedule_autosave(&mut self) {
        let Some(arm) = self.state.autosave.on_edit() else {
            return;
        };
        self.cancel_timer();
        let sender = self.sender.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(arm.delay).await;
            let _ = sender.send(InternalMessage::AutosaveTimer(arm.seq).into());
        }));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn spawn_save(&self, request: SaveRequest) {
        let backend = Arc::clone(&self.backend);
        let note_id = request.note_id.clone();
        let update = request.update.clone();
        self.perform(
            async move { backend.update(&note_id, update).await },
            move |result| InternalMessage::SaveFinished { request, result }.into(),
        );
    }

    fn handle_theme_message(&mut self, msg: ThemeMessage) {
        match msg {
            ThemeMessage::Select(name) => {
                if let Err(e) = self.state.themes.select(&name, self.storage.as_ref()) {
                    self.state.notify(e.user_message(), NotificationLevel::Error);
                }
            }

            ThemeMessage::AddCustom(draft) => {
                let theme = match draft.validate() {
                    Ok(theme) => theme,
                    Err(e) => {
                        self.state.notify(e.to_string(), NotificationLevel::Warning);
                        return;
                    }
                };
                if self.state.themes.catalog().contains(&theme.name) {
                    self.state.notify(
                        format!("A theme named {} already exists", theme.name),
                        NotificationLevel::Warning,
                    );
                    return;
                }

                let backend = Arc::clone(&self.backend);
                let payload = theme.clone();
                self.perform(
                    async move { backend.insert_theme(payload).await },
                    move |result| InternalMessage::ThemeAdded { theme, result }.into(),
                );
            }

            ThemeMessage::Refresh => self.fetch_themes(),
        }
    }

    fn fetch_themes(&self) {
        let backend = Arc::clone(&self.backend);
        self.perform(async move { backend.fetch_themes().await }, |result| {
            InternalMessage::ThemesLoaded(result).into()
        });
    }

    fn handle_media_message(&mut self, msg: MediaMessage) {
        match msg {
            MediaMessage::Upload(upload) => {
                let (Some(uid), Some(note_id)) = (
                    self.state.user_id().map(str::to_string),
                    self.state.editor.note_id().cloned(),
                ) else {
                    self.state
                        .notify(UploadError::NoTarget.user_message(), NotificationLevel::Warning);
                    return;
                };

                let prepared = match prepare_upload(upload, &uid, &self.config.uploads) {
                    Ok(prepared) => prepared,
                    Err(e) => {
                        self.state.notify(e.user_message(), NotificationLevel::Warning);
                        return;
                    }
                };

                let backend = Arc::clone(&self.backend);
                let epoch = self.state.autosave.epoch();
                self.perform(
                    async move {
                        backend
                            .put(&prepared.path, prepared.bytes, prepared.format.mime_type())
                            .await
                    },
                    move |result| {
                        InternalMessage::UploadFinished {
                            note_id,
                            epoch,
                            result,
                        }
                        .into()
                    },
                );
            }
        }
    }

    fn handle_internal_message(&mut self, msg: InternalMessage) {
        match msg {
            InternalMessage::SignedIn(Ok(user)) => self.start_session(user),

            InternalMessage::SignedIn(Err(AuthError::Cancelled)) => {
                self.state
                    .notify(AuthError::Cancelled.to_string(), NotificationLevel::Info);
            }

            InternalMessage::SignedIn(Err(e)) => {
                self.state.notify(e.to_string(), NotificationLevel::Error);
            }

            InternalMessage::SignedOut(result) => match result {
                Ok(()) => log::info!("Signed out"),
                Err(e) => self.state.notify(e.to_string(), NotificationLevel::Error),
            },

            InternalMessage::NotesFetched { session, result } => {
                if session != self.session {
                    return;
                }
                match result {
                    // A snapshot is always at least as fresh as the fetch.
                    Ok(_) if self.snapshot_seen => {}
                    Ok(notes) => {
                        log::debug!("Fetched {} note(s)", notes.len());
                        self.apply_snapshot(notes);
                    }
                    Err(e) => self.state.notify(
                        format!("Could not load notes: {}", e.user_message()),
                        NotificationLevel::Error,
                    ),
                }
            }

            InternalMessage::Snapshot { session, notes } => {
                if session != self.session {
                    return;
                }
                self.snapshot_seen = true;
                self.apply_snapshot(notes);
            }

            InternalMessage::SubscriptionEnded { session, error } => {
                if session != self.session {
                    return;
                }
                self.subscription = None;
                self.state.notify(
                    format!("Live updates stopped: {}", error.user_message()),
                    NotificationLevel::Warning,
                );
            }

            InternalMessage::AutosaveTimer(seq) => {
                let signed_in = self.state.is_signed_in();
                let request = self.state.autosave.on_timer(seq, &self.state.editor, signed_in);
                if let Some(request) = request {
                    self.spawn_save(request);
                }
            }

            InternalMessage::SaveFinished { request, result } => {
                let signed_in = self.state.is_signed_in();
                let (outcome, next) = self.state.autosave.on_write_finished(
                    &request,
                    result,
                    &mut self.state.editor,
                    &mut self.state.notes,
                    signed_in,
                );
                match outcome {
                    SaveOutcome::Saved | SaveOutcome::StaleSaved => {
                        log::debug!("Saved note {}", request.note_id);
                    }
                    SaveOutcome::Failed(e) => self.state.notify(
                        format!("Error saving note: {}", e.user_message()),
                        NotificationLevel::Error,
                    ),
                    SaveOutcome::StaleFailed(e) => self.state.notify(
                        format!("Could not save your previous note: {}", e.user_message()),
                        NotificationLevel::Error,
                    ),
                }
                if let Some(next) = next {
                    self.spawn_save(next);
                }
            }

            InternalMessage::NoteCreated { session, result } => {
                if session != self.session {
                    return;
                }
                match result {
                    Ok(note) => {
                        log::info!("Created note {}", note.id);
                        self.state.notes.append(note);
                    }
                    Err(e) => self.state.notify(
                        format!("Could not create note: {}", e.user_message()),
                        NotificationLevel::Error,
                    ),
                }
            }

            InternalMessage::NoteDeleted {
                session,
                index,
                note,
                result,
            } => {
                if session != self.session {
                    return;
                }
                match result {
                    Ok(()) => log::info!("Deleted note {}", note.id),
                    Err(e) => {
                        let title = note.display_title();
                        self.state.notes.restore(index, note);
                        self.state.notify(
                            format!("Could not delete \"{}\": {}", title, e.user_message()),
                            NotificationLevel::Error,
                        );
                    }
                }
            }

            InternalMessage::ThemesLoaded(result) => match result {
                Ok(themes) => {
                    self.state.themes.merge_custom(themes);
                }
                Err(e) => self.state.notify(
                    format!("Could not load custom themes: {}", e.user_message()),
                    NotificationLevel::Warning,
                ),
            },

            InternalMessage::ThemeAdded { mut theme, result } => match result {
                Ok(id) => {
                    theme.id = Some(id);
                    let name = theme.name.clone();
                    match self.state.themes.add_custom(theme) {
                        Ok(()) => log::info!("Added custom theme {:?}", name),
                        Err(e) => self.state.notify(e.to_string(), NotificationLevel::Warning),
                    }
                }
                Err(e) => self.state.notify(
                    format!("Could not add theme: {}", e.user_message()),
                    NotificationLevel::Error,
                ),
            },

            InternalMessage::UploadFinished {
                note_id,
                epoch,
                result,
            } => match result {
                Ok(url) => {
                    let still_open = epoch == self.state.autosave.epoch()
                        && self.state.editor.note_id() == Some(&note_id);
                    if still_open {
                        self.state.push_command(EditorCommand::InsertImage { url });
                    } else {
                        self.state.notify(
                            "Image uploaded, but its note is no longer open",
                            NotificationLevel::Info,
                        );
                    }
                }
                Err(e) => self.state.notify(
                    UploadError::Storage(e.to_string()).user_message(),
                    NotificationLevel::Error,
                ),
            },
        }
    }

    fn apply_snapshot(&mut self, notes: Vec<Note>) {
        let outcome = self.state.notes.replace_all(notes);
        if outcome.selection_cleared {
            self.cancel_timer();
            self.state.sync_cleared_selection();
            self.state.notify(
                "The note you were editing was removed",
                NotificationLevel::Warning,
            );
        }
    }

    /// Id of the selected note, if any
    pub fn selected_note(&self) -> Option<&NoteId> {
        self.state.notes.selected_id()
    }
}

impl<B: Backend> Drop for NotesApp<B> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
        self.cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, MemoryStorage, NoteStore, Operation, StoreCall};
    use crate::media::{image::png_bytes, ImageUpload};
    use crate::theme::{HslColor, Theme, ThemeDraft};

    type TestApp = NotesApp<MemoryBackend>;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn new_app(
        config: Config,
        backend: &Arc<MemoryBackend>,
        storage: &Arc<MemoryStorage>,
    ) -> TestApp {
        let storage: Arc<dyn LocalStorage> = storage.clone();
        let mut app = NotesApp::new(config, Arc::clone(backend), storage);
        app.start();
        app
    }

    async fn signed_in_with(config: Config) -> (TestApp, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new(MemoryBackend::demo_user()));
        let storage = Arc::new(MemoryStorage::new());
        let mut app = new_app(config, &backend, &storage);
        app.update(AuthMessage::SignIn);
        app.run_for(ms(10)).await;
        assert!(app.state.is_signed_in());
        (app, backend)
    }

    async fn signed_in() -> (TestApp, Arc<MemoryBackend>) {
        signed_in_with(Config::default()).await
    }

    /// Create a note and return its id
    async fn create_note(app: &mut TestApp) -> NoteId {
        let before: Vec<NoteId> = app.state.notes.iter().map(|n| n.id.clone()).collect();
        app.update(NoteMessage::Create);
        app.run_for(ms(10)).await;
        app.state
            .notes
            .iter()
            .map(|n| n.id.clone())
            .find(|id| !before.contains(id))
            .expect("note was created")
    }

    async fn created_and_selected(app: &mut TestApp) -> NoteId {
        let id = create_note(app).await;
        app.update(NoteMessage::Select(id.clone()));
        app.drain_editor_commands();
        id
    }

    fn type_content(app: &mut TestApp, content: &str) {
        app.update(EditorMessage::ContentChanged(content.to_string()));
    }

    fn update_count(calls: &[StoreCall]) -> usize {
        calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Update { .. }))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_then_type_saves_final_value_once() {
        let (mut app, backend) = signed_in().await;
        let id = create_note(&mut app).await;

        let note = app.state.notes.get(&id).unwrap().clone();
        assert_eq!(note.title, "Untitled Note");
        assert_eq!(note.content, "");
        assert_eq!(note.status, "pending");

        app.update(NoteMessage::Select(id.clone()));
        type_content(&mut app, "Hello");
        app.run_for(ms(400)).await;
        type_content(&mut app, "Hello world");
        app.run_for(ms(2000)).await;

        let updates = backend.updates().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, id);
        assert_eq!(updates[0].1.content, "Hello world");
        assert_eq!(updates[0].1.title, "Untitled Note");
        assert_eq!(app.save_status(), SaveStatus::Saved);
        assert_eq!(app.state.notes.get(&id).unwrap().content, "Hello world");
        assert_eq!(backend.note(&id).await.unwrap().content, "Hello world");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_buffer_writes_nothing() {
        let (mut app, backend) = signed_in().await;
        created_and_selected(&mut app).await;

        type_content(&mut app, "draft");
        type_content(&mut app, "");
        app.run_for(ms(2000)).await;

        assert!(backend.updates().await.is_empty());
        assert_eq!(app.save_status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_then_next_keystroke_retries_once() {
        let (mut app, backend) = signed_in().await;
        created_and_selected(&mut app).await;
        backend
            .fail_next(Operation::Update, StoreError::Network("offline".into()))
            .await;

        type_content(&mut app, "Hello");
        type_content(&mut app, "Hello world");
        app.run_for(ms(1500)).await;

        assert_eq!(app.save_status(), SaveStatus::Error);
        assert_eq!(app.state.editor.content(), "Hello world");
        assert_eq!(
            app.state.latest_notification().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
        assert_eq!(update_count(&backend.calls().await), 1);

        // No automatic retry, and no way back to saved without an edit.
        app.run_for(ms(5000)).await;
        assert_eq!(update_count(&backend.calls().await), 1);
        assert_eq!(app.save_status(), SaveStatus::Error);

        type_content(&mut app, "Hello world!");
        app.run_for(ms(500)).await;
        assert_eq!(app.save_status(), SaveStatus::Error);
        app.run_for(ms(1000)).await;

        assert_eq!(update_count(&backend.calls().await), 2);
        assert_eq!(app.save_status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_retries_without_waiting() {
        let (mut app, backend) = signed_in().await;
        created_and_selected(&mut app).await;
        backend
            .fail_next(Operation::Update, StoreError::Network("offline".into()))
            .await;

        type_content(&mut app, "text");
        app.run_for(ms(1100)).await;
        assert_eq!(app.save_status(), SaveStatus::Error);

        app.update(EditorMessage::SaveNow);
        app.run_for(ms(10)).await;
        assert_eq!(app.save_status(), SaveStatus::Saved);
        assert_eq!(backend.updates().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saving_status_while_write_in_flight() {
        let (mut app, backend) = signed_in().await;
        created_and_selected(&mut app).await;
        backend.set_latency(Operation::Update, ms(500)).await;

        type_content(&mut app, "slow");
        app.run_for(ms(1100)).await;
        assert_eq!(app.save_status(), SaveStatus::Saving);
        app.run_for(ms(500)).await;
        assert_eq!(app.save_status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_saves_are_serialized() {
        let (mut app, backend) = signed_in().await;
        let id = created_and_selected(&mut app).await;
        backend.set_latency(Operation::Update, ms(3000)).await;

        type_content(&mut app, "one");
        app.run_for(ms(1100)).await;
        assert!(app.state.autosave.is_saving());

        type_content(&mut app, "one two");
        app.run_for(ms(1500)).await;
        // The second timer fired while the first write was in flight.
        assert_eq!(app.state.autosave.writes_issued(), 1);

        app.run_for(ms(10_000)).await;
        let contents: Vec<String> = backend
            .updates()
            .await
            .into_iter()
            .map(|(_, u)| u.content)
            .collect();
        assert_eq!(contents, vec!["one", "one two"]);
        assert_eq!(app.save_status(), SaveStatus::Saved);
        assert_eq!(backend.note(&id).await.unwrap().content, "one two");
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_notes_never_writes_across() {
        let (mut app, backend) = signed_in().await;
        let a = create_note(&mut app).await;
        let b = create_note(&mut app).await;
        backend.set_latency(Operation::Update, ms(500)).await;

        app.update(NoteMessage::Select(a.clone()));
        type_content(&mut app, "note A text");
        app.run_for(ms(1100)).await;
        assert_eq!(app.save_status(), SaveStatus::Saving);

        app.update(NoteMessage::Select(b.clone()));
        app.run_for(ms(2000)).await;

        assert_eq!(app.state.editor.note_id(), Some(&b));
        assert_eq!(app.state.editor.content(), "");
        assert_eq!(app.state.editor.saved_content(), "");
        assert_eq!(app.save_status(), SaveStatus::Saved);

        let updates = backend.updates().await;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, a);
        assert_eq!(backend.note(&b).await.unwrap().content, "");
        assert_eq!(app.state.notes.get(&a).unwrap().content, "note A text");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselecting_during_write_keeps_order() {
        let (mut app, backend) = signed_in().await;
        let a = create_note(&mut app).await;
        let b = create_note(&mut app).await;
        backend.set_latency(Operation::Update, ms(3000)).await;

        app.update(NoteMessage::Select(a.clone()));
        type_content(&mut app, "first draft");
        app.run_for(ms(1100)).await;
        assert!(app.state.autosave.is_saving());

        app.update(NoteMessage::Select(b.clone()));
        app.update(NoteMessage::Select(a.clone()));
        assert_eq!(app.state.editor.content(), "first draft");
        assert_eq!(app.save_status(), SaveStatus::Saving);
        assert_eq!(
            app.drain_editor_commands().last(),
            Some(&EditorCommand::SetContent("first draft".to_string()))
        );

        type_content(&mut app, "first draft more");
        app.run_for(ms(1100)).await;
        // The new firing waits for the write still in flight.
        assert_eq!(app.state.autosave.writes_issued(), 1);
        assert!(backend.updates().await.is_empty());

        app.run_for(ms(10_000)).await;
        let updates = backend.updates().await;
        assert!(updates.iter().all(|(id, _)| id == &a));
        let contents: Vec<&str> = updates.iter().map(|(_, u)| u.content.as_str()).collect();
        assert_eq!(contents, vec!["first draft", "first draft more"]);
        assert_eq!(backend.note(&a).await.unwrap().content, "first draft more");
        assert_eq!(app.state.editor.saved_content(), "first draft more");
        assert_eq!(app.save_status(), SaveStatus::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_cancels_pending_debounce() {
        let (mut app, backend) = signed_in().await;
        let a = create_note(&mut app).await;
        let b = create_note(&mut app).await;

        app.update(NoteMessage::Select(a));
        type_content(&mut app, "unsaved");
        app.run_for(ms(300)).await;
        app.update(NoteMessage::Select(b));
        app.run_for(ms(3000)).await;

        assert!(backend.updates().await.is_empty());
        assert_eq!(
            app.drain_editor_commands().last(),
            Some(&EditorCommand::SetContent(String::new()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_selected_clears_selection() {
        let (mut app, backend) = signed_in().await;
        let a = create_note(&mut app).await;
        let b = create_note(&mut app).await;

        app.update(NoteMessage::Select(a.clone()));
        type_content(&mut app, "pending edit");
        app.update(NoteMessage::Delete(a.clone()));
        assert!(app.selected_note().is_none());
        assert!(app.state.editor.note_id().is_none());

        app.run_for(ms(2000)).await;
        assert!(backend.note(&a).await.is_none());
        assert!(backend.updates().await.is_empty());
        assert!(app.state.notes.contains(&b));
        assert!(!app.state.notes.contains(&a));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_other_keeps_selection() {
        let (mut app, _backend) = signed_in().await;
        let a = create_note(&mut app).await;
        let b = create_note(&mut app).await;

        app.update(NoteMessage::Select(a.clone()));
        app.update(NoteMessage::Delete(b));
        app.run_for(ms(10)).await;

        assert_eq!(app.selected_note(), Some(&a));
        assert_eq!(app.state.editor.note_id(), Some(&a));
        assert_eq!(app.state.notes.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_restores_note() {
        let (mut app, backend) = signed_in().await;
        let a = create_note(&mut app).await;
        let b = create_note(&mut app).await;
        let order: Vec<NoteId> = app.state.notes.iter().map(|n| n.id.clone()).collect();

        backend
            .fail_next(
                Operation::Delete,
                StoreError::PermissionDenied { id: a.to_string() },
            )
            .await;
        app.update(NoteMessage::Delete(a.clone()));
        assert!(!app.state.notes.contains(&a));

        app.run_for(ms(10)).await;
        let restored: Vec<NoteId> = app.state.notes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(restored, order);
        assert!(app.state.notes.contains(&b));
        assert!(backend.note(&a).await.is_some());
        assert_eq!(
            app.state.latest_notification().map(|n| n.level),
            Some(NotificationLevel::Error)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_create_appends_nothing() {
        let (mut app, backend) = signed_in().await;
        backend
            .fail_next(Operation::Insert, StoreError::Rejected("quota".into()))
            .await;

        app.update(NoteMessage::Create);
        app.run_for(ms(10)).await;

        assert!(app.state.notes.is_empty());
        let notification = app.state.latest_notification().unwrap();
        assert!(notification.text.contains("Could not create note"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_removal_clears_selection() {
        let (mut app, backend) = signed_in().await;
        let id = created_and_selected(&mut app).await;
        type_content(&mut app, "edit");

        backend.delete(&id).await.unwrap();
        app.run_for(ms(3000)).await;

        assert!(app.selected_note().is_none());
        assert!(app.state.editor.note_id().is_none());
        assert!(backend.updates().await.is_empty());
        assert_eq!(
            app.state.latest_notification().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_seed_list_on_sign_in() {
        let backend = Arc::new(MemoryBackend::new(MemoryBackend::demo_user()));
        let storage = Arc::new(MemoryStorage::new());
        let mut seeded = Note::from_new(
            NoteId::from("seed"),
            NewNote::placeholder("demo-user", &Config::default().notes),
        );
        seeded.title = "Groceries".to_string();
        backend.seed_note(seeded).await;

        let mut app = new_app(Config::default(), &backend, &storage);
        assert!(app.state.notes.is_empty());
        app.update(AuthMessage::SignIn);
        app.run_for(ms(10)).await;

        assert_eq!(app.state.notes.len(), 1);
        assert_eq!(
            app.state.notes.get(&NoteId::from("seed")).unwrap().display_title(),
            "Groceries"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_drops_user_data() {
        let (mut app, backend) = signed_in().await;
        created_and_selected(&mut app).await;
        type_content(&mut app, "unsaved");

        app.update(AuthMessage::SignOut);
        app.run_for(ms(3000)).await;

        assert!(!app.state.is_signed_in());
        assert!(app.state.notes.is_empty());
        assert!(app.state.editor.note_id().is_none());
        assert!(backend.updates().await.is_empty());

        let calls_before = backend.calls().await.len();
        app.update(NoteMessage::Create);
        app.run_for(ms(10)).await;
        assert_eq!(backend.calls().await.len(), calls_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_sign_in() {
        let backend = Arc::new(MemoryBackend::without_account());
        let storage = Arc::new(MemoryStorage::new());
        let mut app = new_app(Config::default(), &backend, &storage);

        app.update(AuthMessage::SignIn);
        app.run_for(ms(10)).await;

        assert!(!app.state.is_signed_in());
        assert_eq!(
            app.state.latest_notification().map(|n| n.level),
            Some(NotificationLevel::Info)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_selection_survives_restart() {
        let backend = Arc::new(MemoryBackend::new(MemoryBackend::demo_user()));
        let storage = Arc::new(MemoryStorage::new());

        let mut app = new_app(Config::default(), &backend, &storage);
        app.update(ThemeMessage::Select("Sepia".to_string()));
        let chosen = app.state.themes.active().clone();
        assert_eq!(chosen.name, "Sepia");
        drop(app);

        let reloaded = new_app(Config::default(), &backend, &storage);
        assert_eq!(reloaded.state.themes.active(), &chosen);
        assert_eq!(
            reloaded.state.themes.variables().get("--theme-primary"),
            Some(chosen.primary.css().as_str())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_themes_merge_without_changing_active() {
        let backend = Arc::new(MemoryBackend::new(MemoryBackend::demo_user()));
        let storage = Arc::new(MemoryStorage::new());
        let color = HslColor::new(200.0, 50.0, 50.0);
        backend
            .seed_theme(Theme {
                id: Some("t1".to_string()),
                name: "Ocean".to_string(),
                primary: color,
                secondary: color,
                background: color,
                text: color,
                accent: color,
            })
            .await;

        let mut app = new_app(Config::default(), &backend, &storage);
        app.run_for(ms(10)).await;

        assert!(app.state.themes.catalog().contains("Ocean"));
        assert_eq!(app.state.themes.active().name, "Modern Light");
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_custom_theme() {
        let (mut app, backend) = signed_in().await;

        let mut draft = ThemeDraft {
            name: "Forest".to_string(),
            primary: "120 40% 30%".to_string(),
            secondary: "120 20% 60%".to_string(),
            background: "120 10% 95%".to_string(),
            text: "120 30% 10%".to_string(),
            accent: String::new(),
        };
        app.update(ThemeMessage::AddCustom(draft.clone()));
        app.run_for(ms(10)).await;
        assert!(!app.state.themes.catalog().contains("Forest"));
        assert!(backend.calls().await.is_empty());

        draft.accent = "40 90% 50%".to_string();
        app.update(ThemeMessage::AddCustom(draft));
        app.run_for(ms(10)).await;

        let added = app.state.themes.catalog().get("Forest").unwrap();
        assert!(added.id.is_some());
        assert_eq!(backend.calls().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_inserts_image() {
        let (mut app, backend) = signed_in().await;
        created_and_selected(&mut app).await;

        app.update(MediaMessage::Upload(ImageUpload {
            file_name: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: png_bytes(128),
        }));
        app.run_for(ms(10)).await;

        let commands = app.drain_editor_commands();
        let Some(EditorCommand::InsertImage { url }) = commands.last() else {
            panic!("expected an image insert, got {:?}", commands);
        };
        let path = url.trim_start_matches("memory://");
        assert!(path.starts_with("images/demo-user/"));
        assert_eq!(backend.blob(path).await.map(|b| b.len()), Some(128));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_uploads_never_reach_storage() {
        let mut config = Config::default();
        config.uploads.max_bytes = 100;
        let (mut app, backend) = signed_in_with(config).await;
        created_and_selected(&mut app).await;

        app.update(MediaMessage::Upload(ImageUpload {
            file_name: "doc.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.7".to_vec(),
        }));
        app.update(MediaMessage::Upload(ImageUpload {
            file_name: "big.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: png_bytes(101),
        }));
        app.run_for(ms(10)).await;

        let uploads = backend
            .calls()
            .await
            .into_iter()
            .filter(|c| matches!(c, StoreCall::Upload { .. }))
            .count();
        assert_eq!(uploads, 0);
        assert_eq!(app.state.notifications().count(), 2);
        assert!(app.drain_editor_commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_without_selection() {
        let (mut app, backend) = signed_in().await;
        app.update(MediaMessage::Upload(ImageUpload {
            file_name: "cat.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: png_bytes(16),
        }));
        app.run_for(ms(10)).await;

        assert!(backend.calls().await.is_empty());
        assert_eq!(
            app.state.latest_notification().map(|n| n.text.as_str()),
            Some("No note selected")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_word_count_follows_content() {
        let (mut app, _backend) = signed_in().await;
        created_and_selected(&mut app).await;
        type_content(&mut app, "<p>one two three</p>");
        app.update(EditorMessage::StatsTick);
        assert_eq!(app.state.stats.word_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_words_per_minute_follows_clock() {
        let (mut app, _backend) = signed_in().await;
        created_and_selected(&mut app).await;
        type_content(&mut app, "<p>one two three four five six</p>");

        app.run_for(Duration::from_secs(30)).await;
        assert!(!app.state.autosave.is_saving());
        app.update(EditorMessage::StatsTick);
        assert_eq!(app.state.stats.word_count(), 6);
        assert_eq!(app.state.stats.wpm(), 12);
    }
}
