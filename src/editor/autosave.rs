//! Debounced autosave
//!
//! Pure state machine; the caller owns the actual timer and the remote write.
//! Every buffered change restarts the timer. When it fires, a write is issued
//! if a note is selected, a user is signed in and the buffer differs from
//! the last saved snapshot.
//!
//! Writes are serialized: while one is in flight a timer firing is queued and
//! re-evaluated when the write settles. This holds across selection changes,
//! so a write left over from a previous selection still blocks the next one.
//! Selecting another note bumps the epoch; completions belonging to an older
//! epoch never touch the session or the status. Selecting the note of the
//! write in flight again resumes it under the new epoch.

use crate::error::StoreError;
use crate::state::{EditorSession, NoteCollection, NoteId, NoteUpdate, SaveStatus};
use crate::utils::iso_now;
use std::time::Duration;

/// A write the caller should issue against the note store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub note_id: NoteId,
    pub update: NoteUpdate,
    /// Matches the completion to the write in flight
    pub write_id: u64,
    /// Session revision captured in the write
    pub revision: u64,
}

/// What the caller must do with the timer after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerArm {
    pub seq: u64,
    pub delay: Duration,
}

/// How a finished write was reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Snapshot and list updated, status `saved`
    Saved,
    /// Status `error`, buffer kept
    Failed(StoreError),
    /// Targeted a previous selection; only the list entry was patched
    StaleSaved,
    /// Targeted a previous selection and failed
    StaleFailed(StoreError),
}

/// The write awaiting completion
#[derive(Debug, Clone)]
struct InFlight {
    write_id: u64,
    note_id: NoteId,
    update: NoteUpdate,
    /// Selection epoch the completion is reconciled against
    epoch: u64,
}

#[derive(Debug, Clone)]
pub struct AutosaveCoordinator {
    delay: Duration,
    enabled: bool,
    status: SaveStatus,
    epoch: u64,
    timer_seq: u64,
    timer_armed: bool,
    in_flight: Option<InFlight>,
    queued: bool,
    writes_issued: u64,
}

impl AutosaveCoordinator {
    pub fn new(delay: Duration, enabled: bool) -> Self {
        Self {
            delay,
            enabled,
            status: SaveStatus::Saved,
            epoch: 0,
            timer_seq: 0,
            timer_armed: false,
            in_flight: None,
            queued: false,
            writes_issued: 0,
        }
    }

    /// A buffered change happened: restart the debounce timer.
    /// Returns `None` when autosave is disabled.
    pub fn on_edit(&mut self) -> Option<TimerArm> {
        if !self.enabled {
            return None;
        }
        self.timer_seq += 1;
        self.timer_armed = true;
        Some(TimerArm {
            seq: self.timer_seq,
            delay: self.delay,
        })
    }

    /// The timer tagged `seq` expired
    pub fn on_timer(
        &mut self,
        seq: u64,
        session: &EditorSession,
        signed_in: bool,
    ) -> Option<SaveRequest> {
        if !self.timer_armed || seq != self.timer_seq {
            log::trace!("Ignoring stale autosave timer {}", seq);
            return None;
        }
        self.timer_armed = false;
        self.try_begin(session, signed_in)
    }

    /// Save now, bypassing the debounce (explicit retry)
    pub fn flush(&mut self, session: &EditorSession, signed_in: bool) -> Option<SaveRequest> {
        self.timer_armed = false;
        self.timer_seq += 1;
        self.try_begin(session, signed_in)
    }

    fn try_begin(&mut self, session: &EditorSession, signed_in: bool) -> Option<SaveRequest> {
        if self.in_flight.is_some() {
            log::debug!("Write in flight, queueing autosave");
            self.queued = true;
            return None;
        }
        self.begin(session, signed_in)
    }

    fn begin(&mut self, session: &EditorSession, signed_in: bool) -> Option<SaveRequest> {
        if !signed_in {
            log::debug!("Skipping autosave: not signed in");
            return None;
        }
        let note_id = session.note_id()?.clone();
        if !session.needs_save() {
            return None;
        }

        self.writes_issued += 1;
        let request = SaveRequest {
            note_id: note_id.clone(),
            update: NoteUpdate {
                title: session.title().to_string(),
                content: session.content().to_string(),
                updated_at: iso_now(),
            },
            write_id: self.writes_issued,
            revision: session.revision(),
        };

        log::debug!(
            "Autosaving note {} at revision {}",
            note_id,
            request.revision
        );
        self.status = SaveStatus::Saving;
        self.in_flight = Some(InFlight {
            write_id: request.write_id,
            note_id,
            update: request.update.clone(),
            epoch: self.epoch,
        });
        Some(request)
    }

    /// Reconcile a finished write. Returns how it was applied and, if a
    /// timer firing was queued behind it, the next write to issue.
    pub fn on_write_finished(
        &mut self,
        request: &SaveRequest,
        result: Result<(), StoreError>,
        session: &mut EditorSession,
        notes: &mut NoteCollection,
        signed_in: bool,
    ) -> (SaveOutcome, Option<SaveRequest>) {
        let finished = match self.in_flight.take() {
            Some(flight) if flight.write_id == request.write_id => Some(flight),
            other => {
                log::warn!("Completion for untracked write {}", request.write_id);
                self.in_flight = other;
                None
            }
        };

        if !finished.as_ref().is_some_and(|f| f.epoch == self.epoch) {
            let outcome = match result {
                Ok(()) => {
                    notes.apply_saved(&request.note_id, &request.update);
                    SaveOutcome::StaleSaved
                }
                Err(e) => {
                    log::warn!("Earlier save of note {} failed: {}", request.note_id, e);
                    SaveOutcome::StaleFailed(e)
                }
            };
            let next = match finished {
                Some(_) => self.take_queued(session, signed_in),
                None => None,
            };
            return (outcome, next);
        }

        let outcome = match result {
            Ok(()) => {
                session.mark_saved(&request.update.title, &request.update.content);
                notes.apply_saved(&request.note_id, &request.update);
                self.status = SaveStatus::Saved;
                SaveOutcome::Saved
            }
            Err(e) => {
                log::error!("Error saving note {}: {}", request.note_id, e);
                self.status = SaveStatus::Error;
                SaveOutcome::Failed(e)
            }
        };

        let next = self.take_queued(session, signed_in);
        (outcome, next)
    }

    fn take_queued(&mut self, session: &EditorSession, signed_in: bool) -> Option<SaveRequest> {
        if !self.queued {
            return None;
        }
        self.queued = false;
        self.begin(session, signed_in)
    }

    /// Forget everything tied to the current selection. A write in flight
    /// is kept until its completion arrives.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.timer_seq += 1;
        self.timer_armed = false;
        self.queued = false;
        self.status = SaveStatus::Saved;
    }

    /// `note_id` was selected again. If a write for it is still in flight,
    /// reconcile that write against the current selection and return the
    /// values it carries.
    pub fn resume(&mut self, note_id: &NoteId) -> Option<&NoteUpdate> {
        let flight = self.in_flight.as_mut().filter(|f| &f.note_id == note_id)?;
        log::debug!("Resuming write {} for note {}", flight.write_id, note_id);
        flight.epoch = self.epoch;
        self.status = SaveStatus::Saving;
        Some(&flight.update)
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of writes issued since creation
    pub fn writes_issued(&self) -> u64 {
        self.writes_issued
    }
}
