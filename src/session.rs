//! The mediator between UI intents and a [`NoteStore`] for the currently
//! signed-in identity.
//!
//! The controller never patches its cached notes in memory: after every
//! write it reloads the collection from the store and publishes that, so the
//! published snapshot is always something the store actually returned.

mod errors;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, trace, warn};
use tokio::sync::watch;

use crate::data::{Note, NoteId};
use crate::identity_string::IdentityString;
use crate::storage::NoteStore;

pub use errors::SessionError;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DisplayMode {
    #[default]
    List,
    Map,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::List => DisplayMode::Map,
            DisplayMode::Map => DisplayMode::List,
        }
    }
}

/// The cached notes together with the identity they were loaded for.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NotesSnapshot {
    pub identity: Option<IdentityString>,
    pub notes: Arc<Vec<Note>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutationOutcome {
    /// Written and the refreshed collection is published.
    Applied,
    /// Nothing was written, no identity is selected.
    NoActiveIdentity,
    /// Written, but another identity got selected meanwhile, so the
    /// refreshed collection was not published.
    Superseded,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionOperation {
    Select,
    Upsert,
    Remove,
}

#[derive(Clone, Debug)]
pub struct SessionFailure {
    pub identity: IdentityString,
    pub operation: SessionOperation,
    pub error: SessionError,
}

pub struct NoteSessionController<S: NoteStore> {
    store: Arc<S>,
    state: Mutex<SessionState>,
    notes: watch::Sender<NotesSnapshot>,
    display_mode: watch::Sender<DisplayMode>,
    failures: watch::Sender<Option<SessionFailure>>,
}

// results loaded for an identity other than the active one are never
// published
// tickets: issued when a load starts, a load never overwrites the result of
// a load started after it
#[derive(Default)]
struct SessionState {
    active_identity: Option<IdentityString>,
    next_ticket: u64,
    published_ticket: u64,
}

enum Publication {
    Published,
    Outdated,
    Superseded,
}

impl<S: NoteStore> NoteSessionController<S> {
    pub fn new(store: Arc<S>) -> Self {
        NoteSessionController {
            store,
            state: Mutex::new(SessionState::default()),
            notes: watch::Sender::new(NotesSnapshot::default()),
            display_mode: watch::Sender::new(DisplayMode::default()),
            failures: watch::Sender::new(None),
        }
    }

    pub fn active_identity(&self) -> Option<IdentityString> {
        self.lock_state().active_identity.clone()
    }

    pub fn notes(&self) -> NotesSnapshot {
        self.notes.borrow().clone()
    }

    pub fn subscribe_notes(&self) -> watch::Receiver<NotesSnapshot> {
        self.notes.subscribe()
    }

    pub fn display_mode(&self) -> DisplayMode {
        *self.display_mode.borrow()
    }

    pub fn subscribe_display_mode(&self) -> watch::Receiver<DisplayMode> {
        self.display_mode.subscribe()
    }

    /// The latest failure, reset by the next successful publication.
    pub fn subscribe_failures(&self) -> watch::Receiver<Option<SessionFailure>> {
        self.failures.subscribe()
    }

    /// Makes `identity` active and publishes its notes once loaded. If
    /// another identity gets selected before the load finishes, the result
    /// is dropped. Selecting the active identity again only reloads.
    pub async fn select_identity(
        &self,
        identity: IdentityString,
    ) -> Result<(), SessionError> {
        debug!("selecting identity \"{identity}\"");
        self.lock_state().active_identity = Some(identity.clone());
        self.refresh(&identity, SessionOperation::Select).await?;
        Ok(())
    }

    /// Drops the active identity and publishes an empty snapshot.
    pub fn clear_identity(&self) {
        let mut state = self.lock_state();
        debug!("clearing identity {:?}", state.active_identity);
        state.active_identity = None;
        state.published_ticket = state.next_ticket;
        self.notes.send_replace(NotesSnapshot::default());
        self.failures.send_replace(None);
    }

    pub async fn create_or_update(
        &self,
        note: Note,
    ) -> Result<MutationOutcome, SessionError> {
        let Some(identity) = self.active_identity() else {
            debug!("no active identity, ignoring upsert of note {}", note.id);
            return Ok(MutationOutcome::NoActiveIdentity);
        };
        debug!("upserting note {} for \"{identity}\"", note.id);
        if let Err(e) = self.store.upsert(&identity, note).await {
            return Err(self.report_failure(&identity, SessionOperation::Upsert, e.into()));
        }
        self.refresh(&identity, SessionOperation::Upsert).await
    }

    pub async fn remove(
        &self,
        note_id: &NoteId,
    ) -> Result<MutationOutcome, SessionError> {
        let Some(identity) = self.active_identity() else {
            debug!("no active identity, ignoring removal of note {note_id}");
            return Ok(MutationOutcome::NoActiveIdentity);
        };
        debug!("removing note {note_id} for \"{identity}\"");
        if let Err(e) = self.store.delete(&identity, note_id).await {
            return Err(self.report_failure(&identity, SessionOperation::Remove, e.into()));
        }
        self.refresh(&identity, SessionOperation::Remove).await
    }

    /// Looks the note up in the store rather than in the cached snapshot.
    pub async fn find_by_id(
        &self,
        note_id: &NoteId,
    ) -> Result<Option<Note>, SessionError> {
        let Some(identity) = self.active_identity() else {
            return Ok(None);
        };
        Ok(
            self.store
                .load(&identity)
                .await?
                .into_iter()
                .find(|note| note.id == *note_id)
        )
    }

    pub fn set_display_mode(&self, mode: DisplayMode) {
        trace!("display mode set to {mode:?}");
        self.display_mode.send_replace(mode);
    }

    pub fn toggle_display_mode(&self) {
        self.display_mode.send_modify(|mode| *mode = mode.toggled());
        trace!("display mode toggled to {:?}", *self.display_mode.borrow());
    }

    async fn refresh(
        &self,
        identity: &IdentityString,
        operation: SessionOperation,
    ) -> Result<MutationOutcome, SessionError> {
        let ticket = {
            let mut state = self.lock_state();
            state.next_ticket += 1;
            state.next_ticket
        };
        let notes = match self.store.load(identity).await {
            Ok(notes) => notes,
            Err(e) => return Err(self.report_failure(identity, operation, e.into())),
        };
        Ok(
            match self.publish(identity, ticket, notes) {
                Publication::Published | Publication::Outdated =>
                    MutationOutcome::Applied,
                Publication::Superseded => MutationOutcome::Superseded,
            }
        )
    }

    fn publish(
        &self,
        identity: &IdentityString,
        ticket: u64,
        notes: Vec<Note>,
    ) -> Publication {
        let mut state = self.lock_state();
        if state.active_identity.as_ref() != Some(identity) {
            warn!("discarding notes loaded for \"{identity}\", identity changed meanwhile");
            return Publication::Superseded;
        }
        if ticket <= state.published_ticket {
            debug!("discarding notes loaded for \"{identity}\", a newer load is published");
            return Publication::Outdated;
        }
        state.published_ticket = ticket;
        trace!("publishing {} notes for \"{identity}\"", notes.len());
        self.notes.send_replace(NotesSnapshot {
            identity: Some(identity.clone()),
            notes: Arc::new(notes),
        });
        self.failures.send_if_modified(|failure| failure.take().is_some());
        Publication::Published
    }

    // the cached snapshot is left as it is
    fn report_failure(
        &self,
        identity: &IdentityString,
        operation: SessionOperation,
        error: SessionError,
    ) -> SessionError {
        error!("{operation:?} failed for \"{identity}\": {error}");
        let state = self.lock_state();
        if state.active_identity.as_ref() == Some(identity) {
            self.failures.send_replace(Some(SessionFailure {
                identity: identity.clone(),
                operation,
                error: error.clone(),
            }));
        }
        error
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
