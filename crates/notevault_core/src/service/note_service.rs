//! Note use-case service.
//!
//! # Responsibility
//! - Gate every single-note operation through the access policy.
//! - Run the store operation and publish the resulting change event.
//! - Map store failures onto a caller-facing error taxonomy.
//!
//! # Invariants
//! - A mutation is authorized against the stored note before it is written.
//! - Event publication happens after a successful write and never turns a
//!   successful mutation into an error.
//! - `Unauthorized` and `NotFound` stay distinguishable; masking one as the
//!   other is the caller's choice via [`NoteServiceError::mask_unauthorized`].

use crate::db::DbError;
use crate::events::{ChangeKind, ChannelRegistry, EventRouter};
use crate::model::note::{ActorId, Note, NoteId, NoteInput, NotePatch, NoteValidationError};
use crate::policy::{authorize, Access, AccessDenied};
use crate::query::{list_visible_in_category, list_visible_to};
use crate::store::{NoteSearch, NoteStore, StoreError};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Input failed field validation.
    Validation(NoteValidationError),
    /// No note exists for the id.
    NotFound(NoteId),
    /// The note exists but the actor lacks the required permission.
    Unauthorized(AccessDenied),
    /// Storage failed; see [`NoteServiceError::is_retryable`].
    StoreUnavailable(DbError),
    /// Persisted state violates note invariants.
    InvalidData(String),
}

impl NoteServiceError {
    /// Rewrites `Unauthorized` as `NotFound` for callers that hide existence.
    pub fn mask_unauthorized(self) -> Self {
        match self {
            Self::Unauthorized(denied) => Self::NotFound(denied.note_id),
            other => other,
        }
    }

    /// True only for transient storage contention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(err) if err.is_retryable())
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Unauthorized(denied) => write!(f, "{denied}"),
            Self::StoreUnavailable(err) => write!(f, "note store unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "{message}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Unauthorized(denied) => Some(denied),
            Self::StoreUnavailable(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(err) => Self::Validation(err),
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Db(err) => Self::StoreUnavailable(err),
            StoreError::InvalidData(message) => Self::InvalidData(message),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<AccessDenied> for NoteServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Unauthorized(value)
    }
}

/// Note service facade over a store and a channel registry.
pub struct NoteService<S: NoteStore, R: ChannelRegistry> {
    store: S,
    router: EventRouter<R>,
}

impl<S: NoteStore, R: ChannelRegistry> NoteService<S, R> {
    pub fn new(store: S, registry: R) -> Self {
        Self {
            store,
            router: EventRouter::new(registry),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &R {
        self.router.registry()
    }

    /// Creates a note owned by `actor` and publishes `Created`.
    pub fn create_note(&self, actor: &ActorId, input: &NoteInput) -> NoteServiceResult<Note> {
        let note = self.store.create(actor, input)?;
        let delivery = self.router.route(ChangeKind::Created, &note);
        info!(
            "event=note_create module=service status=ok note_id={} visibility={} channel={} subscribers={}",
            note.id,
            note.visibility.as_str(),
            delivery.channel,
            delivery.delivered
        );
        Ok(note)
    }

    /// Reads one note. Fails `Unauthorized` when it exists but is not readable.
    pub fn get_note(&self, actor: &ActorId, id: NoteId) -> NoteServiceResult<Note> {
        let note = self.load_authorized(actor, id, Access::Read)?;
        Ok(note)
    }

    /// Applies `patch` to an owned note and publishes `Updated`.
    pub fn update_note(
        &self,
        actor: &ActorId,
        id: NoteId,
        patch: &NotePatch,
    ) -> NoteServiceResult<Note> {
        let current = self.load_authorized(actor, id, Access::Write)?;
        let fields = patch.merge_onto(&current)?;
        let note = self.store.update(id, &fields)?;
        let delivery = self.router.route(ChangeKind::Updated, &note);
        info!(
            "event=note_update module=service status=ok note_id={} visibility_before={} visibility={} channel={} subscribers={}",
            note.id,
            current.visibility.as_str(),
            note.visibility.as_str(),
            delivery.channel,
            delivery.delivered
        );
        Ok(note)
    }

    /// Deletes an owned note and publishes `Deleted` with its last snapshot.
    pub fn delete_note(&self, actor: &ActorId, id: NoteId) -> NoteServiceResult<Note> {
        self.load_authorized(actor, id, Access::Write)?;
        let snapshot = self.store.delete(id)?;
        let delivery = self.router.route(ChangeKind::Deleted, &snapshot);
        info!(
            "event=note_delete module=service status=ok note_id={} channel={} subscribers={}",
            snapshot.id, delivery.channel, delivery.delivered
        );
        Ok(snapshot)
    }

    /// Own notes followed by other actors' public notes.
    pub fn list_visible(&self, actor: &ActorId) -> NoteServiceResult<Vec<Note>> {
        Ok(list_visible_to(&self.store, actor)?)
    }

    /// Visible notes narrowed to one category; `"All"` disables the filter.
    pub fn list_visible_in_category(
        &self,
        actor: &ActorId,
        category: Option<&str>,
    ) -> NoteServiceResult<Vec<Note>> {
        Ok(list_visible_in_category(&self.store, actor, category)?)
    }

    /// Searches the actor's own notes by text and category.
    pub fn search_notes(
        &self,
        actor: &ActorId,
        query_text: Option<&str>,
        category: Option<&str>,
    ) -> NoteServiceResult<Vec<Note>> {
        let query = NoteSearch {
            text: query_text.map(str::to_string),
            category: category.map(str::to_string),
        };
        Ok(self.store.search(actor, &query)?)
    }

    /// Categories used by the actor's own notes.
    pub fn note_categories(&self, actor: &ActorId) -> NoteServiceResult<BTreeSet<String>> {
        Ok(self.store.distinct_categories(actor)?)
    }

    fn load_authorized(
        &self,
        actor: &ActorId,
        id: NoteId,
        access: Access,
    ) -> NoteServiceResult<Note> {
        let note = self
            .store
            .get_by_id(id)?
            .ok_or(NoteServiceError::NotFound(id))?;
        if let Err(denied) = authorize(actor, &note, access) {
            warn!(
                "event=note_access module=service status=denied note_id={id} access={}",
                access.as_str()
            );
            return Err(denied.into());
        }
        Ok(note)
    }
}
