//! Note store contracts and persistence implementations.
//!
//! # Responsibility
//! - Define the keyed, text-searchable store the rest of core builds on.
//! - Isolate SQLite query details from policy and orchestration.
//!
//! # Invariants
//! - Write paths validate fields before any SQL mutation.
//! - The store is the only component that assigns timestamps.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::note::{ActorId, Note, NoteFields, NoteId, NoteInput, NoteValidationError};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for note persistence and queries.
#[derive(Debug)]
pub enum StoreError {
    Validation(NoteValidationError),
    NotFound(NoteId),
    /// The underlying database could not serve the request.
    Db(DbError),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Owner-scoped search options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSearch {
    /// Full-text query over title and content. Blank text applies no filter.
    pub text: Option<String>,
    /// Exact category filter. `None` or `"All"` applies no filter.
    pub category: Option<String>,
}

impl NoteSearch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Keyed note storage with owner listing and full-text search.
pub trait NoteStore {
    /// Creates one note owned by `owner`, applying field defaults.
    fn create(&self, owner: &ActorId, input: &NoteInput) -> StoreResult<Note>;
    /// Point lookup by id.
    fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Replaces all mutable fields and refreshes `updated_at`.
    fn update(&self, id: NoteId, fields: &NoteFields) -> StoreResult<Note>;
    /// Removes one note and returns its last snapshot.
    fn delete(&self, id: NoteId) -> StoreResult<Note>;
    /// Lists the owner's notes, newest update first.
    fn list_by_owner(&self, owner: &ActorId) -> StoreResult<Vec<Note>>;
    /// Lists every public note in a stable order.
    fn list_public(&self) -> StoreResult<Vec<Note>>;
    /// Searches the owner's own notes only, newest update first.
    fn search(&self, owner: &ActorId, query: &NoteSearch) -> StoreResult<Vec<Note>>;
    /// Returns categories used by the owner's own notes.
    fn distinct_categories(&self, owner: &ActorId) -> StoreResult<BTreeSet<String>>;
}
