//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and the actor identity it is scoped to.
//! - Own field normalization and validation for create/update inputs.
//!
//! # Invariants
//! - `id` and `owner` are assigned once and never change.
//! - `title` is non-empty after trimming.
//! - `category` is never blank and never the reserved [`CATEGORY_ALL`] value.
//! - `updated_at >= created_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one note.
pub type NoteId = Uuid;

/// Category assigned when the caller omits one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Reserved facet value meaning "no category filter". Never persisted.
pub const CATEGORY_ALL: &str = "All";

/// Authenticated identity supplied by the calling layer.
///
/// Core only compares actors against `Note::owner`; it never stores or
/// authenticates them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    /// Builds an actor id, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, NoteValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(NoteValidationError::BlankActor);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActorId {
    type Error = NoteValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActorId> for String {
    fn from(value: ActorId) -> Self {
        value.0
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cross-actor readability flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Readable by the owner only.
    #[default]
    Private,
    /// Readable by every actor. Never grants write access.
    Public,
}

impl Visibility {
    /// Stable storage/wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    /// Parses the storage/wire value. Only the two exact lowercase values are accepted.
    pub fn parse(value: &str) -> Result<Self, NoteValidationError> {
        match value {
            "private" => Ok(Self::Private),
            "public" => Ok(Self::Public),
            other => Err(NoteValidationError::InvalidVisibility(other.to_string())),
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub owner: ActorId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub visibility: Visibility,
    /// Unix epoch milliseconds, assigned by the store.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed by the store on every mutation.
    pub updated_at: i64,
}

impl Note {
    pub fn is_owned_by(&self, actor: &ActorId) -> bool {
        &self.owner == actor
    }

    /// Returns the mutable field set currently held by this note.
    pub fn fields(&self) -> NoteFields {
        NoteFields {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            visibility: self.visibility,
        }
    }
}

/// Create-time input. Omitted fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl NoteInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Applies defaults and normalization, then validates.
    pub fn resolve(&self) -> Result<NoteFields, NoteValidationError> {
        NoteFields {
            title: self.title.clone(),
            content: self.content.clone().unwrap_or_default(),
            category: self
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            visibility: self.visibility.unwrap_or_default(),
        }
        .normalized()
    }
}

/// Fully resolved mutable field set.
///
/// This is the only shape accepted by store updates, so callers must merge
/// partial input (see [`NotePatch`]) before writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub category: String,
    pub visibility: Visibility,
}

impl NoteFields {
    /// Trims text fields, defaults a blank category, then validates.
    pub fn normalized(self) -> Result<Self, NoteValidationError> {
        let category = self.category.trim();
        let fields = Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            category: if category.is_empty() {
                DEFAULT_CATEGORY.to_string()
            } else {
                category.to_string()
            },
            visibility: self.visibility,
        };
        fields.validate()?;
        Ok(fields)
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        if self.category.trim().is_empty() {
            return Err(NoteValidationError::BlankCategory);
        }
        if self.category == CATEGORY_ALL {
            return Err(NoteValidationError::ReservedCategory(self.category.clone()));
        }
        Ok(())
    }
}

/// Partial update input with explicit "unset" per field.
///
/// `None` keeps the current value; `Some(v)` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
}

impl NotePatch {
    /// Builds a patch that sets every field to the given values.
    pub fn replace_all(fields: NoteFields) -> Self {
        Self {
            title: Some(fields.title),
            content: Some(fields.content),
            category: Some(fields.category),
            visibility: Some(fields.visibility),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Merges this patch onto the current note state.
    pub fn merge_onto(&self, current: &Note) -> Result<NoteFields, NoteValidationError> {
        let base = current.fields();
        NoteFields {
            title: self.title.clone().unwrap_or(base.title),
            content: self.content.clone().unwrap_or(base.content),
            category: self.category.clone().unwrap_or(base.category),
            visibility: self.visibility.unwrap_or(base.visibility),
        }
        .normalized()
    }
}

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    BlankCategory,
    ReservedCategory(String),
    InvalidVisibility(String),
    BlankActor,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::BlankCategory => write!(f, "category must not be blank"),
            Self::ReservedCategory(value) => {
                write!(f, "category `{value}` is reserved for filtering")
            }
            Self::InvalidVisibility(value) => {
                write!(f, "visibility must be `private` or `public`, got `{value}`")
            }
            Self::BlankActor => write!(f, "actor id must not be blank"),
        }
    }
}

impl Error for NoteValidationError {}
