//! Access policy for note reads and writes.
//!
//! # Invariants
//! - Owners can always read and write their own notes.
//! - Public visibility grants read, never write.
//! - These predicates are pure; they never touch storage.

use crate::model::note::{ActorId, Note, NoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Permission requested against one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Returns whether `actor` may read `note`.
pub fn can_read(actor: &ActorId, note: &Note) -> bool {
    note.is_owned_by(actor) || note.visibility.is_public()
}

/// Returns whether `actor` may mutate or delete `note`.
pub fn can_write(actor: &ActorId, note: &Note) -> bool {
    note.is_owned_by(actor)
}

/// Evaluates the predicate matching `access`.
pub fn authorize(actor: &ActorId, note: &Note, access: Access) -> Result<(), AccessDenied> {
    let allowed = match access {
        Access::Read => can_read(actor, note),
        Access::Write => can_write(actor, note),
    };
    if allowed {
        Ok(())
    } else {
        Err(AccessDenied {
            actor: actor.clone(),
            note_id: note.id,
            access,
        })
    }
}

/// An existing note refused the requested access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub actor: ActorId,
    pub note_id: NoteId,
    pub access: Access,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "actor `{}` is not authorized to {} note {}",
            self.actor,
            self.access.as_str(),
            self.note_id
        )
    }
}

impl Error for AccessDenied {}
