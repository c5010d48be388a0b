//! Change event and channel types.

use crate::model::note::{ActorId, Note, Visibility};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Id of the channel every connected subscriber listens on.
pub const GLOBAL_CHANNEL_ID: &str = "global";

const USER_CHANNEL_PREFIX: &str = "user:";

/// Mutation that produced a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// Ephemeral notification carrying the note snapshot at event time.
///
/// Serialized as `{"kind": "...", "note": {...}}`. For `Deleted` the snapshot
/// is the pre-deletion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub note: Note,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, note: Note) -> Self {
        Self { kind, note }
    }

    /// Visibility the note had when the event was produced.
    pub fn visibility(&self) -> Visibility {
        self.note.visibility
    }

    /// Channel this event must be delivered on.
    pub fn channel(&self) -> Channel {
        Channel::for_note(&self.note)
    }
}

/// Logical real-time delivery route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Received by every connected subscriber.
    Global,
    /// Received only by subscribers authenticated as this actor.
    User(ActorId),
}

impl Channel {
    /// Picks the channel from the note's current visibility.
    pub fn for_note(note: &Note) -> Self {
        match note.visibility {
            Visibility::Public => Self::Global,
            Visibility::Private => Self::User(note.owner.clone()),
        }
    }

    /// Registry key: `global` or `user:<actor>`.
    pub fn id(&self) -> String {
        match self {
            Self::Global => GLOBAL_CHANNEL_ID.to_string(),
            Self::User(actor) => format!("{USER_CHANNEL_PREFIX}{actor}"),
        }
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}
