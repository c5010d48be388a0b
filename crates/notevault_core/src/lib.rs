//! Core domain logic for NoteVault.
//! This crate is the single source of truth for note visibility, access and
//! change propagation rules.

pub mod config;
pub mod db;
pub mod events;
pub mod logging;
pub mod model;
pub mod policy;
pub mod query;
pub mod search;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use events::{
    BroadcastRegistry, ChangeEvent, ChangeKind, Channel, ChannelRegistry, Delivery, EventRouter,
    PublishError, SessionFeed, Subscription,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{
    ActorId, Note, NoteFields, NoteId, NoteInput, NotePatch, NoteValidationError, Visibility,
    CATEGORY_ALL, DEFAULT_CATEGORY,
};
pub use policy::{authorize, can_read, can_write, Access, AccessDenied};
pub use query::{list_visible_in_category, list_visible_to};
pub use service::note_service::{NoteService, NoteServiceError, NoteServiceResult};
pub use store::{NoteSearch, NoteStore, SqliteNoteStore, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
