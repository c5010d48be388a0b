//! Domain model for visibility-scoped notes.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep input normalization next to the types it produces.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
