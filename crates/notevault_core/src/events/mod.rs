//! Real-time change propagation for note mutations.
//!
//! # Responsibility
//! - Describe note changes as typed, ephemeral events.
//! - Route each event to exactly one logical channel: the global broadcast
//!   channel for public notes, or the owner's private channel otherwise.
//! - Keep live subscriber sets in an explicit, injectable registry.
//!
//! # Invariants
//! - Private notes are never published on the global channel.
//! - Publishing is best-effort and never fails the triggering mutation.
//! - Events are not persisted or replayed.

mod registry;
mod router;
mod types;

pub use registry::{
    BroadcastRegistry, ChannelRegistry, PublishError, SessionFeed, Subscription,
    DEFAULT_CHANNEL_CAPACITY,
};
pub use router::{Delivery, EventRouter};
pub use types::{ChangeEvent, ChangeKind, Channel};
