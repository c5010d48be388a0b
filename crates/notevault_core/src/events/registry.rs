//! Channel registry and subscriptions.
//!
//! # Invariants
//! - A channel exists only while it may have subscribers: it is created on
//!   first subscribe and dropped on last unsubscribe, or on the first publish
//!   that finds no receivers.
//! - Delivery is at-most-once per subscriber; lagging receivers skip ahead.

use super::types::{ChangeEvent, Channel};
use crate::model::note::ActorId;
use log::warn;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Default per-channel buffer before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Publish failure. Callers log and drop these; they never fail a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Nobody is subscribed to the channel.
    NoActiveChannel(String),
    /// The registry backend could not accept the event.
    Unavailable(String),
}

impl Display for PublishError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveChannel(channel) => write!(f, "no active channel `{channel}`"),
            Self::Unavailable(message) => write!(f, "channel registry unavailable: {message}"),
        }
    }
}

impl Error for PublishError {}

/// Delivery seam between the router and live subscribers.
pub trait ChannelRegistry: Send + Sync {
    /// Publishes one event and returns how many subscribers received it.
    fn publish(&self, channel: &Channel, event: ChangeEvent) -> Result<usize, PublishError>;
}

impl<T> ChannelRegistry for Arc<T>
where
    T: ChannelRegistry + ?Sized,
{
    fn publish(&self, channel: &Channel, event: ChangeEvent) -> Result<usize, PublishError> {
        (**self).publish(channel, event)
    }
}

/// In-process registry backed by one `tokio::sync::broadcast` per channel.
pub struct BroadcastRegistry {
    capacity: usize,
    channels: Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl BroadcastRegistry {
    /// Creates an empty registry. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribes to one channel, creating it when absent.
    pub fn subscribe(&self, channel: &Channel) -> Subscription {
        let mut channels = self.channels();
        let sender = channels
            .entry(channel.id())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Subscription {
            channel: channel.clone(),
            receiver: sender.subscribe(),
        }
    }

    /// Subscribes a connected actor to the global channel and its own channel.
    pub fn connect(&self, actor: &ActorId) -> SessionFeed {
        SessionFeed {
            actor: actor.clone(),
            user: self.subscribe(&Channel::User(actor.clone())),
            global: self.subscribe(&Channel::Global),
        }
    }

    /// Releases one subscription and tears the channel down when it was the last.
    pub fn unsubscribe(&self, subscription: Subscription) {
        let key = subscription.channel.id();
        let mut channels = self.channels();
        drop(subscription);
        if channels
            .get(&key)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&key);
        }
    }

    /// Releases both subscriptions of a session.
    pub fn disconnect(&self, feed: SessionFeed) {
        self.unsubscribe(feed.user);
        self.unsubscribe(feed.global);
    }

    /// Number of live subscribers on one channel.
    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        self.channels()
            .get(&channel.id())
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Sorted ids of channels currently held by the registry.
    pub fn channel_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.channels().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<ChangeEvent>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BroadcastRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ChannelRegistry for BroadcastRegistry {
    fn publish(&self, channel: &Channel, event: ChangeEvent) -> Result<usize, PublishError> {
        let key = channel.id();
        let mut channels = self.channels();
        let Some(sender) = channels.get(&key) else {
            return Err(PublishError::NoActiveChannel(key));
        };

        match sender.send(event) {
            Ok(delivered) => Ok(delivered),
            Err(_) => {
                channels.remove(&key);
                Err(PublishError::NoActiveChannel(key))
            }
        }
    }
}

/// One live receiver on one channel.
pub struct Subscription {
    channel: Channel,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Returns the next buffered event without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => self.log_lag(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the next event. Returns `None` once the channel is gone.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => self.log_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn log_lag(&self, skipped: u64) {
        warn!(
            "event=subscriber_lagged module=events status=degraded channel={} skipped={skipped}",
            self.channel
        );
    }
}

/// Everything one connected actor receives: global plus its private channel.
pub struct SessionFeed {
    actor: ActorId,
    user: Subscription,
    global: Subscription,
}

impl SessionFeed {
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Returns the next buffered event, private channel first.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        self.user.try_next().or_else(|| self.global.try_next())
    }

    /// Drains every buffered event.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}
