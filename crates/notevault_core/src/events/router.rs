//! Routes note changes to their channel.

use super::registry::{ChannelRegistry, PublishError};
use super::types::{ChangeEvent, ChangeKind, Channel};
use crate::model::note::Note;
use log::{debug, warn};

/// Outcome of one routed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: Channel,
    /// Subscribers that received the event; zero when publishing failed.
    pub delivered: usize,
}

/// Builds change events and publishes them through a [`ChannelRegistry`].
///
/// Public notes go to [`Channel::Global`]; private notes go only to the
/// owner's channel. A note switched from public to private is routed to the
/// private channel only; earlier global subscribers get no retraction.
pub struct EventRouter<R: ChannelRegistry> {
    registry: R,
}

impl<R: ChannelRegistry> EventRouter<R> {
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Publishes `note` as a `kind` change. Publish failures are logged and dropped.
    pub fn route(&self, kind: ChangeKind, note: &Note) -> Delivery {
        let event = ChangeEvent::new(kind, note.clone());
        let channel = event.channel();

        let delivered = match self.registry.publish(&channel, event) {
            Ok(delivered) => {
                debug!(
                    "event=note_change_published module=events status=ok kind={} channel={} note_id={} subscribers={delivered}",
                    kind.as_str(),
                    channel,
                    note.id
                );
                delivered
            }
            Err(PublishError::NoActiveChannel(_)) => {
                debug!(
                    "event=note_change_published module=events status=skipped kind={} channel={} note_id={} reason=no_active_channel",
                    kind.as_str(),
                    channel,
                    note.id
                );
                0
            }
            Err(err) => {
                warn!(
                    "event=note_change_published module=events status=error kind={} channel={} note_id={} error={err}",
                    kind.as_str(),
                    channel,
                    note.id
                );
                0
            }
        };

        Delivery { channel, delivered }
    }
}

#[cfg(test)]
mod tests {
    use super::EventRouter;
    use crate::events::{ChangeEvent, ChangeKind, Channel, ChannelRegistry, PublishError};
    use crate::model::note::{ActorId, Note, Visibility};
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingRegistry {
        published: Mutex<Vec<(String, ChangeEvent)>>,
    }

    impl ChannelRegistry for RecordingRegistry {
        fn publish(&self, channel: &Channel, event: ChangeEvent) -> Result<usize, PublishError> {
            self.published
                .lock()
                .expect("lock should not be poisoned")
                .push((channel.id(), event));
            Ok(1)
        }
    }

    struct FailingRegistry;

    impl ChannelRegistry for FailingRegistry {
        fn publish(&self, _channel: &Channel, _event: ChangeEvent) -> Result<usize, PublishError> {
            Err(PublishError::Unavailable("socket gateway down".to_string()))
        }
    }

    fn note(visibility: Visibility) -> Note {
        Note {
            id: Uuid::new_v4(),
            owner: ActorId::new("alice").expect("valid actor"),
            title: "t".to_string(),
            content: String::new(),
            category: "General".to_string(),
            visibility,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn public_note_routes_to_global_only() {
        let router = EventRouter::new(RecordingRegistry::default());
        router.route(ChangeKind::Created, &note(Visibility::Public));

        let published = router.registry().published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "global");
        assert_eq!(published[0].1.kind, ChangeKind::Created);
    }

    #[test]
    fn private_note_routes_to_owner_channel_only() {
        let router = EventRouter::new(RecordingRegistry::default());
        router.route(ChangeKind::Updated, &note(Visibility::Private));

        let published = router.registry().published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "user:alice");
    }

    #[test]
    fn publish_failures_are_swallowed() {
        let router = EventRouter::new(FailingRegistry);
        let delivery = router.route(ChangeKind::Deleted, &note(Visibility::Public));
        assert_eq!(delivery.channel, Channel::Global);
        assert_eq!(delivery.delivered, 0);
    }
}
