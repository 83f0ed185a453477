use common::LifecycleEvent;
use tokio::sync::broadcast;

/// In-process publish/subscribe bus for hackathon lifecycle changes.
///
/// Cloning the bus clones the sender; every clone publishes into the same
/// channel. Subscribers that fall behind see `RecvError::Lagged` and can
/// simply resubscribe, which is acceptable here: events carry no payload
/// a consumer cannot re-derive from the database.
#[derive(Clone)]
pub struct LifecycleBus {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl LifecycleBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Callers must only publish after the mutation's transaction has
    /// committed, so observers never refresh against uncommitted state.
    pub fn publish(&self, event: LifecycleEvent) {
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(receivers, "Published lifecycle event");
            }
            Err(_) => {
                // No subscribers; nothing to notify.
                tracing::trace!("Lifecycle event dropped: no subscribers");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }
}

impl Default for LifecycleBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::HackathonStatus;

    fn status_changed(id: i32) -> LifecycleEvent {
        LifecycleEvent::StatusChanged {
            hackathon_id: id,
            from: HackathonStatus::PendingApproval,
            to: HackathonStatus::Published,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let bus = LifecycleBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(status_changed(1));

        assert_eq!(rx.recv().await.unwrap(), status_changed(1));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_a_noop() {
        let bus = LifecycleBus::new(8);
        // Must not panic or block.
        bus.publish(status_changed(1));
    }

    #[tokio::test]
    async fn test_all_subscribers_see_every_event() {
        let bus = LifecycleBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(status_changed(1));
        bus.publish(LifecycleEvent::ResultsPublished { hackathon_id: 2 });

        assert_eq!(a.recv().await.unwrap().hackathon_id(), 1);
        assert_eq!(a.recv().await.unwrap().hackathon_id(), 2);
        assert_eq!(b.recv().await.unwrap().hackathon_id(), 1);
        assert_eq!(b.recv().await.unwrap().hackathon_id(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_the_channel() {
        let bus = LifecycleBus::new(8);
        let mut rx = bus.subscribe();

        bus.clone().publish(status_changed(9));

        assert_eq!(rx.recv().await.unwrap().hackathon_id(), 9);
    }
}
