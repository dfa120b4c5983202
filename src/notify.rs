use tokio::sync::broadcast;

use crate::model::PoolEvent;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for pool events. Presentation layers subscribe to render
/// status lines; the core only publishes structured events.
pub struct EventHub {
    tx: broadcast::Sender<PoolEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.tx.subscribe()
    }

    /// Send an event. No-op if nobody is listening.
    pub fn send(&self, event: PoolEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_and_receive() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();

        hub.send(PoolEvent::SoldOut);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, PoolEvent::SoldOut);
    }

    #[tokio::test]
    async fn send_without_subscribers_is_noop() {
        let hub = EventHub::new();
        // No subscriber — should not panic
        hub.send(PoolEvent::SoldOut);
    }

    #[tokio::test]
    async fn every_subscriber_sees_every_event() {
        let hub = EventHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.send(PoolEvent::SoldOut);

        assert_eq!(a.recv().await.unwrap(), PoolEvent::SoldOut);
        assert_eq!(b.recv().await.unwrap(), PoolEvent::SoldOut);
    }
}
