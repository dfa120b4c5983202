use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::model::{Booking, Confirmation, PoolEvent};
use crate::notify::EventHub;
use crate::observability;

/// Default simulated delivery delay.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Sends booking confirmations on background tasks. The simulated delivery
/// delay is the only blocking work in the system and runs off the critical
/// path — no lock is held while a dispatch sleeps.
#[derive(Clone)]
pub struct Dispatcher {
    delay: Duration,
    events: Arc<EventHub>,
}

impl Dispatcher {
    pub fn new(delay: Duration, events: Arc<EventHub>) -> Self {
        Self { delay, events }
    }

    /// Hand a booking off for confirmation. Returns immediately; delivery
    /// proceeds on its own task and publishes `Confirmed` when done.
    /// Dispatches of different bookings run fully concurrently with no
    /// ordering between their completions.
    pub fn dispatch(&self, booking: Booking) -> DispatchTask {
        let delay = self.delay;
        let events = self.events.clone();
        metrics::gauge!(observability::DISPATCHES_IN_FLIGHT).increment(1.0);

        let handle = tokio::spawn(async move {
            let start = std::time::Instant::now();
            tokio::time::sleep(delay).await;

            let confirmation = Confirmation {
                booking_id: booking.id,
                ticket_count: booking.ticket_count,
                recipient: booking.full_name(),
                email: booking.email,
            };
            info!("sent {} to {}", confirmation, confirmation.email);

            metrics::histogram!(observability::DISPATCH_DURATION_SECONDS)
                .record(start.elapsed().as_secs_f64());
            metrics::counter!(observability::CONFIRMATIONS_TOTAL).increment(1);
            metrics::gauge!(observability::DISPATCHES_IN_FLIGHT).decrement(1.0);

            events.send(PoolEvent::Confirmed {
                confirmation: confirmation.clone(),
            });
            confirmation
        });

        DispatchTask { handle }
    }
}

/// An in-flight confirmation for one booking. Always runs to completion —
/// there is no cancel, timeout, or retry path.
#[derive(Debug)]
pub struct DispatchTask {
    handle: JoinHandle<Confirmation>,
}

impl DispatchTask {
    /// Wait for the confirmation to go out. A panicked dispatch task is a
    /// programming error, not a delivery failure.
    pub async fn join(self) -> Confirmation {
        self.handle.await.expect("dispatch task panicked")
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookingRequest;

    fn booking(tickets: u32) -> Booking {
        Booking::from_request(&BookingRequest::new("Ada", "Lovelace", "a@b.c", tickets))
    }

    #[tokio::test]
    async fn dispatch_returns_before_delivery_completes() {
        let hub = Arc::new(EventHub::new());
        let dispatcher = Dispatcher::new(Duration::from_secs(5), hub);

        let start = std::time::Instant::now();
        let task = dispatcher.dispatch(booking(3));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(!task.is_finished());
    }

    #[tokio::test]
    async fn join_yields_confirmation_for_the_booking() {
        let hub = Arc::new(EventHub::new());
        let dispatcher = Dispatcher::new(Duration::from_millis(10), hub);

        let b = booking(7);
        let id = b.id;
        let confirmation = dispatcher.dispatch(b).join().await;
        assert_eq!(confirmation.booking_id, id);
        assert_eq!(confirmation.ticket_count, 7);
        assert_eq!(confirmation.recipient, "Ada Lovelace");
        assert_eq!(confirmation.email, "a@b.c");
    }

    #[tokio::test]
    async fn completion_publishes_confirmed_event() {
        let hub = Arc::new(EventHub::new());
        let mut rx = hub.subscribe();
        let dispatcher = Dispatcher::new(Duration::from_millis(10), hub);

        let b = booking(2);
        let id = b.id;
        dispatcher.dispatch(b).join().await;

        match rx.recv().await.unwrap() {
            PoolEvent::Confirmed { confirmation } => assert_eq!(confirmation.booking_id, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn independent_dispatches_overlap() {
        let hub = Arc::new(EventHub::new());
        let dispatcher = Dispatcher::new(Duration::from_millis(50), hub);

        let start = std::time::Instant::now();
        let a = dispatcher.dispatch(booking(1));
        let b = dispatcher.dispatch(booking(2));
        a.join().await;
        b.join().await;
        // Sequential delivery would take at least 100ms.
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
