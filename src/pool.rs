use tokio::sync::RwLock;
use tracing::info;

use crate::model::{Booking, BookingRequest};
use crate::observability;
use crate::validate::{Validation, validate};

struct PoolInner {
    remaining: u32,
    /// Insertion order preserved; bookings are never mutated or removed.
    bookings: Vec<Booking>,
}

impl PoolInner {
    fn sold(&self) -> u32 {
        self.bookings.iter().map(|b| b.ticket_count).sum()
    }

    /// `remaining + Σ ticket_count == capacity` must hold at all times.
    /// A violation means a concurrency-control bug, not a user error.
    fn assert_consistent(&self, capacity: u32) {
        assert_eq!(
            self.remaining + self.sold(),
            capacity,
            "ticket pool invariant violated: remaining {} + sold {} != capacity {}",
            self.remaining,
            self.sold(),
            capacity,
        );
    }
}

/// The authoritative shared record of remaining capacity and confirmed
/// bookings. Single instance per process, shared via `Arc`; all mutation
/// funnels through the write lock held by [`TicketPool::submit`] and
/// [`TicketPool::reserve`].
pub struct TicketPool {
    capacity: u32,
    inner: RwLock<PoolInner>,
}

impl TicketPool {
    pub fn new(capacity: u32) -> Self {
        metrics::gauge!(observability::TICKETS_REMAINING).set(capacity as f64);
        Self {
            capacity,
            inner: RwLock::new(PoolInner {
                remaining: capacity,
                bookings: Vec::new(),
            }),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Consistent snapshot of the remaining ticket count.
    pub async fn remaining(&self) -> u32 {
        self.inner.read().await.remaining
    }

    pub async fn is_sold_out(&self) -> bool {
        self.inner.read().await.remaining == 0
    }

    pub async fn booking_count(&self) -> usize {
        self.inner.read().await.bookings.len()
    }

    /// First names of all bookings in insertion order. Runs under the read
    /// lock, so it sees either the pre- or post-state of any reservation,
    /// never a torn write.
    pub async fn first_names(&self) -> Vec<String> {
        self.inner
            .read()
            .await
            .bookings
            .iter()
            .map(|b| b.first_name.clone())
            .collect()
    }

    /// Validate and reserve under a single write-lock acquisition.
    ///
    /// Holding the lock across the validation read and the decrement is what
    /// stops two in-flight requests from both passing the quantity check
    /// against a stale `remaining`: the loser revalidates against the
    /// post-update count and fails `quantity_valid`.
    pub async fn submit(&self, req: &BookingRequest) -> Result<Booking, Validation> {
        let mut inner = self.inner.write().await;
        let verdict = validate(req, inner.remaining);
        if !verdict.accepted() {
            return Err(verdict);
        }
        Ok(self.reserve_locked(&mut inner, req))
    }

    /// Reserve without revalidation, for callers that have already checked
    /// the request against the current `remaining`. Admitting a request for
    /// more tickets than remain is a programming error and panics.
    pub async fn reserve(&self, req: &BookingRequest) -> Booking {
        let mut inner = self.inner.write().await;
        self.reserve_locked(&mut inner, req)
    }

    fn reserve_locked(&self, inner: &mut PoolInner, req: &BookingRequest) -> Booking {
        inner.assert_consistent(self.capacity);
        assert!(
            req.tickets <= inner.remaining,
            "reserve admitted {} tickets with only {} remaining",
            req.tickets,
            inner.remaining,
        );

        inner.remaining -= req.tickets;
        let booking = Booking::from_request(req);
        inner.bookings.push(booking.clone());
        inner.assert_consistent(self.capacity);

        metrics::counter!(observability::TICKETS_SOLD_TOTAL).increment(u64::from(req.tickets));
        metrics::gauge!(observability::TICKETS_REMAINING).set(inner.remaining as f64);
        info!(
            "booked {} tickets for {} <{}>, {} remaining",
            booking.ticket_count,
            booking.full_name(),
            booking.email,
            inner.remaining,
        );
        booking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn valid_req(tickets: u32) -> BookingRequest {
        BookingRequest::new("Ada", "Lovelace", "ada@example.org", tickets)
    }

    #[tokio::test]
    async fn reserve_decrements_and_records() {
        let pool = TicketPool::new(50);
        let booking = pool.submit(&valid_req(10)).await.unwrap();
        assert_eq!(booking.ticket_count, 10);
        assert_eq!(pool.remaining().await, 40);
        assert_eq!(pool.booking_count().await, 1);
    }

    #[tokio::test]
    async fn invariant_holds_across_reservations() {
        let pool = TicketPool::new(50);
        for tickets in [10, 5, 20, 15] {
            pool.submit(&valid_req(tickets)).await.unwrap();
            let inner = pool.inner.read().await;
            assert_eq!(inner.remaining + inner.sold(), 50);
        }
        assert!(pool.is_sold_out().await);
    }

    #[tokio::test]
    async fn rejection_does_not_mutate() {
        let pool = TicketPool::new(50);
        let verdict = pool.submit(&valid_req(51)).await.unwrap_err();
        assert!(!verdict.quantity_valid);
        assert!(verdict.name_valid);
        assert_eq!(pool.remaining().await, 50);
        assert_eq!(pool.booking_count().await, 0);
    }

    #[tokio::test]
    async fn first_names_in_insertion_order() {
        let pool = TicketPool::new(50);
        for name in ["Ada", "Grace", "Edsger"] {
            pool.submit(&BookingRequest::new(name, "Surname", "x@y.z", 1))
                .await
                .unwrap();
        }
        assert_eq!(pool.first_names().await, vec!["Ada", "Grace", "Edsger"]);
    }

    #[tokio::test]
    async fn racing_submissions_never_oversell() {
        let pool = Arc::new(TicketPool::new(50));
        let mut handles = Vec::new();
        // Ten requests for 10 tickets each — only five can fit.
        for _ in 0..10 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                pool.submit(&valid_req(10)).await.is_ok()
            }));
        }
        let mut accepted = 0;
        for h in handles {
            if h.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 5);
        assert_eq!(pool.remaining().await, 0);
        assert_eq!(pool.booking_count().await, 5);
    }

    #[tokio::test]
    async fn losing_racer_fails_quantity_check() {
        let pool = Arc::new(TicketPool::new(50));
        let a = tokio::spawn({
            let pool = pool.clone();
            async move { pool.submit(&valid_req(30)).await }
        });
        let b = tokio::spawn({
            let pool = pool.clone();
            async move { pool.submit(&valid_req(30)).await }
        });
        let (a, b) = (a.await.unwrap(), b.await.unwrap());

        // Exactly one wins; the loser revalidated against remaining == 20.
        assert!(a.is_ok() != b.is_ok());
        let verdict = a.err().or(b.err()).unwrap();
        assert!(!verdict.quantity_valid);
        assert!(verdict.name_valid);
        assert!(verdict.email_valid);
        assert_eq!(pool.remaining().await, 20);
    }

    #[tokio::test]
    #[should_panic(expected = "reserve admitted")]
    async fn unvalidated_reserve_past_remaining_is_fatal() {
        let pool = TicketPool::new(5);
        pool.reserve(&valid_req(6)).await;
    }
}
