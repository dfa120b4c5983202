use std::sync::Arc;

use futures::future::join_all;
use tracing::info;

use crate::dispatch::{DispatchTask, Dispatcher};
use crate::input::RequestSource;
use crate::model::{Booking, BookingRequest, Confirmation, PoolEvent};
use crate::notify::EventHub;
use crate::observability;
use crate::pool::TicketPool;
use crate::validate::Validation;

/// One request's outcome. A rejection is a normal result, not an error —
/// it carries every failed field for the presentation layer to explain.
#[derive(Debug)]
pub enum Outcome {
    Booked(Booking),
    Rejected(Validation),
}

/// Everything a session run produced, for the caller to render.
#[derive(Debug)]
pub struct SessionSummary {
    pub bookings: Vec<Booking>,
    pub rejections: Vec<(BookingRequest, Validation)>,
    pub confirmations: Vec<Confirmation>,
}

/// Drives the read-validate-reserve-dispatch cycle and owns the outstanding
/// dispatch tasks. Stateless across iterations apart from the shared pool;
/// the task list only exists so the run can end with a completion barrier
/// instead of leaking fire-and-forget work.
pub struct Session {
    pool: Arc<TicketPool>,
    dispatcher: Dispatcher,
    events: Arc<EventHub>,
    outstanding: Vec<DispatchTask>,
    run_until_sold_out: bool,
}

impl Session {
    pub fn new(pool: Arc<TicketPool>, dispatcher: Dispatcher, events: Arc<EventHub>) -> Self {
        Self {
            pool,
            dispatcher,
            events,
            outstanding: Vec::new(),
            run_until_sold_out: false,
        }
    }

    /// Keep accepting requests until the pool is empty or input ends,
    /// instead of stopping after the first request.
    pub fn run_until_sold_out(mut self, yes: bool) -> Self {
        self.run_until_sold_out = yes;
        self
    }

    pub fn outstanding_dispatches(&self) -> usize {
        self.outstanding.len()
    }

    /// Validate, reserve, and hand off to the dispatcher. Never waits on the
    /// confirmation itself; the task is tracked until [`Session::run`] joins it.
    pub async fn handle(&mut self, req: &BookingRequest) -> Outcome {
        match self.pool.submit(req).await {
            Ok(booking) => {
                metrics::counter!(observability::REQUESTS_TOTAL, "status" => "booked")
                    .increment(1);
                self.outstanding.push(self.dispatcher.dispatch(booking.clone()));

                let remaining = self.pool.remaining().await;
                self.events.send(PoolEvent::Booked {
                    booking: booking.clone(),
                    remaining,
                });
                if remaining == 0 {
                    self.events.send(PoolEvent::SoldOut);
                }
                Outcome::Booked(booking)
            }
            Err(verdict) => {
                metrics::counter!(observability::REQUESTS_TOTAL, "status" => "rejected")
                    .increment(1);
                if !verdict.name_valid {
                    metrics::counter!(observability::REJECTIONS_TOTAL, "field" => "name")
                        .increment(1);
                }
                if !verdict.email_valid {
                    metrics::counter!(observability::REJECTIONS_TOTAL, "field" => "email")
                        .increment(1);
                }
                if !verdict.quantity_valid {
                    metrics::counter!(observability::REJECTIONS_TOTAL, "field" => "quantity")
                        .increment(1);
                }

                self.events.send(PoolEvent::Rejected {
                    name_valid: verdict.name_valid,
                    email_valid: verdict.email_valid,
                    quantity_valid: verdict.quantity_valid,
                    requested: req.tickets,
                    remaining: self.pool.remaining().await,
                });
                Outcome::Rejected(verdict)
            }
        }
    }

    /// Consume requests from the source, then block until every outstanding
    /// confirmation has gone out. The drain is the join-before-exit barrier:
    /// the process may not end with dispatches still in flight.
    pub async fn run<S: RequestSource>(mut self, source: &mut S) -> SessionSummary {
        let mut bookings = Vec::new();
        let mut rejections = Vec::new();

        loop {
            let Some(req) = source.next_request().await else {
                break;
            };
            match self.handle(&req).await {
                Outcome::Booked(b) => bookings.push(b),
                Outcome::Rejected(v) => rejections.push((req, v)),
            }
            if !self.run_until_sold_out {
                break;
            }
            if self.pool.is_sold_out().await {
                info!("pool sold out after {} bookings", bookings.len());
                break;
            }
        }

        let confirmations = self.drain().await;
        SessionSummary {
            bookings,
            rejections,
            confirmations,
        }
    }

    async fn drain(&mut self) -> Vec<Confirmation> {
        let tasks = std::mem::take(&mut self.outstanding);
        if tasks.is_empty() {
            return Vec::new();
        }
        info!("waiting for {} outstanding dispatches", tasks.len());
        join_all(tasks.into_iter().map(DispatchTask::join)).await
    }
}
