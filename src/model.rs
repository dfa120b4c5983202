use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A candidate booking as submitted by a user. Transient — one per
/// submission, consumed by validation and, if accepted, folded into a
/// [`Booking`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub tickets: u32,
}

impl BookingRequest {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        tickets: u32,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            tickets,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A confirmed reservation. Immutable once created; owned by the pool's
/// booking list and never removed (cancellation is out of scope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub ticket_count: u32,
}

impl Booking {
    pub(crate) fn from_request(req: &BookingRequest) -> Self {
        Self {
            id: Ulid::new(),
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            email: req.email.clone(),
            ticket_count: req.tickets,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The record produced once a confirmation has gone out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub booking_id: Ulid,
    pub ticket_count: u32,
    pub recipient: String,
    pub email: String,
}

impl std::fmt::Display for Confirmation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} tickets for {}", self.ticket_count, self.recipient)
    }
}

/// Events published on the hub as the pool changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Booked {
        booking: Booking,
        remaining: u32,
    },
    Rejected {
        name_valid: bool,
        email_valid: bool,
        quantity_valid: bool,
        requested: u32,
        remaining: u32,
    },
    Confirmed {
        confirmation: Confirmation,
    },
    SoldOut,
}
