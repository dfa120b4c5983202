use crate::model::BookingRequest;

/// Minimum name length in Unicode code points.
const MIN_NAME_LEN: usize = 2;

/// Per-field verdict for a booking request. Every failed field is reported,
/// not just the first; overall acceptance requires all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validation {
    pub name_valid: bool,
    pub email_valid: bool,
    pub quantity_valid: bool,
}

impl Validation {
    pub fn accepted(&self) -> bool {
        self.name_valid && self.email_valid && self.quantity_valid
    }
}

/// Check a request against a snapshot of the remaining ticket count.
///
/// Pure and deterministic — touches no shared state, so any number of tasks
/// may call it concurrently with their own snapshots. User-facing messaging
/// for failed fields is the caller's job.
pub fn validate(req: &BookingRequest, remaining: u32) -> Validation {
    let name_valid = req.first_name.chars().count() >= MIN_NAME_LEN
        && req.last_name.chars().count() >= MIN_NAME_LEN;
    // Substring presence only — no full RFC validation.
    let email_valid = req.email.contains('@') && req.email.contains('.');
    let quantity_valid = req.tickets >= 1 && req.tickets <= remaining;
    Validation {
        name_valid,
        email_valid,
        quantity_valid,
    }
}
