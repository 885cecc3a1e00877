use chrono::NaiveDate;

use crate::domain::models::account::ChildProfile;
use crate::domain::models::booking::Booking;

/// Ask for a new booking on behalf of the given child.
#[derive(Debug, Clone)]
pub struct RequestBookingCommand {
    pub uid: String,
    pub child_id: String,
    pub car_id: String,
    pub date: NaiveDate,
    pub time: String,
}

/// Outcome of a booking request. A conflict is a normal outcome, not an
/// error: the caller decides whether to reassign or give up.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    /// Booking created; fuel already debited.
    Created { booking: Booking, fuel_liters: i64 },
    /// The requesting child already has an active booking at that date and
    /// time. `candidates` are the sibling profiles the slot could be booked
    /// for instead; empty means the request is refused outright.
    Conflict { candidates: Vec<ChildProfile> },
}

/// Create the booking against a sibling after a conflict offer.
#[derive(Debug, Clone)]
pub struct ReassignBookingCommand {
    pub uid: String,
    pub target_child_id: String,
    pub car_id: String,
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone)]
pub struct ReassignBookingResult {
    pub booking: Booking,
    pub fuel_liters: i64,
}

#[derive(Debug, Clone)]
pub struct CancelBookingCommand {
    pub uid: String,
    pub child_id: String,
    pub booking_id: String,
}

/// Final state after a cancel request. When the booking was not active the
/// request is a no-op and `fuel_liters` is unchanged.
#[derive(Debug, Clone)]
pub struct CancelBookingResult {
    pub booking: Booking,
    pub fuel_liters: i64,
}

#[derive(Debug, Clone)]
pub struct CompleteBookingCommand {
    pub uid: String,
    pub child_id: String,
    pub booking_id: String,
}

#[derive(Debug, Clone)]
pub struct CompleteBookingResult {
    pub booking: Booking,
}
