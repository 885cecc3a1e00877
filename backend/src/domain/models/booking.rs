//! Domain model for a vehicle slot reservation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Status of a booking. Transitions are one-way: active bookings may be
/// completed or cancelled; completed and cancelled bookings are final.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

/// Reminder flags; each is set at most once per booking.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RemindersSent {
    #[serde(default)]
    pub day_before: bool,
    #[serde(default)]
    pub same_day: bool,
}

/// Vehicle catalog entry. Embedded by value into bookings so that later
/// catalog price or name changes never affect existing reservations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarModel {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price_per_slot: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub status: BookingStatus,
    pub date: NaiveDate,
    /// Slot start, HH:MM, from the fixed quarter-hour catalog.
    pub time: String,
    pub car: CarModel,
    #[serde(default)]
    pub reminders_sent: RemindersSent,
}

impl Booking {
    /// Generate a booking ID from the creation timestamp.
    /// Format: booking::<epoch_millis>-<random_suffix>
    ///
    /// Uniqueness is best-effort; bookings are scoped to one child's list.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("booking::{}-{}", timestamp_millis, Self::generate_random_suffix(4))
    }

    fn generate_random_suffix(len: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_nanos();
        format!("{:x}", now % (16_u128.pow(len as u32)))
            .chars()
            .take(len)
            .collect()
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }
}

// ---------------------------------------------------------------------------
// Wire conversions
// ---------------------------------------------------------------------------

impl From<BookingStatus> for shared::BookingStatus {
    fn from(s: BookingStatus) -> Self {
        match s {
            BookingStatus::Active => shared::BookingStatus::Active,
            BookingStatus::Completed => shared::BookingStatus::Completed,
            BookingStatus::Cancelled => shared::BookingStatus::Cancelled,
        }
    }
}

impl From<&CarModel> for shared::CarModel {
    fn from(c: &CarModel) -> Self {
        shared::CarModel {
            id: c.id.clone(),
            name: c.name.clone(),
            image: c.image.clone(),
            price_per_slot: c.price_per_slot,
        }
    }
}

impl From<&Booking> for shared::Booking {
    fn from(b: &Booking) -> Self {
        shared::Booking {
            id: b.id.clone(),
            status: b.status.into(),
            date: b.date.format("%Y-%m-%d").to_string(),
            time: b.time.clone(),
            car: (&b.car).into(),
            reminders_sent: shared::RemindersSent {
                day_before: b.reminders_sent.day_before,
                same_day: b.reminders_sent.same_day,
            },
        }
    }
}
