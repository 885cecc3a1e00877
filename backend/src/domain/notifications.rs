//! Confirmation link builders: Google Calendar events and WhatsApp
//! messages for a booking. Pure string formatting; opening the links is the
//! frontend's job.

use chrono::{Duration, NaiveTime};
use url::Url;

use super::models::account::Guardian;
use super::models::booking::Booking;

/// Track location shown on calendar events.
const TRACK_LOCATION: &str = "PIVES Driving Track";

/// Slot length for the calendar event.
const SLOT_MINUTES: i64 = 15;

/// Google Calendar template URL for a booking.
pub fn calendar_link(child_name: &str, booking: &Booking) -> String {
    let date_part = booking.date.format("%Y%m%d").to_string();
    let start_time = NaiveTime::parse_from_str(&booking.time, "%H:%M")
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    let end_time = start_time + Duration::minutes(SLOT_MINUTES);

    let start = format!("{}T{}", date_part, start_time.format("%H%M%S"));
    let end = format!("{}T{}", date_part, end_time.format("%H%M%S"));

    let mut url = Url::parse("https://www.google.com/calendar/render").unwrap();
    url.query_pairs_mut()
        .append_pair("action", "TEMPLATE")
        .append_pair("text", &format!("🚗 PIVES booking - {child_name}"))
        .append_pair(
            "details",
            &format!(
                "Booking confirmed for {child_name}\nCar: {}\nFuel: {} L",
                booking.car.name, booking.car.price_per_slot
            ),
        )
        .append_pair("location", TRACK_LOCATION)
        .append_pair("dates", &format!("{start}/{end}"));
    url.to_string()
}

/// WhatsApp deep link carrying the booking confirmation message. Falls back
/// to a recipient-less link when the guardian has no phone on file.
pub fn whatsapp_link(guardian: &Guardian, child_name: &str, booking: &Booking) -> String {
    let phone: String = guardian.phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let date_formatted = booking.date.format("%A, %B %-d, %Y").to_string();

    let message = format!(
        "Hi! 👋 Your PIVES booking for {child_name} is confirmed:\n\n\
         🚗 Car: {}\n🗓️ Date: {}\n⏰ Time: {}\n⛽ Fuel used: {} L\n\n\
         See you for a great learning adventure! 🚦",
        booking.car.name, date_formatted, booking.time, booking.car.price_per_slot
    );

    let base = if phone.is_empty() {
        "https://wa.me/".to_string()
    } else {
        format!("https://wa.me/{phone}")
    };
    let mut url = Url::parse(&base).unwrap();
    url.query_pairs_mut().append_pair("text", &message);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;
    use crate::domain::models::booking::{BookingStatus, RemindersSent};

    fn booking(time: &str) -> Booking {
        Booking {
            id: "bk-1".to_string(),
            status: BookingStatus::Active,
            date: "2025-01-17".parse().unwrap(),
            time: time.to_string(),
            car: catalog::car_by_id("car1").unwrap().clone(),
            reminders_sent: RemindersSent::default(),
        }
    }

    fn guardian(phone: &str) -> Guardian {
        Guardian {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_calendar_link_spans_one_slot() {
        let url = calendar_link("Emma", &booking("10:00"));
        assert!(url.starts_with("https://www.google.com/calendar/render?action=TEMPLATE"));
        assert!(url.contains("20250117T100000%2F20250117T101500"));
        assert!(url.contains("Emma"));
    }

    #[test]
    fn test_calendar_link_end_time_rolls_over_the_hour() {
        let url = calendar_link("Emma", &booking("10:45"));
        assert!(url.contains("20250117T104500%2F20250117T110000"));
    }

    #[test]
    fn test_whatsapp_link_uses_digits_only_phone() {
        let url = whatsapp_link(&guardian("+54 9 11 0000-0000"), "Emma", &booking("10:00"));
        assert!(url.starts_with("https://wa.me/5491100000000?text="));
        assert!(url.contains("Emma"));
        assert!(url.contains("10%3A00"));
    }

    #[test]
    fn test_whatsapp_link_without_phone() {
        let url = whatsapp_link(&guardian(""), "Emma", &booking("10:00"));
        assert!(url.starts_with("https://wa.me/?text="));
    }
}
