use crate::domain::models::booking::Booking;

/// Which of the two per-booking reminders is meant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReminderKind {
    DayBefore,
    SameDay,
}

/// A reminder that is due for one booking.
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub booking: Booking,
    pub kind: ReminderKind,
}

#[derive(Debug, Clone)]
pub struct CheckRemindersCommand {
    pub uid: String,
    pub child_id: String,
}

#[derive(Debug, Clone)]
pub struct CheckRemindersResult {
    pub reminder: Option<DueReminder>,
}

/// The guardian saw the reminder; mark it so it never fires again.
#[derive(Debug, Clone)]
pub struct AcknowledgeReminderCommand {
    pub uid: String,
    pub child_id: String,
    pub booking_id: String,
    pub kind: ReminderKind,
}

/// The guardian chose to reschedule: cancel the booking (crediting its
/// fuel) and mark the reminder so it does not resurface.
#[derive(Debug, Clone)]
pub struct ReprogramReminderCommand {
    pub uid: String,
    pub child_id: String,
    pub booking_id: String,
    pub kind: ReminderKind,
}
