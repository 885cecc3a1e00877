//! Reminder scheduling for upcoming bookings.
//!
//! Reminders are not timer-driven: they are recomputed whenever the active
//! child's data is evaluated. Each pass surfaces at most one due reminder
//! (the first qualifying booking in list order), so the guardian always
//! sees a single actionable item.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::info;

use crate::storage::traits::{AccountStore, Connection};

use super::booking_service::BookingService;
use super::commands::bookings::CancelBookingCommand;
use super::commands::reminders::{
    AcknowledgeReminderCommand, CheckRemindersCommand, CheckRemindersResult, DueReminder,
    ReminderKind, ReprogramReminderCommand,
};
use super::errors::DomainError;
use super::models::account::ChildProfile;
use super::models::booking::Booking;

/// The reminder due for `child` on `today`, if any.
///
/// A booking one day out owes a day-before reminder; a booking today owes a
/// same-day reminder. Flags already set never fire again.
pub fn due_reminder(child: &ChildProfile, today: NaiveDate) -> Option<DueReminder> {
    for booking in child.bookings.iter().filter(|b| b.is_active()) {
        let day_diff = (booking.date - today).num_days();

        if day_diff == 1 && !booking.reminders_sent.day_before {
            return Some(DueReminder {
                booking: booking.clone(),
                kind: ReminderKind::DayBefore,
            });
        }
        if day_diff == 0 && !booking.reminders_sent.same_day {
            return Some(DueReminder {
                booking: booking.clone(),
                kind: ReminderKind::SameDay,
            });
        }
    }
    None
}

#[derive(Clone)]
pub struct ReminderService<C: Connection> {
    account_repository: C::AccountRepository,
    booking_service: BookingService<C>,
}

impl<C: Connection> ReminderService<C> {
    pub fn new(connection: Arc<C>, booking_service: BookingService<C>) -> Self {
        Self {
            account_repository: connection.create_account_repository(),
            booking_service,
        }
    }

    /// Evaluate reminders for today (local calendar date).
    pub fn check_reminders(&self, command: CheckRemindersCommand) -> Result<CheckRemindersResult> {
        self.check_reminders_on(command, Local::now().date_naive())
    }

    /// Evaluate reminders as of an explicit date.
    pub fn check_reminders_on(
        &self,
        command: CheckRemindersCommand,
        today: NaiveDate,
    ) -> Result<CheckRemindersResult> {
        let account = self
            .account_repository
            .get_account(&command.uid)?
            .ok_or_else(|| DomainError::account_not_found(&command.uid))?;
        let child = account
            .child(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;

        Ok(CheckRemindersResult {
            reminder: due_reminder(child, today),
        })
    }

    /// The guardian dismissed the reminder: set its flag, nothing else.
    pub fn acknowledge(&self, command: AcknowledgeReminderCommand) -> Result<()> {
        info!(
            "Reminder acknowledged: uid={} child={} booking={} {:?}",
            command.uid, command.child_id, command.booking_id, command.kind
        );
        self.mark_sent(&command.uid, &command.child_id, &command.booking_id, command.kind)
    }

    /// The guardian chose to reschedule: cancel the booking (crediting its
    /// fuel back), then set the flag anyway so the reminder cannot
    /// resurface for the now-cancelled booking.
    pub fn reprogram(&self, command: ReprogramReminderCommand) -> Result<()> {
        info!(
            "Reminder reprogram: uid={} child={} booking={}",
            command.uid, command.child_id, command.booking_id
        );

        self.booking_service.cancel_booking(CancelBookingCommand {
            uid: command.uid.clone(),
            child_id: command.child_id.clone(),
            booking_id: command.booking_id.clone(),
        })?;

        self.mark_sent(&command.uid, &command.child_id, &command.booking_id, command.kind)
    }

    /// Set one reminder flag on one booking, regardless of its status.
    fn mark_sent(
        &self,
        uid: &str,
        child_id: &str,
        booking_id: &str,
        kind: ReminderKind,
    ) -> Result<()> {
        let account = self
            .account_repository
            .get_account(uid)?
            .ok_or_else(|| DomainError::account_not_found(uid))?;
        let child_index = account
            .child_index(child_id)
            .ok_or_else(|| DomainError::child_not_found(child_id))?;
        let child = &account.children[child_index];
        if child.booking(booking_id).is_none() {
            return Err(DomainError::booking_not_found(booking_id).into());
        }

        let bookings: Vec<Booking> = child
            .bookings
            .iter()
            .map(|b| {
                if b.id == booking_id {
                    let mut updated = b.clone();
                    match kind {
                        ReminderKind::DayBefore => updated.reminders_sent.day_before = true,
                        ReminderKind::SameDay => updated.reminders_sent.same_day = true,
                    }
                    updated
                } else {
                    b.clone()
                }
            })
            .collect();

        let updated = account.with_child_replaced(child_index, child.with_bookings(bookings));
        self.account_repository.put_account(&updated)
    }
}
