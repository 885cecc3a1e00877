//! Booking lifecycle: create, reassign, cancel and complete reservations.
//!
//! Status transitions are one-way (active → completed, active → cancelled).
//! Creation debits fuel and cancellation credits it back at the price
//! embedded in the booking, so a later catalog price change never alters
//! what an existing booking refunds.
//!
//! Every mutation loads the whole account, builds an updated copy and
//! writes it back in one put. There is no cross-account lock: the global
//! occupancy check in [`crate::domain::slot_resolver`] stays advisory.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::storage::traits::{AccountStore, Connection};

use super::catalog;
use super::commands::bookings::{
    BookingOutcome, CancelBookingCommand, CancelBookingResult, CompleteBookingCommand,
    CompleteBookingResult, ReassignBookingCommand, ReassignBookingResult, RequestBookingCommand,
};
use super::errors::DomainError;
use super::fuel_ledger;
use super::models::account::Account;
use super::models::booking::{Booking, BookingStatus, CarModel, RemindersSent};
use super::slot_resolver;

#[derive(Clone)]
pub struct BookingService<C: Connection> {
    account_repository: C::AccountRepository,
}

impl<C: Connection> BookingService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            account_repository: connection.create_account_repository(),
        }
    }

    /// Request a booking for a child, resolving conflicts per the slot
    /// rules: fuel first, then the child's own schedule. A self-conflict
    /// produces a `Conflict` outcome carrying the sibling candidates
    /// instead of a booking.
    pub fn request_booking(&self, command: RequestBookingCommand) -> Result<BookingOutcome> {
        info!(
            "Booking request: uid={} child={} car={} {} {}",
            command.uid, command.child_id, command.car_id, command.date, command.time
        );

        let account = self.load_account(&command.uid)?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;
        let car = resolve_car(&command.car_id)?;
        validate_slot(&command.time)?;

        let child = &account.children[child_index];
        if child.progress.fuel_liters < car.price_per_slot {
            return Err(DomainError::InsufficientFuel {
                have: child.progress.fuel_liters,
                need: car.price_per_slot,
            }
            .into());
        }

        if let Some(existing) = slot_resolver::self_conflict(child, command.date, &command.time) {
            let candidates: Vec<_> = slot_resolver::reassignment_candidates(&account, &child.id)
                .into_iter()
                .cloned()
                .collect();
            info!(
                "Self-conflict with booking {} for {}; {} reassignment candidate(s)",
                existing.id,
                child.name,
                candidates.len()
            );
            return Ok(BookingOutcome::Conflict { candidates });
        }

        let (updated, booking) = append_booking(&account, child_index, car, command.date, &command.time)?;
        self.account_repository.put_account(&updated)?;

        let fuel_liters = updated.children[child_index].progress.fuel_liters;
        info!("Created booking {} for {} ({} L left)", booking.id, command.child_id, fuel_liters);
        Ok(BookingOutcome::Created { booking, fuel_liters })
    }

    /// Create the booking against a sibling chosen from a conflict offer.
    /// Only the sibling's own fuel is re-checked; the conflict was already
    /// resolved by picking a different child.
    pub fn reassign_booking(&self, command: ReassignBookingCommand) -> Result<ReassignBookingResult> {
        info!(
            "Reassigned booking request: uid={} target={} car={} {} {}",
            command.uid, command.target_child_id, command.car_id, command.date, command.time
        );

        let account = self.load_account(&command.uid)?;
        let child_index = account
            .child_index(&command.target_child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.target_child_id))?;
        let car = resolve_car(&command.car_id)?;
        validate_slot(&command.time)?;

        let (updated, booking) = append_booking(&account, child_index, car, command.date, &command.time)?;
        self.account_repository.put_account(&updated)?;

        let fuel_liters = updated.children[child_index].progress.fuel_liters;
        info!("Created booking {} for sibling {}", booking.id, command.target_child_id);
        Ok(ReassignBookingResult { booking, fuel_liters })
    }

    /// Cancel an active booking, crediting the fuel it cost at booking
    /// time. Cancelling a completed or already-cancelled booking is a
    /// no-op: no status change and, critically, no second credit.
    pub fn cancel_booking(&self, command: CancelBookingCommand) -> Result<CancelBookingResult> {
        let account = self.load_account(&command.uid)?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;
        let child = &account.children[child_index];
        let booking = child
            .booking(&command.booking_id)
            .ok_or_else(|| DomainError::booking_not_found(&command.booking_id))?;

        if !booking.is_active() {
            warn!(
                "Ignoring cancel for booking {} in state {}",
                booking.id,
                booking.status.as_str()
            );
            return Ok(CancelBookingResult {
                booking: booking.clone(),
                fuel_liters: child.progress.fuel_liters,
            });
        }

        // Refund at the snapshot price captured when the booking was made.
        let refund = booking.car.price_per_slot;
        let progress = fuel_ledger::credit(&child.progress, refund);
        let bookings = with_status(&child.bookings, &command.booking_id, BookingStatus::Cancelled);
        let updated_child = child.with_progress(progress).with_bookings(bookings);
        let fuel_liters = updated_child.progress.fuel_liters;
        let cancelled = updated_child.booking(&command.booking_id).unwrap().clone();

        let updated = account.with_child_replaced(child_index, updated_child);
        self.account_repository.put_account(&updated)?;

        info!(
            "Cancelled booking {} for {}, credited {} L back",
            command.booking_id, command.child_id, refund
        );
        Ok(CancelBookingResult { booking: cancelled, fuel_liters })
    }

    /// Mark an active booking as completed. No fuel effect; a no-op for
    /// bookings in any other state.
    pub fn complete_booking(&self, command: CompleteBookingCommand) -> Result<CompleteBookingResult> {
        let account = self.load_account(&command.uid)?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;
        let child = &account.children[child_index];
        let booking = child
            .booking(&command.booking_id)
            .ok_or_else(|| DomainError::booking_not_found(&command.booking_id))?;

        if !booking.is_active() {
            warn!(
                "Ignoring complete for booking {} in state {}",
                booking.id,
                booking.status.as_str()
            );
            return Ok(CompleteBookingResult { booking: booking.clone() });
        }

        let bookings = with_status(&child.bookings, &command.booking_id, BookingStatus::Completed);
        let updated_child = child.with_bookings(bookings);
        let completed = updated_child.booking(&command.booking_id).unwrap().clone();

        let updated = account.with_child_replaced(child_index, updated_child);
        self.account_repository.put_account(&updated)?;

        info!("Completed booking {} for {}", command.booking_id, command.child_id);
        Ok(CompleteBookingResult { booking: completed })
    }

    fn load_account(&self, uid: &str) -> Result<Account> {
        self.account_repository
            .get_account(uid)?
            .ok_or_else(|| DomainError::account_not_found(uid).into())
    }
}

fn resolve_car(car_id: &str) -> Result<&'static CarModel> {
    catalog::car_by_id(car_id)
        .ok_or_else(|| DomainError::NotFound(format!("car {car_id}")).into())
}

fn validate_slot(time: &str) -> Result<()> {
    if !catalog::is_valid_slot(time) {
        return Err(anyhow::anyhow!("'{}' is not a bookable time slot", time));
    }
    Ok(())
}

/// Debit the child's fuel and append a fresh active booking; both land in
/// the same account copy so one put persists them together.
fn append_booking(
    account: &Account,
    child_index: usize,
    car: &CarModel,
    date: NaiveDate,
    time: &str,
) -> Result<(Account, Booking)> {
    let child = &account.children[child_index];
    let progress = fuel_ledger::debit(&child.progress, car.price_per_slot)?;

    let now_millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
    let booking = Booking {
        id: Booking::generate_id(now_millis),
        status: BookingStatus::Active,
        date,
        time: time.to_string(),
        car: car.clone(),
        reminders_sent: RemindersSent::default(),
    };

    let mut bookings = child.bookings.clone();
    bookings.push(booking.clone());
    let updated_child = child.with_progress(progress).with_bookings(bookings);

    Ok((account.with_child_replaced(child_index, updated_child), booking))
}

fn with_status(bookings: &[Booking], booking_id: &str, status: BookingStatus) -> Vec<Booking> {
    bookings
        .iter()
        .map(|b| {
            if b.id == booking_id {
                Booking { status, ..b.clone() }
            } else {
                b.clone()
            }
        })
        .collect()
}
