//! Slot conflict resolution.
//!
//! Decides whether a requested (car, date, time) slot is bookable for a
//! child. A child clashing with their own schedule is a hard conflict that
//! offers reassignment to a sibling; clashes with other accounts are only
//! surfaced as advisory occupancy, never enforced.

use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;

use crate::storage::traits::{AccountStore, Connection};

use super::models::account::{Account, ChildProfile};
use super::models::booking::Booking;

/// The child's own active booking occupying the requested date and time,
/// regardless of vehicle. "You cannot be in two cars at once."
pub fn self_conflict<'a>(
    child: &'a ChildProfile,
    date: NaiveDate,
    time: &str,
) -> Option<&'a Booking> {
    child
        .bookings
        .iter()
        .find(|b| b.is_active() && b.date == date && b.time == time)
}

/// Sibling profiles the booking could be created for instead. Fuel is not
/// filtered here; it is re-checked when a sibling is actually chosen.
pub fn reassignment_candidates<'a>(
    account: &'a Account,
    requesting_child_id: &str,
) -> Vec<&'a ChildProfile> {
    account
        .children
        .iter()
        .filter(|c| c.id != requesting_child_id)
        .collect()
}

/// Computes global slot occupancy across every account.
#[derive(Clone)]
pub struct SlotResolver<C: Connection> {
    account_repository: C::AccountRepository,
}

impl<C: Connection> SlotResolver<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            account_repository: connection.create_account_repository(),
        }
    }

    /// Times already taken for `car_id` on `date`, across all accounts.
    ///
    /// Linear scan over every account's every child's active bookings.
    /// Advisory only: nothing reserves the slot between this check and a
    /// later booking write, so two accounts racing for the same slot can
    /// both succeed.
    pub fn globally_booked_slots(&self, car_id: &str, date: NaiveDate) -> Result<Vec<String>> {
        let accounts = self.account_repository.list_accounts()?;

        let mut times = Vec::new();
        for account in &accounts {
            for child in &account.children {
                for booking in &child.bookings {
                    if booking.is_active() && booking.date == date && booking.car.id == car_id {
                        times.push(booking.time.clone());
                    }
                }
            }
        }

        debug!(car_id, %date, occupied = times.len(), "computed global slot occupancy");
        Ok(times)
    }
}
