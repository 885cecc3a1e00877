//! Command and result types for the domain services.
//!
//! Every service operation takes one command struct and returns one result
//! type, keeping the REST layer a thin translation.

pub mod bookings;
pub mod children;
pub mod fuel;
pub mod reminders;
