//! PIVES backend: booking, fuel ledger, coupons and payments for the
//! children's driving-education program.
//!
//! The domain layer owns all business rules and stays storage-agnostic; the
//! storage layer persists whole account documents; the gateway layer talks
//! to the payment provider; `rest` exposes everything over HTTP.

pub mod config;
pub mod domain;
pub mod gateway;
pub mod rest;
pub mod storage;
