//! # YAML Document Storage
//!
//! File-based document store: one YAML file per account under `accounts/`
//! and one per coupon under `coupons/`. Documents are written atomically
//! (temp file then rename), mirroring the store's per-document write
//! guarantee: a failed write loses the whole update, never half of it.

pub mod account_repository;
pub mod connection;
pub mod coupon_repository;

#[cfg(test)]
pub mod test_utils;

pub use account_repository::AccountRepository;
pub use connection::YamlConnection;
pub use coupon_repository::CouponRepository;
