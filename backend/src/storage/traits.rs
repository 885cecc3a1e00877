//! # Storage Traits
//!
//! Abstractions over the document store so the domain layer can run against
//! different backends without modification. The account store has
//! whole-document semantics only: callers read the aggregate, mutate a copy
//! and write the whole thing back. There is no concurrency token; concurrent
//! writers to the same account are last-write-wins.

use anyhow::Result;

use crate::domain::models::account::Account;
use crate::domain::models::coupon::FuelCoupon;

/// Interface for account document storage.
pub trait AccountStore: Send + Sync {
    /// Fetch one account by uid.
    fn get_account(&self, uid: &str) -> Result<Option<Account>>;

    /// Write the whole account document, replacing any previous version.
    fn put_account(&self, account: &Account) -> Result<()>;

    /// List every account. Used by the global slot-occupancy scan; linear
    /// over the whole store.
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Delete an account document.
    fn delete_account(&self, uid: &str) -> Result<()>;
}

/// Interface for coupon storage.
pub trait CouponStore: Send + Sync {
    /// Fetch a coupon by its (already normalized) code.
    fn get_by_code(&self, code: &str) -> Result<Option<FuelCoupon>>;

    /// Create or replace a coupon.
    fn put_coupon(&self, coupon: &FuelCoupon) -> Result<()>;

    /// Bump the global usage counter for a code.
    fn increment_usage(&self, code: &str) -> Result<()>;
}

/// Factory for repositories, abstracting the concrete connection type so
/// services can be generic over the storage backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type AccountRepository: AccountStore + Clone;
    type CouponRepository: CouponStore + Clone;

    fn create_account_repository(&self) -> Self::AccountRepository;
    fn create_coupon_repository(&self) -> Self::CouponRepository;
}
