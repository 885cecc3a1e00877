//! Coupon redemption: validates a code and applies it to a child.
//!
//! Usage is counted in two places with different scopes: the coupon's
//! `times_used` counter is global across all accounts, while reuse of a
//! code is blocked per child through the child's own used-codes list.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::storage::traits::{AccountStore, Connection, CouponStore};

use super::commands::fuel::{RedeemCodeCommand, RedeemCodeResult};
use super::errors::DomainError;
use super::fuel_ledger;
use super::models::coupon::FuelCoupon;

#[derive(Clone)]
pub struct CouponService<C: Connection> {
    account_repository: C::AccountRepository,
    coupon_repository: C::CouponRepository,
}

impl<C: Connection> CouponService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            account_repository: connection.create_account_repository(),
            coupon_repository: connection.create_coupon_repository(),
        }
    }

    /// Redeem a code for a child. Liters coupons credit fuel immediately;
    /// discount coupons arm a percentage for the next confirmed purchase.
    pub fn redeem_code(&self, command: RedeemCodeCommand) -> Result<RedeemCodeResult> {
        let code = FuelCoupon::normalize_code(&command.code);
        info!("Redeem attempt: uid={} child={} code={}", command.uid, command.child_id, code);

        let coupon = self
            .coupon_repository
            .get_by_code(&code)?
            .ok_or(DomainError::InvalidCode)?;

        if coupon.is_expired(Utc::now()) {
            return Err(DomainError::CouponExpired.into());
        }
        if coupon.is_exhausted() {
            return Err(DomainError::CouponExhausted.into());
        }

        let account = self
            .account_repository
            .get_account(&command.uid)?
            .ok_or_else(|| DomainError::account_not_found(&command.uid))?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;
        let child = &account.children[child_index];

        let (progress, used_codes) = fuel_ledger::redeem(
            &child.progress,
            &code,
            &child.used_codes,
            coupon.value,
            coupon.kind,
        )?;

        let mut updated_child = child.with_progress(progress.clone());
        updated_child.used_codes = used_codes;
        let updated = account.with_child_replaced(child_index, updated_child);
        self.account_repository.put_account(&updated)?;

        self.coupon_repository.increment_usage(&code)?;

        info!(
            "Redeemed {} ({:?} {}) for child {}",
            code, coupon.kind, coupon.value, command.child_id
        );
        Ok(RedeemCodeResult {
            progress,
            kind: coupon.kind,
            value: coupon.value,
        })
    }
}
