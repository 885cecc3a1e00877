//! Fuel ledger: pure balance transitions over a child's [`Progress`].
//!
//! Nothing here persists anything. Every function returns the new progress
//! value (and, for redemption, the new used-codes list) for the caller to
//! write back as part of a whole-account update.

use tracing::debug;

use super::errors::DomainError;
use super::models::account::Progress;
use super::models::coupon::CouponKind;

/// Debit `amount` liters. Fails with [`DomainError::InsufficientFuel`] when
/// the balance does not cover it; the balance can never go negative through
/// a debit.
pub fn debit(progress: &Progress, amount: i64) -> Result<Progress, DomainError> {
    if progress.fuel_liters < amount {
        return Err(DomainError::InsufficientFuel {
            have: progress.fuel_liters,
            need: amount,
        });
    }
    Ok(progress.with_fuel_liters(progress.fuel_liters - amount))
}

/// Credit `amount` liters. There is no upper bound on the balance.
pub fn credit(progress: &Progress, amount: i64) -> Progress {
    progress.with_fuel_liters(progress.fuel_liters + amount)
}

/// Apply a redeemed code to the progress.
///
/// `liters` codes credit fuel; `discount` codes set the active discount,
/// overwriting any previous one (last redeemed wins, discounts do not
/// stack). The code is appended to the used list; a code already present
/// fails with [`DomainError::CodeAlreadyUsed`] and changes nothing.
pub fn redeem(
    progress: &Progress,
    code: &str,
    used_codes: &[String],
    value: i64,
    kind: CouponKind,
) -> Result<(Progress, Vec<String>), DomainError> {
    if used_codes.iter().any(|c| c == code) {
        return Err(DomainError::CodeAlreadyUsed);
    }

    let updated = match kind {
        CouponKind::Liters => credit(progress, value),
        CouponKind::Discount => progress.with_active_discount(Some(value.clamp(0, 100) as u8)),
    };

    let mut codes = used_codes.to_vec();
    codes.push(code.to_string());

    debug!(code, ?kind, value, "code applied to progress");
    Ok((updated, codes))
}

/// Price after an active percentage discount, rounded to the nearest unit.
pub fn apply_discount(price: i64, percent: u8) -> i64 {
    let factor = 1.0 - f64::from(percent.min(100)) / 100.0;
    (price as f64 * factor).round() as i64
}

/// Drop the active discount. Called only after a confirmed payment; an
/// abandoned checkout keeps the discount available for retry.
pub fn clear_discount(progress: &Progress) -> Progress {
    progress.with_active_discount(None)
}
