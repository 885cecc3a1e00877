//! Domain model for redeemable fuel coupons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a coupon grants when redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Credits `value` liters of fuel.
    Liters,
    /// Sets an active discount of `value` percent on the next purchase.
    Discount,
}

/// A redeemable code. Stored under its uppercase code; usage is counted
/// globally, while per-child reuse is tracked on the child itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelCoupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: i64,
    #[serde(default)]
    pub description: String,
    /// None means unlimited uses.
    #[serde(default)]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub times_used: u32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl FuelCoupon {
    /// Canonical storage form of a user-entered code.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expiry) if now > expiry)
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.max_uses, Some(cap) if self.times_used >= cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(max_uses: Option<u32>, times_used: u32, expires_at: Option<DateTime<Utc>>) -> FuelCoupon {
        FuelCoupon {
            code: "PIVESPROMO5".to_string(),
            kind: CouponKind::Liters,
            value: 5,
            description: "Promo".to_string(),
            max_uses,
            times_used,
            expires_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(FuelCoupon::normalize_code("  pivespromo5 "), "PIVESPROMO5");
        assert_eq!(FuelCoupon::normalize_code("PIVESPROMO5"), "PIVESPROMO5");
    }

    #[test]
    fn test_unlimited_coupon_never_exhausts() {
        assert!(!coupon(None, 10_000, None).is_exhausted());
    }

    #[test]
    fn test_capped_coupon_exhausts_at_cap() {
        assert!(!coupon(Some(3), 2, None).is_exhausted());
        assert!(coupon(Some(3), 3, None).is_exhausted());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        assert!(!coupon(None, 0, None).is_expired(now));
        assert!(!coupon(None, 0, Some(now + Duration::days(1))).is_expired(now));
        assert!(coupon(None, 0, Some(now - Duration::days(1))).is_expired(now));
    }
}
