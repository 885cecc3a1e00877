use crate::domain::models::account::Progress;
use crate::domain::models::coupon::CouponKind;

#[derive(Debug, Clone)]
pub struct RedeemCodeCommand {
    pub uid: String,
    pub child_id: String,
    /// Raw user input; normalized (trimmed, uppercased) before lookup.
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct RedeemCodeResult {
    pub progress: Progress,
    pub kind: CouponKind,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub uid: String,
    pub child_id: String,
    /// Catalog package selector.
    pub liters: i64,
}

#[derive(Debug, Clone)]
pub struct CreateCheckoutResult {
    pub preference_id: String,
    pub checkout_url: String,
    /// Unit price actually charged, after any active discount.
    pub charged_price: i64,
}

#[derive(Debug, Clone)]
pub struct ConfirmPaymentCommand {
    pub uid: String,
    pub child_id: String,
    pub payment_id: String,
    /// Status claimed by the gateway's return URL; never trusted on its own.
    pub claimed_status: String,
    pub liters: i64,
}

/// Outcome of payment confirmation. Only `Approved` credits fuel.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmPaymentOutcome {
    Approved { fuel_liters: i64 },
    /// The gateway still reports the payment as in flight; nothing was
    /// credited. The claim can be retried later with the same payment id.
    Pending,
}
