//! Typed domain errors for the booking and fuel ledger workflow.
//!
//! Services return `anyhow::Result`; these variants are attached so the REST
//! layer can downcast and map them to user-facing responses. Pure ledger
//! functions return them directly.

/// Recoverable errors surfaced to the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("not enough fuel: have {have} L, need {need} L")]
    InsufficientFuel { have: i64, need: i64 },
    #[error("this code has already been redeemed")]
    CodeAlreadyUsed,
    #[error("the code entered is not valid")]
    InvalidCode,
    #[error("this coupon has expired")]
    CouponExpired,
    #[error("this coupon has reached its usage limit")]
    CouponExhausted,
    #[error("{0} not found")]
    NotFound(String),
    #[error("payment not confirmed: gateway reports '{status}'")]
    PaymentNotConfirmed { status: String },
}

impl DomainError {
    pub fn account_not_found(uid: &str) -> Self {
        DomainError::NotFound(format!("account {uid}"))
    }

    pub fn child_not_found(child_id: &str) -> Self {
        DomainError::NotFound(format!("child {child_id}"))
    }

    pub fn booking_not_found(booking_id: &str) -> Self {
        DomainError::NotFound(format!("booking {booking_id}"))
    }
}
