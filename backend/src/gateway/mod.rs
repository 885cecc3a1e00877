//! Payment gateway abstraction.
//!
//! The booking/fuel workflow only needs two calls: create a checkout
//! preference and read back a payment's status. Everything else about the
//! gateway protocol stays behind this trait.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod mercado_pago;

pub use mercado_pago::MercadoPagoGateway;

/// One line item in a checkout preference.
#[derive(Debug, Clone, Serialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub quantity: u32,
    pub currency_id: String,
    pub unit_price: i64,
}

/// Where the gateway sends the payer back after checkout. The URLs carry a
/// claimed status that is later re-verified server-side.
#[derive(Debug, Clone, Serialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceMetadata {
    pub user_id: String,
    pub child_id: String,
    pub liters: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub back_urls: BackUrls,
    pub metadata: PreferenceMetadata,
    pub external_reference: String,
}

/// A created checkout the payer can be redirected to.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub preference_id: String,
    pub checkout_url: String,
}

/// Current state of a payment as reported by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStatus {
    pub status: String,
    pub status_detail: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_preference(&self, request: &PreferenceRequest) -> Result<CheckoutSession>;

    async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentStatus>;
}
