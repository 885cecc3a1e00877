//! Mercado Pago HTTP client for the [`PaymentGateway`] trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::{CheckoutSession, PaymentGateway, PaymentStatus, PreferenceRequest};

const DEFAULT_API_BASE: &str = "https://api.mercadopago.com";

pub struct MercadoPagoGateway {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    id: String,
    #[serde(default)]
    init_point: Option<String>,
    #[serde(default)]
    sandbox_init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    status: String,
    #[serde(default)]
    status_detail: String,
}

impl MercadoPagoGateway {
    pub fn new(access_token: String) -> Self {
        Self::with_api_base(access_token, DEFAULT_API_BASE.to_string())
    }

    /// Point the client at a different API base (used against sandboxes).
    pub fn with_api_base(access_token: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            access_token,
        }
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoGateway {
    async fn create_preference(&self, request: &PreferenceRequest) -> Result<CheckoutSession> {
        debug!("Creating checkout preference: {}", request.external_reference);

        let response = self
            .client
            .post(format!("{}/checkout/preferences", self.api_base))
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .context("Failed to reach the payment gateway")?
            .error_for_status()
            .context("Payment gateway rejected the preference")?
            .json::<PreferenceResponse>()
            .await
            .context("Malformed preference response")?;

        // Production init point when available, sandbox otherwise.
        let checkout_url = response
            .init_point
            .or(response.sandbox_init_point)
            .context("Preference response carried no checkout URL")?;

        info!("Created checkout preference {}", response.id);
        Ok(CheckoutSession {
            preference_id: response.id,
            checkout_url,
        })
    }

    async fn get_payment_status(&self, payment_id: &str) -> Result<PaymentStatus> {
        let response = self
            .client
            .get(format!("{}/v1/payments/{}", self.api_base, payment_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("Failed to reach the payment gateway")?
            .error_for_status()
            .context("Payment gateway rejected the status query")?
            .json::<PaymentResponse>()
            .await
            .context("Malformed payment response")?;

        debug!("Payment {} is '{}'", payment_id, response.status);
        Ok(PaymentStatus {
            status: response.status,
            status_detail: response.status_detail,
        })
    }
}
