//! Fuel purchase flow: checkout creation and payment confirmation.
//!
//! The return URL from the gateway claims a status; that claim is never
//! trusted on its own. Fuel is credited only after the gateway itself
//! reports the payment as approved, and the active discount is consumed
//! only at that point. An abandoned checkout leaves the discount armed.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use uuid::Uuid;

use crate::gateway::{
    BackUrls, PaymentGateway, PreferenceItem, PreferenceMetadata, PreferenceRequest,
};
use crate::storage::traits::{AccountStore, Connection};

use super::catalog;
use super::commands::fuel::{
    ConfirmPaymentCommand, ConfirmPaymentOutcome, CreateCheckoutCommand, CreateCheckoutResult,
};
use super::errors::DomainError;
use super::fuel_ledger;
use super::models::account::FuelTransaction;

#[derive(Clone)]
pub struct PaymentService<C: Connection> {
    account_repository: C::AccountRepository,
    gateway: Arc<dyn PaymentGateway>,
    app_url: String,
}

impl<C: Connection> PaymentService<C> {
    pub fn new(connection: Arc<C>, gateway: Arc<dyn PaymentGateway>, app_url: String) -> Self {
        Self {
            account_repository: connection.create_account_repository(),
            gateway,
            app_url,
        }
    }

    /// Build a gateway checkout for a fuel package. Any active discount is
    /// applied to the charged price but stays armed until the payment is
    /// actually confirmed.
    pub async fn create_checkout(&self, command: CreateCheckoutCommand) -> Result<CreateCheckoutResult> {
        let account = self
            .account_repository
            .get_account(&command.uid)?
            .ok_or_else(|| DomainError::account_not_found(&command.uid))?;
        let child = account
            .child(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;
        let package = catalog::package_by_liters(command.liters)
            .ok_or_else(|| DomainError::NotFound(format!("fuel package {} L", command.liters)))?;

        let charged_price = match child.progress.active_discount {
            Some(percent) => fuel_ledger::apply_discount(package.price, percent),
            None => package.price,
        };

        let now_millis = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as u64;
        let request = PreferenceRequest {
            items: vec![PreferenceItem {
                id: format!("fuel-{}L", package.liters),
                title: format!("PIVES — {} liters of fuel", package.liters),
                description: "Fuel for booking cars on the PIVES platform".to_string(),
                quantity: 1,
                currency_id: "ARS".to_string(),
                unit_price: charged_price,
            }],
            back_urls: BackUrls {
                success: format!(
                    "{}/buy-fuel/status?status=approved&liters={}&child_id={}",
                    self.app_url, package.liters, child.id
                ),
                failure: format!("{}/buy-fuel/status?status=failure", self.app_url),
                pending: format!(
                    "{}/buy-fuel/status?status=pending&liters={}&child_id={}",
                    self.app_url, package.liters, child.id
                ),
            },
            metadata: PreferenceMetadata {
                user_id: account.uid.clone(),
                child_id: child.id.clone(),
                liters: package.liters,
            },
            external_reference: format!(
                "{}_{}_{}L_{}",
                account.uid, child.id, package.liters, now_millis
            ),
        };

        let session = self.gateway.create_preference(&request).await?;
        info!(
            "Checkout {} created for uid={} child={} ({} L at {})",
            session.preference_id, command.uid, command.child_id, package.liters, charged_price
        );

        Ok(CreateCheckoutResult {
            preference_id: session.preference_id,
            checkout_url: session.checkout_url,
            charged_price,
        })
    }

    /// Settle a payment claim from the return URL.
    ///
    /// Only a gateway-confirmed `approved` credits fuel; it also records a
    /// receipt on the account and consumes the active discount. A gateway
    /// that still reports the payment in flight yields `Pending` with no
    /// credit; any other disagreement with an `approved` claim fails with
    /// [`DomainError::PaymentNotConfirmed`].
    pub async fn confirm_payment(&self, command: ConfirmPaymentCommand) -> Result<ConfirmPaymentOutcome> {
        match command.claimed_status.as_str() {
            "approved" => {}
            "pending" | "in_process" => return Ok(ConfirmPaymentOutcome::Pending),
            other => {
                return Err(DomainError::PaymentNotConfirmed {
                    status: other.to_string(),
                }
                .into())
            }
        }

        let package = catalog::package_by_liters(command.liters)
            .ok_or_else(|| DomainError::NotFound(format!("fuel package {} L", command.liters)))?;

        let payment = self.gateway.get_payment_status(&command.payment_id).await?;
        match payment.status.as_str() {
            "approved" => {}
            "pending" | "in_process" => {
                warn!(
                    "Return URL claimed approval but payment {} is still '{}'",
                    command.payment_id, payment.status
                );
                return Ok(ConfirmPaymentOutcome::Pending);
            }
            other => {
                warn!(
                    "Refusing fuel credit: payment {} is '{}' ({})",
                    command.payment_id, other, payment.status_detail
                );
                return Err(DomainError::PaymentNotConfirmed {
                    status: other.to_string(),
                }
                .into());
            }
        }

        let account = self
            .account_repository
            .get_account(&command.uid)?
            .ok_or_else(|| DomainError::account_not_found(&command.uid))?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;
        let child = &account.children[child_index];

        let progress = fuel_ledger::clear_discount(&fuel_ledger::credit(&child.progress, package.liters));
        let fuel_liters = progress.fuel_liters;

        let mut updated = account.with_child_replaced(child_index, child.with_progress(progress));
        updated.fuel_transactions.push(FuelTransaction {
            id: Uuid::new_v4().to_string(),
            child_id: command.child_id.clone(),
            package_liters: package.liters,
            package_price: package.price,
            payment_id: command.payment_id.clone(),
            status: "approved".to_string(),
            created_at: Utc::now(),
        });
        self.account_repository.put_account(&updated)?;

        info!(
            "Credited {} L to child {} after payment {}",
            package.liters, command.child_id, command.payment_id
        );
        Ok(ConfirmPaymentOutcome::Approved { fuel_liters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CheckoutSession, PaymentStatus};
    use crate::storage::yaml::test_utils::test_account;
    use crate::storage::YamlConnection;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Gateway double with a scripted payment status.
    struct StubGateway {
        payment_status: Mutex<String>,
        status_queries: Mutex<u32>,
    }

    impl StubGateway {
        fn reporting(status: &str) -> Arc<Self> {
            Arc::new(Self {
                payment_status: Mutex::new(status.to_string()),
                status_queries: Mutex::new(0),
            })
        }

        fn queries(&self) -> u32 {
            *self.status_queries.lock().unwrap()
        }
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_preference(&self, request: &PreferenceRequest) -> Result<CheckoutSession> {
            Ok(CheckoutSession {
                preference_id: format!("pref-{}", request.external_reference),
                checkout_url: "https://checkout.example/pref".to_string(),
            })
        }

        async fn get_payment_status(&self, _payment_id: &str) -> Result<PaymentStatus> {
            *self.status_queries.lock().unwrap() += 1;
            Ok(PaymentStatus {
                status: self.payment_status.lock().unwrap().clone(),
                status_detail: "stubbed".to_string(),
            })
        }
    }

    struct Fixture {
        service: PaymentService<YamlConnection>,
        accounts: <YamlConnection as Connection>::AccountRepository,
        gateway: Arc<StubGateway>,
        _temp_dir: TempDir,
    }

    fn setup(gateway: Arc<StubGateway>) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(YamlConnection::new(temp_dir.path()).unwrap());
        let accounts = connection.create_account_repository();
        Fixture {
            service: PaymentService::new(
                connection,
                gateway.clone(),
                "https://pives.example".to_string(),
            ),
            accounts,
            gateway,
            _temp_dir: temp_dir,
        }
    }

    fn confirm(uid: &str, child_id: &str, claimed: &str, liters: i64) -> ConfirmPaymentCommand {
        ConfirmPaymentCommand {
            uid: uid.to_string(),
            child_id: child_id.to_string(),
            payment_id: "pay-123".to_string(),
            claimed_status: claimed.to_string(),
            liters,
        }
    }

    #[tokio::test]
    async fn test_checkout_applies_discount_without_consuming_it() {
        let fx = setup(StubGateway::reporting("approved"));
        let mut account = test_account("uid-1", &["Emma"]);
        account.children[0].progress.active_discount = Some(10);
        fx.accounts.put_account(&account).unwrap();

        let result = fx
            .service
            .create_checkout(CreateCheckoutCommand {
                uid: "uid-1".to_string(),
                child_id: account.children[0].id.clone(),
                liters: 5,
            })
            .await
            .unwrap();
        // 22_500 minus 10%.
        assert_eq!(result.charged_price, 20_250);
        assert!(result.checkout_url.starts_with("https://checkout.example"));

        // The discount survives checkout creation; an abandoned payment
        // can retry with it.
        let stored = fx.accounts.get_account("uid-1").unwrap().unwrap();
        assert_eq!(stored.children[0].progress.active_discount, Some(10));
    }

    #[tokio::test]
    async fn test_checkout_unknown_package_is_refused() {
        let fx = setup(StubGateway::reporting("approved"));
        let account = test_account("uid-1", &["Emma"]);
        fx.accounts.put_account(&account).unwrap();

        let err = fx
            .service
            .create_checkout(CreateCheckoutCommand {
                uid: "uid-1".to_string(),
                child_id: account.children[0].id.clone(),
                liters: 3,
            })
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_confirmed_payment_credits_fuel_and_clears_discount() {
        let fx = setup(StubGateway::reporting("approved"));
        let mut account = test_account("uid-1", &["Emma"]);
        account.children[0].progress.active_discount = Some(10);
        fx.accounts.put_account(&account).unwrap();
        let child_id = account.children[0].id.clone();

        let outcome = fx
            .service
            .confirm_payment(confirm("uid-1", &child_id, "approved", 5))
            .await
            .unwrap();
        assert_eq!(outcome, ConfirmPaymentOutcome::Approved { fuel_liters: 15 });

        let stored = fx.accounts.get_account("uid-1").unwrap().unwrap();
        assert_eq!(stored.children[0].progress.fuel_liters, 15);
        assert_eq!(stored.children[0].progress.active_discount, None);
        assert_eq!(stored.fuel_transactions.len(), 1);
        assert_eq!(stored.fuel_transactions[0].payment_id, "pay-123");
        assert_eq!(stored.fuel_transactions[0].package_liters, 5);
    }

    #[tokio::test]
    async fn test_gateway_pending_overrides_approved_claim() {
        // The return URL claims approval but the gateway still says
        // pending: no credit, pending outcome.
        let fx = setup(StubGateway::reporting("pending"));
        let account = test_account("uid-1", &["Emma"]);
        fx.accounts.put_account(&account).unwrap();
        let child_id = account.children[0].id.clone();

        let outcome = fx
            .service
            .confirm_payment(confirm("uid-1", &child_id, "approved", 5))
            .await
            .unwrap();
        assert_eq!(outcome, ConfirmPaymentOutcome::Pending);

        let stored = fx.accounts.get_account("uid-1").unwrap().unwrap();
        assert_eq!(stored.children[0].progress.fuel_liters, 10);
        assert!(stored.fuel_transactions.is_empty());
    }

    #[tokio::test]
    async fn test_gateway_rejection_fails_without_credit() {
        let fx = setup(StubGateway::reporting("rejected"));
        let account = test_account("uid-1", &["Emma"]);
        fx.accounts.put_account(&account).unwrap();
        let child_id = account.children[0].id.clone();

        let err = fx
            .service
            .confirm_payment(confirm("uid-1", &child_id, "approved", 5))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<DomainError>(),
            Some(&DomainError::PaymentNotConfirmed { status: "rejected".to_string() })
        );

        let stored = fx.accounts.get_account("uid-1").unwrap().unwrap();
        assert_eq!(stored.children[0].progress.fuel_liters, 10);
    }

    #[tokio::test]
    async fn test_pending_claim_never_queries_gateway_or_credits() {
        let fx = setup(StubGateway::reporting("approved"));
        let account = test_account("uid-1", &["Emma"]);
        fx.accounts.put_account(&account).unwrap();
        let child_id = account.children[0].id.clone();

        let outcome = fx
            .service
            .confirm_payment(confirm("uid-1", &child_id, "pending", 5))
            .await
            .unwrap();
        assert_eq!(outcome, ConfirmPaymentOutcome::Pending);
        assert_eq!(fx.gateway.queries(), 0);
    }

    #[tokio::test]
    async fn test_failure_claim_is_not_confirmed() {
        let fx = setup(StubGateway::reporting("approved"));
        let account = test_account("uid-1", &["Emma"]);
        fx.accounts.put_account(&account).unwrap();
        let child_id = account.children[0].id.clone();

        let err = fx
            .service
            .confirm_payment(confirm("uid-1", &child_id, "failure", 5))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::PaymentNotConfirmed { .. })
        ));
        assert_eq!(fx.gateway.queries(), 0);
    }
}
