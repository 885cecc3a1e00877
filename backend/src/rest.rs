//! Axum handlers for the booking and fuel API.
//!
//! Handlers are thin: translate the wire types, call one service, map the
//! result. All routes are scoped by the authenticated uid carried in the
//! path; the identity is trusted as supplied by the auth layer in front of
//! this service.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::commands::bookings::{
    BookingOutcome, CancelBookingCommand, CompleteBookingCommand, ReassignBookingCommand,
    RequestBookingCommand,
};
use crate::domain::commands::children::{
    AddChildCommand, CompleteLevelCommand, CreateAccountCommand, EquipAccessoryCommand,
    SetFamilyCardCommand, SetOnboardingCompleteCommand, UnlockAccessoryCommand,
};
use crate::domain::commands::fuel::{
    ConfirmPaymentCommand, ConfirmPaymentOutcome, CreateCheckoutCommand, RedeemCodeCommand,
};
use crate::domain::commands::reminders::{
    AcknowledgeReminderCommand, CheckRemindersCommand, ReminderKind, ReprogramReminderCommand,
};
use crate::domain::models::account::Guardian;
use crate::domain::models::coupon::CouponKind;
use crate::domain::{
    catalog, notifications, AccountService, BookingService, CouponService, DomainError,
    PaymentService, ReminderService, SlotResolver,
};
use crate::gateway::PaymentGateway;
use crate::storage::YamlConnection;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService<YamlConnection>,
    pub booking_service: BookingService<YamlConnection>,
    pub coupon_service: CouponService<YamlConnection>,
    pub payment_service: PaymentService<YamlConnection>,
    pub reminder_service: ReminderService<YamlConnection>,
    pub slot_resolver: SlotResolver<YamlConnection>,
}

impl AppState {
    pub fn new(
        connection: Arc<YamlConnection>,
        gateway: Arc<dyn PaymentGateway>,
        app_url: String,
    ) -> Self {
        let booking_service = BookingService::new(connection.clone());
        Self {
            account_service: AccountService::new(connection.clone()),
            coupon_service: CouponService::new(connection.clone()),
            payment_service: PaymentService::new(connection.clone(), gateway, app_url),
            reminder_service: ReminderService::new(connection.clone(), booking_service.clone()),
            slot_resolver: SlotResolver::new(connection),
            booking_service,
        }
    }
}

/// All API routes under `/api`, plus a bare health probe.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/accounts/:uid",
            post(create_account).get(get_account).delete(delete_account),
        )
        .route("/accounts/:uid/children", post(add_child))
        .route("/accounts/:uid/bookings/reassign", post(reassign_booking))
        .route("/accounts/:uid/children/:child_id/bookings", post(request_booking))
        .route(
            "/accounts/:uid/children/:child_id/bookings/:booking_id/cancel",
            post(cancel_booking),
        )
        .route(
            "/accounts/:uid/children/:child_id/bookings/:booking_id/complete",
            post(complete_booking),
        )
        .route(
            "/accounts/:uid/children/:child_id/bookings/:booking_id/links",
            get(notification_links),
        )
        .route("/accounts/:uid/children/:child_id/reminder", get(check_reminder))
        .route("/accounts/:uid/children/:child_id/reminder/ack", post(acknowledge_reminder))
        .route(
            "/accounts/:uid/children/:child_id/reminder/reprogram",
            post(reprogram_reminder),
        )
        .route("/accounts/:uid/children/:child_id/redeem", post(redeem_code))
        .route("/accounts/:uid/children/:child_id/checkout", post(create_checkout))
        .route(
            "/accounts/:uid/children/:child_id/payments/confirm",
            post(confirm_payment),
        )
        .route("/accounts/:uid/children/:child_id/level-complete", post(complete_level))
        .route("/accounts/:uid/children/:child_id/family-card", post(set_family_card))
        .route(
            "/accounts/:uid/children/:child_id/onboarding/complete",
            post(complete_onboarding),
        )
        .route(
            "/accounts/:uid/children/:child_id/accessories/unlock",
            post(unlock_accessory),
        )
        .route(
            "/accounts/:uid/children/:child_id/accessories/equip",
            post(equip_accessory),
        )
        .route("/slots", get(occupied_slots))
        .route("/catalog/cars", get(list_cars))
        .route("/catalog/packages", get(list_packages));

    Router::new()
        .nest("/api", api)
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Map a service error onto a status code. Typed domain errors are
/// user-recoverable; everything else is a 500.
fn error_response(e: anyhow::Error) -> Response {
    let status = match e.downcast_ref::<DomainError>() {
        Some(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
        Some(DomainError::PaymentNotConfirmed { .. }) => StatusCode::PAYMENT_REQUIRED,
        Some(_) => StatusCode::CONFLICT,
        None => {
            error!("Request failed: {:#}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: "internal error".to_string() }),
            )
                .into_response();
        }
    };
    (status, Json(ErrorBody { error: e.to_string() })).into_response()
}

fn parse_date(date: &str) -> Result<NaiveDate, Response> {
    date.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody { error: format!("invalid date: {date}") }),
        )
            .into_response()
    })
}

fn reminder_kind(kind: shared::ReminderKind) -> ReminderKind {
    match kind {
        shared::ReminderKind::DayBefore => ReminderKind::DayBefore,
        shared::ReminderKind::SameDay => ReminderKind::SameDay,
    }
}

async fn create_account(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<shared::CreateAccountRequest>,
) -> Response {
    info!("POST /api/accounts/{}", uid);
    let command = CreateAccountCommand {
        uid,
        guardian: Guardian {
            name: request.guardian.name,
            email: request.guardian.email,
            phone: request.guardian.phone,
        },
    };
    match state.account_service.create_account(command) {
        Ok(result) => {
            let body: shared::Account = (&result.account).into();
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn get_account(State(state): State<AppState>, Path(uid): Path<String>) -> Response {
    match state.account_service.get_account(&uid) {
        Ok(account) => {
            let body: shared::Account = (&account).into();
            Json(body).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn delete_account(State(state): State<AppState>, Path(uid): Path<String>) -> Response {
    info!("DELETE /api/accounts/{}", uid);
    match state.account_service.delete_account(&uid) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn add_child(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<shared::AddChildRequest>,
) -> Response {
    info!("POST /api/accounts/{}/children", uid);
    let command = AddChildCommand {
        uid,
        name: request.name,
        avatar: request.avatar,
        gender: request.gender.into(),
    };
    match state.account_service.add_child(command) {
        Ok(result) => {
            let body: shared::Child = (&result.child).into();
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn request_booking(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::BookingRequest>,
) -> Response {
    info!("POST /api/accounts/{}/children/{}/bookings", uid, child_id);
    let date = match parse_date(&request.date) {
        Ok(date) => date,
        Err(response) => return response,
    };
    let command = RequestBookingCommand {
        uid,
        child_id,
        car_id: request.car_id,
        date,
        time: request.time,
    };
    match state.booking_service.request_booking(command) {
        Ok(BookingOutcome::Created { booking, fuel_liters }) => {
            let body = shared::BookingResponse::Created {
                booking: (&booking).into(),
                fuel_liters,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Ok(BookingOutcome::Conflict { candidates }) => {
            let body = shared::BookingResponse::Conflict {
                message: "There is already a booking at this time. Pick another slot or book for a sibling.".to_string(),
                candidates: candidates.iter().map(Into::into).collect(),
            };
            (StatusCode::CONFLICT, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn reassign_booking(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(request): Json<shared::ReassignBookingRequest>,
) -> Response {
    info!("POST /api/accounts/{}/bookings/reassign", uid);
    let date = match parse_date(&request.date) {
        Ok(date) => date,
        Err(response) => return response,
    };
    let command = ReassignBookingCommand {
        uid,
        target_child_id: request.target_child_id,
        car_id: request.car_id,
        date,
        time: request.time,
    };
    match state.booking_service.reassign_booking(command) {
        Ok(result) => {
            let body = shared::BookingActionResponse {
                booking: (&result.booking).into(),
                fuel_liters: result.fuel_liters,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path((uid, child_id, booking_id)): Path<(String, String, String)>,
) -> Response {
    info!("POST cancel booking {} for {}/{}", booking_id, uid, child_id);
    let command = CancelBookingCommand { uid, child_id, booking_id };
    match state.booking_service.cancel_booking(command) {
        Ok(result) => Json(shared::BookingActionResponse {
            booking: (&result.booking).into(),
            fuel_liters: result.fuel_liters,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn complete_booking(
    State(state): State<AppState>,
    Path((uid, child_id, booking_id)): Path<(String, String, String)>,
) -> Response {
    info!("POST complete booking {} for {}/{}", booking_id, uid, child_id);
    let command = CompleteBookingCommand { uid, child_id, booking_id };
    match state.booking_service.complete_booking(command) {
        Ok(result) => {
            let booking: shared::Booking = (&result.booking).into();
            Json(booking).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn notification_links(
    State(state): State<AppState>,
    Path((uid, child_id, booking_id)): Path<(String, String, String)>,
) -> Response {
    let account = match state.account_service.get_account(&uid) {
        Ok(account) => account,
        Err(e) => return error_response(e),
    };
    let Some(child) = account.child(&child_id) else {
        return error_response(DomainError::child_not_found(&child_id).into());
    };
    let Some(booking) = child.booking(&booking_id) else {
        return error_response(DomainError::booking_not_found(&booking_id).into());
    };

    Json(shared::NotificationLinksResponse {
        calendar_url: notifications::calendar_link(&child.name, booking),
        whatsapp_url: notifications::whatsapp_link(&account.guardian, &child.name, booking),
    })
    .into_response()
}

async fn check_reminder(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
) -> Response {
    let command = CheckRemindersCommand { uid, child_id };
    match state.reminder_service.check_reminders(command) {
        Ok(result) => {
            let reminder = result.reminder.map(|due| shared::Reminder {
                booking: (&due.booking).into(),
                kind: match due.kind {
                    ReminderKind::DayBefore => shared::ReminderKind::DayBefore,
                    ReminderKind::SameDay => shared::ReminderKind::SameDay,
                },
            });
            Json(shared::ReminderResponse { reminder }).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn acknowledge_reminder(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::ReminderActionRequest>,
) -> Response {
    let command = AcknowledgeReminderCommand {
        uid,
        child_id,
        booking_id: request.booking_id,
        kind: reminder_kind(request.kind),
    };
    match state.reminder_service.acknowledge(command) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn reprogram_reminder(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::ReminderActionRequest>,
) -> Response {
    let command = ReprogramReminderCommand {
        uid,
        child_id,
        booking_id: request.booking_id,
        kind: reminder_kind(request.kind),
    };
    match state.reminder_service.reprogram(command) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn redeem_code(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::RedeemRequest>,
) -> Response {
    let command = RedeemCodeCommand { uid, child_id, code: request.code };
    match state.coupon_service.redeem_code(command) {
        Ok(result) => {
            let message = match result.kind {
                CouponKind::Liters => {
                    format!("Congratulations! You redeemed {} liters of fuel.", result.value)
                }
                CouponKind::Discount => {
                    format!("A {}% discount is ready for your next purchase.", result.value)
                }
            };
            Json(shared::RedeemResponse {
                message,
                fuel_liters: result.progress.fuel_liters,
                active_discount: result.progress.active_discount,
            })
            .into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn create_checkout(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::CheckoutRequest>,
) -> Response {
    info!("POST checkout {} L for {}/{}", request.liters, uid, child_id);
    let command = CreateCheckoutCommand { uid, child_id, liters: request.liters };
    match state.payment_service.create_checkout(command).await {
        Ok(result) => Json(shared::CheckoutResponse {
            preference_id: result.preference_id,
            checkout_url: result.checkout_url,
            charged_price: result.charged_price,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn confirm_payment(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::ConfirmPaymentRequest>,
) -> Response {
    info!("POST confirm payment {} for {}/{}", request.payment_id, uid, child_id);
    let command = ConfirmPaymentCommand {
        uid,
        child_id,
        payment_id: request.payment_id,
        claimed_status: request.claimed_status,
        liters: request.liters,
    };
    match state.payment_service.confirm_payment(command).await {
        Ok(ConfirmPaymentOutcome::Approved { fuel_liters }) => {
            Json(shared::ConfirmPaymentResponse::Approved { fuel_liters }).into_response()
        }
        Ok(ConfirmPaymentOutcome::Pending) => {
            Json(shared::ConfirmPaymentResponse::Pending).into_response()
        }
        Err(e) => {
            if matches!(
                e.downcast_ref::<DomainError>(),
                Some(DomainError::PaymentNotConfirmed { .. })
            ) {
                (
                    StatusCode::PAYMENT_REQUIRED,
                    Json(shared::ConfirmPaymentResponse::Failure { message: e.to_string() }),
                )
                    .into_response()
            } else {
                error_response(e)
            }
        }
    }
}

async fn complete_level(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::LevelCompleteRequest>,
) -> Response {
    let command = CompleteLevelCommand { uid, child_id, level_index: request.level_index };
    match state.account_service.complete_level(command) {
        Ok(result) => Json(shared::LevelCompleteResponse {
            progress: (&result.progress).into(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn set_family_card(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::FamilyCardRequest>,
) -> Response {
    let command = SetFamilyCardCommand { uid, child_id, index: request.index };
    match state.account_service.set_family_card(command) {
        Ok(progress) => {
            let body: shared::Progress = (&progress).into();
            Json(body).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn complete_onboarding(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
) -> Response {
    let command = SetOnboardingCompleteCommand { uid, child_id };
    match state.account_service.set_onboarding_complete(command) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn unlock_accessory(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::UnlockAccessoryRequest>,
) -> Response {
    let command = UnlockAccessoryCommand { uid, child_id, accessory_id: request.accessory_id };
    match state.account_service.unlock_accessory(command) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn equip_accessory(
    State(state): State<AppState>,
    Path((uid, child_id)): Path<(String, String)>,
    Json(request): Json<shared::EquipAccessoryRequest>,
) -> Response {
    let command = EquipAccessoryCommand { uid, child_id, accessory_id: request.accessory_id };
    match state.account_service.equip_accessory(command) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct SlotsQuery {
    car_id: String,
    date: String,
}

async fn occupied_slots(State(state): State<AppState>, Query(query): Query<SlotsQuery>) -> Response {
    let date = match parse_date(&query.date) {
        Ok(date) => date,
        Err(response) => return response,
    };
    match state.slot_resolver.globally_booked_slots(&query.car_id, date) {
        Ok(times) => Json(shared::OccupiedSlotsResponse { times }).into_response(),
        Err(e) => error_response(e),
    }
}

async fn list_cars() -> Json<Vec<shared::CarModel>> {
    Json(catalog::CAR_MODELS.iter().map(Into::into).collect())
}

async fn list_packages() -> Json<Vec<shared::FuelPackage>> {
    Json(
        catalog::FUEL_PACKAGES
            .iter()
            .map(|p| shared::FuelPackage {
                liters: p.liters,
                price: p.price,
                bonus: p.bonus.map(str::to_string),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CheckoutSession, PaymentStatus, PreferenceRequest};
    use anyhow::Result;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct NoopGateway;

    #[async_trait]
    impl PaymentGateway for NoopGateway {
        async fn create_preference(&self, _request: &PreferenceRequest) -> Result<CheckoutSession> {
            Ok(CheckoutSession {
                preference_id: "pref-test".to_string(),
                checkout_url: "https://checkout.example/pref-test".to_string(),
            })
        }

        async fn get_payment_status(&self, _payment_id: &str) -> Result<PaymentStatus> {
            Ok(PaymentStatus {
                status: "approved".to_string(),
                status_detail: "accredited".to_string(),
            })
        }
    }

    fn setup() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(YamlConnection::new(temp_dir.path()).unwrap());
        let state = AppState::new(
            connection,
            Arc::new(NoopGateway),
            "https://pives.example".to_string(),
        );
        (state, temp_dir)
    }

    #[tokio::test]
    async fn test_account_lifecycle_through_handlers() {
        let (state, _dir) = setup();

        let request = shared::CreateAccountRequest {
            guardian: shared::Guardian {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: "5491100000000".to_string(),
            },
        };
        let response =
            create_account(State(state.clone()), Path("uid-1".to_string()), Json(request)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = get_account(State(state.clone()), Path("uid-1".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_account(State(state), Path("uid-missing".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_booking_conflict_maps_to_409() {
        let (state, _dir) = setup();

        create_account(
            State(state.clone()),
            Path("uid-1".to_string()),
            Json(shared::CreateAccountRequest {
                guardian: shared::Guardian {
                    name: "Ana".to_string(),
                    email: "ana@example.com".to_string(),
                    phone: String::new(),
                },
            }),
        )
        .await;
        let child_response = add_child(
            State(state.clone()),
            Path("uid-1".to_string()),
            Json(shared::AddChildRequest {
                name: "Emma".to_string(),
                avatar: "🦊".to_string(),
                gender: shared::Gender::Female,
            }),
        )
        .await;
        assert_eq!(child_response.status(), StatusCode::CREATED);

        let account = state.account_service.get_account("uid-1").unwrap();
        let child_id = account.children[0].id.clone();
        let booking = shared::BookingRequest {
            car_id: "car1".to_string(),
            date: "2025-01-17".to_string(),
            time: "10:00".to_string(),
        };

        let first = request_booking(
            State(state.clone()),
            Path(("uid-1".to_string(), child_id.clone())),
            Json(booking.clone()),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second =
            request_booking(State(state), Path(("uid-1".to_string(), child_id)), Json(booking))
                .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_date_maps_to_400() {
        let (state, _dir) = setup();
        let response = occupied_slots(
            State(state),
            Query(SlotsQuery {
                car_id: "car1".to_string(),
                date: "not-a-date".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
