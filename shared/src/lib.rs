use serde::{Deserialize, Serialize};

/// Guardian contact info attached to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Gender tag used for avatar/theme selection in the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Per-child gamification and currency state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// Minor reward counter; four wheels roll up into one steering wheel.
    pub wheels: u32,
    /// Major reward counter; four steering wheels unlock the next milestone.
    pub steering_wheels: u32,
    /// Unlocked milestone keys, in unlock order.
    pub milestones: Vec<String>,
    /// Highest quiz level reached (monotonically non-decreasing).
    pub quiz_level: u32,
    /// Fuel balance in liters.
    pub fuel_liters: i64,
    /// Index of the current family activity card.
    pub family_card_index: u32,
    /// Active discount percentage (0-100), cleared after a confirmed payment.
    pub active_discount: Option<u8>,
}

/// Which reminders have already been shown for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemindersSent {
    pub day_before: bool,
    pub same_day: bool,
}

/// Booking status as rendered by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

/// Vehicle catalog entry; embedded by value into bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarModel {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price_per_slot: i64,
}

/// A reserved vehicle slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub status: BookingStatus,
    /// Calendar date, YYYY-MM-DD.
    pub date: String,
    /// Slot start time, HH:MM, from the fixed quarter-hour catalog.
    pub time: String,
    /// Snapshot of the car at booking time; later catalog changes do not
    /// affect existing bookings.
    pub car: CarModel,
    pub reminders_sent: RemindersSent,
}

/// Cosmetic accessories unlocked by a child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessories {
    pub unlocked: Vec<String>,
    pub equipped: Option<String>,
}

/// One enrolled child within an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub gender: Gender,
    pub progress: Progress,
    pub bookings: Vec<Booking>,
    pub onboarding_complete: bool,
    pub accessories: Accessories,
    pub used_codes: Vec<String>,
}

/// Receipt for a completed fuel purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelTransaction {
    pub id: String,
    pub child_id: String,
    pub package_liters: i64,
    pub package_price: i64,
    pub payment_id: String,
    pub status: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

/// The whole guardian account, read and written as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub uid: String,
    pub guardian: Guardian,
    pub children: Vec<Child>,
    pub is_admin: bool,
    pub fuel_transactions: Vec<FuelTransaction>,
}

/// Purchasable fuel package from the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPackage {
    pub liters: i64,
    pub price: i64,
    pub bonus: Option<String>,
}

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub guardian: Guardian,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddChildRequest {
    pub name: String,
    pub avatar: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub car_id: String,
    /// YYYY-MM-DD.
    pub date: String,
    /// HH:MM slot value.
    pub time: String,
}

/// Slimmed-down child used when offering reassignment candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRef {
    pub id: String,
    pub name: String,
    pub fuel_liters: i64,
}

/// Outcome of a booking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookingResponse {
    /// The booking was created against the requesting child.
    Created { booking: Booking, fuel_liters: i64 },
    /// The child already has an active booking at that date and time.
    /// `candidates` lists siblings the booking could be reassigned to;
    /// empty means the request is refused outright.
    Conflict {
        message: String,
        candidates: Vec<ChildRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignBookingRequest {
    pub target_child_id: String,
    pub car_id: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingActionResponse {
    pub booking: Booking,
    /// Fuel balance of the owning child after the action.
    pub fuel_liters: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemResponse {
    pub message: String,
    pub fuel_liters: i64,
    pub active_discount: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Package selector; must match a catalog package.
    pub liters: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub preference_id: String,
    pub checkout_url: String,
    /// Unit price actually charged, after any active discount.
    pub charged_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Payment id returned by the gateway in the back URL.
    pub payment_id: String,
    /// Status claimed by the return URL; verified against the gateway
    /// before any fuel is credited.
    pub claimed_status: String,
    pub liters: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConfirmPaymentResponse {
    Approved { fuel_liters: i64 },
    Pending,
    Failure { message: String },
}

/// Kind of reminder due for a booking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderKind {
    DayBefore,
    SameDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub booking: Booking,
    pub kind: ReminderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderResponse {
    pub reminder: Option<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderActionRequest {
    pub booking_id: String,
    pub kind: ReminderKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCompleteRequest {
    /// Index of the quiz level the child just finished.
    pub level_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCompleteResponse {
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyCardRequest {
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockAccessoryRequest {
    pub accessory_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipAccessoryRequest {
    /// `None` unequips.
    pub accessory_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupiedSlotsResponse {
    /// Slot times already taken for the queried car and date, across all
    /// accounts. Advisory only; the check is not atomic with creation.
    pub times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationLinksResponse {
    pub calendar_url: String,
    pub whatsapp_url: String,
}
