//! Domain model for a guardian account and its children.
//!
//! The account is the root aggregate: it is always read and written as one
//! whole document. Children, their progress and their bookings never exist
//! outside of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::booking::Booking;

/// Fuel granted to every newly enrolled child.
pub const INITIAL_FUEL_LITERS: i64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardian {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Gamification counters and fuel balance for one child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub wheels: u32,
    #[serde(default)]
    pub steering_wheels: u32,
    #[serde(default)]
    pub milestones: Vec<String>,
    #[serde(default)]
    pub quiz_level: u32,
    #[serde(default)]
    pub fuel_liters: i64,
    #[serde(default)]
    pub family_card_index: u32,
    /// Percentage discount (0-100) pending on the next confirmed purchase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_discount: Option<u8>,
}

impl Progress {
    /// Starting progress for a new child.
    pub fn initial() -> Self {
        Progress {
            wheels: 0,
            steering_wheels: 0,
            milestones: Vec::new(),
            quiz_level: 0,
            fuel_liters: INITIAL_FUEL_LITERS,
            family_card_index: 0,
            active_discount: None,
        }
    }

    /// Copy of this progress with a different fuel balance.
    pub fn with_fuel_liters(&self, fuel_liters: i64) -> Self {
        Progress {
            fuel_liters,
            ..self.clone()
        }
    }

    /// Copy of this progress with a different active discount.
    pub fn with_active_discount(&self, active_discount: Option<u8>) -> Self {
        Progress {
            active_discount,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Accessories {
    #[serde(default)]
    pub unlocked: Vec<String>,
    #[serde(default)]
    pub equipped: Option<String>,
}

/// One enrolled child. Never physically deleted except with the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub gender: Gender,
    pub progress: Progress,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default)]
    pub accessories: Accessories,
    #[serde(default)]
    pub used_codes: Vec<String>,
}

impl ChildProfile {
    /// Generate a unique ID for a child.
    pub fn generate_id(timestamp_millis: u64) -> String {
        format!("child::{}", timestamp_millis)
    }

    pub fn new(id: String, name: String, avatar: String, gender: Gender) -> Self {
        ChildProfile {
            id,
            name,
            avatar,
            gender,
            progress: Progress::initial(),
            bookings: Vec::new(),
            onboarding_complete: false,
            accessories: Accessories::default(),
            used_codes: Vec::new(),
        }
    }

    pub fn booking(&self, booking_id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == booking_id)
    }

    /// Copy of this child with new progress.
    pub fn with_progress(&self, progress: Progress) -> Self {
        ChildProfile {
            progress,
            ..self.clone()
        }
    }

    /// Copy of this child with a replaced bookings list.
    pub fn with_bookings(&self, bookings: Vec<Booking>) -> Self {
        ChildProfile {
            bookings,
            ..self.clone()
        }
    }
}

/// Receipt appended to the account after a confirmed fuel purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelTransaction {
    pub id: String,
    pub child_id: String,
    pub package_liters: i64,
    pub package_price: i64,
    pub payment_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Root aggregate for one authenticated guardian.
///
/// Documents written by older versions of the app may miss newer fields;
/// serde defaults fill them in on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub uid: String,
    pub guardian: Guardian,
    #[serde(default)]
    pub children: Vec<ChildProfile>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub fuel_transactions: Vec<FuelTransaction>,
}

impl Account {
    pub fn new(uid: String, guardian: Guardian) -> Self {
        Account {
            uid,
            guardian,
            children: Vec::new(),
            is_admin: false,
            fuel_transactions: Vec::new(),
        }
    }

    pub fn child(&self, child_id: &str) -> Option<&ChildProfile> {
        self.children.iter().find(|c| c.id == child_id)
    }

    pub fn child_index(&self, child_id: &str) -> Option<usize> {
        self.children.iter().position(|c| c.id == child_id)
    }

    /// Copy of this account with the child at `index` replaced.
    pub fn with_child_replaced(&self, index: usize, child: ChildProfile) -> Self {
        let mut children = self.children.clone();
        children[index] = child;
        Account {
            children,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Wire conversions
// ---------------------------------------------------------------------------

impl From<&Guardian> for shared::Guardian {
    fn from(g: &Guardian) -> Self {
        shared::Guardian {
            name: g.name.clone(),
            email: g.email.clone(),
            phone: g.phone.clone(),
        }
    }
}

impl From<Gender> for shared::Gender {
    fn from(g: Gender) -> Self {
        match g {
            Gender::Male => shared::Gender::Male,
            Gender::Female => shared::Gender::Female,
        }
    }
}

impl From<shared::Gender> for Gender {
    fn from(g: shared::Gender) -> Self {
        match g {
            shared::Gender::Male => Gender::Male,
            shared::Gender::Female => Gender::Female,
        }
    }
}

impl From<&Progress> for shared::Progress {
    fn from(p: &Progress) -> Self {
        shared::Progress {
            wheels: p.wheels,
            steering_wheels: p.steering_wheels,
            milestones: p.milestones.clone(),
            quiz_level: p.quiz_level,
            fuel_liters: p.fuel_liters,
            family_card_index: p.family_card_index,
            active_discount: p.active_discount,
        }
    }
}

impl From<&Accessories> for shared::Accessories {
    fn from(a: &Accessories) -> Self {
        shared::Accessories {
            unlocked: a.unlocked.clone(),
            equipped: a.equipped.clone(),
        }
    }
}

impl From<&ChildProfile> for shared::Child {
    fn from(c: &ChildProfile) -> Self {
        shared::Child {
            id: c.id.clone(),
            name: c.name.clone(),
            avatar: c.avatar.clone(),
            gender: c.gender.into(),
            progress: (&c.progress).into(),
            bookings: c.bookings.iter().map(Into::into).collect(),
            onboarding_complete: c.onboarding_complete,
            accessories: (&c.accessories).into(),
            used_codes: c.used_codes.clone(),
        }
    }
}

impl From<&ChildProfile> for shared::ChildRef {
    fn from(c: &ChildProfile) -> Self {
        shared::ChildRef {
            id: c.id.clone(),
            name: c.name.clone(),
            fuel_liters: c.progress.fuel_liters,
        }
    }
}

impl From<&FuelTransaction> for shared::FuelTransaction {
    fn from(t: &FuelTransaction) -> Self {
        shared::FuelTransaction {
            id: t.id.clone(),
            child_id: t.child_id.clone(),
            package_liters: t.package_liters,
            package_price: t.package_price,
            payment_id: t.payment_id.clone(),
            status: t.status.clone(),
            created_at: t.created_at.to_rfc3339(),
        }
    }
}

impl From<&Account> for shared::Account {
    fn from(a: &Account) -> Self {
        shared::Account {
            uid: a.uid.clone(),
            guardian: (&a.guardian).into(),
            children: a.children.iter().map(Into::into).collect(),
            is_admin: a.is_admin,
            fuel_transactions: a.fuel_transactions.iter().map(Into::into).collect(),
        }
    }
}
