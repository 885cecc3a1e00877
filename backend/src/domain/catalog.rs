//! Static reference catalogs: vehicles, time slots, fuel packages,
//! milestones and accessories.
//!
//! These are read-only program data, not user state. Bookings embed the car
//! by value, so editing this catalog never rewrites existing reservations.

use once_cell::sync::Lazy;

use super::models::booking::CarModel;

/// A bookable quarter-hour slot.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    /// Canonical HH:MM value stored on bookings.
    pub value: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// A named block of slots (morning / afternoon).
#[derive(Debug, Clone, PartialEq)]
pub struct SlotGroup {
    pub name: &'static str,
    pub slots: &'static [TimeSlot],
}

const MORNING_SLOTS: &[TimeSlot] = &[
    TimeSlot { value: "10:00", label: "10:00 AM" },
    TimeSlot { value: "10:15", label: "10:15 AM" },
    TimeSlot { value: "10:30", label: "10:30 AM" },
    TimeSlot { value: "10:45", label: "10:45 AM" },
    TimeSlot { value: "11:00", label: "11:00 AM" },
    TimeSlot { value: "11:15", label: "11:15 AM" },
    TimeSlot { value: "11:30", label: "11:30 AM" },
    TimeSlot { value: "11:45", label: "11:45 AM" },
    TimeSlot { value: "12:00", label: "12:00 PM" },
    TimeSlot { value: "12:15", label: "12:15 PM" },
    TimeSlot { value: "12:30", label: "12:30 PM" },
    TimeSlot { value: "12:45", label: "12:45 PM" },
];

const AFTERNOON_SLOTS: &[TimeSlot] = &[
    TimeSlot { value: "16:00", label: "04:00 PM" },
    TimeSlot { value: "16:15", label: "04:15 PM" },
    TimeSlot { value: "16:30", label: "04:30 PM" },
    TimeSlot { value: "16:45", label: "04:45 PM" },
    TimeSlot { value: "17:00", label: "05:00 PM" },
    TimeSlot { value: "17:15", label: "05:15 PM" },
    TimeSlot { value: "17:30", label: "05:30 PM" },
    TimeSlot { value: "17:45", label: "05:45 PM" },
    TimeSlot { value: "18:00", label: "06:00 PM" },
    TimeSlot { value: "18:15", label: "06:15 PM" },
    TimeSlot { value: "18:30", label: "06:30 PM" },
    TimeSlot { value: "18:45", label: "06:45 PM" },
];

pub static TIME_SLOTS: &[SlotGroup] = &[
    SlotGroup { name: "Morning", slots: MORNING_SLOTS },
    SlotGroup { name: "Afternoon", slots: AFTERNOON_SLOTS },
];

/// Whether `time` is one of the catalog slot values.
pub fn is_valid_slot(time: &str) -> bool {
    TIME_SLOTS
        .iter()
        .flat_map(|g| g.slots.iter())
        .any(|s| s.value == time)
}

pub static CAR_MODELS: Lazy<Vec<CarModel>> = Lazy::new(|| {
    vec![
        CarModel {
            id: "car1".to_string(),
            name: "Little Buggy".to_string(),
            image: "cars/buggy-red.jpg".to_string(),
            price_per_slot: 2,
        },
        CarModel {
            id: "car2".to_string(),
            name: "Blue Adventurer".to_string(),
            image: "cars/pickup-blue.jpg".to_string(),
            price_per_slot: 2,
        },
        CarModel {
            id: "car3".to_string(),
            name: "Pink Princess".to_string(),
            image: "cars/coupe-pink.jpg".to_string(),
            price_per_slot: 2,
        },
        CarModel {
            id: "car4".to_string(),
            name: "White Lightning".to_string(),
            image: "cars/sedan-white.jpg".to_string(),
            price_per_slot: 2,
        },
    ]
});

pub fn car_by_id(car_id: &str) -> Option<&'static CarModel> {
    CAR_MODELS.iter().find(|c| c.id == car_id)
}

/// Purchasable fuel package.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelPackage {
    pub liters: i64,
    pub price: i64,
    pub bonus: Option<&'static str>,
}

pub static FUEL_PACKAGES: &[FuelPackage] = &[
    FuelPackage { liters: 2, price: 10_000, bonus: None },
    FuelPackage { liters: 5, price: 22_500, bonus: Some("10% off!") },
    FuelPackage { liters: 10, price: 40_000, bonus: Some("20% off!") },
    FuelPackage { liters: 20, price: 75_000, bonus: Some("Best value!") },
];

pub fn package_by_liters(liters: i64) -> Option<&'static FuelPackage> {
    FUEL_PACKAGES.iter().find(|p| p.liters == liters)
}

/// Milestone unlock order. Every fourth steering wheel unlocks the next
/// entry; once the catalog is exhausted no further milestones are granted.
pub static MILESTONES_ORDER: &[&str] = &["license", "insurance", "registration"];

#[derive(Debug, Clone, PartialEq)]
pub struct Milestone {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub static MILESTONES: &[Milestone] = &[
    Milestone { key: "license", name: "Driver's License", icon: "🪪" },
    Milestone { key: "insurance", name: "Insurance Card", icon: "📰" },
    Milestone { key: "registration", name: "Vehicle Registration", icon: "💳" },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Accessory {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub price: u32,
}

pub static ACCESSORIES: &[Accessory] = &[
    Accessory { id: "hat", name: "Driver's Cap", icon: "🧢", price: 2 },
    Accessory { id: "sunglasses", name: "Sunglasses", icon: "🕶️", price: 3 },
    Accessory { id: "crown", name: "Royal Crown", icon: "👑", price: 5 },
    Accessory { id: "scarf", name: "Racing Scarf", icon: "🧣", price: 2 },
    Accessory { id: "bowtie", name: "Fancy Bow", icon: "🎀", price: 1 },
    Accessory { id: "monocle", name: "Monocle", icon: "🧐", price: 4 },
];

pub fn accessory_by_id(id: &str) -> Option<&'static Accessory> {
    ACCESSORIES.iter().find(|a| a.id == id)
}

pub static AVATARS: &[&str] = &[
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐮",
];

/// Number of family activity cards in the printed deck.
pub const FAMILY_CARD_COUNT: u32 = 16;
