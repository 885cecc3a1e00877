use crate::domain::models::account::{Account, ChildProfile, Gender, Guardian, Progress};

#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub uid: String,
    pub guardian: Guardian,
}

#[derive(Debug, Clone)]
pub struct CreateAccountResult {
    pub account: Account,
}

#[derive(Debug, Clone)]
pub struct AddChildCommand {
    pub uid: String,
    pub name: String,
    pub avatar: String,
    pub gender: Gender,
}

#[derive(Debug, Clone)]
pub struct AddChildResult {
    pub child: ChildProfile,
}

/// A quiz level was finished; advance reward counters and, when the level
/// equals the child's current one, the global level index.
#[derive(Debug, Clone)]
pub struct CompleteLevelCommand {
    pub uid: String,
    pub child_id: String,
    pub level_index: u32,
}

#[derive(Debug, Clone)]
pub struct CompleteLevelResult {
    pub progress: Progress,
}

#[derive(Debug, Clone)]
pub struct SetFamilyCardCommand {
    pub uid: String,
    pub child_id: String,
    pub index: u32,
}

#[derive(Debug, Clone)]
pub struct SetOnboardingCompleteCommand {
    pub uid: String,
    pub child_id: String,
}

#[derive(Debug, Clone)]
pub struct UnlockAccessoryCommand {
    pub uid: String,
    pub child_id: String,
    pub accessory_id: String,
}

/// Equip an already-unlocked accessory, or `None` to unequip.
#[derive(Debug, Clone)]
pub struct EquipAccessoryCommand {
    pub uid: String,
    pub child_id: String,
    pub accessory_id: Option<String>,
}
