//! Account management: guardian accounts, child profiles and quiz/reward
//! progress.
//!
//! ## Reward rules
//!
//! - Completing a quiz level grants one wheel.
//! - Four wheels roll up into one steering wheel.
//! - Four steering wheels unlock the next milestone from the catalog.
//! - The quiz level index only advances when the child completes their
//!   current highest level; replaying old levels still earns wheels.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::storage::traits::{AccountStore, Connection};

use super::catalog;
use super::commands::children::{
    AddChildCommand, AddChildResult, CompleteLevelCommand, CompleteLevelResult,
    CreateAccountCommand, CreateAccountResult, EquipAccessoryCommand, SetFamilyCardCommand,
    SetOnboardingCompleteCommand, UnlockAccessoryCommand,
};
use super::errors::DomainError;
use super::models::account::{Account, ChildProfile, Progress};

#[derive(Clone)]
pub struct AccountService<C: Connection> {
    account_repository: C::AccountRepository,
}

impl<C: Connection> AccountService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            account_repository: connection.create_account_repository(),
        }
    }

    /// Create an empty account for a freshly authenticated guardian.
    pub fn create_account(&self, command: CreateAccountCommand) -> Result<CreateAccountResult> {
        info!("Creating account for uid={}", command.uid);

        if command.uid.trim().is_empty() {
            return Err(anyhow::anyhow!("Account uid cannot be empty"));
        }
        if self.account_repository.get_account(&command.uid)?.is_some() {
            return Err(anyhow::anyhow!("Account already exists: {}", command.uid));
        }

        let account = Account::new(command.uid, command.guardian);
        self.account_repository.put_account(&account)?;
        Ok(CreateAccountResult { account })
    }

    pub fn get_account(&self, uid: &str) -> Result<Account> {
        self.account_repository
            .get_account(uid)?
            .ok_or_else(|| DomainError::account_not_found(uid).into())
    }

    pub fn delete_account(&self, uid: &str) -> Result<()> {
        self.account_repository.delete_account(uid)
    }

    /// Enroll a new child with the starting progress (10 L of fuel, no
    /// rewards, no bookings).
    pub fn add_child(&self, command: AddChildCommand) -> Result<AddChildResult> {
        info!("Adding child '{}' to uid={}", command.name, command.uid);

        let name = command.name.trim();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Child name cannot be empty"));
        }
        if name.len() > 100 {
            return Err(anyhow::anyhow!("Child name cannot exceed 100 characters"));
        }
        if !catalog::AVATARS.contains(&command.avatar.as_str()) {
            return Err(anyhow::anyhow!("Unknown avatar: {}", command.avatar));
        }

        let mut account = self.get_account(&command.uid)?;
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("Time went backwards")?
            .as_millis() as u64;
        let child = ChildProfile::new(
            ChildProfile::generate_id(now_millis),
            name.to_string(),
            command.avatar,
            command.gender,
        );

        account.children.push(child.clone());
        self.account_repository.put_account(&account)?;

        info!("Enrolled child {} ({})", child.name, child.id);
        Ok(AddChildResult { child })
    }

    /// Record a finished quiz level: advance reward counters and, when the
    /// child beat their current level, the level index itself.
    pub fn complete_level(&self, command: CompleteLevelCommand) -> Result<CompleteLevelResult> {
        let account = self.get_account(&command.uid)?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;
        let child = &account.children[child_index];

        let progress = advance_rewards(&child.progress, command.level_index);
        info!(
            "Level {} done for {}: wheels={} steering_wheels={} level={}",
            command.level_index,
            command.child_id,
            progress.wheels,
            progress.steering_wheels,
            progress.quiz_level
        );

        let updated = account.with_child_replaced(child_index, child.with_progress(progress.clone()));
        self.account_repository.put_account(&updated)?;
        Ok(CompleteLevelResult { progress })
    }

    /// Move the family activity deck to a new card.
    pub fn set_family_card(&self, command: SetFamilyCardCommand) -> Result<Progress> {
        if command.index >= catalog::FAMILY_CARD_COUNT {
            warn!("Family card index {} past end of deck", command.index);
        }
        self.update_progress(&command.uid, &command.child_id, |progress| Progress {
            family_card_index: command.index,
            ..progress.clone()
        })
    }

    pub fn set_onboarding_complete(&self, command: SetOnboardingCompleteCommand) -> Result<()> {
        let account = self.get_account(&command.uid)?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;

        let mut child = account.children[child_index].clone();
        child.onboarding_complete = true;
        self.account_repository
            .put_account(&account.with_child_replaced(child_index, child))
    }

    pub fn unlock_accessory(&self, command: UnlockAccessoryCommand) -> Result<()> {
        let accessory = catalog::accessory_by_id(&command.accessory_id)
            .ok_or_else(|| DomainError::NotFound(format!("accessory {}", command.accessory_id)))?;

        let account = self.get_account(&command.uid)?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;

        let mut child = account.children[child_index].clone();
        if !child.accessories.unlocked.iter().any(|a| a == accessory.id) {
            child.accessories.unlocked.push(accessory.id.to_string());
        }
        self.account_repository
            .put_account(&account.with_child_replaced(child_index, child))
    }

    pub fn equip_accessory(&self, command: EquipAccessoryCommand) -> Result<()> {
        let account = self.get_account(&command.uid)?;
        let child_index = account
            .child_index(&command.child_id)
            .ok_or_else(|| DomainError::child_not_found(&command.child_id))?;

        let mut child = account.children[child_index].clone();
        if let Some(ref id) = command.accessory_id {
            if !child.accessories.unlocked.iter().any(|a| a == id) {
                return Err(anyhow::anyhow!("Accessory not unlocked: {}", id));
            }
        }
        child.accessories.equipped = command.accessory_id;
        self.account_repository
            .put_account(&account.with_child_replaced(child_index, child))
    }

    fn update_progress(
        &self,
        uid: &str,
        child_id: &str,
        f: impl FnOnce(&Progress) -> Progress,
    ) -> Result<Progress> {
        let account = self.get_account(uid)?;
        let child_index = account
            .child_index(child_id)
            .ok_or_else(|| DomainError::child_not_found(child_id))?;
        let child = &account.children[child_index];

        let progress = f(&child.progress);
        let updated = account.with_child_replaced(child_index, child.with_progress(progress.clone()));
        self.account_repository.put_account(&updated)?;
        Ok(progress)
    }
}

/// Reward roll-up for one completed level.
fn advance_rewards(progress: &Progress, level_index: u32) -> Progress {
    let mut wheels = progress.wheels + 1;
    let mut steering_wheels = progress.steering_wheels;
    let mut milestones = progress.milestones.clone();

    if wheels >= 4 {
        wheels = 0;
        steering_wheels += 1;
    }
    if steering_wheels >= 4 {
        steering_wheels = 0;
        // Append-only; once the catalog is exhausted nothing more unlocks.
        if let Some(next) = catalog::MILESTONES_ORDER.get(milestones.len()) {
            milestones.push(next.to_string());
        }
    }

    let quiz_level = if level_index == progress.quiz_level {
        progress.quiz_level + 1
    } else {
        progress.quiz_level
    };

    Progress {
        wheels,
        steering_wheels,
        milestones,
        quiz_level,
        ..progress.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::account::{Gender, Guardian, INITIAL_FUEL_LITERS};
    use crate::storage::yaml::test_utils::test_account;
    use crate::storage::YamlConnection;
    use tempfile::TempDir;

    struct Fixture {
        service: AccountService<YamlConnection>,
        repository: <YamlConnection as Connection>::AccountRepository,
        _temp_dir: TempDir,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(YamlConnection::new(temp_dir.path()).unwrap());
        Fixture {
            service: AccountService::new(connection.clone()),
            repository: connection.create_account_repository(),
            _temp_dir: temp_dir,
        }
    }

    fn guardian() -> Guardian {
        Guardian {
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: "5491100000000".to_string(),
        }
    }

    #[test]
    fn test_create_account_and_fetch() {
        let fx = setup();
        let result = fx
            .service
            .create_account(CreateAccountCommand {
                uid: "uid-1".to_string(),
                guardian: guardian(),
            })
            .unwrap();
        assert!(result.account.children.is_empty());
        assert!(!result.account.is_admin);

        let fetched = fx.service.get_account("uid-1").unwrap();
        assert_eq!(fetched, result.account);
    }

    #[test]
    fn test_create_duplicate_account_fails() {
        let fx = setup();
        let command = CreateAccountCommand {
            uid: "uid-1".to_string(),
            guardian: guardian(),
        };
        fx.service.create_account(command.clone()).unwrap();
        assert!(fx.service.create_account(command).is_err());
    }

    #[test]
    fn test_get_missing_account_is_not_found() {
        let fx = setup();
        let err = fx.service.get_account("uid-unknown").unwrap_err();
        assert!(matches!(err.downcast_ref::<DomainError>(), Some(DomainError::NotFound(_))));
    }

    #[test]
    fn test_add_child_starts_with_initial_fuel() {
        let fx = setup();
        fx.service
            .create_account(CreateAccountCommand {
                uid: "uid-1".to_string(),
                guardian: guardian(),
            })
            .unwrap();

        let result = fx
            .service
            .add_child(AddChildCommand {
                uid: "uid-1".to_string(),
                name: "  Emma ".to_string(),
                avatar: "🦊".to_string(),
                gender: Gender::Female,
            })
            .unwrap();
        assert_eq!(result.child.name, "Emma");
        assert_eq!(result.child.progress.fuel_liters, INITIAL_FUEL_LITERS);
        assert!(result.child.bookings.is_empty());
        assert!(!result.child.onboarding_complete);
    }

    #[test]
    fn test_add_child_validation() {
        let fx = setup();
        fx.service
            .create_account(CreateAccountCommand {
                uid: "uid-1".to_string(),
                guardian: guardian(),
            })
            .unwrap();

        let blank = AddChildCommand {
            uid: "uid-1".to_string(),
            name: "  ".to_string(),
            avatar: "🦊".to_string(),
            gender: Gender::Male,
        };
        assert!(fx.service.add_child(blank).is_err());

        let bad_avatar = AddChildCommand {
            uid: "uid-1".to_string(),
            name: "Leo".to_string(),
            avatar: "🚗".to_string(),
            gender: Gender::Male,
        };
        assert!(fx.service.add_child(bad_avatar).is_err());
    }

    fn complete(fx: &Fixture, account: &Account, level_index: u32) -> Progress {
        fx.service
            .complete_level(CompleteLevelCommand {
                uid: account.uid.clone(),
                child_id: account.children[0].id.clone(),
                level_index,
            })
            .unwrap()
            .progress
    }

    #[test]
    fn test_four_wheels_become_a_steering_wheel() {
        let fx = setup();
        let account = test_account("uid-1", &["Emma"]);
        fx.repository.put_account(&account).unwrap();

        let mut progress = Progress::initial();
        for level in 0..4 {
            progress = complete(&fx, &account, level);
        }
        assert_eq!(progress.wheels, 0);
        assert_eq!(progress.steering_wheels, 1);
        assert_eq!(progress.quiz_level, 4);
    }

    #[test]
    fn test_sixteen_levels_unlock_first_milestone() {
        let fx = setup();
        let account = test_account("uid-1", &["Emma"]);
        fx.repository.put_account(&account).unwrap();

        let mut progress = Progress::initial();
        for level in 0..16 {
            progress = complete(&fx, &account, level);
        }
        assert_eq!(progress.steering_wheels, 0);
        assert_eq!(progress.milestones, vec!["license".to_string()]);
    }

    #[test]
    fn test_milestones_stop_at_catalog_end() {
        let fx = setup();
        let mut account = test_account("uid-1", &["Emma"]);
        account.children[0].progress.milestones = catalog::MILESTONES_ORDER
            .iter()
            .map(|m| m.to_string())
            .collect();
        account.children[0].progress.wheels = 3;
        account.children[0].progress.steering_wheels = 3;
        fx.repository.put_account(&account).unwrap();

        let progress = complete(&fx, &account, 0);
        assert_eq!(progress.steering_wheels, 0);
        // Still just the three catalog milestones.
        assert_eq!(progress.milestones.len(), catalog::MILESTONES_ORDER.len());
    }

    #[test]
    fn test_replaying_old_level_earns_wheels_but_not_level() {
        let fx = setup();
        let mut account = test_account("uid-1", &["Emma"]);
        account.children[0].progress.quiz_level = 5;
        fx.repository.put_account(&account).unwrap();

        let progress = complete(&fx, &account, 2);
        assert_eq!(progress.wheels, 1);
        // Level index is monotonic; replays never move it.
        assert_eq!(progress.quiz_level, 5);
    }

    #[test]
    fn test_family_card_and_onboarding() {
        let fx = setup();
        let account = test_account("uid-1", &["Emma"]);
        fx.repository.put_account(&account).unwrap();
        let child_id = account.children[0].id.clone();

        let progress = fx
            .service
            .set_family_card(SetFamilyCardCommand {
                uid: "uid-1".to_string(),
                child_id: child_id.clone(),
                index: 3,
            })
            .unwrap();
        assert_eq!(progress.family_card_index, 3);

        fx.service
            .set_onboarding_complete(SetOnboardingCompleteCommand {
                uid: "uid-1".to_string(),
                child_id: child_id.clone(),
            })
            .unwrap();
        let stored = fx.repository.get_account("uid-1").unwrap().unwrap();
        assert!(stored.children[0].onboarding_complete);
    }

    #[test]
    fn test_accessory_unlock_then_equip() {
        let fx = setup();
        let account = test_account("uid-1", &["Emma"]);
        fx.repository.put_account(&account).unwrap();
        let child_id = account.children[0].id.clone();

        // Equipping before unlocking is refused.
        let premature = EquipAccessoryCommand {
            uid: "uid-1".to_string(),
            child_id: child_id.clone(),
            accessory_id: Some("hat".to_string()),
        };
        assert!(fx.service.equip_accessory(premature).is_err());

        fx.service
            .unlock_accessory(UnlockAccessoryCommand {
                uid: "uid-1".to_string(),
                child_id: child_id.clone(),
                accessory_id: "hat".to_string(),
            })
            .unwrap();
        fx.service
            .equip_accessory(EquipAccessoryCommand {
                uid: "uid-1".to_string(),
                child_id: child_id.clone(),
                accessory_id: Some("hat".to_string()),
            })
            .unwrap();

        let stored = fx.repository.get_account("uid-1").unwrap().unwrap();
        assert_eq!(stored.children[0].accessories.equipped.as_deref(), Some("hat"));

        // Unequip.
        fx.service
            .equip_accessory(EquipAccessoryCommand {
                uid: "uid-1".to_string(),
                child_id,
                accessory_id: None,
            })
            .unwrap();
        let stored = fx.repository.get_account("uid-1").unwrap().unwrap();
        assert_eq!(stored.children[0].accessories.equipped, None);
    }
}
