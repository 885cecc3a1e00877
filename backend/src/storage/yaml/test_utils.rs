//! Shared fixtures for storage and service tests.

use crate::domain::models::account::{Account, ChildProfile, Gender, Guardian};

/// Account with one child per name, each starting with the default progress.
pub fn test_account(uid: &str, child_names: &[&str]) -> Account {
    let mut account = Account::new(
        uid.to_string(),
        Guardian {
            name: "Test Guardian".to_string(),
            email: "guardian@example.com".to_string(),
            phone: "5491100000000".to_string(),
        },
    );
    for (i, name) in child_names.iter().enumerate() {
        account.children.push(ChildProfile::new(
            format!("child::{}::{}", uid, i),
            name.to_string(),
            "🦊".to_string(),
            Gender::Female,
        ));
    }
    account
}
