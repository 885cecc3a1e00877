//! YAML-backed account repository: one document per account, keyed by uid.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::domain::models::account::Account;
use crate::storage::traits::AccountStore;

use super::connection::YamlConnection;

#[derive(Debug, Clone)]
pub struct AccountRepository {
    connection: YamlConnection,
}

impl AccountRepository {
    pub fn new(connection: YamlConnection) -> Self {
        Self { connection }
    }

    /// Filesystem-safe form of a uid. Auth-provider uids are alphanumeric,
    /// but the store must never let a crafted uid escape its directory.
    fn safe_file_stem(uid: &str) -> String {
        uid.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    fn account_path(&self, uid: &str) -> PathBuf {
        self.connection
            .accounts_directory()
            .join(format!("{}.yaml", Self::safe_file_stem(uid)))
    }
}

impl AccountStore for AccountRepository {
    fn get_account(&self, uid: &str) -> Result<Option<Account>> {
        let path = self.account_path(uid);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let account: Account = serde_yaml::from_str(&content)?;
        Ok(Some(account))
    }

    fn put_account(&self, account: &Account) -> Result<()> {
        let path = self.account_path(&account.uid);
        let content = serde_yaml::to_string(account)?;

        // Atomic write using temp file; the document is replaced whole or
        // not at all.
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;

        debug!("Saved account {} ({} children)", account.uid, account.children.len());
        Ok(())
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let dir = self.connection.accounts_directory();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Account>(&content) {
                Ok(account) => accounts.push(account),
                Err(e) => warn!("Skipping unreadable account document {:?}: {}", path, e),
            }
        }

        // Stable ordering for scans and tests.
        accounts.sort_by(|a, b| a.uid.cmp(&b.uid));
        Ok(accounts)
    }

    fn delete_account(&self, uid: &str) -> Result<()> {
        let path = self.account_path(uid);
        if path.exists() {
            fs::remove_file(&path)?;
            info!("Deleted account document for {}", uid);
        } else {
            warn!("Attempted to delete a non-existent account: {}", uid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::yaml::test_utils::test_account;
    use tempfile::TempDir;

    fn setup() -> (AccountRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = YamlConnection::new(temp_dir.path()).unwrap();
        (AccountRepository::new(connection), temp_dir)
    }

    #[test]
    fn test_get_missing_account() {
        let (repo, _dir) = setup();
        assert!(repo.get_account("nobody").unwrap().is_none());
    }

    #[test]
    fn test_put_and_get_round_trip() {
        let (repo, _dir) = setup();
        let account = test_account("uid-1", &["Emma"]);
        repo.put_account(&account).unwrap();

        let loaded = repo.get_account("uid-1").unwrap().unwrap();
        assert_eq!(loaded, account);
    }

    #[test]
    fn test_put_replaces_whole_document() {
        let (repo, _dir) = setup();
        let account = test_account("uid-1", &["Emma", "Leo"]);
        repo.put_account(&account).unwrap();

        let mut updated = account.clone();
        updated.children.remove(1);
        repo.put_account(&updated).unwrap();

        let loaded = repo.get_account("uid-1").unwrap().unwrap();
        assert_eq!(loaded.children.len(), 1);
        assert_eq!(loaded.children[0].name, "Emma");
    }

    #[test]
    fn test_list_accounts_sorted() {
        let (repo, _dir) = setup();
        repo.put_account(&test_account("uid-b", &["Leo"])).unwrap();
        repo.put_account(&test_account("uid-a", &["Emma"])).unwrap();

        let accounts = repo.list_accounts().unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].uid, "uid-a");
        assert_eq!(accounts[1].uid, "uid-b");
    }

    #[test]
    fn test_delete_account() {
        let (repo, _dir) = setup();
        repo.put_account(&test_account("uid-1", &[])).unwrap();
        repo.delete_account("uid-1").unwrap();
        assert!(repo.get_account("uid-1").unwrap().is_none());
        // Deleting again is harmless.
        repo.delete_account("uid-1").unwrap();
    }

    #[test]
    fn test_uid_cannot_escape_directory() {
        let (repo, dir) = setup();
        let mut account = test_account("uid-1", &[]);
        account.uid = "../escape".to_string();
        repo.put_account(&account).unwrap();

        // The document landed inside accounts/, not outside the store.
        assert!(!dir.path().join("../escape.yaml").exists());
        assert!(dir.path().join("accounts/___escape.yaml").exists());
    }

    #[test]
    fn test_loads_document_with_missing_optional_fields() {
        // Documents written by older app versions lack newer fields;
        // defaults must fill them in.
        let (repo, dir) = setup();
        let minimal = "uid: legacy\nguardian:\n  name: Ana\n  email: ana@example.com\nchildren: []\n";
        fs::write(dir.path().join("accounts/legacy.yaml"), minimal).unwrap();

        let account = repo.get_account("legacy").unwrap().unwrap();
        assert!(!account.is_admin);
        assert!(account.fuel_transactions.is_empty());
        assert_eq!(account.guardian.phone, "");
    }
}
