//! Connection to the YAML document store.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::storage::traits::Connection;

use super::{AccountRepository, CouponRepository};

/// Handle to the on-disk document store. Cheap to clone; repositories are
/// created per-service from it.
#[derive(Debug, Clone)]
pub struct YamlConnection {
    base_directory: PathBuf,
}

impl YamlConnection {
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        fs::create_dir_all(base_directory.join("accounts"))?;
        fs::create_dir_all(base_directory.join("coupons"))?;
        info!("Opened document store at {:?}", base_directory);
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn accounts_directory(&self) -> PathBuf {
        self.base_directory.join("accounts")
    }

    pub fn coupons_directory(&self) -> PathBuf {
        self.base_directory.join("coupons")
    }
}

impl Connection for YamlConnection {
    type AccountRepository = AccountRepository;
    type CouponRepository = CouponRepository;

    fn create_account_repository(&self) -> AccountRepository {
        AccountRepository::new(self.clone())
    }

    fn create_coupon_repository(&self) -> CouponRepository {
        CouponRepository::new(self.clone())
    }
}
