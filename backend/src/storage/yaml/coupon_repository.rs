//! YAML-backed coupon repository: one document per code.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::domain::models::coupon::FuelCoupon;
use crate::storage::traits::CouponStore;

use super::connection::YamlConnection;

#[derive(Debug, Clone)]
pub struct CouponRepository {
    connection: YamlConnection,
}

impl CouponRepository {
    pub fn new(connection: YamlConnection) -> Self {
        Self { connection }
    }

    fn coupon_path(&self, code: &str) -> PathBuf {
        let stem: String = code
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.connection.coupons_directory().join(format!("{stem}.yaml"))
    }
}

impl CouponStore for CouponRepository {
    fn get_by_code(&self, code: &str) -> Result<Option<FuelCoupon>> {
        let path = self.coupon_path(code);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let coupon: FuelCoupon = serde_yaml::from_str(&content)?;
        Ok(Some(coupon))
    }

    fn put_coupon(&self, coupon: &FuelCoupon) -> Result<()> {
        let path = self.coupon_path(&coupon.code);
        let content = serde_yaml::to_string(coupon)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;

        debug!("Saved coupon {}", coupon.code);
        Ok(())
    }

    fn increment_usage(&self, code: &str) -> Result<()> {
        let mut coupon = self
            .get_by_code(code)?
            .ok_or_else(|| anyhow::anyhow!("Coupon not found: {}", code))?;
        coupon.times_used += 1;
        self.put_coupon(&coupon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::coupon::CouponKind;
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup() -> (CouponRepository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = YamlConnection::new(temp_dir.path()).unwrap();
        (CouponRepository::new(connection), temp_dir)
    }

    fn promo_coupon() -> FuelCoupon {
        FuelCoupon {
            code: "PIVESPROMO5".to_string(),
            kind: CouponKind::Liters,
            value: 5,
            description: "Launch promo".to_string(),
            max_uses: None,
            times_used: 0,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_put_and_get_round_trip() {
        let (repo, _dir) = setup();
        let coupon = promo_coupon();
        repo.put_coupon(&coupon).unwrap();

        let loaded = repo.get_by_code("PIVESPROMO5").unwrap().unwrap();
        assert_eq!(loaded, coupon);
    }

    #[test]
    fn test_get_missing_coupon() {
        let (repo, _dir) = setup();
        assert!(repo.get_by_code("NOPE").unwrap().is_none());
    }

    #[test]
    fn test_increment_usage() {
        let (repo, _dir) = setup();
        repo.put_coupon(&promo_coupon()).unwrap();

        repo.increment_usage("PIVESPROMO5").unwrap();
        repo.increment_usage("PIVESPROMO5").unwrap();

        let loaded = repo.get_by_code("PIVESPROMO5").unwrap().unwrap();
        assert_eq!(loaded.times_used, 2);
    }

    #[test]
    fn test_increment_usage_missing_coupon_fails() {
        let (repo, _dir) = setup();
        assert!(repo.increment_usage("NOPE").is_err());
    }
}
