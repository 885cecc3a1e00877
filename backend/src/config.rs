//! Environment-driven configuration, read once at startup.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the YAML document store.
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Mercado Pago access token; empty disables real checkouts.
    pub mp_access_token: String,
    /// Public URL of the frontend, used for payment back URLs and CORS.
    pub app_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("PIVES_DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let bind_addr = std::env::var("PIVES_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse::<SocketAddr>()
            .context("PIVES_BIND_ADDR is not a valid socket address")?;
        let mp_access_token = std::env::var("PIVES_MP_ACCESS_TOKEN").unwrap_or_default();
        let app_url = std::env::var("PIVES_APP_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Ok(Config {
            data_dir,
            bind_addr,
            mp_access_token,
            app_url,
        })
    }
}
