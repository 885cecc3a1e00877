//! Storage layer: trait definitions and the YAML document backend.

pub mod traits;
pub mod yaml;

pub use traits::{AccountStore, Connection, CouponStore};
pub use yaml::YamlConnection;
