//! Service configuration from environment variables

use std::env;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";
pub const DEFAULT_DATA_DIR: &str = "database";

/// Longest accepted cache lifetime, one week
pub const MAX_CACHE_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Runtime configuration of the web service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Socket address the HTTP server binds to
    pub addr: String,

    /// Directory holding the JSON collections
    pub data_dir: PathBuf,

    /// Lifetime of cached car listings in seconds
    pub cache_ttl_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_ttl_secs: crate::cache::DEFAULT_TTL_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `CAR_INVENTORY_ADDR` (default: 127.0.0.1:5000)
    /// - `CAR_INVENTORY_DATA_DIR` (default: database)
    /// - `CAR_INVENTORY_CACHE_TTL_SECS` (default: 300, at most one week)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] over an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            addr: lookup("CAR_INVENTORY_ADDR").unwrap_or(defaults.addr),
            data_dir: lookup("CAR_INVENTORY_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            cache_ttl_secs: lookup("CAR_INVENTORY_CACHE_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs >= 0)
                .map(|secs: i64| secs.min(MAX_CACHE_TTL_SECS))
                .unwrap_or(defaults.cache_ttl_secs),
        }
    }
}
