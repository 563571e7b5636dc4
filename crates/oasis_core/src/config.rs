use std::path::PathBuf;

use crate::activity::DEFAULT_FEED_LIMIT;
use crate::error::AppError;

pub const INCIDENTS_KEY: &str = "oasis-incidents";
pub const ALERTS_KEY: &str = "oasis-alerts";
pub const DEFAULT_DB_PATH: &str = "oasis-data/oasis.sqlite";

pub const ENV_DB_PATH: &str = "OASIS_DB_PATH";
pub const ENV_FEED_LIMIT: &str = "OASIS_FEED_LIMIT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub incidents_key: String,
    pub alerts_key: String,
    /// Length of `recent_activities()` when the caller gives no limit.
    pub feed_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            incidents_key: INCIDENTS_KEY.to_string(),
            alerts_key: ALERTS_KEY.to_string(),
            feed_limit: DEFAULT_FEED_LIMIT,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source; unset or blank values keep defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = get(ENV_FEED_LIMIT) {
            config.feed_limit = parse_feed_limit(&raw)?;
        }
        Ok(config)
    }
}

pub fn parse_feed_limit(raw: &str) -> Result<usize, AppError> {
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(
            AppError::new("CONFIG_INVALID", "Feed limit must be a positive integer")
                .with_details(format!("{ENV_FEED_LIMIT}={raw:?}")),
        ),
    }
}
