//! Tracker configuration with environment overrides.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::fetch_policy::{FetchPolicy, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT};
use crate::ValidationError;

pub const ENV_DATA_FILE: &str = "FUNDTRACK_DATA_FILE";
pub const ENV_TIMEOUT_MS: &str = "FUNDTRACK_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "FUNDTRACK_MAX_RETRIES";
pub const ENV_HISTORY_DAYS: &str = "FUNDTRACK_HISTORY_DAYS";

/// Default watchlist file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data.csv";
/// One year plus one week, so a year-ago baseline still resolves across gaps.
pub const DEFAULT_HISTORY_DAYS: u32 = 371;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub data_file: PathBuf,
    pub fetch: FetchPolicy,
    /// Calendar days of history fetched on refresh.
    pub history_days: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            fetch: FetchPolicy::new(DEFAULT_TIMEOUT, DEFAULT_MAX_RETRIES),
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }
}

impl TrackerConfig {
    /// Defaults overridden by `FUNDTRACK_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`TrackerConfig::from_env`] but reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATA_FILE).filter(|value| !value.trim().is_empty()) {
            config.data_file = PathBuf::from(path.trim());
        }
        if let Some(timeout_ms) = parse_var::<u64>(&lookup, ENV_TIMEOUT_MS)? {
            config = config.with_timeout_ms(timeout_ms)?;
        }
        if let Some(retries) = parse_var::<u32>(&lookup, ENV_MAX_RETRIES)? {
            config.fetch.max_retries = retries;
        }
        if let Some(days) = parse_var::<u32>(&lookup, ENV_HISTORY_DAYS)? {
            if days == 0 {
                return Err(ValidationError::InvalidConfig {
                    key: ENV_HISTORY_DAYS,
                    value: days.to_string(),
                });
            }
            config.history_days = days;
        }

        Ok(config)
    }

    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Result<Self, ValidationError> {
        if timeout_ms == 0 {
            return Err(ValidationError::InvalidConfig {
                key: ENV_TIMEOUT_MS,
                value: timeout_ms.to_string(),
            });
        }
        self.fetch.timeout = Duration::from_millis(timeout_ms);
        Ok(self)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.fetch.max_retries = max_retries;
        self
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ValidationError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidConfig { key, value: raw })
}
