//! Runtime settings.
//!
//! Settings are read from environment variables with sensible defaults:
//!
//! - `TOOLBELT_LOG_FILE`: call log file (default: `application.log`)
//! - `TOOLBELT_MAX_RETRIES`: attempt budget for retried operations (default: 5)
//! - `TOOLBELT_RETRY_DELAY_MS`: delay between attempts in milliseconds (default: 0)
//! - `TOOLBELT_RETRY_JITTER`: when `true`, the delay is drawn uniformly from
//!   `[0, TOOLBELT_RETRY_DELAY_MS]` instead of being fixed (default: `false`)

use crate::logging::file::DEFAULT_LOG_FILE;
use crate::retry::{DelayPolicy, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Environment variable holding the call log path.
pub const ENV_LOG_FILE: &str = "TOOLBELT_LOG_FILE";
/// Environment variable holding the attempt budget.
pub const ENV_MAX_RETRIES: &str = "TOOLBELT_MAX_RETRIES";
/// Environment variable holding the retry delay in milliseconds.
pub const ENV_RETRY_DELAY_MS: &str = "TOOLBELT_RETRY_DELAY_MS";
/// Environment variable enabling randomized retry delays.
pub const ENV_RETRY_JITTER: &str = "TOOLBELT_RETRY_JITTER";

/// Errors that can occur while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue {
        /// The variable name.
        key: &'static str,
        /// The raw value.
        value: String,
    },

    /// The parsed settings are out of range.
    #[error("Invalid settings: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Toolbelt settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Path of the call log file.
    pub log_file: PathBuf,

    /// Retry policy for retried operations.
    #[validate(nested)]
    pub retry: RetryPolicy,
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed, or if
    /// `TOOLBELT_MAX_RETRIES` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::from_env`].
    ///
    /// # Example
    ///
    /// ```
    /// use shared::config::Settings;
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "TOOLBELT_MAX_RETRIES" => Some("3".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert_eq!(settings.retry.max_attempts, 3);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_file =
            lookup(ENV_LOG_FILE).map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);
        let max_attempts = parse_var(&lookup, ENV_MAX_RETRIES)?.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let delay_ms: u64 = parse_var(&lookup, ENV_RETRY_DELAY_MS)?.unwrap_or(0);
        let jitter: bool = parse_var(&lookup, ENV_RETRY_JITTER)?.unwrap_or(false);

        let delay = Duration::from_millis(delay_ms);
        let delay = match (delay.is_zero(), jitter) {
            (true, _) => DelayPolicy::None,
            (false, true) => DelayPolicy::Random { max: delay },
            (false, false) => DelayPolicy::Fixed { delay },
        };

        let settings = Self {
            log_file,
            retry: RetryPolicy::new(max_attempts).with_delay(delay),
        };
        settings.validate()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            retry: RetryPolicy::default(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.log_file, PathBuf::from("application.log"));
        assert_eq!(settings.retry.max_attempts, 5);
        assert_eq!(settings.retry.delay, DelayPolicy::None);
    }

    #[test]
    fn test_fixed_delay() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TOOLBELT_LOG_FILE", "/tmp/calls.log"),
            ("TOOLBELT_MAX_RETRIES", "3"),
            ("TOOLBELT_RETRY_DELAY_MS", "250"),
        ]))
        .unwrap();

        assert_eq!(settings.log_file, PathBuf::from("/tmp/calls.log"));
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(
            settings.retry.delay,
            DelayPolicy::Fixed {
                delay: Duration::from_millis(250)
            }
        );
    }

    #[test]
    fn test_jittered_delay() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TOOLBELT_RETRY_DELAY_MS", "100"),
            ("TOOLBELT_RETRY_JITTER", "true"),
        ]))
        .unwrap();

        assert_eq!(
            settings.retry.delay,
            DelayPolicy::Random {
                max: Duration::from_millis(100)
            }
        );
    }

    #[test]
    fn test_invalid_number() {
        let err = Settings::from_lookup(lookup_from(&[("TOOLBELT_MAX_RETRIES", "many")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "TOOLBELT_MAX_RETRIES",
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Invalid value \"many\" for TOOLBELT_MAX_RETRIES"
        );
    }

    #[test]
    fn test_invalid_bool() {
        let err = Settings::from_lookup(lookup_from(&[("TOOLBELT_RETRY_JITTER", "yes")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = Settings::from_lookup(lookup_from(&[("TOOLBELT_MAX_RETRIES", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_settings_serialization() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(
            json,
            r#"{"log_file":"application.log","retry":{"max_attempts":5,"delay":{"kind":"none"}}}"#
        );
    }
}
