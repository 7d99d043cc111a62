//! Dispatch engine configuration.

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

/// Invalid configuration value, reported at start-up.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings for the dispatch engine, built once and injected.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Page size for broadcast recipient resolution.
    pub broadcast_page_size: usize,
    /// Trailing window for the duplicate-content guard.
    pub dedup_window: chrono::Duration,
    /// Recipients processed concurrently per trigger.
    pub max_concurrency: usize,
    /// Local offset in which quiet hours and digest times are evaluated.
    pub utc_offset: FixedOffset,
    /// How often deferred notifications are checked for release.
    pub delayed_poll_interval: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            broadcast_page_size: 100,
            dedup_window: chrono::Duration::seconds(60),
            max_concurrency: 8,
            utc_offset: Utc.fix(),
            delayed_poll_interval: Duration::from_secs(60),
        }
    }
}

impl DispatchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `NOTIFY_BROADCAST_PAGE_SIZE` | `100`   |
    /// | `NOTIFY_DEDUP_WINDOW_SECS`   | `60`    |
    /// | `NOTIFY_MAX_CONCURRENCY`     | `8`     |
    /// | `NOTIFY_UTC_OFFSET_MINUTES`  | `0`     |
    /// | `NOTIFY_DELAYED_POLL_SECS`   | `60`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let broadcast_page_size: usize =
            parse(&lookup, "NOTIFY_BROADCAST_PAGE_SIZE", 100, "a positive integer")?;
        if broadcast_page_size == 0 {
            return Err(invalid("NOTIFY_BROADCAST_PAGE_SIZE", "0", "a positive integer"));
        }

        let dedup_window_secs: i64 =
            parse(&lookup, "NOTIFY_DEDUP_WINDOW_SECS", 60, "a non-negative integer")?;
        if dedup_window_secs < 0 {
            return Err(invalid(
                "NOTIFY_DEDUP_WINDOW_SECS",
                &dedup_window_secs.to_string(),
                "a non-negative integer",
            ));
        }

        let max_concurrency: usize =
            parse(&lookup, "NOTIFY_MAX_CONCURRENCY", 8, "a positive integer")?;
        if max_concurrency == 0 {
            return Err(invalid("NOTIFY_MAX_CONCURRENCY", "0", "a positive integer"));
        }

        let offset_minutes: i32 = parse(
            &lookup,
            "NOTIFY_UTC_OFFSET_MINUTES",
            0,
            "an offset in minutes between -1439 and 1439",
        )?;
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                invalid(
                    "NOTIFY_UTC_OFFSET_MINUTES",
                    &offset_minutes.to_string(),
                    "an offset in minutes between -1439 and 1439",
                )
            })?;

        let poll_secs: u64 =
            parse(&lookup, "NOTIFY_DELAYED_POLL_SECS", 60, "a positive integer")?;
        if poll_secs == 0 {
            return Err(invalid("NOTIFY_DELAYED_POLL_SECS", "0", "a positive integer"));
        }

        Ok(Self {
            broadcast_page_size,
            dedup_window: chrono::Duration::seconds(dedup_window_secs),
            max_concurrency,
            utc_offset,
            delayed_poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

fn parse<F, T>(
    lookup: &F,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| invalid(var, &raw, expected)),
    }
}

fn invalid(var: &'static str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        expected,
    }
}
