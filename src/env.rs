//! Environment variable names used by this crate for convenient
//! configuration from microservices.
//!
//! These are purely helpers; [`LogContext`](crate::context::LogContext)
//! and the sinks never read the environment themselves.

use crate::batch::BatchConfig;
use crate::error::ConfigError;
use crate::init::{LoggingConfig, OutputFormat};
use std::str::FromStr;
use std::time::Duration;

/// `EnvFilter` directive, e.g. `info` or `log_context=debug`.
pub const LOG_CONTEXT_FILTER_ENV: &str = "LOG_CONTEXT_FILTER";

/// Output format: `pretty`, `compact` or `json`.
pub const LOG_CONTEXT_FORMAT_ENV: &str = "LOG_CONTEXT_FORMAT";

/// Channel capacity of a `BatchingSink`.
pub const LOG_CONTEXT_CHANNEL_BUFFER_ENV: &str = "LOG_CONTEXT_CHANNEL_BUFFER";

/// Batch size of a `BatchingSink`.
pub const LOG_CONTEXT_BATCH_SIZE_ENV: &str = "LOG_CONTEXT_BATCH_SIZE";

/// Flush interval of a `BatchingSink`, in milliseconds.
pub const LOG_CONTEXT_FLUSH_INTERVAL_MS_ENV: &str = "LOG_CONTEXT_FLUSH_INTERVAL_MS";

/// Optional logical service name, handy as a `LogContext` logger id.
pub const LOG_CONTEXT_SERVICE_NAME_ENV: &str = "LOG_CONTEXT_SERVICE_NAME";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(OutputFormat::Pretty),
            "compact" => Ok(OutputFormat::Compact),
            #[cfg(feature = "json")]
            "json" => Ok(OutputFormat::Json),
            #[cfg(not(feature = "json"))]
            "json" => Err(ConfigError::JsonFeatureDisabled),
            _ => Err(ConfigError::UnknownFormat(value.to_string())),
        }
    }
}

impl LoggingConfig {
    /// Build a config from `LOG_CONTEXT_FILTER` and `LOG_CONTEXT_FORMAT`,
    /// keeping defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// Same as [`from_env`](Self::from_env) with a custom lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = LoggingConfig::default();
        if let Some(filter) = lookup(LOG_CONTEXT_FILTER_ENV) {
            config.filter = filter;
        }
        if let Some(format) = lookup(LOG_CONTEXT_FORMAT_ENV) {
            config.format = format.parse()?;
        }
        Ok(config)
    }
}

impl BatchConfig {
    /// Build a config from the `LOG_CONTEXT_*` batching variables,
    /// keeping defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(process_env)
    }

    /// Same as [`from_env`](Self::from_env) with a custom lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BatchConfig::default();
        if let Some(n) = number(&lookup, LOG_CONTEXT_CHANNEL_BUFFER_ENV)? {
            config.channel_buffer = n;
        }
        if let Some(n) = number(&lookup, LOG_CONTEXT_BATCH_SIZE_ENV)? {
            config.batch_size = n;
        }
        if let Some(ms) = number(&lookup, LOG_CONTEXT_FLUSH_INTERVAL_MS_ENV)? {
            config.flush_interval = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

// Parsed straight into the target type so out-of-range values are
// rejected instead of wrapping.
fn number<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(n) => Ok(Some(n)),
            Err(_) => Err(ConfigError::InvalidNumber { key, value: raw }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let logging = LoggingConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(logging.filter, "info");
        assert_eq!(logging.format, OutputFormat::Pretty);

        let batch = BatchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(batch.batch_size, BatchConfig::default().batch_size);
    }

    #[test]
    fn reads_logging_variables() {
        let config = LoggingConfig::from_lookup(lookup(&[
            (LOG_CONTEXT_FILTER_ENV, "log_context=debug"),
            (LOG_CONTEXT_FORMAT_ENV, " Compact "),
        ]))
        .unwrap();
        assert_eq!(config.filter, "log_context=debug");
        assert_eq!(config.format, OutputFormat::Compact);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_format_with_feature() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
    }

    #[test]
    fn rejects_unknown_format() {
        let err = LoggingConfig::from_lookup(lookup(&[(LOG_CONTEXT_FORMAT_ENV, "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFormat(f) if f == "xml"));
    }

    #[test]
    fn reads_batch_variables() {
        let config = BatchConfig::from_lookup(lookup(&[
            (LOG_CONTEXT_CHANNEL_BUFFER_ENV, "64"),
            (LOG_CONTEXT_BATCH_SIZE_ENV, "8"),
            (LOG_CONTEXT_FLUSH_INTERVAL_MS_ENV, "250"),
        ]))
        .unwrap();
        assert_eq!(config.channel_buffer, 64);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.flush_interval, Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = BatchConfig::from_lookup(lookup(&[(LOG_CONTEXT_BATCH_SIZE_ENV, "-1")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "LOG_CONTEXT_BATCH_SIZE must be a non-negative integer, got \"-1\""
        );
    }

    #[test]
    fn rejects_sizes_beyond_usize() {
        let too_big = (usize::MAX as u128 + 1).to_string();
        let err = BatchConfig::from_lookup(lookup(&[(LOG_CONTEXT_BATCH_SIZE_ENV, too_big.as_str())])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { key: LOG_CONTEXT_BATCH_SIZE_ENV, ref value } if *value == too_big
        ));

        let err = BatchConfig::from_lookup(lookup(&[(LOG_CONTEXT_CHANNEL_BUFFER_ENV, too_big.as_str())])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { key: LOG_CONTEXT_CHANNEL_BUFFER_ENV, .. }));
    }

    #[test]
    fn env_or_falls_back() {
        assert_eq!(env_or("LOG_CONTEXT_SURELY_UNSET_VARIABLE", "fallback"), "fallback");
    }
}
