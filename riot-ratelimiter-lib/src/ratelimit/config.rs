use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of requests a single bucket may run at the same time
const DEFAULT_CONCURRENCY: usize = 1;

/// Default delay before retrying a rate limited request without `Retry-After`
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Default number of attempts for a rate limited request
const DEFAULT_MAX_RETRIES: u32 = 4;

/// Concurrency above this value is likely to trigger 429s
pub(crate) const HIGH_CONCURRENCY: usize = 10;

/// Where bucket state is stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    /// In-process state, one registry per [`crate::RateLimiter`]
    #[default]
    Local,
}

/// Rate limiting configuration shared by every chain of a [`crate::RateLimiter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Maximum number of concurrent requests per bucket
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Delay before a retry when the server does not send `Retry-After`,
    /// or when the exceeded limit belongs to another tier
    #[serde(default = "default_retry_after", with = "humantime_serde")]
    pub retry_after_default: Duration,

    /// Number of attempts for a rate limited request, including the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Storage backend of the bucket state
    #[serde(default)]
    pub datastore: Datastore,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            retry_after_default: default_retry_after(),
            max_retries: default_max_retries(),
            datastore: Datastore::default(),
        }
    }
}

const fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

const fn default_retry_after() -> Duration {
    DEFAULT_RETRY_AFTER
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl RateLimitConfig {
    /// Create a `RateLimitConfig` from optional values, using defaults for missing ones
    #[must_use]
    pub fn from_options(
        concurrency: Option<usize>,
        retry_after_default: Option<Duration>,
        max_retries: Option<u32>,
    ) -> Self {
        Self {
            concurrency: concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            retry_after_default: retry_after_default.unwrap_or(DEFAULT_RETRY_AFTER),
            max_retries: max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            datastore: Datastore::default(),
        }
    }

    /// Concurrency of a single bucket. A bucket always admits at least one request.
    #[must_use]
    pub fn bucket_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Returns `true` if the configured concurrency is likely to exceed the API limits
    #[must_use]
    pub const fn is_high_concurrency(&self) -> bool {
        self.concurrency > HIGH_CONCURRENCY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_rate_limit_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.retry_after_default, Duration::from_secs(5));
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.datastore, Datastore::Local);
        assert!(!config.is_high_concurrency());
    }

    #[test]
    fn test_from_options() {
        let config = RateLimitConfig::from_options(Some(20), None, Some(2));
        assert_eq!(config.concurrency, 20);
        assert_eq!(config.retry_after_default, Duration::from_secs(5));
        assert_eq!(config.max_retries, 2);
        assert!(config.is_high_concurrency());
    }

    #[test]
    fn test_zero_concurrency_still_admits() {
        let config = RateLimitConfig::from_options(Some(0), None, None);
        assert_eq!(config.bucket_concurrency(), 1);
    }

    #[test]
    fn test_config_serialization() {
        let config = RateLimitConfig {
            concurrency: 3,
            retry_after_default: Duration::from_millis(1500),
            max_retries: 6,
            datastore: Datastore::Local,
        };

        let toml = toml::to_string(&config).unwrap();
        let deserialized: RateLimitConfig = toml::from_str(&toml).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RateLimitConfig = toml::from_str(r#"retry_after_default = "2s""#).unwrap();
        assert_eq!(config.retry_after_default, Duration::from_secs(2));
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.max_retries, 4);
    }

    #[test]
    fn test_unknown_datastore_is_rejected() {
        let result = toml::from_str::<RateLimitConfig>(r#"datastore = "redis""#);
        assert!(result.is_err());

        let result = toml::from_str::<RateLimitConfig>("maxConcurrent = 3");
        assert!(result.is_err());
    }
}
