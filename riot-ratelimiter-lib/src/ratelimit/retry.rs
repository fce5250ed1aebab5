use std::time::Duration;

use http::StatusCode;

use super::{LimitType, RateLimitConfig, Tier};
use crate::ErrorKind;

/// Decides whether and when a failed request is retried.
///
/// A policy is bound to one chain. It reacts with the server-provided
/// `Retry-After` only when the exceeded limit belongs to its own tier,
/// and backs off by the configured default otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    applicable: &'static [LimitType],
    retry_after_default: Duration,
    max_retries: u32,
}

impl RetryPolicy {
    /// Create a policy reacting to the given limit types
    #[must_use]
    pub const fn new(
        applicable: &'static [LimitType],
        retry_after_default: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            applicable,
            retry_after_default,
            max_retries,
        }
    }

    /// The policy of a chain of the given tier.
    ///
    /// Application chains react to `application` limits, method chains to
    /// `method` and `service` limits.
    #[must_use]
    pub const fn for_tier(tier: Tier, config: &RateLimitConfig) -> Self {
        let applicable: &'static [LimitType] = match tier {
            Tier::Application => &[LimitType::Application],
            Tier::Method => &[LimitType::Method, LimitType::Service],
        };
        Self::new(applicable, config.retry_after_default, config.max_retries)
    }

    /// Limit types answered with the server-provided delay
    #[must_use]
    pub const fn applicable(&self) -> &'static [LimitType] {
        self.applicable
    }

    /// Delay before retrying after `error` failed attempt number `attempt`
    /// (starting at zero), or `None` if the request must not be retried.
    #[must_use]
    pub fn delay(&self, error: &ErrorKind, attempt: u32) -> Option<Duration> {
        if attempt.saturating_add(1) >= self.max_retries {
            return None;
        }
        if error.status() != Some(StatusCode::TOO_MANY_REQUESTS) {
            return None;
        }

        let advertisement = error.advertisement()?;
        let delay = match advertisement.limit_type {
            Some(limit_type) if self.applicable.contains(&limit_type) => advertisement
                .retry_after
                .unwrap_or(self.retry_after_default),
            _ => self.retry_after_default,
        };
        Some(delay)
    }
}
