use std::fmt::Debug;
use std::time::Duration;

use http::StatusCode;

use super::{Chain, ReservoirChange, Scope};
use crate::ErrorKind;

/// Receives the events of a [`crate::RateLimiter`].
///
/// All methods do nothing by default, so implementors only override what
/// they are interested in. Events are delivered synchronously on the task
/// that caused them and should return quickly.
pub trait RateLimitObserver: Debug + Send + Sync {
    /// A chain was created from the first advertisement of its scope
    fn provisioned(&self, _scope: &Scope, _chain: &Chain) {}

    /// A chain was reconfigured from a 429 response
    fn updated(&self, _scope: &Scope, _chain: &Chain) {}

    /// Reservoirs of a chain were lowered towards the server counters
    fn synchronized(&self, _scope: &Scope, _chain: &Chain, _changes: &[ReservoirChange]) {}

    /// Synchronizing a chain failed. The response is delivered regardless.
    fn synchronization_failed(&self, _scope: &Scope, _chain: &Chain, _error: &ErrorKind) {}

    /// A rate limited request will be sent again after `delay`
    fn retry_scheduled(&self, _scope: &Scope, _attempt: u32, _delay: Duration) {}

    /// A response arrived
    fn dispatched(&self, _scope: &Scope, _status: StatusCode, _elapsed: Duration) {}
}

/// Ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RateLimitObserver for NoopObserver {}

/// Forwards every event to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl RateLimitObserver for LogObserver {
    fn provisioned(&self, scope: &Scope, chain: &Chain) {
        log::info!(
            "{scope}: provisioned {} chain {} with {} bucket(s)",
            chain.tier(),
            chain.id(),
            chain.buckets().len()
        );
    }

    fn updated(&self, scope: &Scope, chain: &Chain) {
        log::info!("{scope}: updated {} chain {}", chain.tier(), chain.id());
    }

    fn synchronized(&self, scope: &Scope, chain: &Chain, changes: &[ReservoirChange]) {
        for change in changes {
            log::debug!(
                "{scope}: {} reservoir of {} {} -> {}",
                chain.tier(),
                change.bucket,
                change.before,
                change.after
            );
        }
    }

    fn synchronization_failed(&self, scope: &Scope, chain: &Chain, error: &ErrorKind) {
        log::warn!("{scope}: skipped synchronization of {}: {error}", chain.id());
    }

    fn retry_scheduled(&self, scope: &Scope, attempt: u32, delay: Duration) {
        log::info!(
            "{scope}: rate limited, retry #{} in {}ms",
            attempt + 1,
            delay.as_millis()
        );
    }

    fn dispatched(&self, scope: &Scope, status: StatusCode, elapsed: Duration) {
        log::trace!("{scope}: {status} after {}ms", elapsed.as_millis());
    }
}
