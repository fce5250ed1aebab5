use serde::Serialize;

use super::bucket::{BucketPermit, TokenBucket};
use super::{RateLimitConfig, RetryPolicy, Tier, TierSpec};
use crate::{ErrorKind, Result};

/// How often a bucket is re-read before synchronization gives up
const MAX_SYNC_ATTEMPTS: usize = 3;

/// An ordered sequence of buckets, one per advertised window.
///
/// A request has to clear bucket 0 first, then bucket 1 and so on, so the
/// chain enforces every window of its tier at once.
#[derive(Debug)]
pub struct Chain {
    id: String,
    tier: Tier,
    buckets: Vec<TokenBucket>,
    retry_policy: RetryPolicy,
}

/// A reservoir lowered by [`Chain::synchronize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservoirChange {
    /// Identifier of the bucket
    pub bucket: String,
    /// Reservoir before synchronization
    pub before: u64,
    /// Reservoir after synchronization
    pub after: u64,
}

impl Chain {
    /// Build a chain from the raw limits and counts of one tier.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidAdvertisement`] if the limits or counts
    /// are malformed.
    pub fn build(
        id: impl Into<String>,
        tier: Tier,
        limits: &str,
        counts: &str,
        config: &RateLimitConfig,
    ) -> Result<Self> {
        let specs = TierSpec::parse_all(tier, limits, counts)?;
        Ok(Self::from_specs(id, tier, &specs, config))
    }

    /// Build a chain from already parsed windows
    #[must_use]
    pub fn from_specs(
        id: impl Into<String>,
        tier: Tier,
        specs: &[TierSpec],
        config: &RateLimitConfig,
    ) -> Self {
        let id = id.into();
        let buckets = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| TokenBucket::new(format!("{id}_{index}"), spec, config))
            .collect();

        Self {
            id,
            tier,
            buckets,
            retry_policy: RetryPolicy::for_tier(tier, config),
        }
    }

    /// Identifier of the chain, e.g. `euw1` or `euw1_MATCH_V5.GET_MATCH_BY_ID`
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The tier this chain limits
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// All buckets, in admission order
    #[must_use]
    pub fn buckets(&self) -> &[TokenBucket] {
        &self.buckets
    }

    /// The head bucket, where requests enter the chain.
    ///
    /// # Panics
    ///
    /// Panics if the chain has no buckets, which the limits parser never produces
    #[must_use]
    pub fn main(&self) -> &TokenBucket {
        &self.buckets[0]
    }

    /// The retry policy bound to this chain
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Requests admitted by the head bucket that have not finished yet
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.buckets.first().map_or(0, TokenBucket::running)
    }

    /// Reconfigure every bucket from a fresh advertisement, keeping the
    /// buckets themselves.
    ///
    /// Windows are matched by index. Extra windows on either side are
    /// ignored.
    pub fn update(&self, specs: &[TierSpec]) {
        if specs.len() != self.buckets.len() {
            log::warn!(
                "Chain {} has {} buckets, but {} windows were advertised",
                self.id,
                self.buckets.len(),
                specs.len()
            );
        }
        for (bucket, spec) in self.buckets.iter().zip(specs) {
            bucket.reconfigure(spec);
        }
        log::debug!("Updated chain {}", self.id);
    }

    /// Lower the reservoirs towards the server counters.
    ///
    /// Per bucket the reservoir becomes
    /// `min(reservoir, capacity - count - in_flight)`. Exhausted buckets are
    /// left alone, and a reservoir is never raised. Returns the reservoirs
    /// that changed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::SynchronizationConflict`] if a bucket kept
    /// changing while it was synchronized. Buckets before it keep their new
    /// reservoir.
    pub fn synchronize(&self, specs: &[TierSpec], in_flight: usize) -> Result<Vec<ReservoirChange>> {
        let in_flight = u64::try_from(in_flight).unwrap_or(u64::MAX);
        let mut changes = Vec::new();
        for (bucket, spec) in self.buckets.iter().zip(specs) {
            if let Some(change) = synchronize_bucket(bucket, spec, in_flight)? {
                changes.push(change);
            }
        }
        Ok(changes)
    }

    /// Wait until every bucket of the chain admits a request
    pub async fn acquire(&self) -> ChainPermit {
        let mut permits = Vec::with_capacity(self.buckets.len());
        for bucket in &self.buckets {
            permits.push(bucket.acquire().await);
        }
        ChainPermit { _permits: permits }
    }
}

fn synchronize_bucket(
    bucket: &TokenBucket,
    spec: &TierSpec,
    in_flight: u64,
) -> Result<Option<ReservoirChange>> {
    let server_remaining = spec.reservoir().saturating_sub(in_flight);

    for _ in 0..MAX_SYNC_ATTEMPTS {
        let snapshot = bucket.snapshot();
        if snapshot.reservoir == 0 {
            return Ok(None);
        }

        let reservoir = snapshot.reservoir.min(server_remaining);
        if reservoir == snapshot.reservoir {
            return Ok(None);
        }
        if bucket.compare_and_set_reservoir(snapshot.version, reservoir) {
            log::debug!(
                "Synchronized bucket {}: reservoir {} -> {reservoir}",
                bucket.id(),
                snapshot.reservoir
            );
            return Ok(Some(ReservoirChange {
                bucket: bucket.id().to_string(),
                before: snapshot.reservoir,
                after: reservoir,
            }));
        }
    }

    Err(ErrorKind::SynchronizationConflict {
        bucket: bucket.id().to_string(),
    })
}

/// Proof of admission by every bucket of a [`Chain`]
#[derive(Debug)]
pub struct ChainPermit {
    _permits: Vec<BucketPermit>,
}
