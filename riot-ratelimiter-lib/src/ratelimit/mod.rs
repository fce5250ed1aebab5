//! Adaptive rate limiting per platform and endpoint method.
//!
//! The limits of the Riot Games API are not known up front. Every response
//! advertises them in its headers, and they may change at any time. This
//! module turns those advertisements into token buckets and keeps the
//! buckets in line with the counters of the server.
//!
//! # Architecture
//!
//! - [`RateLimitAdvertisement`]: The rate limit headers of one response
//! - [`TokenBucket`]: One window of a limit, e.g. 20 requests per second
//! - [`Chain`]: All windows of one tier, cleared in order by every request
//! - [`RetryPolicy`]: Decides when a rate limited request is sent again
//! - [`Registry`]: The chains of every platform and endpoint method
//! - [`RateLimitConfig`]: Settings shared by all chains
//! - [`RateLimitObserver`]: Sink for rate limiting events
//! - [`ScopeStats`]: Statistics tracking for each scope

mod advertisement;
mod bucket;
mod chain;
mod config;
mod headers;
mod observer;
mod registry;
mod retry;
mod scope;
mod stats;

pub use advertisement::{LimitType, RateLimitAdvertisement, TierSpec};
pub use bucket::{BucketPermit, BucketSnapshot, TokenBucket};
pub use chain::{Chain, ChainPermit, ReservoirChange};
pub use config::{Datastore, RateLimitConfig};
pub(crate) use config::HIGH_CONCURRENCY;
pub use observer::{LogObserver, NoopObserver, RateLimitObserver};
pub use registry::{Registry, RegistryEntry, ScopeChains};
pub use retry::RetryPolicy;
pub use scope::{Scope, Tier};
pub use stats::{ScopeStats, ScopeStatsMap};
