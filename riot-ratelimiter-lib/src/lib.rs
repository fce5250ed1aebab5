//! `riot-ratelimiter-lib` sends requests to the Riot Games API without
//! exceeding its rate limits.
//!
//! The API advertises its limits per platform and endpoint method in the
//! headers of every response. The [`RateLimiter`] learns them from the first
//! response of a scope, queues later requests behind token buckets, and keeps
//! the buckets in line with the counters of the server.
//!
//! ```no_run
//! use riot_ratelimiter_lib::{ApiRequest, RateLimiterBuilder, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let limiter = RateLimiterBuilder::default().limiter();
//!   let request = ApiRequest::try_from(
//!       "https://euw1.api.riotgames.com/lol/summoner/v4/summoners/by-puuid/abc",
//!   )?
//!   .with_header(
//!       "X-Riot-Token".parse().unwrap(),
//!       "RGAPI-...".parse().unwrap(),
//!   );
//!   let summoner = limiter.execute(request).await?;
//!   println!("{summoner}");
//!   Ok(())
//! }
//! ```
//!
//! Settings can be passed in with the builder:
//!
//! ```
//! use std::time::Duration;
//! use riot_ratelimiter_lib::{RateLimitConfig, RateLimiterBuilder};
//!
//! let config = RateLimitConfig::from_options(Some(2), Some(Duration::from_secs(3)), None);
//! let limiter = RateLimiterBuilder::builder().config(config).build().limiter();
//! assert_eq!(limiter.config().max_retries, 4);
//! ```
#![warn(missing_docs)]

mod limiter;
mod types;

pub mod ratelimit;
pub mod router;
pub mod transport;

pub use limiter::{RateLimiter, RateLimiterBuilder};
pub use ratelimit::{RateLimitAdvertisement, RateLimitConfig, RateLimitObserver};
pub use router::{EndpointMethod, extract_method, extract_region};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
pub use types::*;
