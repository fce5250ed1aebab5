use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use http::StatusCode;
use serde_json::Value;
use tokio::time::Instant;
use typed_builder::TypedBuilder;

use crate::ratelimit::{
    Chain, ChainPermit, HIGH_CONCURRENCY, NoopObserver, RateLimitAdvertisement, RateLimitConfig,
    RateLimitObserver, Registry, RetryPolicy, Scope, ScopeChains, ScopeStats, ScopeStatsMap, Tier,
    TierSpec,
};
use crate::transport::{ReqwestTransport, Transport, TransportResponse};
use crate::{ApiRequest, EndpointMethod, ErrorKind, PlatformId, Result, router};

/// Builder for [`RateLimiter`].
///
/// See crate-level documentation for usage example.
#[derive(TypedBuilder, Debug)]
#[builder(field_defaults(default))]
#[builder(builder_method(doc = "
Create a builder for building `RateLimiterBuilder`.

On the builder call, call methods with same name as its fields to set their values.

Finally, call `.build()` to create the instance of `RateLimiterBuilder`.
"))]
pub struct RateLimiterBuilder {
    /// Settings shared by every chain
    config: RateLimitConfig,

    /// Sends the admitted requests.
    ///
    /// Defaults to a [`ReqwestTransport`] with a default `reqwest` client.
    #[builder(default = Arc::new(ReqwestTransport::default()) as Arc<dyn Transport>)]
    transport: Arc<dyn Transport>,

    /// Receives rate limiting events. Ignores them by default.
    #[builder(default = Arc::new(NoopObserver) as Arc<dyn RateLimitObserver>)]
    observer: Arc<dyn RateLimitObserver>,
}

impl Default for RateLimiterBuilder {
    #[inline]
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RateLimiterBuilder {
    /// Instantiates a [`RateLimiter`].
    #[must_use]
    pub fn limiter(self) -> RateLimiter {
        let Self {
            config,
            transport,
            observer,
        } = self;

        if config.is_high_concurrency() {
            log::warn!(
                "Concurrency of {} is above {HIGH_CONCURRENCY}, expect 429 responses",
                config.concurrency
            );
        }

        RateLimiter {
            config,
            transport,
            observer,
            registry: Arc::new(Registry::new()),
            stats: Arc::new(DashMap::new()),
        }
    }
}

/// The outcome of a single dispatch
enum Attempt {
    Resolved(Value),
    RateLimited {
        error: ErrorKind,
        /// No method chain served the request, so this was the first
        /// 429 of the scope
        first_contact: bool,
    },
}

/// What happens to chains that already exist when a response arrives
#[derive(Debug, Clone, Copy)]
enum Reconcile {
    /// Lower the reservoirs towards the server counters
    Synchronize,
    /// Apply the advertised limits
    Update,
}

/// Sends requests to the Riot Games API within its advertised rate limits.
///
/// Requests are grouped by platform and endpoint method. A scope is not
/// limited until a response advertises its limits. From then on every
/// request has to clear the method chain and the application chain of its
/// scope, and every response keeps the chains in line with the server.
///
/// Cloning is cheap and clones share their state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn RateLimitObserver>,
    registry: Arc<Registry>,
    stats: Arc<DashMap<Scope, ScopeStats>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiterBuilder::default().limiter()
    }
}

impl RateLimiter {
    /// Send a `GET` request to `url` and return the JSON body.
    ///
    /// # Errors
    ///
    /// See [`RateLimiter::execute`]. Also fails if `url` is not a valid URL.
    pub async fn get(&self, url: &str) -> Result<Value> {
        self.execute(ApiRequest::try_from(url)?).await
    }

    /// Send `request` once the rate limits of its scope allow it, and return
    /// the JSON body of the response. An empty body yields [`Value::Null`].
    ///
    /// Rate limited requests are retried according to the retry policy of
    /// their chain.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::RouteResolution`] if the URL does not belong to a
    ///   known platform and endpoint method
    /// - [`ErrorKind::InvalidAdvertisement`] if the response carries
    ///   malformed rate limit headers
    /// - [`ErrorKind::RateLimited`] if the server still answers with 429
    ///   when no retry is left
    /// - [`ErrorKind::RejectedStatusCode`] for any other non-successful status
    /// - transport errors, unchanged
    /// - [`ErrorKind::InvalidResponseBody`] if the body is not JSON
    pub async fn execute(&self, request: ApiRequest) -> Result<Value> {
        let (region, method) = router::resolve(&request.url)?;
        let scope = Scope::new(region, method);

        let mut attempt = 0;
        let mut first_contact_retried = false;
        loop {
            let (error, first_contact) = match self.dispatch(&scope, &request).await? {
                Attempt::Resolved(value) => return Ok(value),
                Attempt::RateLimited {
                    error,
                    first_contact,
                } => (error, first_contact),
            };

            let delay = if first_contact && !first_contact_retried {
                first_contact_retried = true;
                Some(
                    error
                        .advertisement()
                        .and_then(|advertisement| advertisement.retry_after)
                        .unwrap_or(self.config.retry_after_default),
                )
            } else {
                self.retry_policy(&scope).delay(&error, attempt)
            };

            let Some(delay) = delay else {
                return Err(error);
            };
            log::debug!(
                "{scope}: {error}, retrying in {}ms",
                delay.as_millis()
            );
            self.observer.retry_scheduled(&scope, attempt, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// The policy deciding about retries of `scope`. Requests are queued on
    /// the method chain first, so its policy wins.
    fn retry_policy(&self, scope: &Scope) -> RetryPolicy {
        let chains = self.registry.chains(scope);
        chains
            .method
            .or(chains.app)
            .map_or_else(
                || RetryPolicy::for_tier(Tier::Method, &self.config),
                |chain| chain.retry_policy().clone(),
            )
    }

    async fn dispatch(&self, scope: &Scope, request: &ApiRequest) -> Result<Attempt> {
        let chains = self.registry.chains(scope);
        if chains.is_empty() {
            log::debug!("{scope}: not provisioned, sending {request} unthrottled");
        }

        let permits = admit(&chains).await;
        let start = Instant::now();
        let response = self.transport.send(request).await;
        let elapsed = start.elapsed();
        drop(permits);

        let TransportResponse {
            status,
            headers,
            body,
        } = response?;
        self.stats
            .entry(*scope)
            .or_default()
            .record_response(status.as_u16(), elapsed);
        self.observer.dispatched(scope, status, elapsed);

        let advertisement = RateLimitAdvertisement::from_headers(&headers);
        let status_text = status.canonical_reason().unwrap_or_default().to_string();

        if status.is_success() {
            self.reconcile(scope, &advertisement, Reconcile::Synchronize)?;
            return parse_body(&body).map(Attempt::Resolved);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            self.reconcile(scope, &advertisement, Reconcile::Update)?;
            return Ok(Attempt::RateLimited {
                error: ErrorKind::RateLimited {
                    status,
                    status_text,
                    advertisement,
                },
                first_contact: chains.method.is_none(),
            });
        }

        Err(ErrorKind::RejectedStatusCode {
            status,
            status_text,
            advertisement,
        })
    }

    /// Provision the advertised tiers that have no chain yet, and reconcile
    /// the others.
    ///
    /// Both tiers are parsed before any chain is touched.
    fn reconcile(
        &self,
        scope: &Scope,
        advertisement: &RateLimitAdvertisement,
        mode: Reconcile,
    ) -> Result<()> {
        let mut advertised: Vec<(Tier, Vec<TierSpec>)> = Vec::with_capacity(2);
        for tier in [Tier::Application, Tier::Method] {
            if let Some(specs) = advertisement.tier_specs(tier)? {
                advertised.push((tier, specs));
            }
        }

        for (tier, specs) in advertised {
            let (chain, created) = self.registry.provision(scope, tier, || {
                Chain::from_specs(scope.chain_id(tier), tier, &specs, &self.config)
            });
            if created {
                log::debug!(
                    "{scope}: provisioned {tier} chain {} with {} bucket(s)",
                    chain.id(),
                    chain.buckets().len()
                );
                self.observer.provisioned(scope, &chain);
                continue;
            }

            match mode {
                Reconcile::Synchronize => self.synchronize(scope, &chain, &specs),
                Reconcile::Update => {
                    chain.update(&specs);
                    self.observer.updated(scope, &chain);
                }
            }
        }
        Ok(())
    }

    /// Synchronization never fails a response. A lost race is logged and
    /// the chain keeps its reservoirs until the next response.
    fn synchronize(&self, scope: &Scope, chain: &Chain, specs: &[TierSpec]) {
        match chain.synchronize(specs, chain.in_flight()) {
            Ok(changes) if changes.is_empty() => {}
            Ok(changes) => self.observer.synchronized(scope, chain, &changes),
            Err(error) => {
                log::warn!("{scope}: skipping synchronization of {}: {error}", chain.id());
                self.observer.synchronization_failed(scope, chain, &error);
            }
        }
    }

    /// Settings of this rate limiter
    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// All chains provisioned so far
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Platforms with at least one chain
    #[must_use]
    pub fn provisioned_regions(&self) -> Vec<PlatformId> {
        self.registry.regions()
    }

    /// The application chain of `region`, if provisioned
    #[must_use]
    pub fn app_chain(&self, region: PlatformId) -> Option<Arc<Chain>> {
        self.registry.entry(region)?.app_chain()
    }

    /// The method chain of `method` on `region`, if provisioned
    #[must_use]
    pub fn method_chain(&self, region: PlatformId, method: EndpointMethod) -> Option<Arc<Chain>> {
        self.registry.entry(region)?.method_chain(method)
    }

    /// Response statistics per scope
    #[must_use]
    pub fn scope_stats(&self) -> ScopeStatsMap {
        self.stats
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect::<HashMap<_, _>>()
            .into()
    }
}

/// Wait for the method chain, then for the application chain.
/// Every request takes them in this order, so no two requests wait on each other.
async fn admit(chains: &ScopeChains) -> Vec<ChainPermit> {
    let mut permits = Vec::with_capacity(2);
    for tier in [Tier::Method, Tier::Application] {
        if let Some(chain) = chains.get(tier) {
            permits.push(chain.acquire().await);
        }
    }
    permits
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}
