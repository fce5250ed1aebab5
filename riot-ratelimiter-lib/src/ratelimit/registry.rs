use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{Chain, Scope, Tier};
use crate::{EndpointMethod, PlatformId};

/// The chains of one platform
#[derive(Debug, Default)]
pub struct RegistryEntry {
    app: OnceLock<Arc<Chain>>,
    methods: DashMap<EndpointMethod, Arc<Chain>>,
}

impl RegistryEntry {
    /// The application chain, shared by every method of the platform
    #[must_use]
    pub fn app_chain(&self) -> Option<Arc<Chain>> {
        self.app.get().cloned()
    }

    /// The method chain of `method`
    #[must_use]
    pub fn method_chain(&self, method: EndpointMethod) -> Option<Arc<Chain>> {
        self.methods.get(&method).map(|chain| Arc::clone(&chain))
    }

    /// Methods with a chain, sorted
    #[must_use]
    pub fn methods(&self) -> Vec<EndpointMethod> {
        let mut methods: Vec<_> = self.methods.iter().map(|entry| *entry.key()).collect();
        methods.sort();
        methods
    }
}

/// The chains of one scope that exist at a given moment
#[derive(Debug, Clone, Default)]
pub struct ScopeChains {
    /// Application chain of the platform
    pub app: Option<Arc<Chain>>,
    /// Method chain of the scope
    pub method: Option<Arc<Chain>>,
}

impl ScopeChains {
    /// The chain of the given tier
    #[must_use]
    pub fn get(&self, tier: Tier) -> Option<&Arc<Chain>> {
        match tier {
            Tier::Application => self.app.as_ref(),
            Tier::Method => self.method.as_ref(),
        }
    }

    /// Returns `true` if neither tier is provisioned
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.app.is_none() && self.method.is_none()
    }
}

/// All chains of a [`crate::RateLimiter`], keyed by platform.
///
/// Chains are created on first use and live as long as the registry.
/// Creating a chain is idempotent: when several responses race to
/// provision the same scope, the first one wins and the others get its chain.
#[derive(Debug, Default)]
pub struct Registry {
    entries: DashMap<PlatformId, Arc<RegistryEntry>>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The chains of a platform, if any was provisioned
    #[must_use]
    pub fn entry(&self, region: PlatformId) -> Option<Arc<RegistryEntry>> {
        self.entries.get(&region).map(|entry| Arc::clone(&entry))
    }

    /// The chains that currently serve `scope`
    #[must_use]
    pub fn chains(&self, scope: &Scope) -> ScopeChains {
        self.entry(scope.region)
            .map(|entry| ScopeChains {
                app: entry.app_chain(),
                method: entry.method_chain(scope.method),
            })
            .unwrap_or_default()
    }

    /// Platforms with at least one chain, sorted
    #[must_use]
    pub fn regions(&self) -> Vec<PlatformId> {
        let mut regions: Vec<_> = self.entries.iter().map(|entry| *entry.key()).collect();
        regions.sort();
        regions
    }

    /// Returns `true` if no chain was provisioned yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the chain of `tier` for `scope`, creating it with `build` if it
    /// does not exist yet.
    ///
    /// `build` runs at most once per chain. Returns the chain and whether
    /// this call created it.
    pub fn provision(
        &self,
        scope: &Scope,
        tier: Tier,
        build: impl FnOnce() -> Chain,
    ) -> (Arc<Chain>, bool) {
        let entry = Arc::clone(&self.entries.entry(scope.region).or_default());

        match tier {
            Tier::Application => {
                let mut created = false;
                let chain = entry.app.get_or_init(|| {
                    created = true;
                    Arc::new(build())
                });
                (Arc::clone(chain), created)
            }
            Tier::Method => match entry.methods.entry(scope.method) {
                Entry::Occupied(occupied) => (Arc::clone(occupied.get()), false),
                Entry::Vacant(vacant) => {
                    let chain = Arc::new(build());
                    vacant.insert(Arc::clone(&chain));
                    (chain, true)
                }
            },
        }
    }
}
