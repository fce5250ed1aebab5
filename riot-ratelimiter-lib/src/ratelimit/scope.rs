use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display};

use crate::{EndpointMethod, PlatformId};

/// The two limit brackets advertised by the API.
///
/// Application limits apply to every request of the API key on a platform,
/// method limits to every request of one endpoint method on a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Shared by all methods of a platform
    Application,
    /// Specific to one endpoint method of a platform
    Method,
}

/// A `(platform, endpoint method)` pair.
///
/// The application tier of a scope is shared with every other scope on the
/// same platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Scope {
    /// Platform taken from the request host
    pub region: PlatformId,
    /// Endpoint method taken from the request path
    pub method: EndpointMethod,
}

impl Scope {
    /// Create a new scope
    #[must_use]
    pub const fn new(region: PlatformId, method: EndpointMethod) -> Self {
        Self { region, method }
    }

    /// Identifier of the chain serving the given tier of this scope.
    ///
    /// Application chains are named after the platform alone, since they
    /// are shared by all methods of that platform.
    #[must_use]
    pub fn chain_id(&self, tier: Tier) -> String {
        match tier {
            Tier::Application => self.region.to_string(),
            Tier::Method => format!("{}_{}", self.region, self.method),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.region, self.method)
    }
}
