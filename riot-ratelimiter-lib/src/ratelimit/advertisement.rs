use std::time::Duration;

use serde::{Serialize, Serializer};
use strum::{Display, EnumString};

use super::Tier;
use super::headers::{
    APP_RATE_LIMIT, APP_RATE_LIMIT_COUNT, METHOD_RATE_LIMIT, METHOD_RATE_LIMIT_COUNT,
};
use crate::{ErrorKind, Result};

/// The limit that was exceeded, as reported by `X-Rate-Limit-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LimitType {
    /// The application limit of the API key
    Application,
    /// The method limit of the endpoint method
    Method,
    /// A limit of the underlying service, shared by all API keys
    Service,
}

/// The rate limit headers of a single response.
///
/// The limit and count headers are kept verbatim. They are only parsed
/// (see [`RateLimitAdvertisement::tier_specs`]) when a chain is built or
/// reconciled, so that a malformed value does not hide the status of the
/// response it was attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitAdvertisement {
    /// `X-App-Rate-Limit`, e.g. `20:1,100:120`
    pub app_limits: Option<String>,
    /// `X-App-Rate-Limit-Count`, e.g. `1:1,1:120`
    pub app_counts: Option<String>,
    /// `X-Method-Rate-Limit`
    pub method_limits: Option<String>,
    /// `X-Method-Rate-Limit-Count`
    pub method_counts: Option<String>,
    /// `Retry-After`
    #[serde(rename = "retryAfterMs", serialize_with = "serialize_millis")]
    pub retry_after: Option<Duration>,
    /// `X-Rate-Limit-Type`
    pub limit_type: Option<LimitType>,
}

impl RateLimitAdvertisement {
    /// Raw limits of the given tier, if advertised
    #[must_use]
    pub fn limits(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Application => self.app_limits.as_deref(),
            Tier::Method => self.method_limits.as_deref(),
        }
    }

    /// Raw counts of the given tier, if advertised
    #[must_use]
    pub fn counts(&self, tier: Tier) -> Option<&str> {
        match tier {
            Tier::Application => self.app_counts.as_deref(),
            Tier::Method => self.method_counts.as_deref(),
        }
    }

    /// Returns `true` if neither tier is advertised
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.app_limits.is_none() && self.method_limits.is_none()
    }

    /// Parse the advertised tiers of one limit bracket.
    ///
    /// Returns `Ok(None)` if the limits header of that bracket is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidAdvertisement`] if the limits or counts
    /// are malformed.
    pub fn tier_specs(&self, tier: Tier) -> Result<Option<Vec<TierSpec>>> {
        self.limits(tier)
            .map(|limits| TierSpec::parse_all(tier, limits, self.counts(tier).unwrap_or_default()))
            .transpose()
    }
}

/// The settings of one bucket, derived from one `limit:seconds` entry and
/// its index-aligned `count:seconds` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    /// Requests allowed per window
    pub capacity: u64,
    /// Length of the window
    pub window: Duration,
    /// Requests the server has already counted in the current window
    pub count: u64,
}

impl TierSpec {
    /// Requests still available according to the server
    #[must_use]
    pub const fn reservoir(&self) -> u64 {
        self.capacity.saturating_sub(self.count)
    }

    /// Minimum spacing between two dispatches, `window / capacity`.
    /// A zero capacity spaces dispatches by a whole window.
    #[must_use]
    pub fn min_time(&self) -> Duration {
        u32::try_from(self.capacity)
            .ok()
            .and_then(|capacity| self.window.checked_div(capacity))
            .unwrap_or(self.window)
    }

    /// Parse comma separated `limit:seconds` pairs with their index-aligned
    /// `count:seconds` pairs.
    ///
    /// Missing counts (an empty string, or fewer entries than limits) are
    /// taken as zero.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidAdvertisement`] if any entry does not
    /// consist of two `:` separated numbers.
    pub fn parse_all(tier: Tier, limits: &str, counts: &str) -> Result<Vec<Self>> {
        let (limits_header, counts_header) = header_names(tier);

        let counts = if counts.trim().is_empty() {
            Vec::new()
        } else {
            counts
                .split(',')
                .map(|entry| parse_pair(entry).map(|(count, _)| count))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| invalid(counts_header, counts))?
        };

        limits
            .split(',')
            .enumerate()
            .map(|(index, entry)| {
                let (capacity, seconds) = parse_pair(entry).ok_or_else(|| invalid(limits_header, limits))?;
                Ok(Self {
                    capacity,
                    window: Duration::from_secs(seconds),
                    count: counts.get(index).copied().unwrap_or_default(),
                })
            })
            .collect()
    }
}

/// Parse `value:seconds`. Extra components are ignored.
fn parse_pair(entry: &str) -> Option<(u64, u64)> {
    let mut parts = entry.trim().split(':');
    let value = parts.next()?.trim().parse().ok()?;
    let seconds = parts.next()?.trim().parse().ok()?;
    Some((value, seconds))
}

fn invalid(header: &'static str, value: &str) -> ErrorKind {
    ErrorKind::InvalidAdvertisement {
        header,
        value: value.to_string(),
        reason: "expected a comma separated list of `value:seconds` pairs".to_string(),
    }
}

const fn header_names(tier: Tier) -> (&'static str, &'static str) {
    match tier {
        Tier::Application => (APP_RATE_LIMIT, APP_RATE_LIMIT_COUNT),
        Tier::Method => (METHOD_RATE_LIMIT, METHOD_RATE_LIMIT_COUNT),
    }
}

#[allow(clippy::ref_option)]
fn serialize_millis<S>(duration: &Option<Duration>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match duration {
        Some(duration) => {
            serializer.serialize_some(&u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
        }
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::{LimitType, RateLimitAdvertisement, TierSpec};
    use crate::ErrorKind;
    use crate::ratelimit::Tier;

    #[test]
    fn test_single_tier_with_count() {
        let specs = TierSpec::parse_all(Tier::Application, "100:20", "1:1").unwrap();
        assert_eq!(
            specs,
            vec![TierSpec {
                capacity: 100,
                window: Duration::from_secs(20),
                count: 1,
            }]
        );
        assert_eq!(specs[0].reservoir(), 99);
        assert_eq!(specs[0].min_time(), Duration::from_millis(200));
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let specs = TierSpec::parse_all(Tier::Method, "100:20", "").unwrap();
        assert_eq!(specs[0].reservoir(), 100);

        let specs = TierSpec::parse_all(Tier::Method, "20:1,100:120", "5:1").unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].reservoir(), 15);
        assert_eq!(specs[1].reservoir(), 100);
        assert_eq!(specs[1].window, Duration::from_secs(120));
        assert_eq!(specs[1].min_time(), Duration::from_millis(1200));
    }

    #[rstest]
    #[case("", "")]
    #[case("1", "1")]
    #[case("100:20", "1")]
    #[case("100:20,abc", "")]
    #[case("-1:20", "")]
    #[case("100:20", "1:1,x:1")]
    fn test_malformed_advertisements(#[case] limits: &str, #[case] counts: &str) {
        let result = TierSpec::parse_all(Tier::Application, limits, counts);
        assert!(
            matches!(result, Err(ErrorKind::InvalidAdvertisement { .. })),
            "{limits:?} / {counts:?}"
        );
    }

    #[test]
    fn test_error_names_the_header() {
        let err = TierSpec::parse_all(Tier::Method, "100", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid rate limit header `X-Method-Rate-Limit: 100`: expected a comma separated list of `value:seconds` pairs"
        );
    }

    #[test]
    fn test_over_counted_reservoir_saturates() {
        let specs = TierSpec::parse_all(Tier::Method, "10:10", "12:10").unwrap();
        assert_eq!(specs[0].reservoir(), 0);
    }

    #[test]
    fn test_zero_capacity_min_time() {
        let spec = TierSpec {
            capacity: 0,
            window: Duration::from_secs(10),
            count: 0,
        };
        assert_eq!(spec.min_time(), Duration::from_secs(10));
    }

    #[test]
    fn test_tier_specs_of_absent_tier() {
        let advertisement = RateLimitAdvertisement {
            app_limits: Some("20:1,100:120".into()),
            app_counts: Some("1:1,1:120".into()),
            ..RateLimitAdvertisement::default()
        };
        assert_eq!(advertisement.tier_specs(Tier::Method).unwrap(), None);
        assert_eq!(
            advertisement
                .tier_specs(Tier::Application)
                .unwrap()
                .map(|specs| specs.len()),
            Some(2)
        );
        assert!(!advertisement.is_empty());
        assert!(RateLimitAdvertisement::default().is_empty());
    }

    #[test]
    fn test_serialization() {
        let advertisement = RateLimitAdvertisement {
            method_limits: Some("50:10".into()),
            method_counts: Some("50:10".into()),
            retry_after: Some(Duration::from_secs(3)),
            limit_type: Some(LimitType::Method),
            ..RateLimitAdvertisement::default()
        };
        assert_eq!(
            serde_json::to_value(&advertisement).unwrap(),
            json!({
                "appLimits": null,
                "appCounts": null,
                "methodLimits": "50:10",
                "methodCounts": "50:10",
                "retryAfterMs": 3000,
                "limitType": "method",
            })
        );
    }

    #[test]
    fn test_limit_type_parsing() {
        assert_eq!("application".parse(), Ok(LimitType::Application));
        assert_eq!("SERVICE".parse(), Ok(LimitType::Service));
        assert!("burst".parse::<LimitType>().is_err());
    }
}
