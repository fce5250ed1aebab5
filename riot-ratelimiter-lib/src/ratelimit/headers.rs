//! Handle the rate limit headers of the Riot Games API.

use http::{HeaderMap, HeaderValue};
use std::time::{Duration, SystemTime};
use thiserror::Error;

use super::{LimitType, RateLimitAdvertisement};

/// Application limits, e.g. `20:1,100:120`
pub(crate) const APP_RATE_LIMIT: &str = "X-App-Rate-Limit";
/// Requests counted against the application limits, e.g. `1:1,1:120`
pub(crate) const APP_RATE_LIMIT_COUNT: &str = "X-App-Rate-Limit-Count";
/// Method limits
pub(crate) const METHOD_RATE_LIMIT: &str = "X-Method-Rate-Limit";
/// Requests counted against the method limits
pub(crate) const METHOD_RATE_LIMIT_COUNT: &str = "X-Method-Rate-Limit-Count";
/// The exceeded limit of a 429 response
pub(crate) const RATE_LIMIT_TYPE: &str = "X-Rate-Limit-Type";

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum RetryAfterParseError {
    #[error("Unable to parse value '{0}'")]
    ValueError(String),

    #[error("Header value contains invalid chars")]
    HeaderValueError,
}

impl RateLimitAdvertisement {
    /// Collect the rate limit headers of a response.
    ///
    /// This never fails: limit and count values are validated lazily, an
    /// unparsable `Retry-After` or unknown `X-Rate-Limit-Type` is treated as
    /// absent.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let retry_after = headers.get(http::header::RETRY_AFTER).and_then(|value| {
            parse_retry_after(value)
                .inspect_err(|e| log::debug!("Ignoring Retry-After header: {e}"))
                .ok()
        });

        let limit_type = header_string(headers, RATE_LIMIT_TYPE).and_then(|value| {
            value
                .parse::<LimitType>()
                .inspect_err(|_| log::debug!("Ignoring unknown rate limit type '{value}'"))
                .ok()
        });

        Self {
            app_limits: header_string(headers, APP_RATE_LIMIT),
            app_counts: header_string(headers, APP_RATE_LIMIT_COUNT),
            method_limits: header_string(headers, METHOD_RATE_LIMIT),
            method_counts: header_string(headers, METHOD_RATE_LIMIT_COUNT),
            retry_after,
            limit_type,
        }
    }
}

/// Read a header as a string. Empty values count as absent, invalid bytes
/// are replaced so that they surface when the value is parsed.
fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?;
    let value = String::from_utf8_lossy(value.as_bytes()).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Parse the "Retry-After" header as specified per
/// [RFC 7231 section 7.1.3](https://www.rfc-editor.org/rfc/rfc7231#section-7.1.3)
pub(crate) fn parse_retry_after(value: &HeaderValue) -> Result<Duration, RetryAfterParseError> {
    let value = value
        .to_str()
        .map_err(|_| RetryAfterParseError::HeaderValueError)?;

    // RFC 7231: Retry-After = HTTP-date / delay-seconds
    value.parse::<u64>().map(Duration::from_secs).or_else(|_| {
        httpdate::parse_http_date(value)
            .map(|s| {
                s.duration_since(SystemTime::now())
                    // if date is in the past, we can use ZERO
                    .unwrap_or(Duration::ZERO)
            })
            .map_err(|_| RetryAfterParseError::ValueError(value.into()))
    })
}
