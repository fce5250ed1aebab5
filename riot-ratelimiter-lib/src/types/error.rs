use http::StatusCode;
use serde::{Serialize, Serializer};
use thiserror::Error;
use url::Url;

use crate::ratelimit::RateLimitAdvertisement;

/// Possible errors when sending requests through the rate limiter
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The URL could not be mapped to a platform and an endpoint method.
    /// This is never retried.
    #[error("Unsupported region: {} or method: {} for `{url}`", .region.as_deref().unwrap_or("<unresolved>"), .method.as_deref().unwrap_or("<unresolved>"))]
    RouteResolution {
        /// The requested URL
        url: Url,
        /// The platform extracted from the host, if any
        region: Option<String>,
        /// The endpoint method extracted from the path, if any
        method: Option<String>,
    },

    /// A rate limit header was present, but could not be parsed.
    /// No chain is created or modified when this happens.
    #[error("Invalid rate limit header `{header}: {value}`: {reason}")]
    InvalidAdvertisement {
        /// Name of the offending header
        header: &'static str,
        /// Raw header value
        value: String,
        /// What is wrong with the value
        reason: String,
    },

    /// The server answered with a non-successful status other than 429
    #[error("Rejected status code: {status}")]
    RejectedStatusCode {
        /// Response status
        status: StatusCode,
        /// Canonical reason phrase of the status
        status_text: String,
        /// Rate limit headers of the response
        advertisement: RateLimitAdvertisement,
    },

    /// The server answered with 429 and all retries were used up
    #[error("Rate limit exceeded: {status}{}", .advertisement.limit_type.map(|t| format!(" ({t} limit)")).unwrap_or_default())]
    RateLimited {
        /// Response status, always 429
        status: StatusCode,
        /// Canonical reason phrase of the status
        status_text: String,
        /// Rate limit headers of the last response
        advertisement: RateLimitAdvertisement,
    },

    /// Network error while sending the request
    #[error("Network error while sending the request")]
    NetworkRequest(#[source] reqwest::Error),

    /// The response body could not be read
    #[error("Error reading response body: {0}")]
    ReadResponseBody(#[source] reqwest::Error),

    /// The response body is not valid JSON
    #[error("Response body is not valid JSON: {0}")]
    InvalidResponseBody(#[from] serde_json::Error),

    /// The given string can not be parsed into a URL
    #[error("Cannot parse `{0}` as URL: {1}")]
    ParseUrl(String, #[source] url::ParseError),

    /// Synchronizing a bucket kept losing against concurrent updates
    #[error("Lost every compare-and-swap attempt while synchronizing bucket {bucket}")]
    SynchronizationConflict {
        /// Identifier of the bucket
        bucket: String,
    },

    /// An endpoint method is not part of the catalog
    #[error("Unknown endpoint method `{0}`")]
    UnknownMethod(String),

    /// A path template parameter was not supplied
    #[error("Missing parameter `{param}` for template `{template}`")]
    MissingTemplateParameter {
        /// The template being rendered
        template: &'static str,
        /// The missing parameter name
        param: String,
    },
}

impl ErrorKind {
    /// The HTTP status of the response that caused this error, if any
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RejectedStatusCode { status, .. } | Self::RateLimited { status, .. } => {
                Some(*status)
            }
            Self::NetworkRequest(e) | Self::ReadResponseBody(e) => e.status(),
            _ => None,
        }
    }

    /// The rate limit headers of the response that caused this error, if any
    #[must_use]
    pub const fn advertisement(&self) -> Option<&RateLimitAdvertisement> {
        match self {
            Self::RejectedStatusCode { advertisement, .. }
            | Self::RateLimited { advertisement, .. } => Some(advertisement),
            _ => None,
        }
    }

    /// Returns `true` if the server rejected the request with 429
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Serialized form of a response the server rejected
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Rejection<'a> {
    status: u16,
    status_text: &'a str,
    #[serde(flatten)]
    advertisement: &'a RateLimitAdvertisement,
}

/// Rejected responses serialize as `{status, statusText, ...advertisement}`,
/// every other error as its message.
impl Serialize for ErrorKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::RejectedStatusCode {
                status,
                status_text,
                advertisement,
            }
            | Self::RateLimited {
                status,
                status_text,
                advertisement,
            } => Rejection {
                status: status.as_u16(),
                status_text,
                advertisement,
            }
            .serialize(serializer),
            _ => serializer.collect_str(self),
        }
    }
}
