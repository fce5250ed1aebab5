use std::fmt::Display;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;
use url::Url;

use crate::{ErrorKind, Result};

/// A request to the Riot Games API: the URL plus transport options
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Fully qualified URL, e.g. `https://euw1.api.riotgames.com/lol/status/v4/platform-data`
    pub url: Url,
    /// HTTP method, `GET` by default
    pub method: Method,
    /// Extra headers, e.g. `X-Riot-Token`
    pub headers: HeaderMap,
    /// Optional JSON body (tournament endpoints)
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Create a new `GET` request for the given URL
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a header, replacing any previous value
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl From<Url> for ApiRequest {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

impl TryFrom<&str> for ApiRequest {
    type Error = ErrorKind;

    fn try_from(url: &str) -> Result<Self> {
        Url::parse(url)
            .map(Self::new)
            .map_err(|e| ErrorKind::ParseUrl(url.to_string(), e))
    }
}

impl TryFrom<String> for ApiRequest {
    type Error = ErrorKind;

    fn try_from(url: String) -> Result<Self> {
        Self::try_from(url.as_str())
    }
}

impl Display for ApiRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Method};
    use serde_json::json;

    use super::ApiRequest;

    #[test]
    fn test_request_from_str() {
        let request = ApiRequest::try_from("https://kr.api.riotgames.com/lol/platform/v3/champion-rotations")
            .unwrap();
        assert_eq!(request.method, Method::GET);
        assert!(request.body.is_none());
        assert_eq!(
            request.to_string(),
            "GET https://kr.api.riotgames.com/lol/platform/v3/champion-rotations"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(ApiRequest::try_from("not a url").is_err());
    }

    #[test]
    fn test_builder_methods() {
        let request = ApiRequest::try_from("https://americas.api.riotgames.com/lol/tournament/v5/providers")
            .unwrap()
            .with_method(Method::POST)
            .with_header(
                http::header::HeaderName::from_static("x-riot-token"),
                HeaderValue::from_static("RGAPI-test"),
            )
            .with_json(json!({"region": "EUW", "url": "https://example.com"}));

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers.get("X-Riot-Token").unwrap(), "RGAPI-test");
        assert_eq!(request.body.unwrap()["region"], "EUW");
    }
}
