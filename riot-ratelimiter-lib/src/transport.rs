//! Sending requests over the network.
//!
//! The rate limiter does not talk HTTP itself. It hands every admitted
//! request to a [`Transport`], which returns status, headers and body.
use std::fmt::Debug;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};

use crate::{ApiRequest, ErrorKind, Result};

/// Status, headers and body of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body as text. Empty if the server sent none.
    pub body: String,
}

impl TransportResponse {
    /// Create a response without headers
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Sends a request and reads the whole response.
///
/// Timeouts and connection failures are reported as errors. Non-successful
/// statuses are not errors at this level.
#[async_trait]
pub trait Transport: Debug + Send + Sync {
    /// Send `request` and wait for the response
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a [`reqwest::Client`]
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Use a preconfigured client, e.g. with a timeout or default headers
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<TransportResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ErrorKind::NetworkRequest)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ErrorKind::ReadResponseBody)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_utils::mock_server;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ReqwestTransport, Transport};
    use crate::{ApiRequest, ErrorKind};

    #[tokio::test]
    async fn test_reads_status_headers_and_body() {
        let mock_server = mock_server!(
            StatusCode::OK,
            set_body_string(r#"{"puuid":"abc"}"#),
            insert_header("X-App-Rate-Limit", "20:1")
        );
        let request = ApiRequest::try_from(mock_server.uri()).unwrap();

        let response = ReqwestTransport::default().send(&request).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, r#"{"puuid":"abc"}"#);
        assert_eq!(response.headers["x-app-rate-limit"], "20:1");
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let mock_server = mock_server!(StatusCode::TOO_MANY_REQUESTS);
        let request = ApiRequest::try_from(mock_server.uri()).unwrap();

        let response = ReqwestTransport::default().send(&request).await.unwrap();
        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_sends_method_headers_and_json_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lol/tournament/v5/providers"))
            .and(header("X-Riot-Token", "RGAPI-test"))
            .and(body_json(json!({"region": "EUW", "url": "https://example.com"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("42"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = ApiRequest::try_from(format!(
            "{}/lol/tournament/v5/providers",
            mock_server.uri()
        ))
        .unwrap()
        .with_method(Method::POST)
        .with_header("x-riot-token".parse().unwrap(), "RGAPI-test".parse().unwrap())
        .with_json(json!({"region": "EUW", "url": "https://example.com"}));

        let response = ReqwestTransport::default().send(&request).await.unwrap();
        assert_eq!(response.body, "42");
    }

    #[tokio::test]
    async fn test_connection_failure() {
        // nothing listens on the discard port
        let request = ApiRequest::try_from("http://127.0.0.1:9").unwrap();
        let result = ReqwestTransport::default().send(&request).await;
        assert!(matches!(result, Err(ErrorKind::NetworkRequest(_))));
    }
}
