//! `test-utils` is used for testing `riot-ratelimiter-lib`.
//! This crate does not depend on `riot-ratelimiter-lib`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies.

/// Create a mock web server, which responds with a predefined status when
/// handling a matching request
#[macro_export]
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::method("GET")).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// Build a `http::HeaderMap` from `name => value` pairs
///
/// # Panic
///
/// This panics on invalid header names or values, so it should only be used
/// for testing
#[macro_export]
macro_rules! headers {
    ($($name:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut headers = http::HeaderMap::new();
        $(
            headers.insert(
                http::HeaderName::from_bytes($name.as_bytes()).expect("Expected valid header name"),
                http::HeaderValue::from_str($value).expect("Expected valid header value"),
            );
        )*
        headers
    }};
}

/// Build a Riot Games API URL for a platform and a path
///
/// # Panic
///
/// This panics on error, so it should only be used for testing
#[macro_export]
macro_rules! riot_url {
    ($platform:expr, $path:expr) => {{
        url::Url::parse(&format!("https://{}.api.riotgames.com{}", $platform, $path))
            .expect("Expected valid Riot Games API URL")
    }};
}
