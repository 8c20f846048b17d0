//! Common test utilities for in-process endpoint testing.
//!
//! The fixture builds the real router around either a `MockTransport`
//! (deterministic, works with tokio's paused clock) or a `ReqwestTransport`
//! (for tests that talk to a wiremock upstream).

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use fanout_core::{testing::MockTransport, Config, HttpTransport, ReqwestTransport};
use fanout_server::state::AppState;

/// Test fixture wrapping the router and its shared state.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state, for inspecting the admission gate
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

impl TestFixture {
    /// Fixture backed by a mock transport.
    pub fn with_mock(transport: Arc<MockTransport>, config: Config) -> Self {
        Self::with_transport(transport as Arc<dyn HttpTransport>, config)
    }

    /// Fixture backed by real HTTP.
    pub fn with_http(config: Config) -> Self {
        let transport = ReqwestTransport::new(&config.fetcher).expect("Failed to create transport");
        Self::with_transport(Arc::new(transport), config)
    }

    fn with_transport(transport: Arc<dyn HttpTransport>, config: Config) -> Self {
        let state = Arc::new(AppState::new(config, transport));
        let router = fanout_server::api::create_router(Arc::clone(&state));
        Self { router, state }
    }

    /// POST a JSON array of URLs to the batch endpoint.
    pub async fn post_urls(&self, urls: &[String]) -> TestResponse {
        let body = serde_json::to_string(urls).unwrap();
        self.request("POST", "/", Body::from(body)).await
    }

    /// POST a raw body (for malformed input).
    pub async fn post_raw(&self, body: &str) -> TestResponse {
        self.request("POST", "/", Body::from(body.to_string())).await
    }

    /// Send a request with an empty body.
    pub async fn send(&self, method: &str, path: &str) -> TestResponse {
        self.request(method, path, Body::empty()).await
    }

    async fn request(&self, method: &str, path: &str, body: Body) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            content_type,
            text: String::from_utf8_lossy(&body_bytes).into_owned(),
        }
    }
}

/// Build `n` distinct URLs under `base`.
pub fn urls_under(base: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}/item/{}", base, i)).collect()
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {{
        let response = &$response;
        let expected = $status;
        assert_eq!(
            response.status, expected,
            "Expected status {:?}, got {:?}. Body: {}",
            expected, response.status, response.text
        );
    }};
}
