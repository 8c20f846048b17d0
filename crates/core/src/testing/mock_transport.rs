//! Mock transport for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetcher::{HttpTransport, TransportError, TransportResponse};

/// A scripted reply for one URL.
#[derive(Debug, Clone)]
struct ScriptedReply {
    delay: Duration,
    result: Result<TransportResponse, TransportError>,
}

/// Mock implementation of the HttpTransport trait.
///
/// Provides controllable behavior for testing:
/// - Per-URL status, body, and latency
/// - Transport failures
/// - Recorded calls, in the order they were made
///
/// URLs without a scripted reply fail with `TransportError::Connect`.
///
/// # Example
///
/// ```rust,ignore
/// use fanout_core::testing::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.respond("http://a", 200, "A").await;
/// transport.respond_after("http://slow", Duration::from_millis(700), 200, "S").await;
///
/// // ... run a batch ...
///
/// assert_eq!(transport.calls().await, vec!["http://a", "http://slow"]);
/// ```
#[derive(Default)]
pub struct MockTransport {
    replies: Arc<RwLock<HashMap<String, ScriptedReply>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("replies", &"<replies>")
            .field("calls", &"<calls>")
            .finish()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply immediately with `status` and `body`.
    pub async fn respond(&self, url: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.respond_after(url, Duration::ZERO, status, body).await;
    }

    /// Reply with `status` and `body` after `delay`.
    pub async fn respond_after(
        &self,
        url: &str,
        delay: Duration,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) {
        self.script(
            url,
            ScriptedReply {
                delay,
                result: Ok(TransportResponse::new(status, body)),
            },
        )
        .await;
    }

    /// Fail immediately with `error`.
    pub async fn fail(&self, url: &str, error: TransportError) {
        self.script(
            url,
            ScriptedReply {
                delay: Duration::ZERO,
                result: Err(error),
            },
        )
        .await;
    }

    /// URLs requested so far, in call order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    /// Number of requests made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Clear recorded calls, keeping scripted replies.
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn script(&self, url: &str, reply: ScriptedReply) {
        self.replies.write().await.insert(url.to_string(), reply);
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        self.calls.write().await.push(url.to_string());

        let reply = self.replies.read().await.get(url).cloned();
        match reply {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.result
            }
            None => Err(TransportError::Connect(format!(
                "no mock reply configured for {}",
                url
            ))),
        }
    }
}
