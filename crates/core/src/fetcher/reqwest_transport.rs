//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::FetcherConfig;

use super::{HttpTransport, TransportError, TransportResponse};

/// Production transport. One instance (and one connection pool) is shared by
/// every batch.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the configured User-Agent.
    ///
    /// No client-level timeout is set; the deadline is owned by
    /// `PerItemFetcher`.
    pub fn new(config: &FetcherConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else if e.is_connect() {
                TransportError::Connect(e.to_string())
            } else {
                TransportError::Request(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        debug!(url = url, status = status, bytes = body.len(), "Upstream responded");

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
