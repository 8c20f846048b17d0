//! Single-URL fetch with deadline and settle window.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::config::FetcherConfig;

use super::{FetchError, FetchOutcome, HttpTransport, TransportError, TransportResponse};

/// Fetches one URL and decides whether its result is kept.
#[derive(Clone)]
pub struct PerItemFetcher {
    transport: Arc<dyn HttpTransport>,
    deadline: Duration,
    settle_window: Duration,
}

impl std::fmt::Debug for PerItemFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerItemFetcher")
            .field("transport", &self.transport.name())
            .field("deadline", &self.deadline)
            .field("settle_window", &self.settle_window)
            .finish()
    }
}

impl PerItemFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &FetcherConfig) -> Self {
        Self::with_timings(transport, config.deadline(), config.settle_window())
    }

    pub fn with_timings(
        transport: Arc<dyn HttpTransport>,
        deadline: Duration,
        settle_window: Duration,
    ) -> Self {
        Self {
            transport,
            deadline,
            settle_window,
        }
    }

    /// Fetches `url` once. Never retries.
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let started = Instant::now();
        let deadline = started + self.deadline;

        let result = match time::timeout_at(deadline, self.transport.get(url)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        };

        // The call has returned; race the settle window against the deadline.
        // On a tie the deadline wins.
        let outcome = tokio::select! {
            biased;
            _ = time::sleep_until(deadline) => FetchOutcome::SkippedByDeadline,
            _ = time::sleep(self.settle_window) => classify(url, result),
        };

        debug!(
            url = url,
            outcome = outcome.kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fetch finished"
        );

        outcome
    }
}

fn classify(url: &str, result: Result<TransportResponse, TransportError>) -> FetchOutcome {
    match result {
        Ok(response) if response.is_success() => FetchOutcome::Success(response.body),
        Ok(response) => FetchOutcome::HardFailure(FetchError::Status {
            url: url.to_string(),
            status: response.status,
        }),
        Err(source) => FetchOutcome::HardFailure(FetchError::Transport {
            url: url.to_string(),
            source,
        }),
    }
}
