//! Sequential batch dispatcher.

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::aggregate::{AggregateResponse, ResultAggregator};
use crate::fetcher::{FetchOutcome, PerItemFetcher};

use super::{BatchError, BatchRequest};

/// Runs batches through a `PerItemFetcher`.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    fetcher: PerItemFetcher,
}

impl RequestDispatcher {
    pub fn new(fetcher: PerItemFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetches every URL of `batch` in order.
    ///
    /// `cancel` is checked before each URL is started. A fetch that is already
    /// running is never interrupted; it ends at its own deadline.
    pub async fn dispatch(
        &self,
        batch: &BatchRequest,
        cancel: &CancellationToken,
    ) -> Result<AggregateResponse, BatchError> {
        let batch_id = Uuid::new_v4();
        let span = info_span!("batch", %batch_id, urls = batch.len());

        async move {
            let started = Instant::now();
            let mut aggregator = ResultAggregator::new();

            for (index, url) in batch.urls().iter().enumerate() {
                if cancel.is_cancelled() {
                    info!(completed = index, "Request cancelled, not starting remaining urls");
                    return Err(BatchError::Cancelled);
                }

                match self.fetcher.fetch(url).await {
                    FetchOutcome::Success(body) => aggregator.record(url, body),
                    FetchOutcome::SkippedByDeadline => {
                        debug!(url = url.as_str(), "Request too long, skipping");
                        aggregator.skip();
                    }
                    FetchOutcome::HardFailure(err) => {
                        warn!(url = url.as_str(), error = %err, "Batch aborted");
                        return Err(err.into());
                    }
                }
            }

            let response = aggregator.finish();
            info!(
                fetched = response.len(),
                skipped = response.skipped(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Batch completed"
            );
            Ok(response)
        }
        .instrument(span)
        .await
    }
}
