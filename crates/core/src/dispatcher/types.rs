//! Types for batch dispatching.

use thiserror::Error;

use crate::fetcher::FetchError;

/// Validation errors raised before any network activity.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchRequestError {
    #[error("Too many urls in request: {count} (max {max})")]
    TooManyUrls { count: usize, max: usize },
}

/// Errors that end a batch without a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    /// A URL failed hard; all partial results were discarded.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The requester went away before the batch finished.
    #[error("request cancelled")]
    Cancelled,
}

/// Ordered list of URLs to fetch. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    urls: Vec<String>,
}

impl BatchRequest {
    /// Builds a batch, rejecting more than `max_urls` entries.
    pub fn new(urls: Vec<String>, max_urls: usize) -> Result<Self, BatchRequestError> {
        if urls.len() > max_urls {
            return Err(BatchRequestError::TooManyUrls {
                count: urls.len(),
                max: max_urls,
            });
        }
        Ok(Self { urls })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
