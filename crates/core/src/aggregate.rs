//! Per-batch result assembly.
//!
//! A `ResultAggregator` is owned by the task dispatching one batch and is
//! never shared. Successes are only ever observable through
//! `AggregateResponse`, which exists only when the batch had no hard failure.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Collects successful bodies while a batch is being dispatched.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    entries: BTreeMap<String, Vec<u8>>,
    skipped: usize,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful body. A repeated URL overwrites the earlier body.
    pub fn record(&mut self, url: &str, body: Vec<u8>) {
        self.entries.insert(url.to_string(), body);
    }

    /// Notes a URL left out because its deadline won.
    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn finish(self) -> AggregateResponse {
        AggregateResponse {
            entries: self.entries,
            skipped: self.skipped,
        }
    }
}

/// URL to body mapping for a batch that completed without hard failures.
///
/// Keys are sorted, so the rendered JSON is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResponse {
    entries: BTreeMap<String, Vec<u8>>,
    skipped: usize,
}

impl AggregateResponse {
    pub fn get(&self, url: &str) -> Option<&[u8]> {
        self.entries.get(url).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fetches dropped by the deadline policy.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Renders the JSON object `{ url: body }`.
    ///
    /// Bodies are emitted as text; invalid UTF-8 sequences become U+FFFD.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let rendered: BTreeMap<&str, Cow<'_, str>> = self
            .entries
            .iter()
            .map(|(url, body)| (url.as_str(), String::from_utf8_lossy(body)))
            .collect();
        serde_json::to_vec(&rendered)
    }
}
