//! Batch dispatching.
//!
//! `RequestDispatcher` drives a `BatchRequest` through `PerItemFetcher` one
//! URL at a time, in request order, with all-or-nothing aggregation:
//!
//! - `SkippedByDeadline`: continue, nothing recorded
//! - `HardFailure`: stop, drop everything collected so far, return the error
//! - `Success`: record url -> body
//!
//! Latency adds up across URLs. Concurrency only exists between batches and
//! is bounded by the admission gate.

mod dispatch;
mod types;

pub use dispatch::RequestDispatcher;
pub use types::*;
