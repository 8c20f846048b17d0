//! Per-URL fetching.
//!
//! This module provides:
//! - `HttpTransport`: the seam to the network, with `ReqwestTransport` as the
//!   production implementation
//! - `PerItemFetcher`: fetches one URL under a hard deadline and classifies
//!   the result into a `FetchOutcome`
//!
//! # Timing policy
//!
//! Every URL gets its own deadline (1s by default). The transport call is
//! bounded by that deadline. Once the call returns, a settle window (500ms by
//! default) is raced against the same deadline:
//!
//! - settle window ends first: the result is classified as-is
//! - deadline ends first: the URL is `SkippedByDeadline`, which is not an error
//!
//! In practice a call that returns with at least the settle window left on
//! its deadline is accepted, and anything slower is silently dropped.

mod item;
mod reqwest_transport;
mod types;

pub use item::PerItemFetcher;
pub use reqwest_transport::ReqwestTransport;
pub use types::*;
