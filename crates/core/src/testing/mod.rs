//! Testing utilities and mock implementations.
//!
//! `MockTransport` stands in for the network so batch behaviour, including
//! the deadline policy, can be exercised deterministically with tokio's
//! paused clock.
//!
//! # Example
//!
//! ```rust,ignore
//! use fanout_core::testing::MockTransport;
//! use fanout_core::{PerItemFetcher, RequestDispatcher};
//!
//! let transport = Arc::new(MockTransport::new());
//! transport.respond("http://a", 200, "A").await;
//!
//! let dispatcher = RequestDispatcher::new(PerItemFetcher::new(transport.clone(), &config));
//! ```

mod mock_transport;

pub use mock_transport::MockTransport;
