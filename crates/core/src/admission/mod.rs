//! Admission control for batch requests.
//!
//! The `AdmissionGate` bounds how many batches are dispatched at the same
//! time. Each admitted batch holds exactly one `AdmissionToken`; the slot is
//! returned when the token is dropped, so every exit path (normal return,
//! error, panic unwinding, task abort) releases it.
//!
//! Callers beyond capacity wait for a slot rather than being rejected. No
//! fairness is promised beyond what `tokio::sync::Semaphore` provides.
//!
//! # Example
//!
//! ```ignore
//! use fanout_core::admission::AdmissionGate;
//!
//! let gate = AdmissionGate::new(100);
//! let token = gate.acquire().await?;
//! // ... dispatch the batch ...
//! drop(token); // slot released
//! ```

mod gate;

pub use gate::{AdmissionError, AdmissionGate, AdmissionStats, AdmissionToken};
