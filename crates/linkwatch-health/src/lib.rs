//! linkwatch-health — reachability probing for the linkwatch watchdog.
//!
//! # Architecture
//!
//! ```text
//! RetryPolicy::run
//!   ├── Probing(1) ── Prober::probe(i) → ProbeOutcome
//!   │     ├── Success → Succeeded
//!   │     └── Failure → sleep(retry_delay) → Probing(2) …
//!   └── Probing(max) ── Failure → Warning notification → ExhaustedFailed
//! ```
//!
//! A single reachable answer ends the session early. Only a failure on
//! every attempt of the budget counts as real loss of connectivity.

pub mod checker;
pub mod retry;

pub use checker::{HttpProber, Prober};
pub use retry::{RetryPolicy, SessionState};
