//! cedar-probe — HTTP probing with a failure-budget retry policy.
//!
//! # Architecture
//!
//! ```text
//! CurlTracker (attempted / failed / max_failed)
//!   ├── RetryPolicy::decide(status) → Success | Retry | Fail
//!   ├── Prober::get(url) → ProbeResponse { status, body }
//!   └── fixed backoff between retries
//! ```
//!
//! Only `503` and `404` are retried, and only while the failure budget
//! lasts. Transport errors are never retried. The budget counts failures,
//! not attempts or elapsed time, so a server that alternates between a
//! retriable status and `200` across calls never exhausts it. Set
//! `RetryPolicy::max_attempts` to cap a single call.

pub mod error;
/// Test double for `Prober`. Intended for tests, not production use.
pub mod mock;
pub mod prober;
pub mod retry;

pub use error::{CurlError, ProbeError};
pub use prober::{HttpProber, ProbeResponse, Prober};
pub use retry::{CurlTracker, Decision, RetryPolicy};
