//! Failure-budget retry controller.
//!
//! A `CurlTracker` belongs to one deployed app and counts every probe
//! issued against it. `503` and `404` are retried with a fixed backoff
//! while `failed < max_failed`; the check runs before the increment, so a
//! budget of `n` allows `n` retries and the terminal failure leaves
//! `failed == n + 1`.

use std::time::Duration;

use tracing::{debug, error, warn};

use crate::error::CurlError;
use crate::prober::Prober;

/// Default pause between retries.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// `200`: hand the body back.
    Success,
    /// Retriable status with budget left.
    Retry,
    /// Anything else, or a retriable status with the budget spent.
    Fail,
}

/// Retry timing and the optional attempt cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed pause between attempts. Does not grow.
    pub backoff: Duration,
    /// Cap on attempts within a single curl. `None` leaves the loop
    /// bounded by the failure budget alone.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: DEFAULT_BACKOFF,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Classify `status` given the failures spent so far.
    pub fn decide(status: u16, failed: u32, max_failed: u32) -> Decision {
        match status {
            200 => Decision::Success,
            503 | 404 if failed < max_failed => Decision::Retry,
            _ => Decision::Fail,
        }
    }
}

/// Per-app probe counters plus the retry loop that drives them.
#[derive(Debug, Clone)]
pub struct CurlTracker {
    attempted: u32,
    failed: u32,
    max_failed: u32,
    policy: RetryPolicy,
}

impl CurlTracker {
    pub fn new(max_failed: u32, policy: RetryPolicy) -> Self {
        Self {
            attempted: 0,
            failed: 0,
            max_failed,
            policy,
        }
    }

    /// Probes issued so far, successful or not. Saturates at `u32::MAX`.
    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    /// Probes that did not return `200`. Never decreases.
    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn max_failed(&self) -> u32 {
        self.max_failed
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GET `url` until it returns `200` or the failure budget runs out.
    ///
    /// Transport errors are returned on the spot. They count as an
    /// attempt but leave the failure budget untouched.
    pub async fn curl<P: Prober>(&mut self, prober: &P, url: &str) -> Result<String, CurlError> {
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            self.attempted = self.attempted.saturating_add(1);

            let resp = match prober.get(url).await {
                Ok(resp) => resp,
                Err(source) => {
                    warn!(%url, error = %source, "curl transport error");
                    return Err(CurlError::Transport {
                        url: url.to_string(),
                        source,
                    });
                }
            };

            match RetryPolicy::decide(resp.status, self.failed, self.max_failed) {
                Decision::Success => {
                    debug!(%url, attempts, "curl succeeded");
                    return Ok(resp.body);
                }
                Decision::Retry => {
                    self.failed = self.failed.saturating_add(1);
                    warn!(
                        %url,
                        status = resp.status,
                        body = %resp.body,
                        failed = self.failed,
                        max_failed = self.max_failed,
                        "retrying curl"
                    );
                    if self.policy.max_attempts.is_some_and(|max| attempts >= max) {
                        error!(%url, attempts, "curl attempt cap reached");
                        return Err(CurlError::AttemptsExhausted {
                            url: url.to_string(),
                            attempts,
                        });
                    }
                    tokio::time::sleep(self.policy.backoff).await;
                }
                Decision::Fail => {
                    self.failed = self.failed.saturating_add(1);
                    let err = CurlError::Status {
                        url: url.to_string(),
                        status: resp.status,
                        body: resp.body,
                    };
                    error!(error = %err, failed = self.failed, "curl failed");
                    return Err(err);
                }
            }
        }
    }
}
