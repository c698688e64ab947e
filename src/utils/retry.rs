//! Retry policy: backoff scheduling and Retry-After parsing.
//!
//! The policy itself is stateless; it only answers "should this attempt be
//! retried" and "how long should I wait before the next one." The request
//! pipeline owns the attempt loop and the cancellation semantics.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::{Duration, SystemTime};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Upper bound on any single backoff sleep, regardless of policy or
/// `Retry-After` value.
const MAX_SINGLE_SLEEP: Duration = Duration::from_secs(300);

/// Upper bound honored when parsing a `Retry-After` header.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Exponential backoff with symmetric jitter, bounded by a maximum attempt
/// count and a maximum delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
    /// Fraction of the base backoff added/subtracted as jitter, e.g. `0.1`
    /// jitters `[-10%, +10%]` around the computed wait.
    pub jitter_fraction: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            initial_backoff,
            max_backoff,
            multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }

    /// Overrides the jitter fraction (default `0.1`, i.e. `[-10%, +10%]`).
    pub fn with_jitter_fraction(mut self, jitter_fraction: f64) -> Self {
        self.jitter_fraction = jitter_fraction;
        self
    }

    /// Whether `attempt` (1-indexed, the attempt that just failed) is
    /// eligible for a retry under this policy, given whether the failure
    /// itself was retryable at all.
    pub fn should_retry(&self, attempt: u32, retryable: bool) -> bool {
        retryable && attempt < self.max_attempts
    }

    /// The base, un-jittered backoff for the given attempt number (1-indexed).
    fn base_backoff(&self, attempt: u32) -> Duration {
        let exp = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let scaled = self.initial_backoff.as_secs_f64() * exp;
        Duration::from_secs_f64(scaled.min(self.max_backoff.as_secs_f64()))
    }

    /// The wait duration before the next attempt. A server-supplied
    /// `retry_after` wins outright and is used as-is (capped at
    /// `max_backoff`/`MAX_SINGLE_SLEEP`), bypassing jitter entirely — it is
    /// already the upstream's explicit instruction, not a guess to smear.
    /// Otherwise the exponential schedule is computed, jittered by
    /// `±jitter_fraction`, and only then clamped to `[0, max_backoff]`.
    pub fn wait_duration(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(retry_after) = retry_after {
            return retry_after.min(self.max_backoff).min(MAX_RETRY_AFTER).min(MAX_SINGLE_SLEEP);
        }

        let base = self.base_backoff(attempt).as_secs_f64();
        let jitter_span = base * self.jitter_fraction;
        let jittered = base + (fastrand::f64() * 2.0 - 1.0) * jitter_span;
        let capped = jittered.max(0.0).min(self.max_backoff.as_secs_f64()).min(MAX_SINGLE_SLEEP.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Sleeps for `duration`, returning early if `cancel` fires first.
    ///
    /// Returns `true` if the sleep completed, `false` if it was cancelled.
    pub async fn wait(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = sleep(duration) => true,
            _ = cancel.cancelled() => false,
        }
    }
}

/// Parses a `Retry-After` header value, supporting both `delta-seconds` and
/// an RFC 1123 HTTP-date, capped at one hour.
///
/// A value of zero seconds or a date in the past collapses to `None` —
/// per the exponential-formula fallback policy — rather than forcing a
/// zero-length wait.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?;
    let s = value.to_str().ok()?.trim();

    if let Ok(seconds) = s.parse::<u64>() {
        if seconds == 0 {
            return None;
        }
        return Some(Duration::from_secs(seconds).min(MAX_RETRY_AFTER));
    }

    if let Ok(http_date) = httpdate::parse_http_date(s) {
        let now = SystemTime::now();
        let dur = http_date.duration_since(now).unwrap_or(Duration::ZERO);
        if dur.is_zero() {
            return None;
        }
        return Some(dur.min(MAX_RETRY_AFTER));
    }

    None
}
