//! Per-service circuit breaker: Closed / Open / HalfOpen with bounded
//! concurrent probes.
//!
//! All mutation happens under one short-held `std::sync::Mutex` critical
//! section per breaker; the lock is never held across an `.await`.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Tuning knobs for one breaker instance.
#[derive(Debug, Clone)]
pub struct CircuitPolicy {
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_timeout: Duration,
    pub max_concurrent_probes: u32,
    pub name: String,
}

impl Default for CircuitPolicy {
    fn default() -> Self {
        CircuitPolicy {
            failure_threshold: 5,
            success_threshold: 2,
            open_timeout: Duration::from_secs(30),
            max_concurrent_probes: 1,
            name: "default".to_string(),
        }
    }
}

impl CircuitPolicy {
    pub fn named(name: impl Into<String>) -> Self {
        CircuitPolicy {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// The breaker's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// A point-in-time snapshot of a breaker's counters, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitStats {
    pub state: CircuitState,
    pub consecutive_failures: u32,
    pub consecutive_successes: u32,
    pub in_flight_probes: u32,
}

struct Inner {
    state: CircuitState,
    consecutive_failures: u32,
    consecutive_successes: u32,
    in_flight_probes: u32,
    last_failure_time: Option<Instant>,
}

/// A single service's circuit breaker.
///
/// Cheap to share: wrap in an `Arc` and hand clones to every caller that
/// sends requests to the same upstream.
pub struct CircuitBreaker {
    policy: CircuitPolicy,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(policy: CircuitPolicy) -> Self {
        CircuitBreaker {
            policy,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                consecutive_successes: 0,
                in_flight_probes: 0,
                last_failure_time: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.policy.name
    }

    /// Whether a new call may be admitted right now. Mutates state on the
    /// Open→HalfOpen transition and on HalfOpen probe admission.
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = inner
                    .last_failure_time
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::MAX);
                if elapsed >= self.policy.open_timeout {
                    inner.state = CircuitState::HalfOpen;
                    inner.consecutive_successes = 0;
                    inner.in_flight_probes = 1;
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                if inner.in_flight_probes < self.policy.max_concurrent_probes {
                    inner.in_flight_probes += 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful admitted call.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.in_flight_probes = inner.in_flight_probes.saturating_sub(1);
                inner.consecutive_successes += 1;
                if inner.consecutive_successes >= self.policy.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.consecutive_successes = 0;
                    inner.in_flight_probes = 0;
                }
            }
            CircuitState::Open => {
                // Defensive: feedback arriving after a reopen elsewhere.
                inner.state = CircuitState::HalfOpen;
                inner.consecutive_successes = 1;
                inner.in_flight_probes = 0;
            }
        }
    }

    /// Records a failed admitted call.
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.last_failure_time = Some(Instant::now());
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.policy.failure_threshold {
                    inner.state = CircuitState::Open;
                }
            }
            CircuitState::HalfOpen => {
                inner.in_flight_probes = inner.in_flight_probes.saturating_sub(1);
                inner.state = CircuitState::Open;
                inner.consecutive_successes = 0;
            }
            CircuitState::Open => {}
        }
    }

    /// Forces the breaker back to Closed with all counters zeroed.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.consecutive_successes = 0;
        inner.in_flight_probes = 0;
        inner.last_failure_time = None;
    }

    pub fn stats(&self) -> CircuitStats {
        let inner = self.inner.lock().unwrap();
        CircuitStats {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            consecutive_successes: inner.consecutive_successes,
            in_flight_probes: inner.in_flight_probes,
        }
    }
}
