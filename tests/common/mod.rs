//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use circuit_guard::{BreakerConfig, BreakerResult, CircuitBreaker, SlidingWindow};

/// The reference configuration: 50% failure rate over a 10-call window,
/// evaluated after 6 calls, 3 trial calls after a 2 second wait.
pub fn reference_config() -> BreakerConfig {
    BreakerConfig::named("reference")
        .with_failure_rate_threshold(50.0)
        .with_slow_call_rate_threshold(50.0)
        .with_slow_call_duration_threshold(Duration::from_millis(200))
        .with_minimum_number_of_calls(6)
        .with_sliding_window(SlidingWindow::Count { size: 10 })
        .with_permitted_calls_in_half_open(3)
        .with_wait_duration_in_open(Duration::from_secs(2))
}

/// The reference configuration with a short wait, for fast tests.
#[allow(dead_code)]
pub fn fast_config(wait_ms: u64) -> BreakerConfig {
    reference_config().with_wait_duration_in_open(Duration::from_millis(wait_ms))
}

/// An action that counts its invocations.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct CountingAction {
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingAction {
    pub fn succeed(&self, breaker: &CircuitBreaker) -> BreakerResult<(), String> {
        breaker.execute(|| {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    pub fn fail(&self, breaker: &CircuitBreaker) -> BreakerResult<(), String> {
        breaker.execute(|| {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err("dependency unavailable".to_string())
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
