//! Synthetic workload driver.
//!
//! Pushes randomized calls through a breaker so operators can see how a
//! configuration reacts to a given failure/latency mix before deploying it.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::breaker::{BreakerError, BreakerSnapshot, BreakerState, CircuitBreaker};

/// Error returned by simulated actions.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("simulated dependency failure")]
pub struct SimulatedFailure;

/// Shape of the synthetic traffic.
#[derive(Debug, Clone)]
pub struct Workload {
    /// Number of calls to attempt.
    pub calls: usize,
    /// Probability (0.0-1.0) that an admitted call fails.
    pub failure_ratio: f64,
    /// Probability (0.0-1.0) that an admitted call is slow.
    pub slow_ratio: f64,
    /// How long a slow call sleeps.
    pub slow_delay: Duration,
    /// Pause between calls.
    pub pause: Duration,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            calls: 100,
            failure_ratio: 0.0,
            slow_ratio: 0.0,
            slow_delay: Duration::from_millis(100),
            pause: Duration::from_millis(10),
            seed: None,
        }
    }
}

/// A state change observed between two calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedTransition {
    pub call: usize,
    pub from: BreakerState,
    pub to: BreakerState,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub rejected_open: usize,
    pub rejected_half_open: usize,
    pub transitions: Vec<ObservedTransition>,
    pub last: BreakerSnapshot,
}

/// Drive `workload` through `breaker`.
pub async fn run_workload(breaker: &CircuitBreaker, workload: &Workload) -> SimulationReport {
    let mut rng = match workload.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let mut report = SimulationReport {
        attempted: 0,
        succeeded: 0,
        failed: 0,
        rejected_open: 0,
        rejected_half_open: 0,
        transitions: Vec::new(),
        last: breaker.snapshot(),
    };
    let mut previous = breaker.state();

    for call in 0..workload.calls {
        let fails = rng.f64() < workload.failure_ratio;
        let slow = rng.f64() < workload.slow_ratio;
        let delay = workload.slow_delay;

        let result = breaker
            .execute_async(|| async move {
                if slow {
                    tokio::time::sleep(delay).await;
                }
                if fails {
                    Err(SimulatedFailure)
                } else {
                    Ok(())
                }
            })
            .await;

        report.attempted += 1;
        match result {
            Ok(()) => report.succeeded += 1,
            Err(BreakerError::ActionFailed(_)) => report.failed += 1,
            Err(BreakerError::RejectedOpen { .. }) => report.rejected_open += 1,
            Err(BreakerError::HalfOpenQuotaExceeded { .. }) => report.rejected_half_open += 1,
            Err(BreakerError::Uninitialized { .. }) => {}
        }

        let current = breaker.state();
        if current != previous {
            report.transitions.push(ObservedTransition {
                call,
                from: previous,
                to: current,
            });
            previous = current;
        }

        if !workload.pause.is_zero() {
            tokio::time::sleep(workload.pause).await;
        }
    }

    report.last = breaker.snapshot();
    tracing::info!(
        breaker = %breaker.name(),
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        rejected = report.rejected_open + report.rejected_half_open,
        "Simulation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BreakerConfig, SlidingWindow};

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new(
            BreakerConfig::named("sim")
                .with_minimum_number_of_calls(5)
                .with_sliding_window(SlidingWindow::Count { size: 10 })
                .with_wait_duration_in_open(Duration::from_secs(60)),
        )
    }

    #[tokio::test]
    async fn test_all_failures_trip_and_reject() {
        let breaker = breaker();
        let workload = Workload {
            calls: 20,
            failure_ratio: 1.0,
            pause: Duration::ZERO,
            seed: Some(7),
            ..Workload::default()
        };

        let report = run_workload(&breaker, &workload).await;

        assert_eq!(report.failed, 5);
        assert_eq!(report.rejected_open, 15);
        assert_eq!(
            report.transitions,
            vec![ObservedTransition {
                call: 4,
                from: BreakerState::Closed,
                to: BreakerState::Open,
            }]
        );
        assert_eq!(report.last.state, BreakerState::Open);
    }

    #[tokio::test]
    async fn test_healthy_workload_stays_closed() {
        let breaker = breaker();
        let workload = Workload {
            calls: 30,
            pause: Duration::ZERO,
            seed: Some(1),
            ..Workload::default()
        };

        let report = run_workload(&breaker, &workload).await;

        assert_eq!(report.succeeded, 30);
        assert!(report.transitions.is_empty());
        assert_eq!(report.last.window_len, 10);
    }
}
