//! Breaker engine: admission, outcome recording and transition policy.
//!
//! # State Transitions
//! ```text
//! Closed → Open:      window ≥ minimum calls AND (failure rate ≥ threshold
//!                     OR slow-call rate ≥ threshold)
//! Open → Half-Open:   wait duration elapsed (checked on admission and on record)
//! Half-Open → Open:   a trial call failed or was slow
//! Half-Open → Closed: a successful trial call completed with the half-open quota
//!                     fully consumed
//! ```
//!
//! # Design Decisions
//! - One mutex guards the window and the half-open bookkeeping; it is held
//!   for the admission decision and for recording, never while the action runs
//! - Outcomes land in the window in completion order
//! - The window is not cleared on Half-Open → Closed; old outcomes age out
//! - No timeout enforcement: slowness is measured after the action returns

use serde::Serialize;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::breaker::error::{BreakerError, BreakerResult};
use crate::breaker::state::{BreakerState, StateRegister};
use crate::breaker::window::{Outcome, OutcomeWindow};
use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Mutable bookkeeping guarded by the engine lock.
#[derive(Debug, Default)]
struct Inner {
    window: OutcomeWindow,
    /// Calls admitted in the current half-open episode. Zero outside Half-Open.
    half_open_calls: usize,
    /// Last transition into Open.
    opened_at: Option<Instant>,
}

impl Inner {
    fn cooling_elapsed(&self, now: Instant, wait: Duration) -> bool {
        self.opened_at
            .map_or(true, |opened| now.saturating_duration_since(opened) >= wait)
    }
}

/// Point-in-time view of a breaker, taken under a single lock acquisition.
///
/// Time-based windows are pruned to the moment of the snapshot, so an idle
/// breaker does not keep reporting expired outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: BreakerState,
    pub half_open_calls: usize,
    pub window_len: usize,
    pub failure_count: usize,
    pub slow_count: usize,
    pub failure_rate: f64,
    pub slow_call_rate: f64,
}

/// A circuit breaker guarding calls to one logical dependency.
///
/// Share it behind an `Arc`. Not `Clone`: all callers of one dependency
/// must see the same window.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    state: StateRegister,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Create a closed breaker with an empty window.
    ///
    /// The configuration is taken as-is; see
    /// [`validate_breaker`](crate::config::validation::validate_breaker) for
    /// sanity checks.
    pub fn new(config: BreakerConfig) -> Self {
        metrics::record_state(&config.name, BreakerState::Closed);
        Self {
            config,
            state: StateRegister::default(),
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    /// Current lifecycle state.
    ///
    /// An expired Open state is only promoted to Half-Open by the next call,
    /// so this may still read Open after the wait duration.
    pub fn state(&self) -> BreakerState {
        self.state.get()
    }

    /// Calls admitted in the current half-open episode.
    pub fn half_open_calls(&self) -> usize {
        self.lock().half_open_calls
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let mut inner = self.lock();
        inner
            .window
            .expire(Instant::now(), &self.config.sliding_window);
        BreakerSnapshot {
            name: self.config.name.clone(),
            state: self.state.get(),
            half_open_calls: inner.half_open_calls,
            window_len: inner.window.len(),
            failure_count: inner.window.failure_count(),
            slow_count: inner.window.slow_count(),
            failure_rate: inner.window.failure_rate(),
            slow_call_rate: inner.window.slow_call_rate(),
        }
    }

    /// Run `action` if the breaker admits it, and record its outcome.
    ///
    /// Returns the action's value, its error wrapped in
    /// [`BreakerError::ActionFailed`], or a rejection without running it.
    /// An action that panics is recorded as a failure.
    pub fn execute<T, E, F>(&self, action: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.acquire_permission::<E>()?;

        let call = InFlightCall::start(self);
        let result = action();
        call.finish(result.is_err());

        result.map_err(BreakerError::ActionFailed)
    }

    /// Async counterpart of [`execute`](Self::execute).
    ///
    /// The engine lock is never held across the await point. If the returned
    /// future is dropped after admission (for example by
    /// `tokio::time::timeout`), the call is recorded as a failure: a cancelled
    /// half-open call re-opens the breaker and restarts the cooling period
    /// instead of holding its half-open slot forever.
    pub async fn execute_async<T, E, F, Fut>(&self, action: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.acquire_permission::<E>()?;

        let call = InFlightCall::start(self);
        let result = action().await;
        call.finish(result.is_err());

        result.map_err(BreakerError::ActionFailed)
    }

    /// Admission decision. Consumes a half-open slot when half-open.
    fn acquire_permission<E>(&self) -> BreakerResult<(), E> {
        let mut inner = self.lock();
        let now = Instant::now();

        if self.state.is_open() && inner.cooling_elapsed(now, self.config.wait_duration_in_open) {
            self.transition(&mut inner, BreakerState::HalfOpen, now);
        }

        let rejection = match self.state.get() {
            BreakerState::Closed => None,
            BreakerState::Open => Some(BreakerError::RejectedOpen {
                name: self.config.name.clone(),
            }),
            BreakerState::HalfOpen => {
                if inner.half_open_calls >= self.config.permitted_calls_in_half_open {
                    Some(BreakerError::HalfOpenQuotaExceeded {
                        name: self.config.name.clone(),
                        permitted: self.config.permitted_calls_in_half_open,
                    })
                } else {
                    inner.half_open_calls += 1;
                    None
                }
            }
        };

        match rejection {
            Some(err) => {
                tracing::debug!(breaker = %self.config.name, reason = err.reason(), "Call rejected");
                metrics::record_rejection(&self.config.name, err.reason());
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Record an outcome and apply the transition policy.
    fn on_result(&self, failed: bool, elapsed: Duration) {
        let slow = elapsed >= self.config.slow_call_duration_threshold;
        let outcome = Outcome::classify(failed, slow);
        metrics::record_call(&self.config.name, outcome, elapsed);

        let mut inner = self.lock();
        let now = Instant::now();
        inner
            .window
            .record(failed, slow, now, &self.config.sliding_window);

        match self.state.get() {
            BreakerState::Closed => {
                if inner.window.len() >= self.config.minimum_number_of_calls
                    && (inner.window.failure_rate() >= self.config.failure_rate_threshold
                        || inner.window.slow_call_rate() >= self.config.slow_call_rate_threshold)
                {
                    self.transition(&mut inner, BreakerState::Open, now);
                }
            }
            BreakerState::Open => {
                if inner.cooling_elapsed(now, self.config.wait_duration_in_open) {
                    self.transition(&mut inner, BreakerState::HalfOpen, now);
                }
            }
            BreakerState::HalfOpen => {
                if failed || slow {
                    tracing::warn!(
                        breaker = %self.config.name,
                        outcome = outcome.as_str(),
                        elapsed_ms = millis(elapsed),
                        "Half-open call disqualified recovery"
                    );
                    self.transition(&mut inner, BreakerState::Open, now);
                } else if inner.half_open_calls >= self.config.permitted_calls_in_half_open {
                    self.transition(&mut inner, BreakerState::Closed, now);
                }
            }
        }
    }

    /// Flip the register and reset per-episode bookkeeping. Caller holds the lock.
    fn transition(&self, inner: &mut Inner, to: BreakerState, now: Instant) {
        let from = self.state.get();
        self.state.set(to);
        // Every transition enters or leaves Half-Open, except Closed → Open
        // where the count is already zero.
        inner.half_open_calls = 0;
        if to == BreakerState::Open {
            inner.opened_at = Some(now);
        }

        tracing::info!(
            breaker = %self.config.name,
            from = %from,
            to = %to,
            window_len = inner.window.len(),
            failure_rate = inner.window.failure_rate(),
            slow_call_rate = inner.window.slow_call_rate(),
            "Circuit breaker state transition"
        );
        metrics::record_transition(&self.config.name, from, to);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Critical sections never leave Inner half-updated, so a poisoned
        // lock still guards a consistent value.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An admitted call whose outcome is still owed to the window.
///
/// Records a failure on drop unless [`finish`](Self::finish) ran first.
struct InFlightCall<'a> {
    breaker: &'a CircuitBreaker,
    start: Instant,
    settled: bool,
}

impl<'a> InFlightCall<'a> {
    fn start(breaker: &'a CircuitBreaker) -> Self {
        Self {
            breaker,
            start: Instant::now(),
            settled: false,
        }
    }

    fn finish(mut self, failed: bool) {
        self.settled = true;
        self.breaker.on_result(failed, self.start.elapsed());
    }
}

impl Drop for InFlightCall<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let elapsed = self.start.elapsed();
        tracing::warn!(
            breaker = %self.breaker.config.name,
            elapsed_ms = millis(elapsed),
            "Guarded call abandoned before completion, recording failure"
        );
        self.breaker.on_result(true, elapsed);
    }
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
