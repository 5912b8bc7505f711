//! Sliding window of recent call outcomes.
//!
//! # Responsibilities
//! - Keep outcomes in completion order, oldest first
//! - Prune stale outcomes per the configured [`SlidingWindow`] kind
//! - Maintain failure/slow aggregates incrementally so rates are O(1)
//!
//! # Design Decisions
//! - An outcome is failed, or slow-and-not-failed, or neither; never both
//! - Pruning runs before insertion, so a count window of `size` holds at
//!   most `size` records after each record
//! - Empty window reads as 0% for both rates

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::SlidingWindow;

/// Classification of a completed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    /// Succeeded, but took at least the slow-call threshold.
    Slow,
}

impl Outcome {
    /// Classify a call. Failure wins over slowness.
    pub fn classify(failed: bool, slow: bool) -> Self {
        if failed {
            Outcome::Failure
        } else if slow {
            Outcome::Slow
        } else {
            Outcome::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Slow => "slow",
        }
    }
}

/// A single recorded outcome.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeRecord {
    pub failed: bool,
    pub slow: bool,
    pub observed_at: Instant,
}

impl OutcomeRecord {
    fn outcome(&self) -> Outcome {
        Outcome::classify(self.failed, self.slow)
    }
}

/// Bounded, continuously pruned sample of recent outcomes.
#[derive(Debug, Default)]
pub struct OutcomeWindow {
    records: VecDeque<OutcomeRecord>,
    failure_count: usize,
    slow_count: usize,
}

impl OutcomeWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prune per `kind`, then append a new record observed at `now`.
    pub fn record(&mut self, failed: bool, slow: bool, now: Instant, kind: &SlidingWindow) {
        self.prune(now, kind);

        let record = OutcomeRecord {
            failed,
            slow,
            observed_at: now,
        };
        match record.outcome() {
            Outcome::Failure => self.failure_count += 1,
            Outcome::Slow => self.slow_count += 1,
            Outcome::Success => {}
        }
        self.records.push_back(record);
    }

    /// Remove stale records per the window kind.
    pub fn prune(&mut self, now: Instant, kind: &SlidingWindow) {
        match *kind {
            SlidingWindow::Count { size } => self.prune_by_count(size),
            SlidingWindow::Time { duration } => self.prune_by_age(now, duration),
        }
    }

    /// Drop records that have aged out, without making room for a new one.
    ///
    /// Only time-based windows expire; a count window is left as is.
    pub fn expire(&mut self, now: Instant, kind: &SlidingWindow) {
        if let SlidingWindow::Time { duration } = *kind {
            self.prune_by_age(now, duration);
        }
    }

    /// Drop oldest records until there is room for one more below `size`.
    fn prune_by_count(&mut self, size: usize) {
        while !self.records.is_empty() && self.records.len() >= size {
            self.pop_oldest();
        }
    }

    /// Drop records observed at or before `now - duration`.
    fn prune_by_age(&mut self, now: Instant, duration: Duration) {
        // Nothing can be older than the process clock origin
        let Some(cutoff) = now.checked_sub(duration) else {
            return;
        };

        while let Some(oldest) = self.records.front() {
            if oldest.observed_at > cutoff {
                break;
            }
            self.pop_oldest();
        }
    }

    fn pop_oldest(&mut self) {
        if let Some(record) = self.records.pop_front() {
            match record.outcome() {
                Outcome::Failure => self.failure_count -= 1,
                Outcome::Slow => self.slow_count -= 1,
                Outcome::Success => {}
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failure_count
    }

    /// Slow calls that did not also fail.
    pub fn slow_count(&self) -> usize {
        self.slow_count
    }

    /// Failure percentage, 0.0 when empty.
    pub fn failure_rate(&self) -> f64 {
        Self::percent(self.failure_count, self.records.len())
    }

    /// Slow-call percentage, 0.0 when empty.
    pub fn slow_call_rate(&self) -> f64 {
        Self::percent(self.slow_count, self.records.len())
    }

    fn percent(count: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        count as f64 * 100.0 / total as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(size: usize) -> SlidingWindow {
        SlidingWindow::Count { size }
    }

    fn time(ms: u64) -> SlidingWindow {
        SlidingWindow::Time {
            duration: Duration::from_millis(ms),
        }
    }

    /// Re-derive aggregates by linear scan.
    fn scan(window: &OutcomeWindow) -> (usize, usize) {
        window.iter().fold((0, 0), |(f, s), r| match r.outcome() {
            Outcome::Failure => (f + 1, s),
            Outcome::Slow => (f, s + 1),
            Outcome::Success => (f, s),
        })
    }

    #[test]
    fn test_empty_window_rates_are_zero() {
        let mut window = OutcomeWindow::new();
        window.prune(Instant::now(), &count(10));
        window.prune(Instant::now(), &time(1000));

        assert!(window.is_empty());
        assert_eq!(window.failure_rate(), 0.0);
        assert_eq!(window.slow_call_rate(), 0.0);
    }

    #[test]
    fn test_failed_and_slow_counts_as_failure_only() {
        let mut window = OutcomeWindow::new();
        let now = Instant::now();
        window.record(true, true, now, &count(10));
        window.record(false, true, now, &count(10));
        window.record(false, false, now, &count(10));

        assert_eq!(window.len(), 3);
        assert_eq!(window.failure_count(), 1);
        assert_eq!(window.slow_count(), 1);
        assert!((window.failure_rate() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_count_window_never_exceeds_size() {
        let mut window = OutcomeWindow::new();
        let now = Instant::now();
        let kind = count(4);

        for i in 0..50 {
            window.record(i % 3 == 0, i % 5 == 0, now, &kind);
            assert!(window.len() <= 4);
            assert_eq!(scan(&window), (window.failure_count(), window.slow_count()));
        }
        assert_eq!(window.len(), 4);
    }

    #[test]
    fn test_count_window_evicts_oldest_first() {
        let mut window = OutcomeWindow::new();
        let now = Instant::now();
        let kind = count(3);

        window.record(true, false, now, &kind);
        window.record(false, false, now, &kind);
        window.record(false, false, now, &kind);
        assert_eq!(window.failure_count(), 1);

        // Evicts the failure at the front
        window.record(false, false, now, &kind);
        assert_eq!(window.failure_count(), 0);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_time_window_drops_expired() {
        let mut window = OutcomeWindow::new();
        let start = Instant::now();
        let kind = time(100);

        window.record(true, false, start, &kind);
        window.record(false, true, start + Duration::from_millis(50), &kind);
        window.record(false, false, start + Duration::from_millis(90), &kind);
        assert_eq!(window.len(), 3);

        // Cutoff at exactly the first record's timestamp removes it
        window.prune(start + Duration::from_millis(100), &kind);
        assert_eq!(window.len(), 2);
        assert_eq!(window.failure_count(), 0);
        assert_eq!(window.slow_count(), 1);

        window.record(false, false, start + Duration::from_millis(175), &kind);
        assert_eq!(window.len(), 2);
        assert_eq!(window.slow_count(), 0);
        assert_eq!(scan(&window), (0, 0));
    }

    #[test]
    fn test_time_window_retains_only_recent_ages() {
        let mut window = OutcomeWindow::new();
        let start = Instant::now();
        let kind = time(40);

        for step in 0..30u64 {
            let now = start + Duration::from_millis(step * 7);
            window.record(step % 2 == 0, step % 3 == 0, now, &kind);
            for r in window.iter() {
                assert!(now.duration_since(r.observed_at) < Duration::from_millis(40));
            }
            assert_eq!(scan(&window), (window.failure_count(), window.slow_count()));
        }
    }

    #[test]
    fn test_expire_only_touches_time_windows() {
        let start = Instant::now();

        let mut full = OutcomeWindow::new();
        for _ in 0..3 {
            full.record(true, false, start, &count(3));
        }
        full.expire(start + Duration::from_secs(60), &count(3));
        assert_eq!(full.len(), 3);
        assert_eq!(full.failure_count(), 3);

        let mut timed = OutcomeWindow::new();
        timed.record(true, false, start, &time(50));
        timed.record(false, true, start + Duration::from_millis(40), &time(50));
        timed.expire(start + Duration::from_millis(60), &time(50));
        assert_eq!(timed.len(), 1);
        assert_eq!(timed.failure_count(), 0);
        assert_eq!(timed.slow_count(), 1);
    }

    #[test]
    fn test_prune_then_rates_on_drained_window() {
        let mut window = OutcomeWindow::new();
        let start = Instant::now();
        let kind = time(10);

        window.record(true, false, start, &kind);
        window.prune(start + Duration::from_secs(1), &kind);

        assert!(window.is_empty());
        assert_eq!(window.failure_count(), 0);
        assert_eq!(window.failure_rate(), 0.0);
        assert_eq!(window.slow_call_rate(), 0.0);
    }
}
