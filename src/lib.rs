//! Circuit breaker for guarding calls to fragile dependencies.
//!
//! A [`CircuitBreaker`] wraps an opaque operation and decides per call
//! whether to run it, reject it, or run it as a limited recovery trial,
//! based on failure and slow-call rates over a sliding window.

pub mod admin;
pub mod breaker;
pub mod config;
pub mod observability;
pub mod registry;
pub mod simulate;

pub use breaker::{BreakerError, BreakerResult, BreakerSnapshot, BreakerState, CircuitBreaker};
pub use config::{BreakerConfig, Settings, SlidingWindow};
pub use registry::BreakerRegistry;
