//! Circuit breaker core.
//!
//! # Data Flow
//! ```text
//! caller → CircuitBreaker::execute(action)
//!     → admission under engine lock (state.rs register, half-open quota)
//!     → action runs with no lock held
//!     → outcome recorded under engine lock
//!         → window.rs prune + append + rates
//!         → transition policy may flip state.rs
//! ```

pub mod engine;
pub mod error;
pub mod state;
pub mod window;

pub use engine::{BreakerSnapshot, CircuitBreaker};
pub use error::{BreakerError, BreakerResult};
pub use state::{BreakerState, StateRegister};
pub use window::{Outcome, OutcomeWindow};
