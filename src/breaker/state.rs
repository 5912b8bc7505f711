//! Breaker lifecycle state register.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: a bounded number of trial calls test recovery
//!
//! # Design Decisions
//! - Pure storage, no policy; the engine decides transitions
//! - Single atomic word, so every read and write is exclusive on its own
//! - Compound read-then-write sequences are the engine's job (under its lock)

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle state of a breaker.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl From<u8> for BreakerState {
    fn from(val: u8) -> Self {
        match val {
            1 => BreakerState::Open,
            2 => BreakerState::HalfOpen,
            _ => BreakerState::Closed,
        }
    }
}

impl BreakerState {
    /// Stable label used in logs and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the current [`BreakerState`].
#[derive(Debug)]
pub struct StateRegister {
    state: AtomicU8,
}

impl StateRegister {
    /// Create a register in the given state.
    pub fn new(initial: BreakerState) -> Self {
        Self {
            state: AtomicU8::new(initial as u8),
        }
    }

    pub fn get(&self) -> BreakerState {
        BreakerState::from(self.state.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: BreakerState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.get() == BreakerState::Open
    }

    pub fn is_half_open(&self) -> bool {
        self.get() == BreakerState::HalfOpen
    }

    pub fn is_closed(&self) -> bool {
        self.get() == BreakerState::Closed
    }
}

impl Default for StateRegister {
    fn default() -> Self {
        Self::new(BreakerState::Closed)
    }
}
