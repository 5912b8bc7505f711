//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (rates within 0-100, non-empty windows)
//! - Detect duplicate breaker names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Breakers built directly in code are not validated; call
//!   [`BreakerConfig::validate`] when the values come from outside

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

use crate::config::schema::{BreakerConfig, Settings, SlidingWindow};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("breaker name must not be empty")]
    EmptyName,

    #[error("duplicate breaker name '{0}'")]
    DuplicateName(String),

    #[error("{breaker}: {field} must be a percentage in [0, 100], got {value}")]
    RateOutOfRange {
        breaker: String,
        field: &'static str,
        value: f64,
    },

    #[error("{breaker}: count-based sliding window size must be at least 1")]
    EmptyCountWindow { breaker: String },

    #[error("{breaker}: time-based sliding window duration must be positive")]
    EmptyTimeWindow { breaker: String },

    #[error("{breaker}: permitted_calls_in_half_open must be at least 1")]
    NoHalfOpenCalls { breaker: String },

    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a whole settings file.
pub fn validate_config(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for breaker in &settings.breakers {
        if !breaker.name.is_empty() && !seen.insert(breaker.name.as_str()) {
            errors.push(ValidationError::DuplicateName(breaker.name.clone()));
        }
        check_breaker(breaker, &mut errors);
    }

    if settings.observability.metrics_enabled {
        check_address("observability.metrics_address", &settings.observability.metrics_address, &mut errors);
    }
    if settings.admin.enabled {
        check_address("admin.bind_address", &settings.admin.bind_address, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single breaker configuration.
pub fn validate_breaker(config: &BreakerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_breaker(config, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl BreakerConfig {
    /// Semantic checks; see [`validate_breaker`].
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        validate_breaker(self)
    }
}

fn check_breaker(config: &BreakerConfig, errors: &mut Vec<ValidationError>) {
    if config.name.is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    for (field, value) in [
        ("failure_rate_threshold", config.failure_rate_threshold),
        ("slow_call_rate_threshold", config.slow_call_rate_threshold),
    ] {
        // NaN fails the range check too
        if !(0.0..=100.0).contains(&value) {
            errors.push(ValidationError::RateOutOfRange {
                breaker: config.name.clone(),
                field,
                value,
            });
        }
    }

    match config.sliding_window {
        SlidingWindow::Count { size: 0 } => errors.push(ValidationError::EmptyCountWindow {
            breaker: config.name.clone(),
        }),
        SlidingWindow::Time { duration } if duration == Duration::ZERO => {
            errors.push(ValidationError::EmptyTimeWindow {
                breaker: config.name.clone(),
            })
        }
        _ => {}
    }

    if config.permitted_calls_in_half_open == 0 {
        errors.push(ValidationError::NoHalfOpenCalls {
            breaker: config.name.clone(),
        });
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
