//! Guarded-call error definitions.

use thiserror::Error;

/// Errors returned by a guarded call.
///
/// Rejections are produced locally without running the action.
/// `ActionFailed` carries the action's own error unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreakerError<E> {
    /// Breaker is open and the cooling period has not elapsed.
    #[error("{name}: circuit breaker is open")]
    RejectedOpen { name: String },

    /// The trial-call quota for this half-open episode is used up.
    #[error("{name}: circuit breaker is half-open, all {permitted} trial calls in flight or spent")]
    HalfOpenQuotaExceeded { name: String, permitted: usize },

    /// The wrapped action ran and returned an error.
    #[error("{0}")]
    ActionFailed(E),

    /// No breaker was constructed under this name.
    #[error("circuit breaker '{name}' is not initialized")]
    Uninitialized { name: String },
}

impl<E> BreakerError<E> {
    /// True when the call was turned away without invoking the action.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BreakerError::ActionFailed(_))
    }

    /// The action's own error, if the action ran and failed.
    pub fn into_action_error(self) -> Option<E> {
        match self {
            BreakerError::ActionFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Stable label for rejection metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            BreakerError::RejectedOpen { .. } => "open",
            BreakerError::HalfOpenQuotaExceeded { .. } => "half_open_quota",
            BreakerError::ActionFailed(_) => "action_failed",
            BreakerError::Uninitialized { .. } => "uninitialized",
        }
    }
}

/// Result type for guarded calls.
pub type BreakerResult<T, E> = Result<T, BreakerError<E>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err: BreakerError<String> = BreakerError::RejectedOpen {
            name: "payments".into(),
        };
        assert_eq!(err.to_string(), "payments: circuit breaker is open");

        let err: BreakerError<String> = BreakerError::HalfOpenQuotaExceeded {
            name: "payments".into(),
            permitted: 3,
        };
        assert!(err.to_string().contains("half-open"));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_action_error_is_verbatim() {
        let err = BreakerError::ActionFailed("connection reset".to_string());
        assert_eq!(err.to_string(), "connection reset");
        assert!(!err.is_rejection());
        assert_eq!(err.into_action_error().as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_rejections_carry_no_action_error() {
        let err: BreakerError<std::io::Error> = BreakerError::Uninitialized {
            name: "ghost".into(),
        };
        assert!(err.is_rejection());
        assert_eq!(err.reason(), "uninitialized");
        assert!(err.into_action_error().is_none());
    }
}
