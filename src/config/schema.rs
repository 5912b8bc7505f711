//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Durations are written as integer milliseconds on the wire.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Breaker definitions, one per protected dependency.
    pub breakers: Vec<BreakerConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin surface settings.
    pub admin: AdminConfig,
}

/// How the sliding window bounds its sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SlidingWindow {
    /// Keep at most `size` most recent outcomes.
    Count { size: usize },

    /// Keep outcomes observed within the trailing `duration`.
    Time {
        #[serde(rename = "duration_ms", with = "duration_ms")]
        duration: Duration,
    },
}

impl Default for SlidingWindow {
    fn default() -> Self {
        SlidingWindow::Count { size: 100 }
    }
}

/// Immutable per-breaker configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Breaker identifier for logging/metrics.
    pub name: String,

    /// Failure percentage (0-100) at or above which the breaker opens.
    pub failure_rate_threshold: f64,

    /// Slow-call percentage (0-100) at or above which the breaker opens.
    pub slow_call_rate_threshold: f64,

    /// Calls taking at least this long are counted as slow.
    #[serde(rename = "slow_call_duration_ms", with = "duration_ms")]
    pub slow_call_duration_threshold: Duration,

    /// Window population required before rates are evaluated.
    pub minimum_number_of_calls: usize,

    /// Window kind and bound.
    pub sliding_window: SlidingWindow,

    /// Trial calls admitted per half-open episode.
    pub permitted_calls_in_half_open: usize,

    /// Cooling period spent in Open before probing.
    #[serde(rename = "wait_duration_in_open_ms", with = "duration_ms")]
    pub wait_duration_in_open: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            failure_rate_threshold: 50.0,
            slow_call_rate_threshold: 100.0,
            slow_call_duration_threshold: Duration::from_secs(60),
            minimum_number_of_calls: 100,
            sliding_window: SlidingWindow::default(),
            permitted_calls_in_half_open: 10,
            wait_duration_in_open: Duration::from_secs(60),
        }
    }
}

impl BreakerConfig {
    /// Default configuration under the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_failure_rate_threshold(mut self, percent: f64) -> Self {
        self.failure_rate_threshold = percent;
        self
    }

    pub fn with_slow_call_rate_threshold(mut self, percent: f64) -> Self {
        self.slow_call_rate_threshold = percent;
        self
    }

    pub fn with_slow_call_duration_threshold(mut self, threshold: Duration) -> Self {
        self.slow_call_duration_threshold = threshold;
        self
    }

    pub fn with_minimum_number_of_calls(mut self, calls: usize) -> Self {
        self.minimum_number_of_calls = calls;
        self
    }

    pub fn with_sliding_window(mut self, window: SlidingWindow) -> Self {
        self.sliding_window = window;
        self
    }

    pub fn with_permitted_calls_in_half_open(mut self, calls: usize) -> Self {
        self.permitted_calls_in_half_open = calls;
        self
    }

    pub fn with_wait_duration_in_open(mut self, wait: Duration) -> Self {
        self.wait_duration_in_open = wait;
        self
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin router.
    pub enabled: bool,

    /// Bearer token required on admin requests. Empty disables auth.
    pub api_key: String,

    /// Admin bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
