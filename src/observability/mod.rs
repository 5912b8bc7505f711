//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Breaker engine produces:
//!     → tracing events (transitions, rejections, failed trial calls)
//!     → metrics.rs (counters, gauge, latency histogram)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
