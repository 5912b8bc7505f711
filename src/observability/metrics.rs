//! Metrics collection and exposition.
//!
//! # Metrics
//! - `circuit_breaker_calls_total` (counter): admitted calls by breaker, outcome
//! - `circuit_breaker_rejections_total` (counter): rejected calls by breaker, reason
//! - `circuit_breaker_transitions_total` (counter): state changes by breaker, from, to
//! - `circuit_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `circuit_breaker_call_duration_seconds` (histogram): action latency
//!
//! Recording is a no-op until a recorder is installed, so library users
//! who never call [`init_metrics`] pay only for the macro dispatch.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::breaker::{BreakerState, Outcome};

/// Install the Prometheus exporter and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!(
        "circuit_breaker_calls_total",
        "Calls admitted and executed, by outcome"
    );
    describe_counter!(
        "circuit_breaker_rejections_total",
        "Calls rejected without invoking the action"
    );
    describe_counter!(
        "circuit_breaker_transitions_total",
        "Breaker state transitions"
    );
    describe_gauge!("circuit_breaker_state", "Current breaker state");
    describe_histogram!(
        "circuit_breaker_call_duration_seconds",
        "Wrapped action latency in seconds"
    );
}

/// Record one executed call.
pub fn record_call(breaker: &str, outcome: Outcome, elapsed: Duration) {
    counter!(
        "circuit_breaker_calls_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!(
        "circuit_breaker_call_duration_seconds",
        "breaker" => breaker.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Record a call turned away by the breaker.
pub fn record_rejection(breaker: &str, reason: &'static str) {
    counter!(
        "circuit_breaker_rejections_total",
        "breaker" => breaker.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// Record a state change and update the state gauge.
pub fn record_transition(breaker: &str, from: BreakerState, to: BreakerState) {
    counter!(
        "circuit_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    record_state(breaker, to);
}

pub fn record_state(breaker: &str, state: BreakerState) {
    gauge!("circuit_breaker_state", "breaker" => breaker.to_string()).set(state as u8 as f64);
}
