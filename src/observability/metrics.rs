//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relay requests by outcome (`relayed` or an error kind)
//! - `relay_request_duration_seconds` (histogram): end-to-end relay latency
//! - `relay_rpc_healthy` (gauge): 1=chain RPC reachable, 0=unreachable
//! - `relay_relayer_balance_wei` (gauge): last observed relayer balance
//! - `relay_insufficient_funds_total` (counter): submissions refused for lack of gas funds
//! - `relay_rate_limited_total` (counter): requests rejected by the rate limiter
//!
//! Updates go through the `metrics` facade and are no-ops until
//! `init_metrics` installs the Prometheus recorder.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::relay::error::RelayError;

const DURATION_BUCKETS: &[f64] = &[0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0];

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(
            Matcher::Full("relay_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )?
        .install()?;

    describe_counter!("relay_requests_total", "Relay requests by outcome");
    describe_histogram!(
        "relay_request_duration_seconds",
        metrics::Unit::Seconds,
        "End-to-end relay latency"
    );
    describe_gauge!("relay_rpc_healthy", "Chain RPC reachability (1=healthy)");
    describe_gauge!("relay_relayer_balance_wei", "Relayer account balance in wei");
    describe_counter!(
        "relay_insufficient_funds_total",
        "Submissions refused because the relayer cannot pay for gas"
    );
    describe_counter!("relay_rate_limited_total", "Requests rejected by the rate limiter");

    tracing::info!(address = %addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Outcome label for a relay result.
pub fn outcome_label(result: &Result<(), &RelayError>) -> &'static str {
    match result {
        Ok(()) => "relayed",
        Err(e) => e.kind().as_str(),
    }
}

/// Record a completed relay request.
pub fn record_relay(outcome: &'static str, start: Instant) {
    counter!("relay_requests_total", "outcome" => outcome).increment(1);
    histogram!("relay_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_rpc_health(healthy: bool) {
    gauge!("relay_rpc_healthy").set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_relayer_balance(balance_wei: f64) {
    gauge!("relay_relayer_balance_wei").set(balance_wei);
}

pub fn record_insufficient_funds() {
    counter!("relay_insufficient_funds_total").increment(1);
}

pub fn record_rate_limited() {
    counter!("relay_rate_limited_total").increment(1);
}

/// In-process relay counters reported by the admin status endpoint.
#[derive(Debug, Default)]
pub struct RelayStats {
    relayed: AtomicU64,
    rejected: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RelayStatsSnapshot {
    pub relayed: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl RelayStats {
    pub fn record(&self, result: Result<(), &RelayError>) {
        let slot = match result {
            Ok(()) => &self.relayed,
            Err(e) if e.is_rejection() => &self.rejected,
            Err(_) => &self.failed,
        };
        slot.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            relayed: self.relayed.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
