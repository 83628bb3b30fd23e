// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for ingress-zone.
//!
//! All metrics carry the `ingress_zone_` prefix and live in a dedicated
//! registry. When `--metrics-addr` is set, [`serve`] exposes them in the
//! Prometheus text format on `GET /metrics`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ingress_zone::metrics::{gather_metrics, record_rebuild_success};
//!
//! record_rebuild_success("manual", std::time::Duration::from_millis(20), 3);
//! let text = gather_metrics().unwrap();
//! ```

use crate::constants::{METRICS_NAMESPACE, METRICS_SERVER_PATH};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, Opts, Registry, TextEncoder,
};
use std::net::SocketAddr;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{error, info};

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

fn register<M>(metric: M) -> M
where
    M: prometheus::core::Collector + Clone + 'static,
{
    METRICS_REGISTRY
        .register(Box::new(metric.clone()))
        .expect("metric names are unique");
    metric
}

// ============================================================================
// Rebuild Metrics
// ============================================================================

/// Total number of rebuilds by trigger source and status
///
/// Labels:
/// - `trigger`: Source of the rebuild (`stream`, `manual`, `once`)
/// - `status`: Outcome (`success`, `error`)
pub static REBUILDS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rebuilds_total"),
        "Total number of zone rebuilds by trigger and status",
    );
    register(CounterVec::new(opts, &["trigger", "status"]).expect("valid rebuilds_total"))
});

/// Duration of rebuilds in seconds, reload command included
pub static REBUILD_DURATION_SECONDS: LazyLock<Histogram> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_rebuild_duration_seconds"),
        "Duration of zone rebuilds in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    register(Histogram::with_opts(opts).expect("valid rebuild_duration_seconds"))
});

/// Number of hostnames in the most recently written zone
pub static ZONE_ENTRIES: LazyLock<Gauge> = LazyLock::new(|| {
    register(
        Gauge::new(
            format!("{METRICS_NAMESPACE}_zone_entries"),
            "Number of hostnames in the last written zone file",
        )
        .expect("valid zone_entries"),
    )
});

// ============================================================================
// Reload Metrics
// ============================================================================

/// Total number of reload command runs by outcome
///
/// Labels:
/// - `outcome`: `success`, `non_zero_exit`, `launch_failure`
pub static RELOADS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reloads_total"),
        "Total number of reload command runs by outcome",
    );
    register(CounterVec::new(opts, &["outcome"]).expect("valid reloads_total"))
});

// ============================================================================
// Watch Metrics
// ============================================================================

/// Total number of times the Ingress watch was reopened
pub static STREAM_RECONNECTS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    register(
        IntCounter::new(
            format!("{METRICS_NAMESPACE}_stream_reconnects_total"),
            "Total number of Ingress watch reconnects",
        )
        .expect("valid stream_reconnects_total"),
    )
});

/// Total number of change events received by kind
///
/// Labels:
/// - `kind`: `added`, `modified`, `deleted`, `error`
pub static CHANGE_EVENTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_change_events_total"),
        "Total number of Ingress change events by kind",
    );
    register(CounterVec::new(opts, &["kind"]).expect("valid change_events_total"))
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful rebuild
///
/// # Arguments
/// * `trigger` - What started the rebuild
/// * `duration` - Wall time of the rebuild
/// * `entries` - Hostnames in the written zone
pub fn record_rebuild_success(trigger: &str, duration: Duration, entries: usize) {
    REBUILDS_TOTAL.with_label_values(&[trigger, "success"]).inc();
    REBUILD_DURATION_SECONDS.observe(duration.as_secs_f64());
    #[allow(clippy::cast_precision_loss)]
    ZONE_ENTRIES.set(entries as f64);
}

/// Record a failed rebuild
pub fn record_rebuild_error(trigger: &str, duration: Duration) {
    REBUILDS_TOTAL.with_label_values(&[trigger, "error"]).inc();
    REBUILD_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Record a reload command run
pub fn record_reload(outcome: &str) {
    RELOADS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Record a watch reconnect
pub fn record_stream_reconnect() {
    STREAM_RECONNECTS_TOTAL.inc();
}

/// Record a received change event
pub fn record_change_event(kind: &str) {
    CHANGE_EVENTS_TOTAL.with_label_values(&[kind]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

async fn metrics_handler() -> (StatusCode, String) {
    match gather_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Router exposing the metrics endpoint.
pub fn router() -> Router {
    Router::new().route(METRICS_SERVER_PATH, get(metrics_handler))
}

/// Serve metrics on `addr` until the process exits.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, path = METRICS_SERVER_PATH, "Serving metrics");
    axum::serve(listener, router()).await
}
