// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for ingress-zone.
//!
//! Defaults for the configuration surface, zone file layout, and the
//! reconnect/metrics tunables live here so they are easy to find.

// ============================================================================
// Configuration Defaults
// ============================================================================

/// Default location of the generated zone file
pub const DEFAULT_ZONE_FILE_PATH: &str = "zones/k8s-zones.cluster.local";

// ============================================================================
// Zone File Layout
// ============================================================================

/// First line of every generated zone file
pub const ZONE_FILE_HEADER: &str = "; vim: set ft=bindzone :";

/// Record class token written on every address line
pub const RECORD_CLASS: &str = "IN";

/// Record type for IPv4 (and any non-IPv6) addresses
pub const RECORD_TYPE_A: &str = "A";

/// Record type for IPv6 addresses
pub const RECORD_TYPE_AAAA: &str = "AAAA";

/// Unix permission bits for the zone file
pub const ZONE_FILE_MODE: u32 = 0o640;

// ============================================================================
// Reconciliation
// ============================================================================

/// Capacity of the rebuild-request channel shared by all trigger sources
pub const REBUILD_QUEUE_CAPACITY: usize = 16;

/// Resource version passed when opening a fresh subscription
pub const WATCH_FROM_VERSION: &str = "0";

// ============================================================================
// Reconnect Backoff
// ============================================================================

/// Initial delay before the first reopen attempt (100ms)
pub const RECONNECT_INITIAL_INTERVAL_MILLIS: u64 = 100;

/// Upper bound on the delay between reopen attempts (30 seconds)
pub const RECONNECT_MAX_INTERVAL_SECS: u64 = 30;

/// Backoff multiplier (exponential growth factor)
pub const RECONNECT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Randomization factor to prevent thundering herd (±10%)
pub const RECONNECT_RANDOMIZATION_FACTOR: f64 = 0.1;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
pub const METRICS_NAMESPACE: &str = "ingress_zone";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
