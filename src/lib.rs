// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # ingress-zone - BIND zone file generator for Kubernetes Ingresses
//!
//! ingress-zone watches the cluster's Ingress resources and keeps a BIND zone
//! file in step with them: one `A`/`AAAA` record per load-balancer address
//! for every hostname an Ingress routes.
//!
//! ## Overview
//!
//! Every rebuild re-reads the whole inventory and rewrites the whole file:
//!
//! 1. List all Ingresses ([`inventory`])
//! 2. Strip the configured domain suffix from each hostname ([`suffix`])
//! 3. Merge addresses per hostname ([`entries`])
//! 4. Render and write the zone file ([`zone`])
//! 5. Optionally run a reload command so the DNS server picks it up ([`reload`])
//!
//! Rebuilds are triggered by the Ingress watch and by a manual trigger, and
//! are serialized by the [`reconciler`].
//!
//! ## Modules
//!
//! - [`config`] - Command-line flags and validated runtime configuration
//! - [`inventory`] - Listing and watching Ingress resources
//! - [`entries`] - Hostname to address aggregation
//! - [`zone`] - Zone file rendering and writing
//! - [`reload`] - Reload command parsing and execution
//! - [`reconciler`] - Rebuild coordination and watch reconnects
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust
//! use ingress_zone::entries::{aggregate, IngressResource};
//! use ingress_zone::zone::render;
//!
//! let resources = vec![IngressResource::new(
//!     "api",
//!     ["api.example.com"],
//!     ["10.0.0.5"],
//! )];
//!
//! let text = render(&aggregate(&resources, "example.com"));
//! assert!(text.contains("api\tIN\tA\t10.0.0.5"));
//! ```

pub mod backoff;
pub mod config;
pub mod constants;
pub mod entries;
pub mod errors;
pub mod inventory;
pub mod metrics;
pub mod reconciler;
pub mod reload;
pub mod suffix;
pub mod zone;
