// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration.
//!
//! [`Args`] is the raw clap surface. [`Args::into_config`] validates it once
//! at startup and produces the immutable [`Config`] that is handed to the
//! reconciler; nothing reads configuration from global state afterwards.

use crate::constants::DEFAULT_ZONE_FILE_PATH;
use crate::errors::ConfigError;
use crate::reload::ReloadCommand;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Keep a BIND zone file in sync with the hosts of Kubernetes Ingresses.
#[derive(Parser, Debug, Clone)]
#[command(name = "ingress-zone", version, about, long_about = None)]
pub struct Args {
    /// Use the in-cluster service account to reach the API server
    #[arg(long, env = "INGRESS_ZONE_INCLUSTER")]
    pub incluster: bool,

    /// API server URL (required unless --incluster)
    #[arg(long, env = "INGRESS_ZONE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Location of the generated zone file
    #[arg(long, env = "INGRESS_ZONE_FILEPATH", default_value = DEFAULT_ZONE_FILE_PATH)]
    pub filepath: PathBuf,

    /// DNS suffix stripped from Ingress hosts (e.g. example.com)
    #[arg(long, env = "INGRESS_ZONE_SUFFIX", default_value = "")]
    pub suffix: String,

    /// Command to run every time the zone file is rewritten
    #[arg(long, env = "INGRESS_ZONE_COMMAND", default_value = "")]
    pub command: String,

    /// Rebuild the zone file once and exit instead of watching
    #[arg(long, env = "INGRESS_ZONE_ONCE")]
    pub once: bool,

    /// Back off exponentially between watch reconnect attempts
    #[arg(long, env = "INGRESS_ZONE_RECONNECT_BACKOFF")]
    pub reconnect_backoff: bool,

    /// Serve Prometheus metrics on this address (e.g. 0.0.0.0:9090)
    #[arg(long, env = "INGRESS_ZONE_METRICS_ADDR")]
    pub metrics_addr: Option<String>,
}

/// How the inventory reaches the cluster API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterAccess {
    /// Service-account credentials mounted into the pod
    InCluster,
    /// Explicit API server URL
    Endpoint(String),
}

/// Whether the reconciler watches forever or rebuilds once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Rebuild on every change until terminated
    Continuous,
    /// Rebuild exactly once, then exit
    Once,
}

/// Validated, immutable configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Cluster access mode
    pub access: ClusterAccess,
    /// Zone file destination
    pub zone_file: PathBuf,
    /// Suffix stripped from hosts (empty for none)
    pub suffix: String,
    /// Command run after each successful write
    pub reload_command: Option<ReloadCommand>,
    /// Continuous or one-shot
    pub mode: RunMode,
    /// Back off between watch reopen attempts
    pub reconnect_backoff: bool,
    /// Metrics listen address
    pub metrics_addr: Option<SocketAddr>,
}

impl Config {
    /// Continuous-mode configuration with every optional feature off.
    #[must_use]
    pub fn new(access: ClusterAccess, zone_file: impl Into<PathBuf>) -> Self {
        Self {
            access,
            zone_file: zone_file.into(),
            suffix: String::new(),
            reload_command: None,
            mode: RunMode::Continuous,
            reconnect_backoff: false,
            metrics_addr: None,
        }
    }
}

impl Args {
    /// Validate arguments into a [`Config`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingEndpoint`] if not in-cluster and no endpoint was given
    /// - [`ConfigError::InvalidEndpoint`] if the endpoint is not a URI
    /// - [`ConfigError::InvalidMetricsAddress`] if the metrics address does not parse
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let access = if self.incluster {
            ClusterAccess::InCluster
        } else {
            let endpoint = self
                .endpoint
                .filter(|e| !e.trim().is_empty())
                .ok_or(ConfigError::MissingEndpoint)?;
            crate::inventory::endpoint_config(&endpoint).map_err(|reason| {
                ConfigError::InvalidEndpoint {
                    endpoint: endpoint.clone(),
                    reason,
                }
            })?;
            ClusterAccess::Endpoint(endpoint)
        };

        let metrics_addr = self
            .metrics_addr
            .map(|address| {
                address
                    .parse::<SocketAddr>()
                    .map_err(|e| ConfigError::InvalidMetricsAddress {
                        address: address.clone(),
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        Ok(Config {
            access,
            zone_file: self.filepath,
            suffix: self.suffix,
            reload_command: ReloadCommand::parse(&self.command),
            mode: if self.once {
                RunMode::Once
            } else {
                RunMode::Continuous
            },
            reconnect_backoff: self.reconnect_backoff,
            metrics_addr,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
