// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for ingress-zone.
//!
//! This module provides specialized error types for:
//! - Configuration validation before anything talks to the cluster
//! - Reading the Ingress inventory and opening the change subscription
//! - Writing the rendered zone file
//!
//! [`RebuildError`] rolls the runtime failures up into the single error a
//! rebuild can return. Reload command failures are deliberately absent: they
//! are reported through [`crate::reload::ReloadOutcome`] and never fail a
//! rebuild.

use std::path::PathBuf;
use thiserror::Error;

/// Errors detected while turning command-line arguments into a [`crate::config::Config`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Not running in-cluster and no API server endpoint was given
    #[error("an API server endpoint is required when not running in-cluster (use --endpoint or --incluster)")]
    MissingEndpoint,

    /// The API server endpoint could not be parsed as a URI
    #[error("invalid API server endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as given on the command line
        endpoint: String,
        /// Parser message
        reason: String,
    },

    /// The metrics listen address could not be parsed
    #[error("invalid metrics address '{address}': {reason}")]
    InvalidMetricsAddress {
        /// The address as given on the command line
        address: String,
        /// Parser message
        reason: String,
    },
}

/// Errors raised by an [`crate::inventory::Inventory`].
#[derive(Error, Debug, Clone)]
pub enum InventoryError {
    /// Could not build a client for the cluster API
    #[error("failed to create Kubernetes client: {reason}")]
    ClientUnavailable {
        /// Underlying client error
        reason: String,
    },

    /// Listing the full Ingress inventory failed
    #[error("failed to list Ingress resources: {reason}")]
    ListFailed {
        /// Underlying API error
        reason: String,
    },

    /// Opening the change subscription failed
    #[error("failed to open Ingress watch: {reason}")]
    WatchFailed {
        /// Underlying API error
        reason: String,
    },

    /// An open subscription delivered a transport or decode error
    #[error("Ingress watch interrupted: {reason}")]
    StreamInterrupted {
        /// Underlying stream error
        reason: String,
    },
}

/// Errors raised while persisting the rendered zone.
#[derive(Error, Debug)]
pub enum ZoneWriteError {
    /// The parent directory of the zone file could not be created
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// The zone file could not be opened for writing
    #[error("failed to open zone file {path}: {source}")]
    Open {
        /// Zone file path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing, flushing, or syncing the zone file failed
    #[error("failed to write zone file {path}: {source}")]
    Write {
        /// Zone file path
        path: PathBuf,
        /// I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a rebuild.
///
/// Both variants are fatal in continuous mode: the engine stops and the
/// process exits non-zero rather than keep serving a stale zone file.
#[derive(Error, Debug)]
pub enum RebuildError {
    /// Reading the inventory failed
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Writing the zone file failed
    #[error(transparent)]
    Write(#[from] ZoneWriteError),
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
