// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Access to the Ingress inventory.
//!
//! The reconciler needs two things from the cluster: the full current list
//! of Ingresses, and a stream of change notifications telling it when to
//! re-read that list. [`Inventory`] captures exactly that contract so the
//! reconciler can be driven by [`KubeInventory`] in production and by an
//! in-memory fake in tests.

use crate::config::ClusterAccess;
use crate::constants::WATCH_FROM_VERSION;
use crate::entries::IngressResource;
use crate::errors::InventoryError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{ListParams, WatchEvent, WatchParams};
use kube::{Api, Client};
use tracing::debug;

/// Kind of change carried by a [`ChangeEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A resource appeared
    Added,
    /// A resource changed
    Modified,
    /// A resource was removed
    Deleted,
    /// The server reported an error on the watch
    Error,
}

impl ChangeKind {
    /// Whether this kind of change should trigger a rebuild.
    ///
    /// Only additions and modifications do. Deletions converge on the next
    /// rebuild because every rebuild re-reads the full inventory.
    #[must_use]
    pub fn triggers_rebuild(self) -> bool {
        matches!(self, Self::Added | Self::Modified)
    }

    /// Lowercase label used for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Error => "error",
        }
    }
}

/// One notification from the change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// What happened
    pub kind: ChangeKind,
    /// The affected resource (absent for [`ChangeKind::Error`])
    pub resource: Option<IngressResource>,
}

impl ChangeEvent {
    /// Event for a changed resource.
    #[must_use]
    pub fn new(kind: ChangeKind, resource: IngressResource) -> Self {
        Self {
            kind,
            resource: Some(resource),
        }
    }

    /// Server-side watch error.
    #[must_use]
    pub fn error() -> Self {
        Self {
            kind: ChangeKind::Error,
            resource: None,
        }
    }
}

/// Live change subscription. Ends when the server closes the watch.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, InventoryError>>;

/// Read contract the reconciler depends on.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Read the full current inventory.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::ListFailed`] if the inventory cannot be read.
    async fn list(&self) -> Result<Vec<IngressResource>, InventoryError>;

    /// Open a new change subscription.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::WatchFailed`] if the subscription cannot be opened.
    async fn watch(&self) -> Result<ChangeStream, InventoryError>;
}

/// [`Inventory`] backed by the Kubernetes API, across all namespaces.
#[derive(Clone)]
pub struct KubeInventory {
    api: Api<Ingress>,
}

impl KubeInventory {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }

    /// Build a client for the configured cluster access mode.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::ClientUnavailable`] if the in-cluster
    /// environment is incomplete or the client cannot be constructed.
    pub fn connect(access: &ClusterAccess) -> Result<Self, InventoryError> {
        let unavailable = |reason: String| InventoryError::ClientUnavailable { reason };

        let config = match access {
            ClusterAccess::InCluster => {
                kube::Config::incluster().map_err(|e| unavailable(e.to_string()))?
            }
            ClusterAccess::Endpoint(endpoint) => endpoint_config(endpoint).map_err(unavailable)?,
        };

        let client = Client::try_from(config).map_err(|e| unavailable(e.to_string()))?;
        debug!("Kubernetes client initialized successfully");
        Ok(Self::new(client))
    }
}

/// Client configuration for an explicit API server URL.
///
/// # Errors
///
/// Returns the parser message if `endpoint` is not a valid URI.
pub fn endpoint_config(endpoint: &str) -> Result<kube::Config, String> {
    Ok(kube::Config::new(parse_uri(endpoint)?))
}

fn parse_uri<T>(raw: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| e.to_string())
}

/// Map a raw watch event; bookmarks carry no change and are dropped.
fn change_event(event: WatchEvent<Ingress>) -> Option<ChangeEvent> {
    match event {
        WatchEvent::Added(ingress) => Some(ChangeEvent::new(
            ChangeKind::Added,
            IngressResource::from(&ingress),
        )),
        WatchEvent::Modified(ingress) => Some(ChangeEvent::new(
            ChangeKind::Modified,
            IngressResource::from(&ingress),
        )),
        WatchEvent::Deleted(ingress) => Some(ChangeEvent::new(
            ChangeKind::Deleted,
            IngressResource::from(&ingress),
        )),
        WatchEvent::Error(_) => Some(ChangeEvent::error()),
        WatchEvent::Bookmark(_) => None,
    }
}

#[async_trait]
impl Inventory for KubeInventory {
    async fn list(&self) -> Result<Vec<IngressResource>, InventoryError> {
        let ingresses = self
            .api
            .list(&ListParams::default())
            .await
            .map_err(|e| InventoryError::ListFailed {
                reason: e.to_string(),
            })?;

        Ok(ingresses.items.iter().map(IngressResource::from).collect())
    }

    async fn watch(&self) -> Result<ChangeStream, InventoryError> {
        let stream = self
            .api
            .watch(&WatchParams::default(), WATCH_FROM_VERSION)
            .await
            .map_err(|e| InventoryError::WatchFailed {
                reason: e.to_string(),
            })?;

        Ok(stream
            .map_err(|e| InventoryError::StreamInterrupted {
                reason: e.to_string(),
            })
            .try_filter_map(|event| futures::future::ready(Ok(change_event(event))))
            .boxed())
    }
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod inventory_tests;
