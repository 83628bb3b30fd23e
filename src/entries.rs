// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Aggregation of Ingress resources into zone entries.
//!
//! Every rebuild turns the full Ingress inventory into a [`ZoneMapping`]:
//! one [`Entry`] per normalized hostname with the union of the load-balancer
//! addresses of every rule that resolves to it. The mapping is built from
//! scratch each time, so it never drifts from the inventory.
//!
//! Ordered collections back the mapping, so iteration is lexicographic by
//! hostname and then by address. Rendering relies on that for byte-identical
//! output across rebuilds.

use crate::suffix::normalize;
use k8s_openapi::api::networking::v1::Ingress;
use kube::ResourceExt;
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot of one routing resource as read from the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressResource {
    /// Resource name
    pub name: String,
    /// Resource namespace, if namespaced
    pub namespace: Option<String>,
    /// Host of every rule, in declaration order (rules without a host are skipped)
    pub hosts: Vec<String>,
    /// Resolved load-balancer addresses
    pub addresses: Vec<String>,
}

impl IngressResource {
    /// Create a resource snapshot from its parts.
    #[must_use]
    pub fn new<H, A>(name: impl Into<String>, hosts: H, addresses: A) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        Self {
            name: name.into(),
            namespace: None,
            hosts: hosts.into_iter().map(Into::into).collect(),
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&Ingress> for IngressResource {
    fn from(ingress: &Ingress) -> Self {
        let hosts = ingress
            .spec
            .as_ref()
            .and_then(|spec| spec.rules.as_ref())
            .map(|rules| rules.iter().filter_map(|rule| rule.host.clone()).collect())
            .unwrap_or_default();

        let addresses = ingress
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .map(|lb_ingress| lb_ingress.iter().filter_map(|lb| lb.ip.clone()).collect())
            .unwrap_or_default();

        Self {
            name: ingress.name_any(),
            namespace: ingress.namespace(),
            hosts,
            addresses,
        }
    }
}

/// One zone record owner and its addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// Hostname relative to the zone origin
    pub name: String,
    /// Deduplicated addresses, never containing the empty string
    pub addresses: BTreeSet<String>,
}

/// Complete hostname → [`Entry`] mapping produced by one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneMapping {
    entries: BTreeMap<String, Entry>,
}

impl ZoneMapping {
    /// Merge `addresses` into the entry for `name`, creating it if needed.
    ///
    /// Empty names are ignored, as are empty address strings.
    pub fn insert<'a, I>(&mut self, name: &str, addresses: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        if name.is_empty() {
            return;
        }

        let entry = self
            .entries
            .entry(name.to_string())
            .or_insert_with(|| Entry {
                name: name.to_string(),
                addresses: BTreeSet::new(),
            });

        entry.addresses.extend(
            addresses
                .into_iter()
                .filter(|address| !address.is_empty())
                .cloned(),
        );
    }

    /// Look up the entry for a hostname.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Entries in lexicographic hostname order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Number of distinct hostnames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no hostnames at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the [`ZoneMapping`] for a full inventory.
///
/// Each resource's addresses are deduplicated, then merged into the entry of
/// every host rule after stripping `suffix`. Hosts that normalize to the
/// empty string are dropped.
#[must_use]
pub fn aggregate(resources: &[IngressResource], suffix: &str) -> ZoneMapping {
    let mut mapping = ZoneMapping::default();

    for resource in resources {
        let addresses: BTreeSet<String> = resource
            .addresses
            .iter()
            .filter(|address| !address.is_empty())
            .cloned()
            .collect();

        for host in &resource.hosts {
            let name = normalize(host, suffix);
            if name.is_empty() {
                tracing::debug!(
                    resource = %resource.name,
                    host = %host,
                    "Host normalizes to the zone origin, skipping"
                );
                continue;
            }
            mapping.insert(&name, &addresses);
        }
    }

    mapping
}

#[cfg(test)]
#[path = "entries_tests.rs"]
mod entries_tests;
