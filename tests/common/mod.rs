// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use ingress_zone::config::{ClusterAccess, Config};
use ingress_zone::entries::IngressResource;
use ingress_zone::errors::InventoryError;
use ingress_zone::inventory::{ChangeEvent, ChangeKind, ChangeStream, Inventory};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// In-memory inventory driven by scripted watch streams.
///
/// Each call to `watch()` consumes the next script; once the scripts run out
/// the returned stream stays open forever without yielding.
#[derive(Default)]
pub struct FakeInventory {
    resources: Mutex<Vec<IngressResource>>,
    scripts: Mutex<VecDeque<Vec<Result<ChangeEvent, InventoryError>>>>,
    fail_list: AtomicBool,
    fail_watch: AtomicBool,
    list_delay: Mutex<Option<Duration>>,
    pub list_calls: AtomicUsize,
    pub watch_calls: AtomicUsize,
    active_lists: AtomicUsize,
    pub max_concurrent_lists: AtomicUsize,
}

impl FakeInventory {
    pub fn with_resources(resources: Vec<IngressResource>) -> Self {
        let inventory = Self::default();
        inventory.set_resources(resources);
        inventory
    }

    pub fn set_resources(&self, resources: Vec<IngressResource>) {
        *self.resources.lock().unwrap() = resources;
    }

    pub fn push_script(&self, script: Vec<Result<ChangeEvent, InventoryError>>) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn fail_watch(&self) {
        self.fail_watch.store(true, Ordering::SeqCst);
    }

    pub fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = Some(delay);
    }

    pub fn list_snapshot(&self) -> Vec<IngressResource> {
        self.resources.lock().unwrap().clone()
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn watches(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn list(&self) -> Result<Vec<IngressResource>, InventoryError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(InventoryError::ListFailed {
                reason: "connection refused".to_string(),
            });
        }

        let active = self.active_lists.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_lists.fetch_max(active, Ordering::SeqCst);
        let delay = *self.list_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let resources = self.resources.lock().unwrap().clone();
        self.active_lists.fetch_sub(1, Ordering::SeqCst);

        Ok(resources)
    }

    async fn watch(&self) -> Result<ChangeStream, InventoryError> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_watch.load(Ordering::SeqCst) {
            return Err(InventoryError::WatchFailed {
                reason: "forbidden".to_string(),
            });
        }

        let script = self.scripts.lock().unwrap().pop_front();
        Ok(match script {
            Some(items) => stream::iter(items).boxed(),
            None => stream::pending().boxed(),
        })
    }
}

pub fn event(kind: ChangeKind) -> Result<ChangeEvent, InventoryError> {
    Ok(ChangeEvent::new(kind, IngressResource::default()))
}

pub fn resource(name: &str, hosts: &[&str], addresses: &[&str]) -> IngressResource {
    IngressResource::new(name, hosts.iter().copied(), addresses.iter().copied())
}

pub fn config(zone_file: &Path) -> Config {
    Config::new(
        ClusterAccess::Endpoint("http://127.0.0.1:8080".to_string()),
        zone_file,
    )
}

/// Poll `condition` until it holds, failing the test after five seconds.
pub async fn wait_for(what: &str, condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {what}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
