// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone reconciliation engine.
//!
//! The [`Reconciler`] keeps the zone file in step with the Ingress inventory.
//! Two independent sources ask for rebuilds:
//!
//! - the Ingress watch, for every `Added` or `Modified` event
//! - a manual trigger (SIGHUP in the binary)
//!
//! Both feed one bounded queue drained by a single coordinator loop. Every
//! rebuild re-reads the full inventory and rewrites the whole file, so
//! requests arriving while the queue is full are coalesced into the one
//! already waiting. [`Reconciler::rebuild`] additionally holds an exclusive
//! lock for the whole list → aggregate → render → write → reload pipeline,
//! which keeps direct concurrent callers from interleaving their output.
//!
//! # Failure policy
//!
//! - Watch ends (cleanly or with an error): reopened immediately, forever
//!   (optionally with exponential backoff)
//! - Watch cannot be opened, inventory cannot be listed, or zone file cannot
//!   be written: fatal, [`Reconciler::run`] returns the error
//! - Reload command fails: reported, rebuild still succeeds

use crate::backoff::reconnect_backoff;
use crate::config::{Config, RunMode};
use crate::constants::REBUILD_QUEUE_CAPACITY;
use crate::entries::aggregate;
use crate::errors::{InventoryError, RebuildError};
use crate::inventory::{ChangeKind, Inventory};
use crate::metrics;
use crate::reload::{self, ReloadOutcome};
use crate::zone;
use futures::{Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Instant;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, not yet running
    Idle,
    /// Watch open, waiting for events
    Streaming,
    /// A rebuild is in progress
    Rebuilding,
    /// Watch closed, reopening
    Reconnecting,
    /// Stopped after run-once or a fatal error
    Terminated,
}

/// What asked for a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildTrigger {
    /// A change event from the watch
    Stream(ChangeKind),
    /// The manual trigger
    Manual,
    /// Run-once mode
    Once,
}

impl RebuildTrigger {
    /// Label used for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stream(_) => "stream",
            Self::Manual => "manual",
            Self::Once => "once",
        }
    }
}

/// Summary of a completed rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildReport {
    /// Resources read from the inventory
    pub resources: usize,
    /// Hostnames written to the zone file
    pub entries: usize,
    /// Outcome of the reload command, if one is configured
    pub reload: Option<ReloadOutcome>,
}

/// Zone reconciliation engine over an [`Inventory`].
pub struct Reconciler<I> {
    inventory: I,
    config: Config,
    rebuild_lock: Mutex<()>,
    rebuilding: AtomicBool,
    phase: StdMutex<EngineState>,
}

impl<I> Reconciler<I>
where
    I: Inventory + 'static,
{
    /// Create an idle reconciler.
    #[must_use]
    pub fn new(inventory: I, config: Config) -> Self {
        Self {
            inventory,
            config,
            rebuild_lock: Mutex::new(()),
            rebuilding: AtomicBool::new(false),
            phase: StdMutex::new(EngineState::Idle),
        }
    }

    /// Inventory the reconciler reads from.
    #[must_use]
    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    /// Current state. A running rebuild takes precedence over the watch phase.
    #[must_use]
    pub fn state(&self) -> EngineState {
        if self.rebuilding.load(Ordering::SeqCst) {
            return EngineState::Rebuilding;
        }
        self.phase
            .lock()
            .map_or(EngineState::Terminated, |phase| *phase)
    }

    fn set_phase(&self, state: EngineState) {
        if let Ok(mut phase) = self.phase.lock() {
            *phase = state;
        }
    }

    /// Run one full rebuild: list, aggregate, render, write, reload.
    ///
    /// Holds the rebuild lock for the whole pipeline; concurrent callers wait.
    ///
    /// # Errors
    ///
    /// Returns [`RebuildError`] if the inventory cannot be listed or the zone
    /// file cannot be written. A failing reload command is not an error; its
    /// outcome is in the returned [`RebuildReport`].
    pub async fn rebuild(&self, trigger: RebuildTrigger) -> Result<RebuildReport, RebuildError> {
        let _guard = self.rebuild_lock.lock().await;
        let _flag = RebuildingFlag::raise(&self.rebuilding);

        let start = Instant::now();
        debug!(trigger = trigger.as_str(), "Rebuilding zone file");
        let result = self.rebuild_locked().await;
        let duration = start.elapsed();

        match &result {
            Ok(report) => {
                info!(
                    trigger = trigger.as_str(),
                    resources = report.resources,
                    entries = report.entries,
                    path = %self.config.zone_file.display(),
                    elapsed = ?duration,
                    "Zone file rebuilt"
                );
                metrics::record_rebuild_success(trigger.as_str(), duration, report.entries);
            }
            Err(e) => {
                error!(trigger = trigger.as_str(), error = %e, "Zone rebuild failed");
                metrics::record_rebuild_error(trigger.as_str(), duration);
            }
        }

        result
    }

    async fn rebuild_locked(&self) -> Result<RebuildReport, RebuildError> {
        let resources = self.inventory.list().await?;
        let mapping = aggregate(&resources, &self.config.suffix);
        let text = zone::render(&mapping);
        // Hostnames without an address are left out of the file
        let written = mapping
            .entries()
            .filter(|entry| !entry.addresses.is_empty())
            .count();
        zone::write(&text, &self.config.zone_file).await?;

        let reload = match &self.config.reload_command {
            Some(command) => {
                let outcome = reload::trigger(command).await;
                metrics::record_reload(outcome.label());
                Some(outcome)
            }
            None => None,
        };

        Ok(RebuildReport {
            resources: resources.len(),
            entries: written,
            reload,
        })
    }

    /// Run until a fatal error (continuous mode) or after one rebuild (run-once).
    ///
    /// `manual` yields once per manual rebuild request. In run-once mode it
    /// is never polled and the watch is never opened.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`RebuildError`] that stopped the engine.
    pub async fn run<S>(self: Arc<Self>, manual: S) -> Result<(), RebuildError>
    where
        S: Stream<Item = ()> + Send + 'static,
    {
        if self.config.mode == RunMode::Once {
            let result = self.rebuild(RebuildTrigger::Once).await;
            self.set_phase(EngineState::Terminated);
            return result.map(|_| ());
        }

        let (tx, mut rx) = mpsc::channel(REBUILD_QUEUE_CAPACITY);
        let mut stream_listener = tokio::spawn(Arc::clone(&self).listen_stream(tx.clone()));
        let manual_listener = tokio::spawn(listen_manual(manual, tx));

        let result = loop {
            tokio::select! {
                Some(trigger) = rx.recv() => {
                    if let Err(e) = self.rebuild(trigger).await {
                        break Err(e);
                    }
                }
                joined = &mut stream_listener => {
                    break match joined {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(e)) => Err(e.into()),
                        Err(e) => Err(InventoryError::WatchFailed {
                            reason: format!("watch listener stopped: {e}"),
                        }
                        .into()),
                    };
                }
            }
        };

        stream_listener.abort();
        manual_listener.abort();
        self.set_phase(EngineState::Terminated);
        result
    }

    /// Keep a watch open forever, queueing a rebuild for every add or modify.
    ///
    /// Returns `Ok` only when the coordinator has gone away.
    async fn listen_stream(
        self: Arc<Self>,
        tx: mpsc::Sender<RebuildTrigger>,
    ) -> Result<(), InventoryError> {
        let mut backoff = reconnect_backoff();

        loop {
            let mut stream = self.inventory.watch().await?;
            self.set_phase(EngineState::Streaming);
            info!("Watching Ingress resources");

            while let Some(item) = stream.next().await {
                match item {
                    Ok(event) => {
                        backoff.reset();
                        metrics::record_change_event(event.kind.as_str());

                        if !event.kind.triggers_rebuild() {
                            debug!(kind = event.kind.as_str(), "Ignoring change event");
                            continue;
                        }
                        if !enqueue(&tx, RebuildTrigger::Stream(event.kind)) {
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Ingress watch failed");
                        break;
                    }
                }
            }

            info!("Ingress watch closed, starting again");
            self.set_phase(EngineState::Reconnecting);
            metrics::record_stream_reconnect();

            if self.config.reconnect_backoff {
                let delay = backoff.next_backoff();
                debug!(delay = ?delay, "Waiting before reopening Ingress watch");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Marks a rebuild in progress; cleared on drop, including cancellation.
struct RebuildingFlag<'a>(&'a AtomicBool);

impl<'a> RebuildingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RebuildingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Forward manual requests into the rebuild queue until either side closes.
async fn listen_manual<S>(manual: S, tx: mpsc::Sender<RebuildTrigger>)
where
    S: Stream<Item = ()> + Send + 'static,
{
    futures::pin_mut!(manual);
    while manual.next().await.is_some() {
        info!("Manual rebuild requested");
        if !enqueue(&tx, RebuildTrigger::Manual) {
            return;
        }
    }
}

/// Queue a rebuild request, coalescing into pending ones when the queue is full.
///
/// Returns `false` once the coordinator is gone.
fn enqueue(tx: &mpsc::Sender<RebuildTrigger>, trigger: RebuildTrigger) -> bool {
    match tx.try_send(trigger) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!(
                trigger = trigger.as_str(),
                "Rebuild queue full, coalescing with pending request"
            );
            true
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
