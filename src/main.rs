// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use futures::stream::{BoxStream, StreamExt};
use ingress_zone::{
    config::{Args, ClusterAccess, Config, RunMode},
    constants::TOKIO_WORKER_THREADS,
    inventory::KubeInventory,
    metrics,
    reconciler::Reconciler,
};
use std::sync::Arc;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("ingress-zone")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    init_tracing();

    let config = args.into_config()?;
    info!(
        zone_file = %config.zone_file.display(),
        suffix = %config.suffix,
        once = config.mode == RunMode::Once,
        "Starting ingress-zone"
    );
    log_access(&config);

    debug!("Initializing Kubernetes client");
    let inventory = KubeInventory::connect(&config.access)?;

    if let Some(addr) = config.metrics_addr {
        tokio::spawn(async move {
            if let Err(e) = metrics::serve(addr).await {
                error!(address = %addr, error = %e, "Metrics server stopped");
            }
        });
    }

    let reconciler = Arc::new(Reconciler::new(inventory, config));
    let manual = manual_triggers()?;

    tokio::select! {
        result = Arc::clone(&reconciler).run(manual) => {
            if let Err(e) = result {
                error!(error = %e, "CRITICAL: zone reconciliation stopped");
                return Err(e.into());
            }
            info!("Zone reconciliation finished");
        }
        signal = shutdown_signal() => {
            let name = signal?;
            info!(signal = name, "Received shutdown signal, exiting");
        }
    }

    Ok(())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or
/// `text`, default `text`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

fn log_access(config: &Config) {
    match &config.access {
        ClusterAccess::InCluster => info!("Using in-cluster service account"),
        ClusterAccess::Endpoint(endpoint) => info!(endpoint = %endpoint, "Using API endpoint"),
    }
}

/// One item per SIGHUP, used to force a rebuild.
#[cfg(unix)]
fn manual_triggers() -> Result<BoxStream<'static, ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    Ok(futures::stream::poll_fn(move |cx| hangup.poll_recv(cx)).boxed())
}

#[cfg(not(unix))]
fn manual_triggers() -> Result<BoxStream<'static, ()>> {
    Ok(futures::stream::pending().boxed())
}

/// Wait for SIGINT or SIGTERM and return which one arrived.
async fn shutdown_signal() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                Ok("SIGINT")
            }
            _ = sigterm.recv() => Ok("SIGTERM"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("SIGINT")
    }
}
