// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone file rendering and persistence.
//!
//! The rendered file is a BIND zone fragment meant to be `$INCLUDE`d or
//! loaded directly by a DNS server:
//!
//! ```text
//! ; vim: set ft=bindzone :
//!
//! api	IN	A	10.0.0.5
//!
//! web	IN	A	10.0.0.1
//! 	IN	A	10.0.0.2
//! ```
//!
//! Columns are tab separated (owner, class, type, address). Continuation
//! lines leave the owner column empty, which zone parsers read as "same owner
//! as the previous record".

use crate::constants::{
    RECORD_CLASS, RECORD_TYPE_A, RECORD_TYPE_AAAA, ZONE_FILE_HEADER, ZONE_FILE_MODE,
};
use crate::entries::ZoneMapping;
use crate::errors::ZoneWriteError;
use std::fmt::Write as _;
use std::net::Ipv6Addr;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Record type for an address: `AAAA` for IPv6, `A` otherwise.
#[must_use]
pub fn record_type(address: &str) -> &'static str {
    if address.parse::<Ipv6Addr>().is_ok() {
        RECORD_TYPE_AAAA
    } else {
        RECORD_TYPE_A
    }
}

/// Render a [`ZoneMapping`] into zone file text.
///
/// The output depends only on the mapping's contents. Entries without any
/// address produce no block.
#[must_use]
pub fn render(mapping: &ZoneMapping) -> String {
    let mut out = String::new();
    out.push_str(ZONE_FILE_HEADER);
    out.push_str("\n\n");

    for entry in mapping.entries() {
        if entry.addresses.is_empty() {
            debug!(host = %entry.name, "No load-balancer address yet, leaving out of zone");
            continue;
        }

        let mut owner = entry.name.as_str();
        for address in &entry.addresses {
            // Writing to a String cannot fail
            let _ = writeln!(
                out,
                "{owner}\t{RECORD_CLASS}\t{}\t{address}",
                record_type(address)
            );
            owner = "";
        }
        out.push('\n');
    }

    out
}

/// Write rendered zone text to `path`, replacing any previous content.
///
/// The file is created (mode `0640` on Unix) or truncated, written in full,
/// flushed, and synced before returning. Missing parent directories are
/// created.
///
/// # Errors
///
/// Returns [`ZoneWriteError`] if the directory cannot be created or the file
/// cannot be opened, written, or synced. A partially written file is
/// acceptable: the next rebuild rewrites it from scratch.
pub async fn write(text: &str, path: &Path) -> Result<(), ZoneWriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| ZoneWriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    options.mode(ZONE_FILE_MODE);

    let mut file = options
        .open(path)
        .await
        .map_err(|source| ZoneWriteError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let write_err = |source| ZoneWriteError::Write {
        path: path.to_path_buf(),
        source,
    };
    file.write_all(text.as_bytes()).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;
    file.sync_all().await.map_err(write_err)?;

    debug!(path = %path.display(), bytes = text.len(), "Zone file written");
    Ok(())
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
