// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! External reload command.
//!
//! After a new zone file is committed, the operator can have a command run
//! (typically `rndc reload` or a signal to the DNS server). The command's
//! stdout is forwarded to ours; its stderr is forwarded only when it exits
//! non-zero. Failures are reported, never propagated: the zone file is
//! already on disk by the time the command runs.

use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Pre-tokenized reload command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadCommand {
    program: String,
    args: Vec<String>,
}

impl ReloadCommand {
    /// Tokenize a raw command string.
    ///
    /// Leading and trailing `"` characters are trimmed, then the rest is split
    /// on runs of whitespace. Returns `None` when nothing is left.
    ///
    /// # Examples
    ///
    /// ```
    /// use ingress_zone::reload::ReloadCommand;
    ///
    /// let cmd = ReloadCommand::parse("\"rndc  reload k8s.cluster.local\"").unwrap();
    /// assert_eq!(cmd.program(), "rndc");
    /// assert_eq!(cmd.args(), ["reload", "k8s.cluster.local"]);
    ///
    /// assert!(ReloadCommand::parse("  ").is_none());
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut tokens = raw.trim_matches('"').split_whitespace().map(str::to_string);
        let program = tokens.next()?;
        Some(Self {
            program,
            args: tokens.collect(),
        })
    }

    /// Executable name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl std::fmt::Display for ReloadCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How a reload attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The command exited with status zero
    Success {
        /// Captured standard output
        stdout: Vec<u8>,
    },
    /// The command ran but exited non-zero (or was killed by a signal)
    NonZeroExit {
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: Vec<u8>,
    },
    /// The command could not be started at all
    LaunchFailure {
        /// Why spawning failed
        reason: String,
    },
}

impl ReloadOutcome {
    /// Whether the command ran and exited zero.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short label used for metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::NonZeroExit { .. } => "non_zero_exit",
            Self::LaunchFailure { .. } => "launch_failure",
        }
    }
}

/// Run the reload command once and classify the result.
///
/// Stdout is forwarded to this process's stdout in every case where the
/// command ran; stderr is forwarded only on a non-zero exit. There is no
/// timeout: a hung command holds up the rebuild that started it.
pub async fn trigger(command: &ReloadCommand) -> ReloadOutcome {
    debug!(command = %command, "Running reload command");

    let output = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            error!(command = %command, error = %e, "Failed to launch reload command");
            return ReloadOutcome::LaunchFailure {
                reason: e.to_string(),
            };
        }
    };

    forward(&mut tokio::io::stdout(), &output.stdout).await;

    if output.status.success() {
        info!(command = %command, "Reload command succeeded");
        ReloadOutcome::Success {
            stdout: output.stdout,
        }
    } else {
        error!(
            command = %command,
            status = %output.status,
            "Reload command exited unsuccessfully"
        );
        forward(&mut tokio::io::stderr(), &output.stderr).await;
        ReloadOutcome::NonZeroExit {
            code: output.status.code(),
            stderr: output.stderr,
        }
    }
}

async fn forward<W>(sink: &mut W, bytes: &[u8])
where
    W: tokio::io::AsyncWrite + Unpin,
{
    if bytes.is_empty() {
        return;
    }
    if let Err(e) = sink.write_all(bytes).await {
        warn!(error = %e, "Failed to forward reload command output");
        return;
    }
    if let Err(e) = sink.flush().await {
        warn!(error = %e, "Failed to flush reload command output");
    }
}

#[cfg(test)]
#[path = "reload_tests.rs"]
mod reload_tests;
