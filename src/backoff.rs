// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Exponential backoff for reopening the Ingress watch.
//!
//! By default the reconciler reopens a closed watch immediately and forever.
//! With `--reconnect-backoff` it waits between attempts instead, doubling the
//! delay each time up to a cap. There is no ceiling on the number of
//! attempts: the watch is always reopened eventually.

use crate::constants::{
    RECONNECT_BACKOFF_MULTIPLIER, RECONNECT_INITIAL_INTERVAL_MILLIS, RECONNECT_MAX_INTERVAL_SECS,
    RECONNECT_RANDOMIZATION_FACTOR,
};
use rand::Rng;
use std::time::Duration;

/// Simple exponential backoff implementation.
///
/// Provides exponential backoff with randomization (jitter) to prevent thundering herd.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// Current interval duration
    pub current_interval: Duration,
    /// Interval restored by [`ExponentialBackoff::reset`]
    pub initial_interval: Duration,
    /// Maximum interval duration
    pub max_interval: Duration,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
    /// Randomization factor (e.g., 0.1 for ±10%)
    pub randomization_factor: f64,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with specified parameters.
    #[must_use]
    pub fn new(
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
        randomization_factor: f64,
    ) -> Self {
        Self {
            current_interval: initial_interval,
            initial_interval,
            max_interval,
            multiplier,
            randomization_factor,
        }
    }

    /// Get the next backoff interval and grow the one after it.
    pub fn next_backoff(&mut self) -> Duration {
        let interval = self.current_interval;
        let jittered = self.apply_jitter(interval);

        let next = interval.as_secs_f64() * self.multiplier;
        self.current_interval = Duration::from_secs_f64(next).min(self.max_interval);

        jittered
    }

    /// Start over from the initial interval, e.g. after a healthy watch.
    pub fn reset(&mut self) {
        self.current_interval = self.initial_interval;
    }

    /// Apply randomization (jitter) to an interval.
    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let min = secs - delta;
        let max = secs + delta;

        let mut rng = rand::thread_rng();
        let jittered = rng.gen_range(min..=max);

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

/// Backoff used between watch reopen attempts.
///
/// # Retry Schedule
///
/// Approximately 100ms, 200ms, 400ms, ... doubling until capped at 30s,
/// then 30s between every further attempt.
#[must_use]
pub fn reconnect_backoff() -> ExponentialBackoff {
    ExponentialBackoff::new(
        Duration::from_millis(RECONNECT_INITIAL_INTERVAL_MILLIS),
        Duration::from_secs(RECONNECT_MAX_INTERVAL_SECS),
        RECONNECT_BACKOFF_MULTIPLIER,
        RECONNECT_RANDOMIZATION_FACTOR,
    )
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod backoff_tests;
