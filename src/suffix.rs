// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS suffix stripping for Ingress hostnames.
//!
//! Zone records are written relative to the zone origin, so a host such as
//! `api.example.com` in a zone for `example.com` must be written as `api`.
//! Matching works on whole labels only: a suffix of `example.com` never
//! strips part of `myexample.com`.

/// Strip `suffix` from the end of `hostname`, label by label.
///
/// Labels are compared from the right. When every label of `suffix` matches
/// the trailing labels of `hostname`, those labels are removed and the rest
/// is joined with dots, which may yield an empty string when the whole
/// hostname was consumed. When `suffix` is empty or is not a label suffix of
/// `hostname`, the hostname comes back unchanged. A single trailing dot on
/// either argument is ignored.
///
/// # Examples
///
/// ```
/// use ingress_zone::suffix::normalize;
///
/// assert_eq!(normalize("api.example.com", "example.com"), "api");
/// assert_eq!(normalize("api.example.org", "example.com"), "api.example.org");
/// assert_eq!(normalize("example.com", "example.com"), "");
/// assert_eq!(normalize("api.example.com", ""), "api.example.com");
/// ```
#[must_use]
pub fn normalize(hostname: &str, suffix: &str) -> String {
    let hostname = hostname.strip_suffix('.').unwrap_or(hostname);
    let suffix = suffix.strip_suffix('.').unwrap_or(suffix);

    if suffix.is_empty() {
        return hostname.to_string();
    }

    let mut host_labels: Vec<&str> = hostname.split('.').collect();
    let mut suffix_labels: Vec<&str> = suffix.split('.').collect();

    while let (Some(host_last), Some(suffix_last)) = (host_labels.last(), suffix_labels.last()) {
        if host_last != suffix_last {
            break;
        }
        host_labels.pop();
        suffix_labels.pop();
    }

    // Partial overlap (e.g. only the TLD matched) is not a suffix match.
    if !suffix_labels.is_empty() {
        return hostname.to_string();
    }

    host_labels.join(".")
}

#[cfg(test)]
#[path = "suffix_tests.rs"]
mod suffix_tests;
