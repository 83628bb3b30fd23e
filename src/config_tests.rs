// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use crate::config::{Args, ClusterAccess, RunMode};
    use crate::errors::ConfigError;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("ingress-zone").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--endpoint", "http://127.0.0.1:8080"])
            .into_config()
            .expect("valid config");

        assert_eq!(
            config.access,
            ClusterAccess::Endpoint("http://127.0.0.1:8080".to_string())
        );
        assert_eq!(config.zone_file, PathBuf::from("zones/k8s-zones.cluster.local"));
        assert_eq!(config.suffix, "");
        assert!(config.reload_command.is_none());
        assert_eq!(config.mode, RunMode::Continuous);
        assert!(!config.reconnect_backoff);
        assert!(config.metrics_addr.is_none());
    }

    #[test]
    fn test_incluster_does_not_need_endpoint() {
        let config = parse(&["--incluster"]).into_config().expect("valid config");

        assert_eq!(config.access, ClusterAccess::InCluster);
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let err = parse(&[]).into_config().expect_err("endpoint required");

        assert_eq!(err, ConfigError::MissingEndpoint);
    }

    #[test]
    fn test_blank_endpoint_is_config_error() {
        let err = parse(&["--endpoint", "  "]).into_config().expect_err("endpoint required");

        assert_eq!(err, ConfigError::MissingEndpoint);
    }

    #[test]
    fn test_invalid_endpoint_is_config_error() {
        let err = parse(&["--endpoint", "not a url"])
            .into_config()
            .expect_err("invalid endpoint");

        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_all_options() {
        let config = parse(&[
            "--incluster",
            "--filepath",
            "/etc/bind/k8s.zone",
            "--suffix",
            "example.com",
            "--command",
            "\"rndc reload k8s\"",
            "--once",
            "--reconnect-backoff",
            "--metrics-addr",
            "127.0.0.1:9090",
        ])
        .into_config()
        .expect("valid config");

        assert_eq!(config.zone_file, PathBuf::from("/etc/bind/k8s.zone"));
        assert_eq!(config.suffix, "example.com");
        let command = config.reload_command.expect("reload command");
        assert_eq!(command.program(), "rndc");
        assert_eq!(command.args(), ["reload", "k8s"]);
        assert_eq!(config.mode, RunMode::Once);
        assert!(config.reconnect_backoff);
        assert_eq!(
            config.metrics_addr.map(|a| a.to_string()),
            Some("127.0.0.1:9090".to_string())
        );
    }

    #[test]
    fn test_invalid_metrics_address() {
        let err = parse(&["--incluster", "--metrics-addr", "localhost"])
            .into_config()
            .expect_err("invalid address");

        assert!(matches!(
            err,
            ConfigError::InvalidMetricsAddress { ref address, .. } if address == "localhost"
        ));
    }
}
