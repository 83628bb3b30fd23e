// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `zone.rs`

#[cfg(test)]
mod tests {
    use super::super::{record_type, render, write};
    use crate::entries::{aggregate, IngressResource};
    use crate::errors::ZoneWriteError;

    #[test]
    fn test_render_empty_mapping_is_header_only() {
        let mapping = aggregate(&[], "");

        assert_eq!(render(&mapping), "; vim: set ft=bindzone :\n\n");
    }

    #[test]
    fn test_render_single_entry() {
        let mapping = aggregate(
            &[IngressResource::new("api", ["api.example.com"], ["10.0.0.5"])],
            "example.com",
        );

        assert_eq!(
            render(&mapping),
            "; vim: set ft=bindzone :\n\napi\tIN\tA\t10.0.0.5\n\n"
        );
    }

    #[test]
    fn test_render_merged_entry_lists_each_address_once() {
        let mapping = aggregate(
            &[
                IngressResource::new("one", ["svc.internal"], ["10.0.0.1"]),
                IngressResource::new("two", ["svc.internal"], ["10.0.0.2", "10.0.0.1"]),
            ],
            "",
        );

        let text = render(&mapping);

        assert_eq!(
            text,
            "; vim: set ft=bindzone :\n\nsvc.internal\tIN\tA\t10.0.0.1\n\tIN\tA\t10.0.0.2\n\n"
        );
        assert_eq!(text.matches("10.0.0.1").count(), 1);
        assert_eq!(text.matches("svc.internal").count(), 1);
    }

    #[test]
    fn test_render_blocks_are_sorted_and_separated() {
        let mapping = aggregate(
            &[
                IngressResource::new("b", ["beta.example.com"], ["10.0.0.2"]),
                IngressResource::new("a", ["alpha.example.com"], ["10.0.0.1"]),
            ],
            "example.com",
        );

        assert_eq!(
            render(&mapping),
            "; vim: set ft=bindzone :\n\nalpha\tIN\tA\t10.0.0.1\n\nbeta\tIN\tA\t10.0.0.2\n\n"
        );
    }

    #[test]
    fn test_render_uses_aaaa_for_ipv6() {
        let mapping = aggregate(&[IngressResource::new("v6", ["v6"], ["2001:db8::1"])], "");

        assert!(render(&mapping).contains("v6\tIN\tAAAA\t2001:db8::1\n"));
    }

    #[test]
    fn test_render_skips_entries_without_addresses() {
        let mapping = aggregate(
            &[
                IngressResource::new("pending", ["pending"], Vec::<String>::new()),
                IngressResource::new("ready", ["ready"], ["10.0.0.1"]),
            ],
            "",
        );

        let text = render(&mapping);

        assert!(!text.contains("pending"));
        assert!(text.contains("ready\tIN\tA\t10.0.0.1"));
    }

    #[test]
    fn test_render_never_emits_origin_hosts() {
        let mapping = aggregate(
            &[IngressResource::new("apex", ["example.com"], ["10.0.0.1"])],
            "example.com",
        );

        assert_eq!(render(&mapping), "; vim: set ft=bindzone :\n\n");
    }

    #[test]
    fn test_render_is_idempotent() {
        let resources = vec![
            IngressResource::new("x", ["x.example.com", "y.example.com"], ["10.0.0.3", "10.0.0.1"]),
            IngressResource::new("y", ["y.example.com"], ["2001:db8::5"]),
        ];

        let first = render(&aggregate(&resources, "example.com"));
        let second = render(&aggregate(&resources, "example.com"));

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_record_type() {
        assert_eq!(record_type("10.0.0.1"), "A");
        assert_eq!(record_type("::1"), "AAAA");
        assert_eq!(record_type("not-an-ip"), "A");
    }

    #[tokio::test]
    async fn test_write_creates_file_and_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("zones").join("k8s.zone");

        write("; test\n", &path).await.expect("write succeeds");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "; test\n");
    }

    #[tokio::test]
    async fn test_write_truncates_previous_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("k8s.zone");

        write("a much longer first version of the zone\n", &path)
            .await
            .expect("first write");
        write("short\n", &path).await.expect("second write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "short\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_write_sets_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("k8s.zone");

        write("x\n", &path).await.expect("write");

        let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
        // umask can only clear bits
        assert_eq!(mode & 0o777 & !0o640, 0);
    }

    #[tokio::test]
    async fn test_write_to_directory_fails() {
        let dir = tempfile::tempdir().expect("tempdir");

        let err = write("x\n", dir.path()).await.expect_err("directory is not a file");

        assert!(matches!(err, ZoneWriteError::Open { .. }));
    }
}
