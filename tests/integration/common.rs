//! Common test utilities.

#![allow(dead_code)]

/// A complete, format-valid set of `up` flags for tests to override.
///
/// The hostname points nowhere; tests using these must fail during
/// validation, before any network activity.
pub fn valid_up_args() -> Vec<(&'static str, &'static str)> {
    vec![
        ("--cert-manager-version", "v1.15.3"),
        ("--email", "demo@suse.com"),
        ("--admin-password", "sup3rsecret"),
        ("--domain", "demo.invalid"),
        ("--rancher-version", "v2.9.2"),
        ("--rancher-hostname", "rancher.demo.invalid"),
        ("--s3-access-key", "AKIA123"),
        ("--s3-secret-key", "secret"),
        ("--s3-region", "eu-central-1"),
        ("--s3-bucket", "tsdemo-backups"),
        ("--s3-endpoint", "s3.eu-central-1.amazonaws.com"),
        ("--registry-hostname", "registry.demo.invalid"),
        ("--aws-access-key", "AKIA456"),
        ("--aws-secret-key", "secret2"),
        ("--aws-region", "us-east-1"),
        ("--dsc-count", "2"),
    ]
}
