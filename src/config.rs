//! Run configuration and parameter validation.
//!
//! `RunConfig` is the immutable record of all provisioning parameters,
//! created once from CLI input at process start and never mutated. Every
//! format rule is enforced here, before any side effect occurs.

use crate::cli::UpArgs;
use crate::error::{Error, Result};

/// Inclusive bounds on the downstream-cluster count.
pub const DSC_COUNT_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Immutable record of all provisioning parameters.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// cert-manager chart version.
    pub cert_manager_version: String,
    /// Contact email for ACME certificate issuance.
    pub email: String,
    /// Administrative username for the Rancher local auth provider.
    pub admin_username: String,
    /// Administrative (bootstrap) password.
    pub admin_password: String,
    /// Base DNS domain of the demo environment.
    pub domain: String,
    /// Rancher version.
    pub rancher_version: String,
    /// Rancher hostname.
    pub rancher_hostname: String,
    /// Object-storage access key.
    pub s3_access_key: String,
    /// Object-storage secret key.
    pub s3_secret_key: String,
    /// Object-storage region.
    pub s3_region: String,
    /// Object-storage bucket.
    pub s3_bucket: String,
    /// Object-storage endpoint.
    pub s3_endpoint: String,
    /// Image registry hostname.
    pub registry_hostname: String,
    /// Cloud access key.
    pub aws_access_key: String,
    /// Cloud secret key.
    pub aws_secret_key: String,
    /// Cloud region.
    pub aws_region: String,
    /// Number of downstream clusters to create and import.
    pub dsc_count: u8,
    /// Step ordinal to start from.
    pub starting_step: usize,
}

impl RunConfig {
    /// Build a validated configuration from parsed CLI arguments.
    ///
    /// Fails with an `InvalidArgument` error naming the offending field;
    /// no network call or external action happens before this passes.
    pub fn from_args(args: UpArgs) -> Result<Self> {
        let cfg = Self {
            cert_manager_version: args.cert_manager_version,
            email: args.email,
            admin_username: args.admin_username,
            admin_password: args.admin_password,
            domain: args.domain,
            rancher_version: args.rancher_version,
            rancher_hostname: args.rancher_hostname,
            s3_access_key: args.s3_access_key,
            s3_secret_key: args.s3_secret_key,
            s3_region: args.s3_region,
            s3_bucket: args.s3_bucket,
            s3_endpoint: args.s3_endpoint,
            registry_hostname: args.registry_hostname,
            aws_access_key: args.aws_access_key,
            aws_secret_key: args.aws_secret_key,
            aws_region: args.aws_region,
            dsc_count: args.dsc_count,
            starting_step: args.starting_step,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate every field's presence and format.
    fn validate(&self) -> Result<()> {
        if !DSC_COUNT_RANGE.contains(&self.dsc_count) {
            return Err(Error::invalid_arg(format!(
                "--dsc-count must be between {} and {}, got {}",
                DSC_COUNT_RANGE.start(),
                DSC_COUNT_RANGE.end(),
                self.dsc_count
            )));
        }

        for (flag, value) in [
            ("--admin-username", &self.admin_username),
            ("--admin-password", &self.admin_password),
            ("--s3-access-key", &self.s3_access_key),
            ("--s3-secret-key", &self.s3_secret_key),
            ("--s3-bucket", &self.s3_bucket),
            ("--aws-access-key", &self.aws_access_key),
            ("--aws-secret-key", &self.aws_secret_key),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_arg(format!("{flag} must not be empty")));
            }
        }

        for (flag, value) in [
            ("--cert-manager-version", &self.cert_manager_version),
            ("--rancher-version", &self.rancher_version),
        ] {
            if !is_version_tag(value) {
                return Err(Error::invalid_arg(format!(
                    "{flag} must match vMAJOR.MINOR.PATCH, got '{value}'"
                )));
            }
        }

        for (flag, value) in
            [("--s3-region", &self.s3_region), ("--aws-region", &self.aws_region)]
        {
            if !is_cloud_region(value) {
                return Err(Error::invalid_arg(format!(
                    "{flag} must look like a cloud region (e.g. eu-central-1), got '{value}'"
                )));
            }
        }

        for (flag, value) in [
            ("--domain", &self.domain),
            ("--rancher-hostname", &self.rancher_hostname),
            ("--s3-endpoint", &self.s3_endpoint),
            ("--registry-hostname", &self.registry_hostname),
        ] {
            if !is_bare_hostname(value) {
                return Err(Error::invalid_arg(format!(
                    "{flag} must be a bare hostname without scheme or path, got '{value}'"
                )));
            }
        }

        if !is_email(&self.email) {
            return Err(Error::invalid_arg(format!(
                "--email must be a valid address, got '{}'",
                self.email
            )));
        }

        Ok(())
    }
}

/// Check `vMAJOR.MINOR.PATCH` with purely numeric components.
fn is_version_tag(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('v') else {
        return false;
    };
    let parts: Vec<&str> = rest.split('.').collect();
    parts.len() == 3
        && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Check a cloud-region pattern: lowercase segments joined by dashes, ending
/// in a digit (e.g. `eu-central-1`, `ap-southeast-2`).
fn is_cloud_region(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() < 3 {
        return false;
    }
    let Some((last, rest)) = parts.split_last() else {
        return false;
    };
    rest.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_lowercase()))
        && !last.is_empty()
        && last.chars().all(|c| c.is_ascii_digit())
}

/// Check that a value is a bare hostname: non-empty, no scheme, no path,
/// no whitespace. Anything that parses as an absolute URL is rejected.
fn is_bare_hostname(s: &str) -> bool {
    if s.is_empty() || s.contains('/') || s.contains(char::is_whitespace) {
        return false;
    }
    // `url` only accepts absolute URLs; a bare hostname fails to parse.
    url::Url::parse(s).is_err()
}

/// Minimal email shape check: one `@` with non-empty local part and a domain
/// containing a dot.
fn is_email(s: &str) -> bool {
    let mut parts = s.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && domain.contains('.') && is_bare_hostname(domain)
        },
        _ => false,
    }
}
