//! Command-line argument parsing and command definitions.
//!
//! Uses clap with derive macros for type-safe argument parsing.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// tsdemo CLI - Rancher demo environment provisioner
#[derive(Parser, Debug)]
#[command(name = "tsdemo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision the demo environment (all steps, or a resumed subsequence)
    Up(Box<UpArgs>),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parameters for a provisioning run.
///
/// Every flag is mandatory for a full run; `--starting-step` restricts the
/// executed subsequence for resumed runs. All flags can also be supplied via
/// `TSDEMO_*` environment variables.
#[derive(Args, Debug, Clone)]
pub struct UpArgs {
    /// cert-manager chart version (vMAJOR.MINOR.PATCH)
    #[arg(long, env = "TSDEMO_CERT_MANAGER_VERSION")]
    pub cert_manager_version: String,

    /// Contact email for ACME certificate issuance
    #[arg(long, env = "TSDEMO_EMAIL")]
    pub email: String,

    /// Administrative username for the Rancher local auth provider
    #[arg(long, env = "TSDEMO_ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Administrative (bootstrap) password for Rancher
    #[arg(long, env = "TSDEMO_ADMIN_PASSWORD")]
    pub admin_password: String,

    /// Base DNS domain of the demo environment (bare hostname)
    #[arg(long, env = "TSDEMO_DOMAIN")]
    pub domain: String,

    /// Rancher version (vMAJOR.MINOR.PATCH)
    #[arg(long, env = "TSDEMO_RANCHER_VERSION")]
    pub rancher_version: String,

    /// Rancher hostname (bare hostname, no scheme)
    #[arg(long, env = "TSDEMO_RANCHER_HOSTNAME")]
    pub rancher_hostname: String,

    /// Object-storage access key for the backup operator
    #[arg(long, env = "TSDEMO_S3_ACCESS_KEY")]
    pub s3_access_key: String,

    /// Object-storage secret key for the backup operator
    #[arg(long, env = "TSDEMO_S3_SECRET_KEY")]
    pub s3_secret_key: String,

    /// Object-storage region (cloud-region pattern, e.g. eu-central-1)
    #[arg(long, env = "TSDEMO_S3_REGION")]
    pub s3_region: String,

    /// Object-storage bucket for backups
    #[arg(long, env = "TSDEMO_S3_BUCKET")]
    pub s3_bucket: String,

    /// Object-storage endpoint (bare hostname, no scheme)
    #[arg(long, env = "TSDEMO_S3_ENDPOINT")]
    pub s3_endpoint: String,

    /// Image registry hostname (bare hostname, no scheme)
    #[arg(long, env = "TSDEMO_REGISTRY_HOSTNAME")]
    pub registry_hostname: String,

    /// Cloud access key (registry replication storage)
    #[arg(long, env = "TSDEMO_AWS_ACCESS_KEY")]
    pub aws_access_key: String,

    /// Cloud secret key (registry replication storage)
    #[arg(long, env = "TSDEMO_AWS_SECRET_KEY")]
    pub aws_secret_key: String,

    /// Cloud region (cloud-region pattern, e.g. us-east-1)
    #[arg(long, env = "TSDEMO_AWS_REGION")]
    pub aws_region: String,

    /// Number of downstream clusters to create and import (1-5)
    #[arg(long, env = "TSDEMO_DSC_COUNT")]
    pub dsc_count: u8,

    /// Step ordinal to start from (earlier steps are skipped entirely)
    #[arg(long, env = "TSDEMO_STARTING_STEP", default_value_t = 1)]
    pub starting_step: usize,
}
