//! tsdemo CLI Library
//!
//! This crate provisions a multi-cluster Rancher demonstration environment:
//! it installs platform components (certificate issuance, backup, CIS
//! benchmarking, image registry) onto a management cluster, then creates and
//! imports a configurable number of downstream clusters via the Rancher
//! management API.
//!
//! ## Usage
//!
//! ```bash
//! tsdemo up --rancher-hostname rancher.demo.example.com ...  # Full run
//! tsdemo up --starting-step 9 ...                            # Resume at a step
//! ```
//!
//! Runs are resumable: `--starting-step N` skips every step with a lower
//! ordinal, and the cluster provisioning step is re-entrant via
//! already-exists checks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{Error, Result};

/// CLI version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the CLI with the given arguments.
///
/// This is the main entry point for the CLI, parsing arguments and
/// dispatching to the appropriate command handler.
pub async fn run(args: Vec<String>) -> Result<()> {
    use clap::Parser;

    // Parse CLI arguments
    let cli_args = match Cli::try_parse_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            // Print clap error (includes help/version)
            e.print().ok();
            // Exit successfully for help/version, otherwise return error
            use clap::error::ErrorKind;
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => return Ok(()),
                _ => return Err(Error::other("")),
            }
        },
    };

    init_logging(cli_args.debug);

    // Execute command
    commands::execute(cli_args).await
}

/// Initialize tracing/logging.
///
/// Step markers and per-attempt poll lines are emitted as tracing events, so
/// logging is always on; `--debug` raises the default level.
fn init_logging(debug: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = if debug { "tsdemo_cli=debug" } else { "tsdemo_cli=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
