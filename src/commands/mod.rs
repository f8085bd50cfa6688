//! Command dispatch and implementations.

pub mod clusters;
pub mod exec;
pub mod helm;
pub mod steps;
pub mod up;

use clap::CommandFactory;

use crate::cli::{Cli, Commands};
use crate::config::RunConfig;
use crate::error::Result;

/// Execute the parsed CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Up(args) => {
            let cfg = RunConfig::from_args(*args)?;
            up::up(&cfg).await
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        },
    }
}
