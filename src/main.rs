//! tsdemo CLI
//!
//! Command-line interface for provisioning the Rancher demo environment.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match tsdemo_cli::run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Don't print if it's an empty error (e.g., from clap --help)
            let msg = e.to_string();
            if !msg.is_empty() {
                eprintln!("Error: {}", e);

                // Show hint if relevant
                if e.should_suggest_usage() {
                    eprintln!();
                    eprintln!("Run 'tsdemo up --help' for parameter formats.");
                }
            }

            // Return appropriate exit code
            let code = e.exit_code();
            ExitCode::from(code as u8)
        },
    }
}
