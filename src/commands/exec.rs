//! External command execution and diagnostics.
//!
//! Every side-effecting external call (chart installs, manifest applies,
//! CLI installs) passes through [`invoke`], giving uniform logging and a
//! uniform fatal-error shape regardless of which tool is invoked.

use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use crate::error::{Error, Result};

/// Check if a command is available in PATH.
pub fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run an external action, capturing combined output and exit status.
///
/// On non-zero status the description and captured output are logged and an
/// [`Error::ExternalAction`] is raised, which the step runner treats as
/// run-terminating. On success a short confirmation is logged and stdout is
/// returned.
pub fn invoke(description: &str, cmd: &str, args: &[&str]) -> Result<String> {
    debug!(%cmd, ?args, "running external command");

    let output = Command::new(cmd).args(args).output().map_err(|e| Error::ExternalAction {
        description: description.to_string(),
        output: format!("failed to spawn {cmd}: {e}"),
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        info!("{description}: ok");
        Ok(stdout)
    } else {
        let combined = format!("{stdout}{stderr}");
        error!("{description} failed:\n{}", combined.trim());
        Err(Error::ExternalAction {
            description: description.to_string(),
            output: combined.trim().to_string(),
        })
    }
}

/// Run a command, returning Some(stdout) on success or None on failure.
///
/// Used for existence checks where a failure is an answer, not an error.
pub fn invoke_optional(cmd: &str, args: &[&str]) -> Option<String> {
    Command::new(cmd)
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).to_string())
}

/// Run a shell pipeline, feeding `stdin_data` to its standard input.
///
/// Used for manifest applies (`kubectl apply -f -`). Stdin is written from
/// a separate thread while this one drains stdout/stderr, so a child that
/// echoes more than a pipe buffer before reading its input cannot deadlock.
pub fn invoke_with_stdin(description: &str, cmd: &str, args: &[&str], stdin_data: &str) -> Result<()> {
    use std::io::Write;

    debug!(%cmd, ?args, "running external command with stdin");

    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::ExternalAction {
            description: description.to_string(),
            output: format!("failed to spawn {cmd}: {e}"),
        })?;

    let writer = child.stdin.take().map(|mut stdin| {
        let data = stdin_data.to_string();
        std::thread::spawn(move || stdin.write_all(data.as_bytes()))
    });

    let output = child.wait_with_output().map_err(|e| Error::ExternalAction {
        description: description.to_string(),
        output: e.to_string(),
    })?;

    if let Some(writer) = writer {
        match writer.join() {
            // A broken pipe just means the child stopped reading; its exit
            // status is the authoritative outcome.
            Ok(Ok(())) | Ok(Err(_)) => {},
            Err(_) => {
                return Err(Error::ExternalAction {
                    description: description.to_string(),
                    output: "stdin writer thread panicked".to_string(),
                });
            },
        }
    }

    if output.status.success() {
        info!("{description}: ok");
        Ok(())
    } else {
        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        error!("{description} failed:\n{}", combined.trim());
        Err(Error::ExternalAction {
            description: description.to_string(),
            output: combined.trim().to_string(),
        })
    }
}
