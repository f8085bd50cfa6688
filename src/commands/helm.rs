//! Helm and kubectl collaborator wrappers.
//!
//! The orchestration core treats chart and manifest deployment as opaque
//! pass/fail actions; these helpers only assemble arguments and route the
//! call through the command executor.

use tracing::info;

use super::exec::{command_exists, invoke, invoke_optional, invoke_with_stdin};
use crate::error::Result;

/// URL of the official helm install script.
const HELM_INSTALL_SCRIPT: &str =
    "https://raw.githubusercontent.com/helm/helm/main/scripts/get-helm-3";

/// Ensure the helm binary is present, installing it when missing.
pub fn ensure_helm() -> Result<()> {
    if command_exists("helm") {
        info!("helm already installed, skipping");
        return Ok(());
    }
    invoke(
        "installing helm",
        "sh",
        &["-c", &format!("curl -sfL {HELM_INSTALL_SCRIPT} | bash")],
    )?;
    Ok(())
}

/// Check if a Helm repo exists.
pub fn helm_repo_exists(name: &str) -> bool {
    invoke_optional("helm", &["repo", "list", "-o", "json"]).is_some_and(|output| {
        output.contains(&format!("\"{name}\"")) || output.contains(&format!("\"name\":\"{name}\""))
    })
}

/// Add a Helm repository if it isn't configured yet, then refresh indexes.
pub fn helm_repo_ensure(name: &str, url: &str) -> Result<()> {
    if !helm_repo_exists(name) {
        invoke(&format!("adding helm repo {name}"), "helm", &["repo", "add", name, url])?;
    }
    invoke("updating helm repos", "helm", &["repo", "update"])?;
    Ok(())
}

/// Install or upgrade a chart into a namespace with `--set` overrides.
pub fn helm_upgrade_install(
    release: &str,
    chart: &str,
    namespace: &str,
    version: Option<&str>,
    sets: &[(&str, &str)],
) -> Result<()> {
    let mut args: Vec<String> = vec![
        "upgrade".into(),
        "--install".into(),
        release.into(),
        chart.into(),
        "--namespace".into(),
        namespace.into(),
        "--create-namespace".into(),
        "--wait".into(),
    ];
    if let Some(version) = version {
        args.push("--version".into());
        args.push(version.into());
    }
    for (key, value) in sets {
        args.push("--set".into());
        args.push(format!("{key}={value}"));
    }

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    invoke(&format!("deploying chart {chart} as {release}"), "helm", &arg_refs)?;
    Ok(())
}

/// Apply a manifest from a URL.
pub fn kubectl_apply_url(description: &str, url: &str) -> Result<()> {
    invoke(description, "kubectl", &["apply", "-f", url])?;
    Ok(())
}

/// Apply an inline manifest via stdin.
pub fn kubectl_apply_stdin(description: &str, yaml: &str) -> Result<()> {
    invoke_with_stdin(description, "kubectl", &["apply", "-f", "-"], yaml)
}

/// Create a namespace if it doesn't exist.
pub fn ensure_namespace(namespace: &str) -> Result<()> {
    if invoke_optional("kubectl", &["get", "namespace", namespace]).is_some() {
        return Ok(());
    }
    invoke(
        &format!("creating namespace {namespace}"),
        "kubectl",
        &["create", "namespace", namespace],
    )?;
    Ok(())
}

/// Create a generic secret from literal key/value pairs, replacing any
/// previous version so re-runs converge on the configured values.
pub fn ensure_secret(name: &str, namespace: &str, literals: &[(&str, &str)]) -> Result<()> {
    if invoke_optional("kubectl", &["get", "secret", name, "-n", namespace]).is_some() {
        invoke(
            &format!("removing stale secret {name}"),
            "kubectl",
            &["delete", "secret", name, "-n", namespace],
        )?;
    }

    let mut args: Vec<String> =
        vec!["create".into(), "secret".into(), "generic".into(), name.into()];
    args.push("-n".into());
    args.push(namespace.into());
    for (key, value) in literals {
        args.push(format!("--from-literal={key}={value}"));
    }

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    invoke(&format!("creating secret {name}"), "kubectl", &arg_refs)?;
    Ok(())
}

/// Wait for a deployment rollout to complete.
pub fn wait_for_deployment(name: &str, namespace: &str, timeout: &str) -> Result<()> {
    invoke(
        &format!("waiting for deployment {name} in {namespace}"),
        "kubectl",
        &[
            "rollout",
            "status",
            &format!("deployment/{name}"),
            "-n",
            namespace,
            "--timeout",
            timeout,
        ],
    )?;
    Ok(())
}
