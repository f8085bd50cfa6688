//! The `up` command: the full provisioning run.
//!
//! Registers the ordered step sequence and executes it from the configured
//! starting ordinal. Steps 1-8 install platform components onto the
//! management cluster; step 9 creates and imports the downstream clusters
//! and prints their import commands as the run's terminal artifact.

use futures::FutureExt;
use tracing::info;

use super::clusters::{ProvisionOutcome, provision_clusters};
use super::helm::{
    ensure_helm, ensure_namespace, ensure_secret, helm_repo_ensure, helm_upgrade_install,
    kubectl_apply_stdin, kubectl_apply_url, wait_for_deployment,
};
use super::steps::{Step, run_steps};
use crate::client::RancherClient;
use crate::config::RunConfig;
use crate::error::Result;

const JETSTACK_REPO_URL: &str = "https://charts.jetstack.io";
const RANCHER_REPO_URL: &str = "https://releases.rancher.com/server-charts/latest";
const RANCHER_CHARTS_REPO_URL: &str = "https://charts.rancher.io";
const HARBOR_REPO_URL: &str = "https://helm.goharbor.io";

const RANCHER_NAMESPACE: &str = "cattle-system";
const BACKUP_NAMESPACE: &str = "cattle-resources-system";
const CIS_NAMESPACE: &str = "cis-operator-system";
const REGISTRY_NAMESPACE: &str = "harbor";

/// Run the provisioning sequence described by the configuration.
pub async fn up(cfg: &RunConfig) -> Result<()> {
    let client = RancherClient::new(cfg)?;
    let steps = build_steps(cfg, &client);
    run_steps(steps, cfg.starting_step).await
}

/// Register the ordered provisioning steps.
///
/// Ordinals are positional; `--starting-step N` resumes at ordinal N.
fn build_steps<'a>(cfg: &'a RunConfig, client: &'a RancherClient) -> Vec<Step<'a>> {
    vec![
        Step::new("install-helm", move || async move { ensure_helm() }.boxed_local()),
        Step::new("cert-manager", move || {
            async move {
                helm_repo_ensure("jetstack", JETSTACK_REPO_URL)?;
                kubectl_apply_url(
                    "applying cert-manager CRDs",
                    &format!(
                        "https://github.com/cert-manager/cert-manager/releases/download/{}/cert-manager.crds.yaml",
                        cfg.cert_manager_version
                    ),
                )?;
                helm_upgrade_install(
                    "cert-manager",
                    "jetstack/cert-manager",
                    "cert-manager",
                    Some(cfg.cert_manager_version.as_str()),
                    &[],
                )
            }
            .boxed_local()
        }),
        Step::new("cluster-issuer", move || {
            async move {
                kubectl_apply_stdin("applying ClusterIssuer", &cluster_issuer_manifest(&cfg.email))
            }
            .boxed_local()
        }),
        Step::new("rancher", move || {
            async move {
                helm_repo_ensure("rancher-latest", RANCHER_REPO_URL)?;
                helm_upgrade_install(
                    "rancher",
                    "rancher-latest/rancher",
                    RANCHER_NAMESPACE,
                    Some(cfg.rancher_version.trim_start_matches('v')),
                    &[
                        ("hostname", &cfg.rancher_hostname),
                        ("bootstrapPassword", &cfg.admin_password),
                        ("ingress.tls.source", "letsEncrypt"),
                        ("letsEncrypt.email", &cfg.email),
                        ("letsEncrypt.ingress.class", "nginx"),
                        ("replicas", "1"),
                    ],
                )?;
                wait_for_deployment("rancher", RANCHER_NAMESPACE, "10m")
            }
            .boxed_local()
        }),
        Step::new("agent-tls-mode", move || {
            async move {
                client.acquire_token(cfg).await?;
                let current = client.get_setting("agent-tls-mode").await?;
                if current.value == "system-store" {
                    info!("agent-tls-mode already set to system-store");
                    return Ok(());
                }
                client.put_setting("agent-tls-mode", "system-store").await
            }
            .boxed_local()
        }),
        Step::new("backup-operator", move || {
            async move {
                ensure_namespace(BACKUP_NAMESPACE)?;
                ensure_secret(
                    "s3-creds",
                    BACKUP_NAMESPACE,
                    &[
                        ("accessKey", &cfg.s3_access_key),
                        ("secretKey", &cfg.s3_secret_key),
                    ],
                )?;
                helm_repo_ensure("rancher-charts", RANCHER_CHARTS_REPO_URL)?;
                helm_upgrade_install(
                    "rancher-backup-crd",
                    "rancher-charts/rancher-backup-crd",
                    BACKUP_NAMESPACE,
                    None,
                    &[],
                )?;
                helm_upgrade_install(
                    "rancher-backup",
                    "rancher-charts/rancher-backup",
                    BACKUP_NAMESPACE,
                    None,
                    &[
                        ("s3.enabled", "true"),
                        ("s3.bucketName", &cfg.s3_bucket),
                        ("s3.region", &cfg.s3_region),
                        ("s3.endpoint", &cfg.s3_endpoint),
                        ("s3.credentialSecretName", "s3-creds"),
                        ("s3.credentialSecretNamespace", BACKUP_NAMESPACE),
                    ],
                )
            }
            .boxed_local()
        }),
        Step::new("cis-benchmark", move || {
            async move {
                helm_repo_ensure("rancher-charts", RANCHER_CHARTS_REPO_URL)?;
                helm_upgrade_install(
                    "rancher-cis-benchmark-crd",
                    "rancher-charts/rancher-cis-benchmark-crd",
                    CIS_NAMESPACE,
                    None,
                    &[],
                )?;
                helm_upgrade_install(
                    "rancher-cis-benchmark",
                    "rancher-charts/rancher-cis-benchmark",
                    CIS_NAMESPACE,
                    None,
                    &[],
                )
            }
            .boxed_local()
        }),
        Step::new("registry", move || {
            async move {
                ensure_namespace(REGISTRY_NAMESPACE)?;
                ensure_secret(
                    "registry-cloud-creds",
                    REGISTRY_NAMESPACE,
                    &[
                        ("accessKey", &cfg.aws_access_key),
                        ("secretKey", &cfg.aws_secret_key),
                        ("region", &cfg.aws_region),
                    ],
                )?;
                helm_repo_ensure("harbor", HARBOR_REPO_URL)?;
                helm_upgrade_install(
                    "harbor",
                    "harbor/harbor",
                    REGISTRY_NAMESPACE,
                    None,
                    &[
                        ("externalURL", &format!("https://{}", cfg.registry_hostname)),
                        ("expose.ingress.hosts.core", &cfg.registry_hostname),
                        ("expose.ingress.annotations.cert-manager\\.io/cluster-issuer", "letsencrypt-prod"),
                        ("harborAdminPassword", &cfg.admin_password),
                    ],
                )
            }
            .boxed_local()
        }),
        Step::new("downstream-clusters", move || {
            async move {
                client.acquire_token(cfg).await?;
                let outcome = provision_clusters(client, cfg).await?;
                print_outcome(&outcome);
                Ok(())
            }
            .boxed_local()
        }),
    ]
}

/// ACME ClusterIssuer manifest for certificate issuance.
fn cluster_issuer_manifest(email: &str) -> String {
    format!(
        r"apiVersion: cert-manager.io/v1
kind: ClusterIssuer
metadata:
  name: letsencrypt-prod
spec:
  acme:
    server: https://acme-v02.api.letsencrypt.org/directory
    email: {email}
    privateKeySecretRef:
      name: letsencrypt-prod
    solvers:
      - http01:
          ingress:
            class: nginx
"
    )
}

/// Print the run's terminal artifact: one import command set per cluster,
/// plus skipped clusters and per-cluster failures.
fn print_outcome(outcome: &ProvisionOutcome) {
    println!();
    for set in &outcome.imported {
        println!("=== {} ===", set.cluster_name);
        println!("  apply:    {}", set.direct);
        println!("  insecure: {}", set.insecure);
        println!("  agent:    {}", set.node_agent);
        println!();
    }

    for name in &outcome.skipped {
        println!("{name}: already imported, nothing to do");
    }

    if !outcome.failures.is_empty() {
        println!();
        println!("Failed clusters:");
        for (name, error) in &outcome.failures {
            println!("  {name}: {error}");
        }
        println!("Re-run with '--starting-step 9' once the cause is resolved.");
    }
}
