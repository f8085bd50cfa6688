//! Downstream cluster provisioning.
//!
//! For each requested cluster index: existence check, creation,
//! registration-token retrieval, import-command synthesis. The whole
//! operation is re-entrant: clusters that already exist are skipped, so a
//! resumed run converges instead of failing.
//!
//! Error policy: one cluster's provisioning failure does not abort the loop
//! over other indices; failures are collected and reported in the final
//! summary. Only a structurally invalid cluster listing is fatal, since it
//! means every subsequent index would fail the same way.

use tracing::{info, warn};

use crate::client::{ManagementApi, TOKEN_SETTLE_DELAY};
use crate::config::RunConfig;
use crate::error::{Error, Result};

/// Prefix from which deterministic downstream cluster names are derived.
pub const CLUSTER_NAME_PREFIX: &str = "ts-suse-demo-dsc";

/// Deterministic, zero-padded name for a downstream cluster index.
pub fn cluster_name(index: u8) -> String {
    format!("{CLUSTER_NAME_PREFIX}-{index:02}")
}

/// Three equivalent representations of the import action for one cluster.
///
/// Produced once per cluster and returned to the operator as the terminal
/// artifact of the run.
#[derive(Debug, Clone)]
pub struct ImportCommandSet {
    /// Name of the downstream cluster these commands import.
    pub cluster_name: String,
    /// Direct manifest apply.
    pub direct: String,
    /// Insecure-TLS fetch piped into an apply.
    pub insecure: String,
    /// Privileged node-agent join command.
    pub node_agent: String,
}

impl ImportCommandSet {
    /// Synthesize the three command variants from a cluster identifier and
    /// its registration token.
    pub fn synthesize(name: &str, cluster_id: &str, token: &str, cfg: &RunConfig) -> Self {
        let host = &cfg.rancher_hostname;
        let manifest = format!("https://{host}/v3/import/{token}_{cluster_id}.yaml");

        Self {
            cluster_name: name.to_string(),
            direct: format!("kubectl apply -f {manifest}"),
            insecure: format!("curl --insecure -sfL {manifest} | kubectl apply -f -"),
            node_agent: format!(
                "sudo docker run -d --privileged --restart=unless-stopped --net=host \
                 -v /etc/kubernetes:/etc/kubernetes -v /var/run:/var/run \
                 rancher/rancher-agent:{version} --server https://{host} --token {token}",
                version = cfg.rancher_version
            ),
        }
    }
}

/// Result of a provisioning pass over all requested indices.
#[derive(Debug, Default)]
pub struct ProvisionOutcome {
    /// Import command sets for clusters created in this pass, in ascending
    /// index order.
    pub imported: Vec<ImportCommandSet>,
    /// Clusters skipped because they already existed.
    pub skipped: Vec<String>,
    /// Per-cluster failures, reported in the final summary.
    pub failures: Vec<(String, Error)>,
}

/// Provision every requested downstream cluster, in ascending index order.
///
/// Clusters that already exist are skipped (logged, not an error). A
/// structurally invalid cluster listing aborts the pass; any other
/// per-cluster failure is recorded and the loop continues.
pub async fn provision_clusters<A: ManagementApi>(
    api: &A,
    cfg: &RunConfig,
) -> Result<ProvisionOutcome> {
    let mut outcome = ProvisionOutcome::default();

    for index in 1..=cfg.dsc_count {
        let name = cluster_name(index);

        let clusters = api.list_clusters().await?;
        if clusters.data.iter().any(|c| c.name == name) {
            info!(cluster = %name, "already present, skipping creation");
            outcome.skipped.push(name);
            continue;
        }

        match provision_one(api, cfg, &name).await {
            Ok(set) => outcome.imported.push(set),
            Err(e) => {
                warn!(cluster = %name, error = %e, "provisioning failed, continuing");
                outcome.failures.push((name, e));
            },
        }
    }

    Ok(outcome)
}

async fn provision_one<A: ManagementApi>(
    api: &A,
    cfg: &RunConfig,
    name: &str,
) -> Result<ImportCommandSet> {
    let cluster_id = api.create_cluster(name).await?;
    info!(cluster = %name, id = %cluster_id, "created");

    // The registration token is eventually consistent; it is observed to be
    // absent immediately after creation.
    tokio::time::sleep(TOKEN_SETTLE_DELAY).await;

    let tokens = api.list_registration_tokens().await?;
    let token = tokens
        .data
        .iter()
        .find(|t| t.cluster_id == cluster_id)
        .and_then(|t| t.token.clone())
        .filter(|t| !t.is_empty() && t != "null")
        .ok_or_else(|| Error::TokenRetrievalFailed(name.to_string()))?;

    Ok(ImportCommandSet::synthesize(name, &cluster_id, &token, cfg))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests can use unwrap for cleaner assertions

    use std::cell::RefCell;

    use super::*;
    use crate::cli::UpArgs;
    use crate::client::{ClusterList, ClusterSummary, RegistrationToken, RegistrationTokenList};

    fn test_config(dsc_count: u8) -> RunConfig {
        RunConfig::from_args(UpArgs {
            cert_manager_version: "v1.15.3".into(),
            email: "demo@suse.com".into(),
            admin_username: "admin".into(),
            admin_password: "sup3rsecret".into(),
            domain: "demo.example.com".into(),
            rancher_version: "v2.9.2".into(),
            rancher_hostname: "rancher.demo.example.com".into(),
            s3_access_key: "AKIA123".into(),
            s3_secret_key: "secret".into(),
            s3_region: "eu-central-1".into(),
            s3_bucket: "tsdemo-backups".into(),
            s3_endpoint: "s3.eu-central-1.amazonaws.com".into(),
            registry_hostname: "registry.demo.example.com".into(),
            aws_access_key: "AKIA456".into(),
            aws_secret_key: "secret2".into(),
            aws_region: "us-east-1".into(),
            dsc_count,
            starting_step: 1,
        })
        .unwrap()
    }

    /// In-memory management API double.
    struct FakeApi {
        clusters: RefCell<Vec<ClusterSummary>>,
        create_calls: RefCell<Vec<String>>,
        /// Token issued per created cluster; `None` simulates a withheld token.
        issue_tokens: bool,
    }

    impl FakeApi {
        fn new(existing: &[(&str, &str)]) -> Self {
            Self {
                clusters: RefCell::new(
                    existing
                        .iter()
                        .map(|(id, name)| ClusterSummary {
                            id: (*id).to_string(),
                            name: (*name).to_string(),
                        })
                        .collect(),
                ),
                create_calls: RefCell::new(Vec::new()),
                issue_tokens: true,
            }
        }
    }

    impl ManagementApi for FakeApi {
        async fn list_clusters(&self) -> crate::error::Result<ClusterList> {
            Ok(ClusterList { data: self.clusters.borrow().clone() })
        }

        async fn create_cluster(&self, name: &str) -> crate::error::Result<String> {
            let id = format!("c-{:05}", self.create_calls.borrow().len() + 1);
            self.create_calls.borrow_mut().push(name.to_string());
            self.clusters
                .borrow_mut()
                .push(ClusterSummary { id: id.clone(), name: name.to_string() });
            Ok(id)
        }

        async fn list_registration_tokens(&self) -> crate::error::Result<RegistrationTokenList> {
            let data = self
                .clusters
                .borrow()
                .iter()
                .map(|c| RegistrationToken {
                    cluster_id: c.id.clone(),
                    token: if self.issue_tokens {
                        Some(format!("token-for-{}", c.id))
                    } else {
                        Some("null".to_string())
                    },
                })
                .collect();
            Ok(RegistrationTokenList { data })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_existing_cluster_is_skipped() {
        let api = FakeApi::new(&[("c-exist", "ts-suse-demo-dsc-01")]);
        let cfg = test_config(1);

        let outcome = provision_clusters(&api, &cfg).await.unwrap();

        assert!(api.create_calls.borrow().is_empty());
        assert!(outcome.imported.is_empty());
        assert_eq!(outcome.skipped, vec!["ts-suse-demo-dsc-01"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_clusters_from_empty_list() {
        let api = FakeApi::new(&[]);
        let cfg = test_config(2);

        let outcome = provision_clusters(&api, &cfg).await.unwrap();

        assert_eq!(
            *api.create_calls.borrow(),
            vec!["ts-suse-demo-dsc-01", "ts-suse-demo-dsc-02"]
        );
        assert_eq!(outcome.imported.len(), 2);
        assert!(outcome.failures.is_empty());

        for (set, id) in outcome.imported.iter().zip(["c-00001", "c-00002"]) {
            let token = format!("token-for-{id}");
            assert!(set.direct.contains(&token));
            assert!(set.insecure.contains(&token));
            assert!(set.node_agent.contains(&token));
            // Three distinct non-empty command strings.
            assert!(!set.direct.is_empty());
            assert_ne!(set.direct, set.insecure);
            assert_ne!(set.insecure, set.node_agent);
        }
        assert_eq!(outcome.imported[0].cluster_name, "ts-suse-demo-dsc-01");
        assert_eq!(outcome.imported[1].cluster_name, "ts-suse-demo-dsc-02");
    }

    #[tokio::test(start_paused = true)]
    async fn test_placeholder_token_is_a_per_cluster_failure() {
        let mut api = FakeApi::new(&[]);
        api.issue_tokens = false;
        let cfg = test_config(2);

        let outcome = provision_clusters(&api, &cfg).await.unwrap();

        // Both indices are attempted; neither aborts the loop.
        assert_eq!(api.create_calls.borrow().len(), 2);
        assert!(outcome.imported.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert!(matches!(outcome.failures[0].1, Error::TokenRetrievalFailed(_)));
    }

    #[test]
    fn test_cluster_name_is_zero_padded() {
        assert_eq!(cluster_name(1), "ts-suse-demo-dsc-01");
        assert_eq!(cluster_name(5), "ts-suse-demo-dsc-05");
    }

    #[test]
    fn test_import_commands_reference_manifest_url() {
        let cfg = test_config(1);
        let set = ImportCommandSet::synthesize("ts-suse-demo-dsc-01", "c-abc12", "tok123", &cfg);
        let manifest = "https://rancher.demo.example.com/v3/import/tok123_c-abc12.yaml";
        assert!(set.direct.contains(manifest));
        assert!(set.insecure.contains(manifest));
        assert!(set.node_agent.contains("--token tok123"));
        assert!(set.node_agent.contains("rancher/rancher-agent:v2.9.2"));
    }
}
