//! Client module for Rancher management API interactions.
//!
//! Wraps `reqwest` with the endpoints the provisioning run needs: login,
//! global settings, cluster list/create, and registration-token retrieval.
//! The registration-token listing is passed through [`sanitize`] before
//! structured parsing because the upstream API has been observed to emit
//! malformed JSON there.

pub mod poll;
pub mod sanitize;

pub use poll::await_ready;
pub use sanitize::sanitize;

use std::cell::RefCell;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::config::RunConfig;
use crate::error::{Error, Result};

/// Interval between readiness probe attempts.
pub const READY_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Interval between login attempts while Rancher finishes its bootstrap.
pub const LOGIN_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Bounded login attempt budget.
pub const LOGIN_MAX_ATTEMPTS: u32 = 10;

/// Delay before the registration-token listing after cluster creation;
/// the token is observed to be absent immediately after creation.
pub const TOKEN_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Holds the bearer token for one run and its acquisition timestamp.
///
/// Owned by the client; a token is reusable for the remainder of the run
/// once acquired (no expiry check).
#[derive(Debug, Default)]
pub struct Session {
    /// Bearer token, `None` until acquired.
    pub token: Option<String>,
    /// When the token was acquired. Diagnostic only: logged when a cached
    /// token is reused, never consulted for expiry.
    pub acquired_at: Option<DateTime<Utc>>,
}

/// Login response from `/v3-public/localProviders/local?action=login`.
///
/// A `message` field indicates failure; a `token` field indicates success.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Bearer token on success.
    pub token: Option<String>,
    /// Structured error message on failure.
    pub message: Option<String>,
}

/// One entry of the `/v3/clusters` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSummary {
    /// Cluster identifier (e.g. `c-abc12`).
    pub id: String,
    /// Cluster display name.
    pub name: String,
}

/// Collection shape of the `/v3/clusters` listing.
#[derive(Debug, Deserialize)]
pub struct ClusterList {
    /// Clusters known to the management plane.
    pub data: Vec<ClusterSummary>,
}

/// One entry of the `/v3/clusterregistrationtoken` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationToken {
    /// Identifier of the cluster this token belongs to.
    #[serde(rename = "clusterId")]
    pub cluster_id: String,
    /// The registration token value. May be absent or a quoted `"null"`
    /// placeholder while the token is still being issued.
    pub token: Option<String>,
}

/// Collection shape of the registration-token listing.
#[derive(Debug, Deserialize)]
pub struct RegistrationTokenList {
    /// All registration tokens known to the management plane.
    pub data: Vec<RegistrationToken>,
}

/// A global Rancher setting (`/v3/settings/{name}`).
#[derive(Debug, Deserialize)]
pub struct Setting {
    /// Current value of the setting.
    pub value: String,
}

/// The subset of the management API the cluster provisioner depends on.
///
/// Implemented by [`RancherClient`]; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)] // single-threaded CLI, futures need not be Send
pub trait ManagementApi {
    /// List all clusters.
    async fn list_clusters(&self) -> Result<ClusterList>;
    /// Create an imported cluster, returning its identifier.
    async fn create_cluster(&self, name: &str) -> Result<String>;
    /// List registration tokens (response sanitized before parsing).
    async fn list_registration_tokens(&self) -> Result<RegistrationTokenList>;
}

/// HTTP client for the Rancher management API.
pub struct RancherClient {
    http: reqwest::Client,
    base_url: String,
    session: RefCell<Session>,
}

impl RancherClient {
    /// Create a client for `https://{rancher_hostname}`.
    ///
    /// Certificate verification is disabled: the demo Rancher serves a
    /// self-signed certificate until cert-manager issues one.
    pub fn new(cfg: &RunConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("https://{}", cfg.rancher_hostname),
            session: RefCell::new(Session::default()),
        })
    }

    /// Base URL of the management API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn session(&self) -> &RefCell<Session> {
        &self.session
    }

    /// Probe whether the management API answers HTTP requests at all.
    ///
    /// Transport errors and non-success statuses are treated identically:
    /// both mean "not ready yet".
    pub async fn is_reachable(&self) -> bool {
        match self.http.get(&self.base_url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, "management API not reachable");
                false
            },
        }
    }

    /// Attempt a single login exchange.
    ///
    /// Returns `Ok(Some(token))` on success, `Ok(None)` when the response
    /// carries a structured error message (Rancher still bootstrapping).
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<String>> {
        let url = format!("{}/v3-public/localProviders/local?action=login", self.base_url);
        let body = serde_json::json!({ "username": username, "password": password });

        let resp: LoginResponse = self.http.post(&url).json(&body).send().await?.json().await?;

        if let Some(message) = resp.message {
            debug!(%message, "login rejected");
            return Ok(None);
        }
        Ok(resp.token)
    }

    fn bearer(&self) -> Result<String> {
        self.session
            .borrow()
            .token
            .clone()
            .ok_or_else(|| Error::other("no session token acquired for this run"))
    }

    /// Read a global setting.
    pub async fn get_setting(&self, name: &str) -> Result<Setting> {
        let url = format!("{}/v3/settings/{name}", self.base_url);
        let resp = self.http.get(&url).bearer_auth(self.bearer()?).send().await?;
        let raw = resp.text().await?;
        serde_json::from_str(&raw)
            .map_err(|_| Error::ApiContract { endpoint: "/v3/settings", body: raw })
    }

    /// Write a global setting.
    pub async fn put_setting(&self, name: &str, value: &str) -> Result<()> {
        let url = format!("{}/v3/settings/{name}", self.base_url);
        let body = serde_json::json!({ "value": value });
        let resp =
            self.http.put(&url).bearer_auth(self.bearer()?).json(&body).send().await?;
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::ApiContract { endpoint: "/v3/settings", body });
        }
        Ok(())
    }
}

impl ManagementApi for RancherClient {
    async fn list_clusters(&self) -> Result<ClusterList> {
        let url = format!("{}/v3/clusters", self.base_url);
        let raw = self.http.get(&url).bearer_auth(self.bearer()?).send().await?.text().await?;
        // Presence of the top-level `data` field signals a structurally
        // valid listing; anything else is a contract violation.
        serde_json::from_str(&raw)
            .map_err(|_| Error::ApiContract { endpoint: "/v3/clusters", body: raw })
    }

    async fn create_cluster(&self, name: &str) -> Result<String> {
        let url = format!("{}/v3/clusters", self.base_url);
        let body = serde_json::json!({ "type": "cluster", "name": name });
        let raw = self
            .http
            .post(&url)
            .bearer_auth(self.bearer()?)
            .json(&body)
            .send()
            .await?
            .text()
            .await?;

        #[derive(Deserialize)]
        struct Created {
            id: Option<String>,
        }
        let created: Created = serde_json::from_str(&raw)
            .map_err(|_| Error::ApiContract { endpoint: "/v3/clusters", body: raw })?;

        created.id.ok_or_else(|| Error::ClusterCreateFailed(name.to_string()))
    }

    async fn list_registration_tokens(&self) -> Result<RegistrationTokenList> {
        let url = format!("{}/v3/clusterregistrationtoken", self.base_url);
        let raw = self.http.get(&url).bearer_auth(self.bearer()?).send().await?.text().await?;

        // The raw body is cleaned up line-wise before parsing; see `sanitize`
        // for the observed malformations this repairs.
        let cleaned = sanitize(&raw);
        serde_json::from_str(&cleaned).map_err(|_| Error::ApiContract {
            endpoint: "/v3/clusterregistrationtoken",
            body: raw,
        })
    }
}
