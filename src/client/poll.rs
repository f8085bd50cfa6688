//! Readiness polling and session authentication.
//!
//! Two layered retry loops guard every authenticated call: an unbounded
//! liveness probe (the management API answering HTTP at all is a hard
//! precondition for everything that follows), and a bounded login loop on
//! top of it, because Rancher keeps answering HTTP 200 on its root path for
//! a while before logins start succeeding.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::{LOGIN_MAX_ATTEMPTS, LOGIN_RETRY_INTERVAL, READY_POLL_INTERVAL, RancherClient};
use crate::config::RunConfig;
use crate::error::{Error, Result};

/// Block the current task until `probe` returns `true`, sleeping `interval`
/// between failed attempts. Retries indefinitely.
pub async fn await_ready<F, Fut>(mut probe: F, interval: Duration)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut attempt: u64 = 1;
    loop {
        if probe().await {
            debug!(attempt, "probe succeeded");
            return;
        }
        info!(attempt, "not ready yet, retrying in {}s", interval.as_secs());
        tokio::time::sleep(interval).await;
        attempt += 1;
    }
}

impl RancherClient {
    /// Exchange credentials for a bearer token, caching it for the run.
    ///
    /// A cached token is returned unchanged without re-validation. Otherwise
    /// the base URL is polled until it answers, then the login exchange is
    /// attempted up to [`LOGIN_MAX_ATTEMPTS`] times with a fixed interval
    /// between attempts.
    pub async fn acquire_token(&self, cfg: &RunConfig) -> Result<String> {
        self.acquire_token_via(
            || self.is_reachable(),
            || self.login(&cfg.admin_username, &cfg.admin_password),
        )
        .await
    }

    /// Token acquisition with the probe and login exchange injected, so the
    /// cache and retry behavior can be exercised without a live endpoint.
    async fn acquire_token_via<P, PF, L, LF>(&self, probe: P, mut exchange: L) -> Result<String>
    where
        P: FnMut() -> PF,
        PF: Future<Output = bool>,
        L: FnMut() -> LF,
        LF: Future<Output = Result<Option<String>>>,
    {
        {
            let session = self.session().borrow();
            if let Some(token) = session.token.clone() {
                debug!(
                    acquired_at = ?session.acquired_at,
                    "reusing session token acquired earlier in this run"
                );
                return Ok(token);
            }
        }

        info!("waiting for {} to answer HTTP requests", self.base_url());
        await_ready(probe, READY_POLL_INTERVAL).await;

        for attempt in 1..=LOGIN_MAX_ATTEMPTS {
            match exchange().await {
                Ok(Some(token)) => {
                    info!(attempt, "logged in to the management API");
                    let mut session = self.session().borrow_mut();
                    session.token = Some(token.clone());
                    session.acquired_at = Some(Utc::now());
                    return Ok(token);
                },
                Ok(None) => {
                    info!(attempt, "login rejected, Rancher may still be bootstrapping");
                },
                Err(e) => {
                    warn!(attempt, error = %e, "login attempt failed");
                },
            }
            if attempt < LOGIN_MAX_ATTEMPTS {
                tokio::time::sleep(LOGIN_RETRY_INTERVAL).await;
            }
        }

        Err(Error::AuthExhausted { attempts: LOGIN_MAX_ATTEMPTS })
    }
}
