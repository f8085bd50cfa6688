//! Step registry and runner.
//!
//! Provisioning work is an ordered sequence of named steps. The runner
//! executes every step at or after a given starting ordinal, in ascending
//! order, and terminates the whole run on the first failure. There is no
//! retry at this layer; actions that need one (readiness polling, login)
//! carry their own. Resumability comes purely from skipping earlier
//! ordinals, not from persisted completion markers.

use futures::future::LocalBoxFuture;
use tracing::{error, info};

use crate::error::Result;

/// One ordinally-positioned unit of provisioning work.
///
/// The ordinal is the step's 1-based position in the registered sequence.
/// Actions have exclusively side effects; they may read the run
/// configuration and session but never mutate the configuration.
pub struct Step<'a> {
    /// Human-readable step name.
    pub name: &'static str,
    /// The step's action, produced fresh on each invocation.
    pub action: Box<dyn FnMut() -> LocalBoxFuture<'a, Result<()>> + 'a>,
}

impl<'a> Step<'a> {
    /// Create a named step from an action factory.
    pub fn new<F>(name: &'static str, action: F) -> Self
    where
        F: FnMut() -> LocalBoxFuture<'a, Result<()>> + 'a,
    {
        Self { name, action: Box::new(action) }
    }
}

/// Execute every step whose ordinal is at or after `starting_step`.
///
/// Steps with a lower ordinal are skipped entirely; their side effects are
/// assumed absent from the environment or already applied. A
/// `starting_step` beyond the last ordinal is a valid no-op run. The first
/// action failure aborts the run immediately, with no continuation and no
/// rollback of prior steps.
pub async fn run_steps(mut steps: Vec<Step<'_>>, starting_step: usize) -> Result<()> {
    let total = steps.len();

    for (ordinal, step) in steps.iter_mut().enumerate().map(|(i, s)| (i + 1, s)) {
        if ordinal < starting_step {
            info!("step {ordinal}/{total}: {} (skipped)", step.name);
            continue;
        }

        info!("step {ordinal}/{total}: {}", step.name);
        match (step.action)().await {
            Ok(()) => info!("step {ordinal}/{total}: {} done", step.name),
            Err(e) => {
                error!("step {ordinal}/{total}: {} failed: {e}", step.name);
                return Err(e);
            },
        }
    }

    Ok(())
}
