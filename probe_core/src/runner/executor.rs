//! Runs one probe under its own deadline

use crate::probes::Probe;
use crate::Outcome;
use std::any::Any;
use std::sync::Arc;
use tokio::task::JoinError;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs `probe` on its own task and waits at most `probe.timeout()`.
///
/// An `Err` or a panic from the probe becomes [`Outcome::Crashed`]. When the
/// deadline passes first the task is aborted and [`Outcome::TimedOut`] is
/// returned without waiting for it to wind down.
///
/// The deadline only holds if `run` yields. Probes must push synchronous
/// collaborators onto `spawn_blocking`; such a call is not interrupted by the
/// abort and finishes on the blocking pool with its result discarded.
pub async fn execute(probe: Arc<dyn Probe>) -> Outcome {
    let budget = probe.timeout();
    let task_probe = Arc::clone(&probe);
    let mut handle = tokio::spawn(async move { task_probe.run().await });

    match timeout(budget, &mut handle).await {
        Ok(Ok(Ok(outcome))) => normalize(probe.as_ref(), outcome),
        Ok(Ok(Err(e))) => {
            debug!("Probe {} returned an error: {}", probe.name(), e);
            Outcome::crashed(e.to_string())
        }
        Ok(Err(join_error)) => Outcome::crashed(describe_join_error(join_error)),
        Err(_) => {
            warn!("Probe {} exceeded its {:?} budget", probe.name(), budget);
            handle.abort();
            Outcome::TimedOut
        }
    }
}

/// A failure without reasons gets a generic one naming the probe kind.
fn normalize(probe: &dyn Probe, outcome: Outcome) -> Outcome {
    match outcome {
        Outcome::Failed(reasons) if reasons.is_empty() => {
            Outcome::failed(format!("{} probe {} has failed", probe.kind(), probe.name()))
        }
        other => other,
    }
}

fn describe_join_error(error: JoinError) -> String {
    if error.is_panic() {
        format!("panicked: {}", panic_message(error.into_panic()))
    } else {
        "task was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
