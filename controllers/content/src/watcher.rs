//! Kubernetes resource watcher.
//!
//! Drives `Content` reconciliation with `kube_runtime::Controller`, which
//! handles reconnection, per-object serialization and scheduling. This module
//! turns reconcile outcomes into requeue actions and owns the error backoff.

use crate::backoff::ErrorBackoff;
use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::probes::Diagnostics;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crds::Content;
use futures::StreamExt;
use kube::Api;
use kube_runtime::controller::{Action, Config as RuntimeConfig};
use kube_runtime::reflector::ObjectRef;
use kube_runtime::{Controller, watcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Shared state handed to every reconcile and error-policy call.
#[derive(Debug)]
pub struct Context {
    reconciler: Reconciler,
    metrics: Metrics,
    backoff: ErrorBackoff<ObjectRef<Content>>,
    diagnostics: Arc<RwLock<Diagnostics>>,
    requeue_after: Duration,
}

impl Context {
    /// Creates the controller context.
    pub fn new(
        reconciler: Reconciler,
        metrics: Metrics,
        diagnostics: Arc<RwLock<Diagnostics>>,
        config: &ControllerConfig,
    ) -> Self {
        Self {
            reconciler,
            metrics,
            backoff: ErrorBackoff::new(config.backoff_min_secs, config.backoff_max_secs),
            diagnostics,
            requeue_after: config.requeue_after,
        }
    }
}

/// Maps a reconcile outcome to the controller action.
pub fn action_for(outcome: ReconcileOutcome, requeue_after: Duration) -> Action {
    if outcome.requeues() {
        Action::requeue(requeue_after)
    } else {
        Action::await_change()
    }
}

async fn reconcile(content: Arc<Content>, ctx: Arc<Context>) -> Result<Action, ControllerError> {
    let key = ObjectRef::from_obj(content.as_ref());
    let _timer = ctx.metrics.count_and_measure();
    ctx.diagnostics.write().await.record_event();

    let outcome = ctx.reconciler.reconcile_content(&key).await?;
    ctx.backoff.reset(&key);

    if outcome == ReconcileOutcome::StatusUpdateFailed {
        ctx.metrics.status_update_failure();
    }

    Ok(action_for(outcome, ctx.requeue_after))
}

fn error_policy(content: Arc<Content>, error: &ControllerError, ctx: Arc<Context>) -> Action {
    let key = ObjectRef::from_obj(content.as_ref());
    ctx.metrics.reconcile_failure(error);
    if matches!(error, ControllerError::StatusUpdate(_)) {
        ctx.metrics.status_update_failure();
    }

    let delay = ctx.backoff.next_delay(key.clone());
    // Deleted objects are never reconciled again, so nothing would reset them
    if matches!(error, ControllerError::Store(e) if e.is_not_found()) {
        ctx.backoff.reset(&key);
    }
    warn!(content = %key, error = %error, "Reconciliation failed, retrying in {:?}", delay);
    Action::requeue(delay)
}

/// Watches Content resources until the stream ends or a shutdown signal arrives.
pub async fn watch_contents(
    api: Api<Content>,
    ctx: Arc<Context>,
    config: ControllerConfig,
) -> Result<(), ControllerError> {
    info!("Starting Content watcher");

    let runtime_config = RuntimeConfig::default()
        .debounce(config.debounce)
        .concurrency(config.concurrency);

    Controller::new(api, watcher::Config::default().any_semantic())
        .with_config(runtime_config)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, action)) => debug!(content = %obj, "Reconciled: {:?}", action),
                Err(e) => warn!("Controller error for Content: {}", e),
            }
        })
        .await;

    info!("Content watcher stopped");
    Ok(())
}
