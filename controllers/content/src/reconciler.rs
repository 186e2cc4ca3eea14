//! Reconciliation logic for Content CRDs.
//!
//! One pass reads the object fresh from the store, marks it provisioned if it
//! is not already, and writes the status subresource back.

use crate::config::StatusUpdateFailurePolicy;
use crate::error::ControllerError;
use content_store::{ContentStoreTrait, StoreError};
use crds::{Content, ContentStatus};
use kube_runtime::reflector::ObjectRef;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;

/// Result of a single successful reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Status already said provisioned; nothing was written
    AlreadyProvisioned,
    /// Status was written; the object should get another pass
    Provisioned,
    /// Status write failed and was absorbed
    StatusUpdateFailed,
}

impl ReconcileOutcome {
    /// Whether the controller should schedule another pass
    #[must_use]
    pub fn requeues(self) -> bool {
        matches!(self, ReconcileOutcome::Provisioned)
    }
}

/// Reconciles Content resources.
pub struct Reconciler {
    store: Arc<dyn ContentStoreTrait>,
    status_update_failure_policy: StatusUpdateFailurePolicy,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("status_update_failure_policy", &self.status_update_failure_policy)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(
        store: Arc<dyn ContentStoreTrait>,
        status_update_failure_policy: StatusUpdateFailurePolicy,
    ) -> Self {
        Self {
            store,
            status_update_failure_policy,
        }
    }

    /// Reconciles the Content object identified by `key`.
    ///
    /// This method:
    /// 1. Fetches the current object (errors are returned to the controller)
    /// 2. Returns early if it is already provisioned
    /// 3. Marks it provisioned and writes the status subresource
    ///
    /// A failed status write is absorbed or returned depending on the
    /// configured `StatusUpdateFailurePolicy`.
    #[instrument(skip(self, key), fields(namespace = ?key.namespace, name = %key.name))]
    pub async fn reconcile_content(
        &self,
        key: &ObjectRef<Content>,
    ) -> Result<ReconcileOutcome, ControllerError> {
        let name = key.name.as_str();
        let namespace = key.namespace.as_deref().ok_or_else(|| {
            StoreError::InvalidObject(format!("Content {} has no namespace", name))
        })?;

        let mut content = self.store.get_content(namespace, name).await?;

        if content.is_provisioned() {
            debug!("Content {}/{} already provisioned", namespace, name);
            return Ok(ReconcileOutcome::AlreadyProvisioned);
        }

        mark_provisioned(&mut content);

        match self.store.update_status(&content).await {
            Ok(_) => {
                info!("Provisioned Content {}/{}", namespace, name);
                Ok(ReconcileOutcome::Provisioned)
            }
            Err(e) => {
                error!("Failed to update Content {}/{} status: {}", namespace, name, e);
                match self.status_update_failure_policy {
                    StatusUpdateFailurePolicy::Absorb => Ok(ReconcileOutcome::StatusUpdateFailed),
                    StatusUpdateFailurePolicy::Retry => Err(ControllerError::StatusUpdate(format!(
                        "Content {}/{}: {}",
                        namespace, name, e
                    ))),
                }
            }
        }
    }
}

/// Sets `status.provisioned`, creating the status block if needed.
pub(crate) fn mark_provisioned(content: &mut Content) {
    content
        .status
        .get_or_insert_with(ContentStatus::default)
        .provisioned = true;
}
