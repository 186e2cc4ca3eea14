//! Test utilities for unit testing the reconciler
//!
//! Helpers for creating test data and wiring a reconciler to a mock store.

use crate::config::StatusUpdateFailurePolicy;
use crate::reconciler::Reconciler;
use content_store::MockContentStore;
use crds::{Content, ContentSpec, ContentStatus};
use kube_runtime::reflector::ObjectRef;
use std::sync::Arc;

/// Helper to create a test Content CRD
///
/// `provisioned: None` leaves the status block out entirely.
pub fn create_test_content(
    name: &str,
    namespace: &str,
    foo: &str,
    provisioned: Option<bool>,
) -> Content {
    let mut content = Content::new(name, ContentSpec { foo: foo.to_string() });
    content.metadata.namespace = Some(namespace.to_string());
    content.status = provisioned.map(|provisioned| ContentStatus { provisioned });
    content
}

/// Helper to build the identity the watch loop hands to the reconciler
pub fn content_ref(name: &str, namespace: &str) -> ObjectRef<Content> {
    ObjectRef::new(name).within(namespace)
}

/// Helper to create a reconciler backed by `store`
pub fn create_test_reconciler(
    store: &MockContentStore,
    policy: StatusUpdateFailurePolicy,
) -> Reconciler {
    Reconciler::new(Arc::new(store.clone()), policy)
}
