//! Kubernetes-backed content store.

use crate::error::StoreError;
use crate::store_trait::ContentStoreTrait;
use crds::Content;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use serde_json::json;
use tracing::debug;

/// Reads and writes `Content` objects through the cluster API.
#[derive(Clone)]
pub struct KubeContentStore {
    client: Client,
}

impl std::fmt::Debug for KubeContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeContentStore").finish_non_exhaustive()
    }
}

impl KubeContentStore {
    /// Creates a store on top of an existing client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Content> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Namespace and name of an object, or `InvalidObject` if either is missing.
pub(crate) fn identity(content: &Content) -> Result<(&str, &str), StoreError> {
    let name = content
        .metadata
        .name
        .as_deref()
        .ok_or_else(|| StoreError::InvalidObject("Content missing name".to_string()))?;
    let namespace = content
        .metadata
        .namespace
        .as_deref()
        .ok_or_else(|| StoreError::InvalidObject(format!("Content {} missing namespace", name)))?;
    Ok((namespace, name))
}

/// Merge-patch body for the status subresource. A missing status is sent as the default.
pub(crate) fn status_patch(content: &Content) -> serde_json::Value {
    json!({
        "status": content.status.clone().unwrap_or_default()
    })
}

#[async_trait::async_trait]
impl ContentStoreTrait for KubeContentStore {
    async fn get_content(&self, namespace: &str, name: &str) -> Result<Content, StoreError> {
        debug!("GET Content {}/{}", namespace, name);
        self.api(namespace)
            .get(name)
            .await
            .map_err(|e| StoreError::from_kube(e, namespace, name))
    }

    async fn update_status(&self, content: &Content) -> Result<Content, StoreError> {
        let (namespace, name) = identity(content)?;
        debug!("PATCH Content {}/{} status", namespace, name);

        let patch = status_patch(content);

        let pp = PatchParams::default();
        self.api(namespace)
            .patch_status(name, &pp, &Patch::Merge(&patch))
            .await
            .map_err(|e| StoreError::from_kube(e, namespace, name))
    }
}
