//! Mock content store for unit testing
//!
//! Keeps `Content` objects in memory keyed by namespace/name. Reads and writes
//! can be made to fail on demand, and every call is counted so tests can
//! assert whether a write happened.

use crate::client::identity;
use crate::error::StoreError;
use crate::store_trait::ContentStoreTrait;
use crds::Content;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Mock ContentStore for testing
#[derive(Clone, Debug, Default)]
pub struct MockContentStore {
    pub(crate) contents: Arc<Mutex<HashMap<(String, String), Content>>>,
    pub(crate) get_failure: Arc<Mutex<Option<String>>>,
    pub(crate) update_failure: Arc<Mutex<Option<String>>>,
    pub(crate) get_calls: Arc<Mutex<usize>>,
    pub(crate) update_calls: Arc<Mutex<usize>>,
}

impl MockContentStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the mock store (for test setup)
    ///
    /// Objects without a namespace are stored under `default`.
    pub fn add_content(&self, mut content: Content) {
        let namespace = content
            .metadata
            .namespace
            .get_or_insert_with(|| "default".to_string())
            .clone();
        let name = content.metadata.name.clone().unwrap_or_default();
        self.contents.lock().unwrap().insert((namespace, name), content);
    }

    /// Current stored copy of an object
    pub fn content(&self, namespace: &str, name: &str) -> Option<Content> {
        self.contents
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    /// Make every following `get_content` fail with `message`
    pub fn fail_get(&self, message: impl Into<String>) {
        *self.get_failure.lock().unwrap() = Some(message.into());
    }

    /// Make every following `update_status` fail with `message`
    pub fn fail_update(&self, message: impl Into<String>) {
        *self.update_failure.lock().unwrap() = Some(message.into());
    }

    /// Clear injected failures
    pub fn heal(&self) {
        *self.get_failure.lock().unwrap() = None;
        *self.update_failure.lock().unwrap() = None;
    }

    /// Number of `get_content` calls so far
    pub fn get_calls(&self) -> usize {
        *self.get_calls.lock().unwrap()
    }

    /// Number of `update_status` calls so far, failed ones included
    pub fn update_calls(&self) -> usize {
        *self.update_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl ContentStoreTrait for MockContentStore {
    async fn get_content(&self, namespace: &str, name: &str) -> Result<Content, StoreError> {
        *self.get_calls.lock().unwrap() += 1;

        if let Some(message) = self.get_failure.lock().unwrap().clone() {
            return Err(StoreError::Injected(message));
        }

        self.content(namespace, name)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", namespace, name)))
    }

    async fn update_status(&self, content: &Content) -> Result<Content, StoreError> {
        *self.update_calls.lock().unwrap() += 1;

        if let Some(message) = self.update_failure.lock().unwrap().clone() {
            return Err(StoreError::Injected(message));
        }

        let (namespace, name) = identity(content)?;
        let mut contents = self.contents.lock().unwrap();
        let stored = contents
            .get_mut(&(namespace.to_string(), name.to_string()))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", namespace, name)))?;

        // Status subresource: only status is written
        stored.status = content.status.clone();
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{ContentSpec, ContentStatus};

    fn sample(name: &str, namespace: &str) -> Content {
        let mut content = Content::new(name, ContentSpec { foo: "x".to_string() });
        content.metadata.namespace = Some(namespace.to_string());
        content
    }

    #[tokio::test]
    async fn test_get_missing_returns_not_found() {
        let store = MockContentStore::new();
        let err = store.get_content("default", "missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.get_calls(), 1);
    }

    #[tokio::test]
    async fn test_add_content_defaults_namespace() {
        let store = MockContentStore::new();
        store.add_content(Content::new("sample", ContentSpec::default()));

        let content = store.get_content("default", "sample").await.unwrap();
        assert_eq!(content.metadata.namespace.as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn test_update_status_only_writes_status() {
        let store = MockContentStore::new();
        store.add_content(sample("sample", "team-a"));

        let mut changed = sample("sample", "team-a");
        changed.spec.foo = "changed".to_string();
        changed.status = Some(ContentStatus { provisioned: true });

        let stored = store.update_status(&changed).await.unwrap();
        assert!(stored.is_provisioned());
        assert_eq!(stored.spec.foo, "x", "Spec must not be written through the status call");
        assert_eq!(store.content("team-a", "sample").unwrap(), stored);
    }

    #[tokio::test]
    async fn test_injected_update_failure_leaves_object_unchanged() {
        let store = MockContentStore::new();
        store.add_content(sample("sample", "default"));
        store.fail_update("conflict");

        let mut changed = sample("sample", "default");
        changed.status = Some(ContentStatus { provisioned: true });

        let err = store.update_status(&changed).await.unwrap_err();
        assert!(matches!(err, StoreError::Injected(ref m) if m == "conflict"));
        assert_eq!(store.update_calls(), 1);
        assert!(!store.content("default", "sample").unwrap().is_provisioned());
    }

    #[tokio::test]
    async fn test_heal_clears_failures() {
        let store = MockContentStore::new();
        store.add_content(sample("sample", "default"));
        store.fail_get("boom");
        assert!(store.get_content("default", "sample").await.is_err());

        store.heal();
        assert!(store.get_content("default", "sample").await.is_ok());
    }
}
