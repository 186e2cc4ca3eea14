//! ContentStoreTrait for mocking
//!
//! This trait abstracts access to `Content` objects so the reconciler never
//! talks to the API server directly. `KubeContentStore` implements it against
//! a cluster; tests use `MockContentStore`.

use crate::error::StoreError;
use crds::Content;

/// Object store operations needed by the content reconciler
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ContentStoreTrait: Send + Sync {
    /// Fetch the current object by namespace and name.
    async fn get_content(&self, namespace: &str, name: &str) -> Result<Content, StoreError>;

    /// Write the status subresource of `content`.
    ///
    /// Only `status` is sent; spec and metadata changes are ignored. Returns
    /// the object as stored after the write.
    async fn update_status(&self, content: &Content) -> Result<Content, StoreError>;
}
