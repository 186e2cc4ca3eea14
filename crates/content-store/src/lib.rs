//! Content store
//!
//! Typed access to `Content` objects for the content controller: fetch by
//! namespace/name and write the status subresource.
//!
//! # Example
//!
//! ```no_run
//! use content_store::{ContentStoreTrait, KubeContentStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let store = KubeContentStore::new(client);
//!
//! let mut content = store.get_content("default", "sample").await?;
//! content.status.get_or_insert_with(Default::default).provisioned = true;
//! store.update_status(&content).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
#[path = "trait.rs"]
pub mod store_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::KubeContentStore;
pub use error::StoreError;
pub use store_trait::ContentStoreTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockContentStore;
