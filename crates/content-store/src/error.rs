//! Content store errors

use thiserror::Error;

/// Errors that can occur when reading or writing `Content` objects
#[derive(Debug, Error)]
pub enum StoreError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Object does not exist (namespace/name)
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Object is missing identity fields required for the call
    #[error("Invalid object: {0}")]
    InvalidObject(String),

    /// Failure injected by the mock store
    #[error("Injected failure: {0}")]
    Injected(String),
}

impl StoreError {
    /// Classify a kube error, turning HTTP 404 into `NotFound`.
    pub(crate) fn from_kube(err: kube::Error, namespace: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(ref response) if response.code == 404 => {
                StoreError::NotFound(format!("{}/{}", namespace, name))
            }
            other => StoreError::Kube(other),
        }
    }

    /// Whether the object was missing
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Short, stable label for metrics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Kube(_) => "kube",
            StoreError::NotFound(_) => "not_found",
            StoreError::InvalidObject(_) => "invalid_object",
            StoreError::Injected(_) => "injected",
        }
    }
}
