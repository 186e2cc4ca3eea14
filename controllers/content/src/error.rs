//! Controller-specific error types.
//!
//! This module defines error types specific to the Content Controller
//! that are not covered by upstream library errors.

use content_store::StoreError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the Content Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Content store error (fetch or status write)
    #[error("Content store error: {0}")]
    Store(#[from] StoreError),

    /// Kubernetes API error outside the content store
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Status update failed and the retry policy is in effect
    #[error("Status update failed: {0}")]
    StatusUpdate(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Metric registration or encoding failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Metrics/probe server failed
    #[error("Server error: {0}")]
    Server(String),
}

impl ControllerError {
    /// Short, stable label for the `error` metric dimension
    #[must_use]
    pub fn metric_label(&self) -> &'static str {
        match self {
            ControllerError::Store(e) => e.kind(),
            ControllerError::Kube(_) => "kube",
            ControllerError::StatusUpdate(_) => "status_update",
            ControllerError::InvalidConfig(_) => "invalid_config",
            ControllerError::Watch(_) => "watch",
            ControllerError::Metrics(_) => "metrics",
            ControllerError::Server(_) => "server",
        }
    }
}
