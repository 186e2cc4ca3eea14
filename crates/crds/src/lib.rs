//! Content filter CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the content controller.

pub mod content;

pub use content::*;
