//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the content store,
//! reconciler, watcher and probe server together for the Content Controller.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::probes::{self, ProbeState};
use crate::reconciler::Reconciler;
use crate::watcher::{self, Context};
use content_store::KubeContentStore;
use crds::Content;
use kube::api::ListParams;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Main controller for Content management.
#[derive(Debug)]
pub struct Controller {
    content_watcher: JoinHandle<Result<(), ControllerError>>,
    probe_server: JoinHandle<Result<(), ControllerError>>,
}

impl Controller {
    /// Creates a new controller instance.
    ///
    /// The probe server starts first so liveness answers during startup;
    /// readiness flips once the Content CRD is confirmed to be installed.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing Content Controller");

        let metrics = Metrics::new()?;
        let probe_state = ProbeState::new(metrics.clone());
        let probe_server = tokio::spawn(probes::serve(config.metrics_addr, probe_state.clone()));

        // Create Kubernetes client
        let kube_client = Client::try_default().await?;

        let content_api: Api<Content> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client.clone(), ns),
            None => Api::all(kube_client.clone()),
        };

        // Ensure CRD is installed before loop-watching
        content_api
            .list(&ListParams::default().limit(1))
            .await
            .map_err(|e| {
                error!("Failed to list Content resources: {}", e);
                error!("Is the CRD installed? Run: cargo run -p crds --bin crdgen | kubectl apply -f -");
                ControllerError::Kube(e)
            })?;

        let store = KubeContentStore::new(kube_client);
        let reconciler = Reconciler::new(Arc::new(store), config.status_update_failure_policy);
        let context = Arc::new(Context::new(
            reconciler,
            metrics,
            probe_state.diagnostics(),
            &config,
        ));

        let content_watcher = tokio::spawn(watcher::watch_contents(content_api, context, config));
        probe_state.set_ready(true);

        Ok(Self {
            content_watcher,
            probe_server,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Content Controller running");

        tokio::select! {
            result = &mut self.content_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Content watcher panicked: {}", e)))??;
            }
            result = &mut self.probe_server => {
                result.map_err(|e| ControllerError::Server(format!("Probe server panicked: {}", e)))??;
            }
        }

        Ok(())
    }
}
