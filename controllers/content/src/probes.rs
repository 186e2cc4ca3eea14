//! Metrics and probe HTTP server.
//!
//! - `GET /healthz` - liveness, always `ok`
//! - `GET /readyz` - 200 once the controller is watching, 503 before
//! - `GET /metrics` - Prometheus text exposition
//! - `GET /` - JSON diagnostics

use crate::error::ControllerError;
use crate::metrics::Metrics;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Diagnostics exposed on `/`
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Start of the most recent reconcile pass
    pub last_event: Option<DateTime<Utc>>,
    /// Reconcile passes since startup
    pub reconciles: u64,
}

impl Diagnostics {
    /// Records the start of a reconcile pass
    pub fn record_event(&mut self) {
        self.last_event = Some(Utc::now());
        self.reconciles += 1;
    }
}

/// Shared state behind the probe endpoints.
#[derive(Clone, Debug)]
pub struct ProbeState {
    metrics: Metrics,
    ready: Arc<AtomicBool>,
    diagnostics: Arc<RwLock<Diagnostics>>,
}

impl ProbeState {
    /// Creates a not-yet-ready state.
    pub fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            ready: Arc::new(AtomicBool::new(false)),
            diagnostics: Arc::new(RwLock::new(Diagnostics::default())),
        }
    }

    /// Flips the readiness probe.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    /// Handle the reconcile loop writes diagnostics into.
    pub fn diagnostics(&self) -> Arc<RwLock<Diagnostics>> {
        Arc::clone(&self.diagnostics)
    }
}

/// Build the probe router
pub fn probe_routes(state: ProbeState) -> Router {
    Router::new()
        .route("/", get(diagnostics))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the probe router on `addr` until the process exits.
pub async fn serve(addr: SocketAddr, state: ProbeState) -> Result<(), ControllerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ControllerError::Server(format!("Failed to bind {}: {}", addr, e)))?;
    info!(addr = %addr, "Metrics and probe server started");

    axum::serve(listener, probe_routes(state))
        .await
        .map_err(|e| ControllerError::Server(format!("Probe server error: {}", e)))
}

async fn readyz(State(state): State<ProbeState>) -> (StatusCode, &'static str) {
    if state.ready.load(Ordering::Acquire) {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready")
    }
}

async fn metrics(State(state): State<ProbeState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn diagnostics(State(state): State<ProbeState>) -> Json<Diagnostics> {
    Json(state.diagnostics.read().await.clone())
}
