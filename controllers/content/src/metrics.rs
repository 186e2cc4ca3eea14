//! Prometheus metrics for the reconcile loop.

use crate::error::ControllerError;
use prometheus::{
    Histogram, HistogramOpts, HistogramTimer, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Reconcile metrics, registered in a registry owned by the controller.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    /// Reconcile passes started
    pub reconciliations: IntCounter,
    /// Failed passes by error kind
    pub failures: IntCounterVec,
    /// Status writes that failed, absorbed or retried
    pub status_update_failures: IntCounter,
    /// Reconcile duration
    pub duration: Histogram,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("reconciliations", &self.reconciliations.get())
            .field("status_update_failures", &self.status_update_failures.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Creates and registers all metrics.
    pub fn new() -> Result<Self, ControllerError> {
        let registry = Registry::new();

        let reconciliations = IntCounter::with_opts(Opts::new(
            "content_reconcile_total",
            "Content reconciliations",
        ))?;
        let failures = IntCounterVec::new(
            Opts::new("content_reconcile_errors_total", "Content reconciliation errors"),
            &["error"],
        )?;
        let status_update_failures = IntCounter::with_opts(Opts::new(
            "content_status_update_failures_total",
            "Failed Content status subresource writes",
        ))?;
        let duration = Histogram::with_opts(
            HistogramOpts::new("content_reconcile_duration_seconds", "Content reconcile duration")
                .buckets(vec![0.01, 0.1, 0.25, 0.5, 1., 5., 15., 60.]),
        )?;

        registry.register(Box::new(reconciliations.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(status_update_failures.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            reconciliations,
            failures,
            status_update_failures,
            duration,
        })
    }

    /// Counts a pass and returns a timer that records its duration when dropped.
    #[must_use]
    pub fn count_and_measure(&self) -> HistogramTimer {
        self.reconciliations.inc();
        self.duration.start_timer()
    }

    /// Records a failed pass.
    pub fn reconcile_failure(&self, error: &ControllerError) {
        self.failures.with_label_values(&[error.metric_label()]).inc();
    }

    /// Records a failed status write.
    pub fn status_update_failure(&self) {
        self.status_update_failures.inc();
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, ControllerError> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}
