//! Controller configuration.
//!
//! All settings come from environment variables and are read once at startup.

use crate::error::ControllerError;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_REQUEUE_AFTER_SECS: u64 = 1;
const DEFAULT_CONCURRENCY: u16 = 1;
const DEFAULT_BACKOFF_MIN_SECS: u64 = 1;
const DEFAULT_BACKOFF_MAX_SECS: u64 = 300;

/// What the reconciler does when writing the status subresource fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusUpdateFailurePolicy {
    /// Log the failure and finish without error or requeue
    #[default]
    Absorb,

    /// Return an error so the controller backs off and retries
    Retry,
}

impl FromStr for StatusUpdateFailurePolicy {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absorb" => Ok(Self::Absorb),
            "retry" => Ok(Self::Retry),
            other => Err(ControllerError::InvalidConfig(format!(
                "STATUS_UPDATE_FAILURE_POLICY must be 'absorb' or 'retry', got '{}'",
                other
            ))),
        }
    }
}

/// Runtime settings for the Content Controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace to watch; `None` watches all namespaces
    pub namespace: Option<String>,
    /// Listen address of the metrics and probe server
    pub metrics_addr: SocketAddr,
    /// Delay before the pass that follows a successful provision
    pub requeue_after: Duration,
    /// Maximum concurrent reconciliations (0 means unbounded)
    pub concurrency: u16,
    /// Quiet period applied to watch events before reconciling
    pub debounce: Duration,
    /// First retry delay after a failed reconcile, in seconds
    pub backoff_min_secs: u64,
    /// Upper bound of the retry delay, in seconds
    pub backoff_max_secs: u64,
    /// Handling of status write failures
    pub status_update_failure_policy: StatusUpdateFailurePolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            requeue_after: Duration::from_secs(DEFAULT_REQUEUE_AFTER_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            debounce: Duration::ZERO,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            status_update_failure_policy: StatusUpdateFailurePolicy::Absorb,
        }
    }
}

impl ControllerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which returns the raw value of a variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ControllerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.trim().is_empty());

        let metrics_addr = lookup("METRICS_ADDR")
            .unwrap_or_else(|| DEFAULT_METRICS_ADDR.to_string());
        let metrics_addr = metrics_addr.parse::<SocketAddr>().map_err(|e| {
            ControllerError::InvalidConfig(format!(
                "METRICS_ADDR '{}' is not a socket address: {}",
                metrics_addr, e
            ))
        })?;

        let requeue_after = parse_number(&lookup, "REQUEUE_AFTER_SECS", DEFAULT_REQUEUE_AFTER_SECS)?;
        let concurrency = parse_number(&lookup, "RECONCILE_CONCURRENCY", DEFAULT_CONCURRENCY)?;
        let debounce = parse_number(&lookup, "DEBOUNCE_SECS", 0u64)?;
        let backoff_min_secs = parse_number(&lookup, "ERROR_BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS)?;
        let backoff_max_secs = parse_number(&lookup, "ERROR_BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS)?;

        if backoff_min_secs == 0 {
            return Err(ControllerError::InvalidConfig(
                "ERROR_BACKOFF_MIN_SECS must be at least 1".to_string(),
            ));
        }
        if backoff_max_secs < backoff_min_secs {
            return Err(ControllerError::InvalidConfig(format!(
                "ERROR_BACKOFF_MAX_SECS ({}) must not be below ERROR_BACKOFF_MIN_SECS ({})",
                backoff_max_secs, backoff_min_secs
            )));
        }

        let status_update_failure_policy = match lookup("STATUS_UPDATE_FAILURE_POLICY") {
            Some(raw) => raw.parse()?,
            None => StatusUpdateFailurePolicy::default(),
        };

        Ok(Self {
            namespace,
            metrics_addr,
            requeue_after: Duration::from_secs(requeue_after),
            concurrency,
            debounce: Duration::from_secs(debounce),
            backoff_min_secs,
            backoff_max_secs,
            status_update_failure_policy,
        })
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ControllerError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            ControllerError::InvalidConfig(format!("{} '{}' is invalid: {}", key, raw, e))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ControllerConfig, ControllerError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ControllerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.metrics_addr.to_string(), DEFAULT_METRICS_ADDR);
        assert_eq!(config.status_update_failure_policy, StatusUpdateFailurePolicy::Absorb);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("WATCH_NAMESPACE", "team-a"),
            ("METRICS_ADDR", "127.0.0.1:9090"),
            ("REQUEUE_AFTER_SECS", "30"),
            ("RECONCILE_CONCURRENCY", "4"),
            ("DEBOUNCE_SECS", "5"),
            ("ERROR_BACKOFF_MIN_SECS", "2"),
            ("ERROR_BACKOFF_MAX_SECS", "120"),
            ("STATUS_UPDATE_FAILURE_POLICY", "Retry"),
        ])
        .unwrap();

        assert_eq!(config.namespace.as_deref(), Some("team-a"));
        assert_eq!(config.metrics_addr.port(), 9090);
        assert_eq!(config.requeue_after, Duration::from_secs(30));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.debounce, Duration::from_secs(5));
        assert_eq!(config.backoff_min_secs, 2);
        assert_eq!(config.backoff_max_secs, 120);
        assert_eq!(config.status_update_failure_policy, StatusUpdateFailurePolicy::Retry);
    }

    #[test]
    fn test_blank_namespace_means_all() {
        let config = config_from(&[("WATCH_NAMESPACE", "  ")]).unwrap();
        assert_eq!(config.namespace, None);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = config_from(&[("REQUEUE_AFTER_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfig(ref m) if m.contains("REQUEUE_AFTER_SECS")));
    }

    #[test]
    fn test_invalid_metrics_addr_rejected() {
        let err = config_from(&[("METRICS_ADDR", ":8080")]).unwrap_err();
        assert!(matches!(err, ControllerError::InvalidConfig(_)));
    }

    #[test]
    fn test_backoff_bounds_validated() {
        assert!(config_from(&[("ERROR_BACKOFF_MIN_SECS", "0")]).is_err());
        assert!(config_from(&[("ERROR_BACKOFF_MIN_SECS", "10"), ("ERROR_BACKOFF_MAX_SECS", "5")]).is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = "requeue".parse::<StatusUpdateFailurePolicy>().unwrap_err();
        assert!(err.to_string().contains("absorb"));
    }
}
