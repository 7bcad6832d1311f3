//! Telemetry identity configuration.
//!
//! Identity tags are normally supplied by the host. `from_env` exists for
//! hosts that keep node identity in environment variables; the facade itself
//! never reads the environment.

use crate::types::NodeType;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default top-level metric namespace.
pub const DEFAULT_NAMESPACE: &str = "sfu";

/// Default deployment environment label.
pub const DEFAULT_ENV: &str = "development";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Identity tags attached as constant labels to every series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Opaque node identifier.
    pub node_id: String,

    /// Role of this node.
    pub node_type: NodeType,

    /// Free-form deployment label (e.g. "production").
    pub env: String,

    /// Metric name prefix (default: "sfu").
    pub namespace: String,
}

impl TelemetryConfig {
    /// Create a config with the default namespace.
    pub fn new(node_id: impl Into<String>, node_type: NodeType, env: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            node_type,
            env: env.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Override the metric namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let node_id = vars
            .get("TELEMETRY_NODE_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("TELEMETRY_NODE_ID".to_string()))?
            .clone();

        let node_type = match vars.get("TELEMETRY_NODE_TYPE") {
            Some(value) => value.parse()?,
            None => NodeType::default(),
        };

        let env = vars
            .get("TELEMETRY_ENV")
            .cloned()
            .unwrap_or_else(|| DEFAULT_ENV.to_string());

        let namespace = vars
            .get("TELEMETRY_NAMESPACE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        let config = Self {
            node_id,
            node_type,
            env,
            namespace,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the identity can be rendered as Prometheus series.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_id.is_empty() {
            return Err(ConfigError::InvalidValue(
                "node_id must not be empty".to_string(),
            ));
        }

        if !is_valid_metric_prefix(&self.namespace) {
            return Err(ConfigError::InvalidValue(format!(
                "namespace '{}' is not a valid metric name prefix",
                self.namespace
            )));
        }

        Ok(())
    }

    /// Full metric name for a series: `{namespace}_{subsystem}_{name}`.
    #[must_use]
    pub fn metric_name(&self, subsystem: &str, name: &str) -> String {
        format!("{}_{}_{}", self.namespace, subsystem, name)
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`
fn is_valid_metric_prefix(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
