//! Room telemetry error types.
//!
//! Event entry points on the facade never fail. These errors only surface
//! from construction and from the process-wide instance accessors.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while building or looking up a telemetry facade.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The process-wide facade was already initialized.
    #[error("Room telemetry already initialized")]
    AlreadyInitialized,

    /// The process-wide facade was used before initialization.
    #[error("Room telemetry not initialized")]
    NotInitialized,

    /// The Prometheus exporter rejected its configuration.
    #[error("Exporter error: {0}")]
    Exporter(String),

    /// Identity configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
