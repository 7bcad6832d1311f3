//! Process-wide facade instance.
//!
//! Hosts that cannot thread a [`RoomTelemetry`] through every caller
//! initialize one here at startup. Initialization happens at most once; a
//! second call fails instead of registering the series again.

use crate::config::TelemetryConfig;
use crate::errors::TelemetryError;
use crate::observability::RoomTelemetry;
use std::sync::OnceLock;
use tracing::warn;

static TELEMETRY: OnceLock<RoomTelemetry> = OnceLock::new();

/// Build the process-wide facade.
///
/// # Errors
///
/// Returns [`TelemetryError::AlreadyInitialized`] on every call after the
/// first successful one, or any error from [`RoomTelemetry::new`].
pub fn init(config: TelemetryConfig) -> Result<&'static RoomTelemetry, TelemetryError> {
    if TELEMETRY.get().is_some() {
        return Err(already_initialized(&config));
    }

    let telemetry = RoomTelemetry::new(config.clone())?;
    TELEMETRY
        .set(telemetry)
        .map_err(|_| already_initialized(&config))?;

    get()
}

/// The process-wide facade.
///
/// # Errors
///
/// Returns [`TelemetryError::NotInitialized`] before [`init`] succeeds.
pub fn get() -> Result<&'static RoomTelemetry, TelemetryError> {
    TELEMETRY.get().ok_or(TelemetryError::NotInitialized)
}

fn already_initialized(config: &TelemetryConfig) -> TelemetryError {
    warn!(
        target: "room_telemetry.init",
        node_id = %config.node_id,
        "Room telemetry already initialized, ignoring second init"
    );
    TelemetryError::AlreadyInitialized
}
