//! Room Telemetry Library
//!
//! Metrics accounting for a real-time media server hosting rooms, where
//! participants publish and subscribe to media tracks. Domain code reports
//! lifecycle events to a [`RoomTelemetry`] facade, which keeps two views of
//! the same state:
//!
//! - Prometheus series (gauges, labeled counters, a room duration histogram)
//!   for pull-based scraping
//! - Atomic in-process mirrors for cheap synchronous reads by health probes
//!   and admission control
//!
//! # Usage
//!
//! ```rust,ignore
//! use room_telemetry::{NodeType, RoomTelemetry, TelemetryConfig, TrackKind};
//!
//! let telemetry = RoomTelemetry::new(TelemetryConfig::new("n1", NodeType::Server, "prod"))?;
//!
//! telemetry.room_started();
//! telemetry.add_participant();
//! telemetry.add_published_track(TrackKind::Audio);
//!
//! assert_eq!(telemetry.mirrors().rooms(), 1);
//! let text = telemetry.render();
//! ```
//!
//! # Modules
//!
//! - [`observability`] - Facade, mirrors and scrape router
//! - [`global`] - Optional process-wide instance
//! - [`config`] - Identity tags
//! - [`types`] - Label vocabulary
//! - [`errors`] - Construction errors

pub mod config;
pub mod errors;
pub mod global;
pub mod observability;
pub mod types;

pub use config::{ConfigError, TelemetryConfig};
pub use errors::TelemetryError;
pub use observability::{metrics_router, MirrorCounters, MirrorSnapshot, RoomTelemetry};
pub use types::{NodeType, SubscribeFailureReason, TrackKind};
