//! # Telemetry Test Utilities
//!
//! Shared helpers for room telemetry tests.
//!
//! ## Modules
//!
//! - `capture` - `DebuggingRecorder` wrapper with exact-label lookups
//! - `scrape` - Prometheus text exposition parser
//! - `fixtures` - Identity tags used across scenarios
//!
//! ## Usage
//!
//! ```rust,ignore
//! use telemetry_test_utils::capture::{debugging_recorder, CapturedMetrics};
//! use telemetry_test_utils::fixtures::with_identity;
//!
//! let (recorder, snapshotter) = debugging_recorder();
//! // build the facade on `recorder`, emit events...
//! let captured = CapturedMetrics::take(&snapshotter);
//! assert_eq!(captured.gauge("sfu_room_total", &with_identity(&[])), Some(1.0));
//! ```

pub mod capture;
pub mod fixtures;
pub mod scrape;

pub use capture::{debugging_recorder, CapturedMetrics};
pub use fixtures::*;
pub use scrape::{Sample, Scrape};
