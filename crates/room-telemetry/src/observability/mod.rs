//! Observability for room lifecycle events.
//!
//! - [`metrics`]: the [`RoomTelemetry`] facade and its exported series
//! - [`mirrors`]: atomic in-process copies of the same accounting
//! - [`http`]: `/metrics` router for Prometheus scraping

pub mod http;
pub mod metrics;
pub mod mirrors;

pub use self::http::metrics_router;
pub use self::metrics::{RoomTelemetry, ROOM_DURATION_BUCKETS};
pub use self::mirrors::{MirrorCounters, MirrorSnapshot};
