//! Room, participant and track series.
//!
//! All series follow Prometheus naming conventions under a configurable
//! namespace (default `sfu`):
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `{ns}_room_total` | Gauge | none | Live rooms |
//! | `{ns}_room_duration_seconds` | Histogram | none | Room lifetime at end of room |
//! | `{ns}_participant_total` | Gauge | none | Live participants across rooms |
//! | `{ns}_track_published_total` | Gauge | `kind` | Live published tracks |
//! | `{ns}_track_subscribed_total` | Gauge | `kind` | Live subscriptions |
//! | `{ns}_track_publish_counter` | Counter | `kind`, `state` | Publish attempts and successes |
//! | `{ns}_track_subscribe_counter` | Counter | `state`, `error` | Subscribe attempts, successes, failures |
//!
//! Every series also carries the constant labels `node_id`, `node_type` and
//! `env`, ahead of its variable labels.
//!
//! # Cardinality
//!
//! - `kind`: caller supplied, normally `audio`, `video`, `data`
//! - `state`: 2 values for publish, 3 for subscribe
//! - `error`: caller supplied. Raw error messages are unbounded; prefer
//!   [`RoomTelemetry::record_track_subscribe_failure_reason`].

use crate::config::TelemetryConfig;
use crate::errors::TelemetryError;
use crate::observability::mirrors::{MirrorCounters, MirrorSnapshot};
use crate::types::{SubscribeFailureReason, TrackKind};
use chrono::{DateTime, Utc};
use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Label, Level, Metadata, Recorder, SharedString, Unit,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Room duration buckets in seconds, from 5 seconds to 10 hours.
pub const ROOM_DURATION_BUCKETS: [f64; 10] = [
    5.0, 10.0, 60.0, 300.0, 600.0, 1800.0, 3600.0, 7200.0, 18000.0, 36000.0,
];

pub const STATE_ATTEMPT: &str = "attempt";
pub const STATE_SUCCESS: &str = "success";
pub const STATE_FAILURE: &str = "failure";

/// Kinds whose per-kind handles are cached after first use.
const KNOWN_KINDS: [TrackKind; 3] = [TrackKind::Audio, TrackKind::Video, TrackKind::Data];

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

/// Fully qualified series names, resolved once from the namespace.
#[derive(Debug)]
struct SeriesNames {
    room_total: String,
    room_duration: String,
    participant_total: String,
    track_published: String,
    track_subscribed: String,
    track_publish_counter: String,
    track_subscribe_counter: String,
}

impl SeriesNames {
    fn new(config: &TelemetryConfig) -> Self {
        Self {
            room_total: config.metric_name("room", "total"),
            room_duration: config.metric_name("room", "duration_seconds"),
            participant_total: config.metric_name("participant", "total"),
            track_published: config.metric_name("track", "published_total"),
            track_subscribed: config.metric_name("track", "subscribed_total"),
            track_publish_counter: config.metric_name("track", "publish_counter"),
            track_subscribe_counter: config.metric_name("track", "subscribe_counter"),
        }
    }
}

/// Per-kind handles, registered on first use.
#[derive(Default)]
struct KindSeries {
    published: OnceLock<Gauge>,
    subscribed: OnceLock<Gauge>,
    publish_attempts: OnceLock<Counter>,
    publish_successes: OnceLock<Counter>,
}

/// Telemetry facade for room lifecycle events.
///
/// Every entry point updates an exported series and the matching atomic
/// mirror. The two updates are not atomic as a pair; a scrape taken
/// mid-call may see them momentarily apart.
///
/// A facade built with [`new`](Self::new) owns a Prometheus recorder with no
/// background upkeep. Histogram observations are buffered until the next
/// [`render`](Self::render) or [`run_upkeep`](Self::run_upkeep); hosts that
/// scrape rarely, or never, must call `run_upkeep` periodically.
pub struct RoomTelemetry {
    config: TelemetryConfig,
    names: SeriesNames,
    identity: Vec<Label>,
    recorder: Arc<dyn Recorder + Send + Sync>,
    exposition: Option<PrometheusHandle>,
    mirrors: Arc<MirrorCounters>,

    room_total: Gauge,
    room_duration: Histogram,
    participant_total: Gauge,
    subscribe_attempts: Counter,
    subscribe_successes: Counter,
    kinds: [KindSeries; 3],
}

impl fmt::Debug for RoomTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomTelemetry")
            .field("config", &self.config)
            .field("mirrors", &self.mirrors.snapshot())
            .field("exposition", &self.exposition.is_some())
            .finish_non_exhaustive()
    }
}

impl RoomTelemetry {
    /// Build a facade backed by its own Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is invalid or the exporter rejects
    /// the histogram bucket configuration.
    pub fn new(config: TelemetryConfig) -> Result<Self, TelemetryError> {
        config.validate()?;

        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(config.metric_name("room", "duration_seconds")),
                &ROOM_DURATION_BUCKETS,
            )
            .map_err(|e| {
                TelemetryError::Exporter(format!("Failed to set room duration buckets: {e}"))
            })?
            .build_recorder();
        let handle = recorder.handle();

        Ok(Self::build(config, Arc::new(recorder), Some(handle)))
    }

    /// Build a facade that registers its series with `recorder`.
    ///
    /// No text exposition is available; [`render`](Self::render) returns
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is invalid.
    pub fn with_recorder(
        config: TelemetryConfig,
        recorder: Arc<dyn Recorder + Send + Sync>,
    ) -> Result<Self, TelemetryError> {
        config.validate()?;
        Ok(Self::build(config, recorder, None))
    }

    fn build(
        config: TelemetryConfig,
        recorder: Arc<dyn Recorder + Send + Sync>,
        exposition: Option<PrometheusHandle>,
    ) -> Self {
        let names = SeriesNames::new(&config);
        let identity = vec![
            Label::new("node_id", config.node_id.clone()),
            Label::new("node_type", config.node_type.as_str()),
            Label::new("env", config.env.clone()),
        ];

        describe(&*recorder, &names);

        let identity_key = |name: &str| Key::from_parts(name.to_owned(), identity.clone());
        let subscribe_key = |state: &'static str| {
            let mut labels = identity.clone();
            labels.push(Label::new("state", state));
            labels.push(Label::new("error", ""));
            Key::from_parts(names.track_subscribe_counter.clone(), labels)
        };

        let room_total = recorder.register_gauge(&identity_key(&names.room_total), &METADATA);
        let room_duration =
            recorder.register_histogram(&identity_key(&names.room_duration), &METADATA);
        let participant_total =
            recorder.register_gauge(&identity_key(&names.participant_total), &METADATA);
        let subscribe_attempts =
            recorder.register_counter(&subscribe_key(STATE_ATTEMPT), &METADATA);
        let subscribe_successes =
            recorder.register_counter(&subscribe_key(STATE_SUCCESS), &METADATA);

        info!(
            target: "room_telemetry.init",
            node_id = %config.node_id,
            node_type = config.node_type.as_str(),
            env = %config.env,
            namespace = %config.namespace,
            exposition = exposition.is_some(),
            "Room telemetry initialized"
        );

        Self {
            config,
            names,
            identity,
            recorder,
            exposition,
            mirrors: MirrorCounters::new(),
            room_total,
            room_duration,
            participant_total,
            subscribe_attempts,
            subscribe_successes,
            kinds: Default::default(),
        }
    }

    /// Key for `name` with the identity labels followed by `labels`.
    fn key(&self, name: &str, labels: &[(&'static str, &str)]) -> Key {
        let mut all = self.identity.clone();
        all.extend(
            labels
                .iter()
                .map(|(key, value)| Label::new(*key, (*value).to_owned())),
        );
        Key::from_parts(name.to_owned(), all)
    }

    fn gauge(&self, name: &str, labels: &[(&'static str, &str)]) -> Gauge {
        self.recorder
            .register_gauge(&self.key(name, labels), &METADATA)
    }

    fn counter(&self, name: &str, labels: &[(&'static str, &str)]) -> Counter {
        self.recorder
            .register_counter(&self.key(name, labels), &METADATA)
    }

    fn kind_series(&self, kind: &str) -> Option<&KindSeries> {
        KNOWN_KINDS
            .iter()
            .position(|known| known.as_str() == kind)
            .and_then(|idx| self.kinds.get(idx))
    }

    fn published_gauge(&self, kind: &str) -> Gauge {
        let register = || self.gauge(&self.names.track_published, &[("kind", kind)]);
        match self.kind_series(kind) {
            Some(series) => series.published.get_or_init(register).clone(),
            None => register(),
        }
    }

    fn subscribed_gauge(&self, kind: &str) -> Gauge {
        let register = || self.gauge(&self.names.track_subscribed, &[("kind", kind)]);
        match self.kind_series(kind) {
            Some(series) => series.subscribed.get_or_init(register).clone(),
            None => register(),
        }
    }

    fn publish_counter(&self, kind: &str, state: &'static str) -> Counter {
        let register = || {
            self.counter(
                &self.names.track_publish_counter,
                &[("kind", kind), ("state", state)],
            )
        };
        match (self.kind_series(kind), state) {
            (Some(series), STATE_ATTEMPT) => series.publish_attempts.get_or_init(register).clone(),
            (Some(series), STATE_SUCCESS) => {
                series.publish_successes.get_or_init(register).clone()
            }
            _ => register(),
        }
    }

    // ========================================================================
    // Rooms
    // ========================================================================

    /// A room became live.
    pub fn room_started(&self) {
        self.room_total.increment(1.0);
        self.mirrors.room_started();
    }

    /// A room ended.
    ///
    /// When `started_at` is set, the room lifetime is observed in
    /// `room_duration_seconds`. A missing start time, or one at or before the
    /// Unix epoch, skips the observation. A start time in the future (clock
    /// skew) is observed as zero seconds rather than a negative duration. The
    /// room gauge decreases either way.
    pub fn room_ended(&self, started_at: Option<DateTime<Utc>>) {
        if let Some(started_at) = started_at.filter(|t| t.timestamp() > 0) {
            self.room_duration
                .record(elapsed_seconds(started_at, Utc::now()));
        }
        self.room_total.decrement(1.0);
        self.mirrors.room_ended();
    }

    // ========================================================================
    // Participants
    // ========================================================================

    /// A participant joined a room.
    pub fn add_participant(&self) {
        self.participant_total.increment(1.0);
        self.mirrors.participant_added();
    }

    /// A participant left a room.
    pub fn sub_participant(&self) {
        self.participant_total.decrement(1.0);
        self.mirrors.participant_removed();
    }

    // ========================================================================
    // Publishing
    // ========================================================================

    /// A track of `kind` was published.
    pub fn add_published_track(&self, kind: impl AsRef<str>) {
        self.published_gauge(kind.as_ref()).increment(1.0);
        self.mirrors.track_published();
    }

    /// A track of `kind` was unpublished.
    pub fn sub_published_track(&self, kind: impl AsRef<str>) {
        self.published_gauge(kind.as_ref()).decrement(1.0);
        self.mirrors.track_unpublished();
    }

    pub fn add_publish_attempt(&self, kind: impl AsRef<str>) {
        self.mirrors.publish_attempted();
        self.publish_counter(kind.as_ref(), STATE_ATTEMPT)
            .increment(1);
    }

    pub fn add_publish_success(&self, kind: impl AsRef<str>) {
        self.mirrors.publish_succeeded();
        self.publish_counter(kind.as_ref(), STATE_SUCCESS)
            .increment(1);
    }

    // ========================================================================
    // Subscribing
    // ========================================================================

    pub fn record_track_subscribe_attempt(&self) {
        self.mirrors.subscribe_attempted();
        self.subscribe_attempts.increment(1);
    }

    /// A subscription to a track of `kind` was established.
    ///
    /// Moves both the live subscription gauge and the cumulative success
    /// counter.
    pub fn record_track_subscribe_success(&self, kind: impl AsRef<str>) {
        self.subscribed_gauge(kind.as_ref()).increment(1.0);
        self.subscribe_successes.increment(1);
        self.mirrors.subscribe_succeeded();
    }

    /// A subscription to a track of `kind` was torn down.
    ///
    /// Only the live gauge moves. Counters feed rate computations and are
    /// never decremented.
    pub fn record_track_unsubscribed(&self, kind: impl AsRef<str>) {
        self.subscribed_gauge(kind.as_ref()).decrement(1.0);
        self.mirrors.unsubscribed();
    }

    /// A subscribe attempt failed with `err`.
    ///
    /// The error's message becomes the `error` label verbatim. Callers must
    /// keep the set of messages bounded.
    pub fn record_track_subscribe_failure(&self, err: impl fmt::Display, is_user_error: bool) {
        self.record_failure(&err.to_string(), is_user_error);
    }

    /// A subscribe attempt failed for a classified `reason`.
    pub fn record_track_subscribe_failure_reason(&self, reason: SubscribeFailureReason) {
        self.record_failure(reason.as_str(), reason.is_user_error());
    }

    fn record_failure(&self, error: &str, is_user_error: bool) {
        self.counter(
            &self.names.track_subscribe_counter,
            &[("state", STATE_FAILURE), ("error", error)],
        )
        .increment(1);

        if is_user_error {
            self.mirrors.subscribe_user_error();
        }

        debug!(
            target: "room_telemetry.track",
            error = %error,
            user_error = is_user_error,
            "Track subscribe failed"
        );
    }

    // ========================================================================
    // Readers
    // ========================================================================

    /// Identity this facade was built with.
    #[must_use]
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Shared handle to the in-process mirrors.
    #[must_use]
    pub fn mirrors(&self) -> &Arc<MirrorCounters> {
        &self.mirrors
    }

    /// Current value of every mirror.
    #[must_use]
    pub fn snapshot(&self) -> MirrorSnapshot {
        self.mirrors.snapshot()
    }

    /// Prometheus handle for serving the registry, if this facade owns one.
    #[must_use]
    pub fn prometheus_handle(&self) -> Option<PrometheusHandle> {
        self.exposition.clone()
    }

    /// Render the registry in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.exposition.as_ref().map(PrometheusHandle::render)
    }

    /// Drain buffered histogram observations into the registry.
    ///
    /// Rendering also drains them, so a host that scrapes on a short
    /// interval does not need this. Others should call it on a timer.
    /// No-op for facades built with [`with_recorder`](Self::with_recorder).
    pub fn run_upkeep(&self) {
        if let Some(handle) = &self.exposition {
            handle.run_upkeep();
        }
    }
}

fn describe(recorder: &dyn Recorder, names: &SeriesNames) {
    let gauges = [
        (&names.room_total, "Number of live rooms"),
        (&names.participant_total, "Number of live participants across all rooms"),
        (&names.track_published, "Number of live published tracks by kind"),
        (&names.track_subscribed, "Number of live track subscriptions by kind"),
    ];
    for (name, help) in gauges {
        recorder.describe_gauge(KeyName::from(name.clone()), None, SharedString::from(help));
    }

    recorder.describe_histogram(
        KeyName::from(names.room_duration.clone()),
        Some(Unit::Seconds),
        SharedString::from("Room lifetime measured when the room ends"),
    );
    recorder.describe_counter(
        KeyName::from(names.track_publish_counter.clone()),
        None,
        SharedString::from("Track publish events by kind and state"),
    );
    recorder.describe_counter(
        KeyName::from(names.track_subscribe_counter.clone()),
        None,
        SharedString::from("Track subscribe events by state and error"),
    );
}

/// Seconds between `started_at` and `now`, clamped at zero.
fn elapsed_seconds(started_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    match now.signed_duration_since(started_at).to_std() {
        Ok(elapsed) => elapsed.as_secs_f64(),
        Err(_) => {
            debug!(
                target: "room_telemetry.room",
                started_at = %started_at,
                "Room start time is in the future, recording zero duration"
            );
            0.0
        }
    }
}
