//! End-to-end lifecycle scenarios against the Prometheus exposition.
//!
//! Each test builds its own facade so registries never leak between tests.
//! Identity: node_id="n1", node_type="SERVER", env="test".

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeDelta, Utc};
use room_telemetry::{NodeType, RoomTelemetry, TelemetryConfig, TrackKind};
use telemetry_test_utils::fixtures::{TEST_ENV, TEST_NODE_ID, TEST_NODE_TYPE};
use telemetry_test_utils::scrape::Scrape;

const ROOM_TOTAL: &str = "sfu_room_total";
const ROOM_DURATION: &str = "sfu_room_duration_seconds";
const PARTICIPANT_TOTAL: &str = "sfu_participant_total";
const PUBLISHED_TOTAL: &str = "sfu_track_published_total";
const SUBSCRIBED_TOTAL: &str = "sfu_track_subscribed_total";
const SUBSCRIBE_COUNTER: &str = "sfu_track_subscribe_counter";

fn telemetry() -> RoomTelemetry {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("room_telemetry=debug")
        .try_init();

    RoomTelemetry::new(TelemetryConfig::new(TEST_NODE_ID, NodeType::Server, TEST_ENV))
        .expect("telemetry should build")
}

fn scrape(telemetry: &RoomTelemetry) -> Scrape {
    Scrape::parse(&telemetry.render().expect("prometheus facade should render"))
}

/// Room, participant and published track on one node.
fn start_room_with_audio(telemetry: &RoomTelemetry) {
    telemetry.room_started();
    telemetry.add_participant();
    telemetry.add_published_track(TrackKind::Audio);
}

/// Three attempts, two successes, one user-caused failure.
fn subscribe_twice_fail_once(telemetry: &RoomTelemetry) {
    for _ in 0..3 {
        telemetry.record_track_subscribe_attempt();
    }
    for _ in 0..2 {
        telemetry.record_track_subscribe_success("video");
    }
    telemetry.record_track_subscribe_failure("denied", true);
}

#[test]
fn live_room_participant_and_track_are_exported() {
    let telemetry = telemetry();
    start_room_with_audio(&telemetry);

    let scrape = scrape(&telemetry);
    assert_eq!(scrape.value(ROOM_TOTAL, &[]), Some(1.0));
    assert_eq!(scrape.value(PARTICIPANT_TOTAL, &[]), Some(1.0));
    assert_eq!(scrape.value(PUBLISHED_TOTAL, &[("kind", "audio")]), Some(1.0));

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.room_current, 1);
    assert_eq!(snapshot.participant_current, 1);
    assert_eq!(snapshot.track_published_current, 1);
}

#[test]
fn every_series_carries_identity_labels() {
    let telemetry = telemetry();
    start_room_with_audio(&telemetry);
    subscribe_twice_fail_once(&telemetry);

    let scrape = scrape(&telemetry);
    assert!(!scrape.samples().is_empty());
    for sample in scrape.samples() {
        assert_eq!(sample.label("node_id"), Some(TEST_NODE_ID), "{sample:?}");
        assert_eq!(sample.label("node_type"), Some(TEST_NODE_TYPE), "{sample:?}");
        assert_eq!(sample.label("env"), Some(TEST_ENV), "{sample:?}");
    }
}

#[test]
fn teardown_returns_gauges_to_zero_and_observes_duration() {
    let telemetry = telemetry();
    start_room_with_audio(&telemetry);

    telemetry.sub_published_track(TrackKind::Audio);
    telemetry.sub_participant();
    telemetry.room_ended(Some(Utc::now() - TimeDelta::seconds(65)));

    let scrape = scrape(&telemetry);
    assert_eq!(scrape.value(ROOM_TOTAL, &[]), Some(0.0));
    assert_eq!(scrape.value(PARTICIPANT_TOTAL, &[]), Some(0.0));
    assert_eq!(scrape.value(PUBLISHED_TOTAL, &[("kind", "audio")]), Some(0.0));

    assert_eq!(scrape.histogram_count(ROOM_DURATION, &[]), Some(1.0));
    assert_eq!(scrape.bucket(ROOM_DURATION, 60.0, &[]), Some(0.0));
    assert_eq!(scrape.bucket(ROOM_DURATION, 300.0, &[]), Some(1.0));

    let sum = scrape
        .value(&format!("{ROOM_DURATION}_sum"), &[])
        .expect("histogram sum should be rendered");
    assert!((65.0..70.0).contains(&sum), "duration sum {sum} should be about 65s");

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.room_current, 0);
    assert_eq!(snapshot.participant_current, 0);
    assert_eq!(snapshot.track_published_current, 0);
}

#[test]
fn room_duration_uses_configured_buckets() {
    let telemetry = telemetry();
    telemetry.room_started();
    telemetry.room_ended(Some(Utc::now() - TimeDelta::hours(3)));

    let scrape = scrape(&telemetry);
    for le in [5.0, 10.0, 60.0, 300.0, 600.0, 1800.0, 3600.0] {
        assert_eq!(scrape.bucket(ROOM_DURATION, le, &[]), Some(0.0), "le={le}");
    }
    for le in [18000.0, 36000.0, f64::INFINITY] {
        assert_eq!(scrape.bucket(ROOM_DURATION, le, &[]), Some(1.0), "le={le}");
    }
    assert_eq!(scrape.bucket(ROOM_DURATION, 7200.0, &[]), Some(0.0));
}

#[test]
fn subscribe_attempts_successes_and_user_failure() {
    let telemetry = telemetry();
    subscribe_twice_fail_once(&telemetry);

    let scrape = scrape(&telemetry);
    assert_eq!(
        scrape.value(SUBSCRIBE_COUNTER, &[("state", "attempt"), ("error", "")]),
        Some(3.0)
    );
    assert_eq!(
        scrape.value(SUBSCRIBE_COUNTER, &[("state", "success"), ("error", "")]),
        Some(2.0)
    );
    assert_eq!(
        scrape.value(SUBSCRIBE_COUNTER, &[("state", "failure"), ("error", "denied")]),
        Some(1.0)
    );
    assert_eq!(scrape.value(SUBSCRIBED_TOTAL, &[("kind", "video")]), Some(2.0));

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.track_subscribe_attempts, 3);
    assert_eq!(snapshot.track_subscribe_success, 2);
    assert_eq!(snapshot.track_subscribe_user_error, 1);
    assert_eq!(snapshot.track_subscribed_current, 2);
}

#[test]
fn unsubscribe_moves_only_the_live_gauge() {
    let telemetry = telemetry();
    subscribe_twice_fail_once(&telemetry);

    telemetry.record_track_unsubscribed("video");
    telemetry.record_track_unsubscribed("video");

    let scrape = scrape(&telemetry);
    assert_eq!(scrape.value(SUBSCRIBED_TOTAL, &[("kind", "video")]), Some(0.0));
    assert_eq!(
        scrape.value(SUBSCRIBE_COUNTER, &[("state", "attempt"), ("error", "")]),
        Some(3.0)
    );
    assert_eq!(
        scrape.value(SUBSCRIBE_COUNTER, &[("state", "success"), ("error", "")]),
        Some(2.0)
    );
    assert_eq!(
        scrape.value(SUBSCRIBE_COUNTER, &[("state", "failure"), ("error", "denied")]),
        Some(1.0)
    );

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.track_subscribed_current, 0);
    assert_eq!(snapshot.track_subscribe_success, 2);
}

#[test]
fn room_ended_without_start_time_skips_histogram() {
    let telemetry = telemetry();
    telemetry.room_started();
    telemetry.room_started();

    let before = scrape(&telemetry)
        .histogram_count(ROOM_DURATION, &[])
        .unwrap_or(0.0);

    telemetry.room_ended(None);

    let scrape = scrape(&telemetry);
    assert_eq!(
        scrape.histogram_count(ROOM_DURATION, &[]).unwrap_or(0.0),
        before
    );
    assert_eq!(scrape.value(ROOM_TOTAL, &[]), Some(1.0));
    assert_eq!(telemetry.snapshot().room_current, 1);
}

#[test]
fn publish_counter_tracks_kind_and_state() {
    let telemetry = telemetry();

    telemetry.add_publish_attempt(TrackKind::Video);
    telemetry.add_publish_attempt(TrackKind::Video);
    telemetry.add_publish_attempt(TrackKind::Audio);
    telemetry.add_publish_success(TrackKind::Video);

    let scrape = scrape(&telemetry);
    let counter = "sfu_track_publish_counter";
    assert_eq!(
        scrape.value(counter, &[("kind", "video"), ("state", "attempt")]),
        Some(2.0)
    );
    assert_eq!(
        scrape.value(counter, &[("kind", "audio"), ("state", "attempt")]),
        Some(1.0)
    );
    assert_eq!(
        scrape.value(counter, &[("kind", "video"), ("state", "success")]),
        Some(1.0)
    );
    assert_eq!(scrape.value(counter, &[("kind", "audio"), ("state", "success")]), None);

    let snapshot = telemetry.snapshot();
    assert_eq!(snapshot.track_publish_attempts, 3);
    assert_eq!(snapshot.track_publish_success, 1);
}

#[test]
fn unbalanced_decrement_goes_negative() {
    let telemetry = telemetry();

    telemetry.sub_participant();

    let scrape = scrape(&telemetry);
    assert_eq!(scrape.value(PARTICIPANT_TOTAL, &[]), Some(-1.0));
    assert_eq!(telemetry.snapshot().participant_current, -1);
}

#[test]
fn separate_facades_do_not_share_state() {
    let first = telemetry();
    let second = telemetry();

    first.room_started();

    assert_eq!(scrape(&first).value(ROOM_TOTAL, &[]), Some(1.0));
    assert_eq!(scrape(&second).value(ROOM_TOTAL, &[]), Some(0.0));
    assert_eq!(second.snapshot().room_current, 0);
}
