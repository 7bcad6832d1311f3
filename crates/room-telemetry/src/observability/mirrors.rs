//! In-process mirrors of the exported series.
//!
//! Each mirror is a signed 32-bit atomic updated alongside its series so
//! health probes and admission control can read current load without
//! rendering the registry. Values wrap on overflow and may go negative if
//! callers pair add/sub incorrectly.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Atomic counters shared between the facade and its readers.
#[derive(Debug, Default)]
pub struct MirrorCounters {
    room_current: AtomicI32,
    participant_current: AtomicI32,
    track_published_current: AtomicI32,
    track_subscribed_current: AtomicI32,
    track_publish_attempts: AtomicI32,
    track_publish_success: AtomicI32,
    track_subscribe_attempts: AtomicI32,
    track_subscribe_success: AtomicI32,
    /// Failures caused by the subscriber (permissions, missing track).
    track_subscribe_user_error: AtomicI32,
}

/// Snapshot of all mirrors at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSnapshot {
    pub room_current: i32,
    pub participant_current: i32,
    pub track_published_current: i32,
    pub track_subscribed_current: i32,
    pub track_publish_attempts: i32,
    pub track_publish_success: i32,
    pub track_subscribe_attempts: i32,
    pub track_subscribe_success: i32,
    pub track_subscribe_user_error: i32,
}

#[inline]
fn inc(counter: &AtomicI32) {
    counter.fetch_add(1, Ordering::SeqCst);
}

#[inline]
fn dec(counter: &AtomicI32) {
    counter.fetch_sub(1, Ordering::SeqCst);
}

impl MirrorCounters {
    /// Create a new shared mirror set.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn room_started(&self) {
        inc(&self.room_current);
    }

    pub(crate) fn room_ended(&self) {
        dec(&self.room_current);
    }

    pub(crate) fn participant_added(&self) {
        inc(&self.participant_current);
    }

    pub(crate) fn participant_removed(&self) {
        dec(&self.participant_current);
    }

    pub(crate) fn track_published(&self) {
        inc(&self.track_published_current);
    }

    pub(crate) fn track_unpublished(&self) {
        dec(&self.track_published_current);
    }

    pub(crate) fn publish_attempted(&self) {
        inc(&self.track_publish_attempts);
    }

    pub(crate) fn publish_succeeded(&self) {
        inc(&self.track_publish_success);
    }

    pub(crate) fn subscribe_attempted(&self) {
        inc(&self.track_subscribe_attempts);
    }

    /// A successful subscribe opens a subscription and counts a success.
    pub(crate) fn subscribe_succeeded(&self) {
        inc(&self.track_subscribed_current);
        inc(&self.track_subscribe_success);
    }

    pub(crate) fn unsubscribed(&self) {
        dec(&self.track_subscribed_current);
    }

    pub(crate) fn subscribe_user_error(&self) {
        inc(&self.track_subscribe_user_error);
    }

    /// Current number of live rooms.
    #[must_use]
    pub fn rooms(&self) -> i32 {
        self.room_current.load(Ordering::SeqCst)
    }

    /// Current number of participants across all rooms.
    #[must_use]
    pub fn participants(&self) -> i32 {
        self.participant_current.load(Ordering::SeqCst)
    }

    /// Current number of published tracks, all kinds.
    #[must_use]
    pub fn published_tracks(&self) -> i32 {
        self.track_published_current.load(Ordering::SeqCst)
    }

    /// Current number of subscriptions, all kinds.
    #[must_use]
    pub fn subscribed_tracks(&self) -> i32 {
        self.track_subscribed_current.load(Ordering::SeqCst)
    }

    /// Read every mirror.
    ///
    /// Fields are loaded one at a time; a concurrent event may land between
    /// two loads.
    #[must_use]
    pub fn snapshot(&self) -> MirrorSnapshot {
        MirrorSnapshot {
            room_current: self.room_current.load(Ordering::SeqCst),
            participant_current: self.participant_current.load(Ordering::SeqCst),
            track_published_current: self.track_published_current.load(Ordering::SeqCst),
            track_subscribed_current: self.track_subscribed_current.load(Ordering::SeqCst),
            track_publish_attempts: self.track_publish_attempts.load(Ordering::SeqCst),
            track_publish_success: self.track_publish_success.load(Ordering::SeqCst),
            track_subscribe_attempts: self.track_subscribe_attempts.load(Ordering::SeqCst),
            track_subscribe_success: self.track_subscribe_success.load(Ordering::SeqCst),
            track_subscribe_user_error: self.track_subscribe_user_error.load(Ordering::SeqCst),
        }
    }
}
