//! Exact metric capture via `metrics-util`'s `DebuggingRecorder`.
//!
//! Lookups match the metric name and the full label list in order, so a
//! passing lookup also proves label ordering.

use metrics::{SharedString, Unit};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use metrics_util::{CompositeKey, MetricKind};
use std::sync::Arc;

type Entry = (CompositeKey, Option<Unit>, Option<SharedString>, DebugValue);

/// A fresh recorder (not installed globally) and its snapshotter.
pub fn debugging_recorder() -> (Arc<DebuggingRecorder>, Snapshotter) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (Arc::new(recorder), snapshotter)
}

/// One snapshot of every registered series.
///
/// Histogram observations are drained by the snapshot; take one snapshot per
/// assertion phase.
pub struct CapturedMetrics {
    entries: Vec<Entry>,
}

impl CapturedMetrics {
    pub fn take(snapshotter: &Snapshotter) -> Self {
        Self {
            entries: snapshotter.snapshot().into_vec(),
        }
    }

    fn find(&self, kind: MetricKind, name: &str, labels: &[(&str, &str)]) -> Option<&DebugValue> {
        self.entries
            .iter()
            .find(|(key, _, _, _)| {
                key.kind() == kind
                    && key.key().name() == name
                    && labels_equal(key, labels)
            })
            .map(|(_, _, _, value)| value)
    }

    pub fn gauge(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        match self.find(MetricKind::Gauge, name, labels)? {
            DebugValue::Gauge(value) => Some(value.0),
            _ => None,
        }
    }

    pub fn counter(&self, name: &str, labels: &[(&str, &str)]) -> Option<u64> {
        match self.find(MetricKind::Counter, name, labels)? {
            DebugValue::Counter(value) => Some(*value),
            _ => None,
        }
    }

    pub fn histogram(&self, name: &str, labels: &[(&str, &str)]) -> Option<Vec<f64>> {
        match self.find(MetricKind::Histogram, name, labels)? {
            DebugValue::Histogram(values) => Some(values.iter().map(|v| v.0).collect()),
            _ => None,
        }
    }

    /// Sum of every counter named `name` whose labels include `filter`.
    pub fn counter_sum(&self, name: &str, filter: &[(&str, &str)]) -> u64 {
        self.entries
            .iter()
            .filter(|(key, _, _, _)| {
                key.kind() == MetricKind::Counter
                    && key.key().name() == name
                    && labels_contain(key, filter)
            })
            .map(|(_, _, _, value)| match value {
                DebugValue::Counter(v) => *v,
                _ => 0,
            })
            .sum()
    }

    /// Number of registered series named `name`, any kind.
    pub fn series_count(&self, name: &str) -> usize {
        self.entries
            .iter()
            .filter(|(key, _, _, _)| key.key().name() == name)
            .count()
    }
}

fn labels_equal(key: &CompositeKey, expected: &[(&str, &str)]) -> bool {
    let actual: Vec<(&str, &str)> = key
        .key()
        .labels()
        .map(|label| (label.key(), label.value()))
        .collect();
    actual == expected
}

fn labels_contain(key: &CompositeKey, filter: &[(&str, &str)]) -> bool {
    filter.iter().all(|(name, value)| {
        key.key()
            .labels()
            .any(|label| label.key() == *name && label.value() == *value)
    })
}
