//! Bounded, time-ordered ring of telemetry samples.

extern crate alloc;
use alloc::collections::VecDeque;
use alloc::vec::Vec;

use log::debug;

use crate::sample::Sample;

/// Retention bounds enforced on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Maximum number of samples kept.
    pub capacity: usize,
    /// Maximum sample age relative to "now", in milliseconds.
    pub max_age_ms: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            capacity: 2000,
            max_age_ms: 24 * 60 * 60 * 1000,
        }
    }
}

/// Ordered, age- and count-bounded buffer of [`Sample`]s.
///
/// Invariants, re-established by every mutation:
/// - samples are sorted ascending by `timestamp_ms` (duplicates allowed,
///   arrival order preserved);
/// - no sample is older than `max_age_ms` relative to the `now_ms` passed
///   to the mutating call;
/// - `len() <= capacity`, evicting oldest-first.
///
/// The store never trusts persisted input: [`SampleStore::load`] re-sorts,
/// re-filters and re-caps whatever it is given.
#[derive(Debug, Default)]
pub struct SampleStore {
    samples: VecDeque<Sample>,
    policy: RetentionPolicy,
}

impl SampleStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            samples: VecDeque::with_capacity(policy.capacity.min(2048)),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Iterate the full buffer in time order.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Insert a sample and re-enforce retention.
    ///
    /// The hot path is a tail append; a positional insert keeps the sort
    /// invariant when a sample arrives out of order.
    pub fn append(&mut self, sample: Sample, now_ms: i64) {
        let sample = sample.sanitized();
        let in_order = self
            .samples
            .back()
            .is_none_or(|last| last.timestamp_ms <= sample.timestamp_ms);
        if in_order {
            self.samples.push_back(sample);
        } else {
            let at = self
                .samples
                .partition_point(|s| s.timestamp_ms <= sample.timestamp_ms);
            self.samples.insert(at, sample);
        }
        self.prune(now_ms);
    }

    /// Evict from the front until both retention bounds hold.
    pub fn prune(&mut self, now_ms: i64) {
        let mut evicted = 0usize;
        while self.samples.len() > self.policy.capacity {
            self.samples.pop_front();
            evicted += 1;
        }
        let cutoff = now_ms - self.policy.max_age_ms;
        while self
            .samples
            .front()
            .is_some_and(|s| s.timestamp_ms < cutoff)
        {
            self.samples.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!("evicted {evicted} expired samples, {} kept", self.samples.len());
        }
    }

    /// Lazy view of the suffix no older than `duration_ms` before `now_ms`.
    pub fn window(&self, duration_ms: i64, now_ms: i64) -> impl Iterator<Item = &Sample> {
        let cutoff = now_ms - duration_ms;
        let start = self.samples.partition_point(|s| s.timestamp_ms < cutoff);
        self.samples.iter().skip(start)
    }

    /// Plain-record copy of the buffer, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Replace the buffer with a repaired version of `records`.
    ///
    /// Out-of-order input is re-sorted, expired samples are dropped, and
    /// when the count bound is exceeded the newest samples win.
    pub fn load(&mut self, records: Vec<Sample>, now_ms: i64) {
        let cutoff = now_ms - self.policy.max_age_ms;
        let mut records: Vec<Sample> = records
            .into_iter()
            .map(Sample::sanitized)
            .filter(|s| s.timestamp_ms >= cutoff)
            .collect();
        records.sort_by_key(|s| s.timestamp_ms);
        let skip = records.len().saturating_sub(self.policy.capacity);
        self.samples = records.into_iter().skip(skip).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ts: i64, temp: f32) -> Sample {
        Sample {
            timestamp_ms: ts,
            temperature_c: Some(temp),
            ..Sample::default()
        }
    }

    fn assert_invariants(store: &SampleStore, now_ms: i64) {
        let policy = store.policy();
        assert!(store.len() <= policy.capacity);
        let mut prev = i64::MIN;
        for sample in store.iter() {
            assert!(sample.timestamp_ms >= prev, "buffer must stay sorted");
            assert!(now_ms - sample.timestamp_ms <= policy.max_age_ms);
            prev = sample.timestamp_ms;
        }
    }

    #[test]
    fn append_enforces_capacity_and_age_after_every_call() {
        let mut store = SampleStore::new(RetentionPolicy {
            capacity: 5,
            max_age_ms: 10_000,
        });
        // Deliberately interleaved timestamps, advancing "now" as we go.
        let arrivals = [0i64, 3_000, 1_000, 9_000, 6_000, 12_000, 11_000, 20_000];
        for (i, ts) in arrivals.into_iter().enumerate() {
            let now = ts.max(arrivals[..=i].iter().copied().max().unwrap_or(0));
            store.append(at(ts, 20.0), now);
            assert_invariants(&store, now);
        }
        // now = 20_000, max age 10s: everything below 10_000 is gone.
        assert!(store.iter().all(|s| s.timestamp_ms >= 10_000));
    }

    #[test]
    fn out_of_order_append_keeps_sort() {
        let mut store = SampleStore::new(RetentionPolicy {
            capacity: 10,
            max_age_ms: 100_000,
        });
        store.append(at(1_000, 1.0), 1_000);
        store.append(at(3_000, 3.0), 3_000);
        store.append(at(2_000, 2.0), 3_000);
        let times: Vec<i64> = store.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(times, [1_000, 2_000, 3_000]);
    }

    #[test]
    fn duplicate_timestamps_keep_arrival_order() {
        let mut store = SampleStore::new(RetentionPolicy::default());
        store.append(at(1_000, 1.0), 1_000);
        store.append(at(1_000, 2.0), 1_000);
        let values: Vec<f32> = store.iter().filter_map(|s| s.temperature_c).collect();
        assert_eq!(values, [1.0, 2.0]);
    }

    #[test]
    fn window_returns_trailing_suffix_only() {
        let mut store = SampleStore::new(RetentionPolicy::default());
        for ts in [0i64, 30_000, 60_000, 90_000] {
            store.append(at(ts, 20.0), ts);
        }
        let times: Vec<i64> = store.window(45_000, 90_000).map(|s| s.timestamp_ms).collect();
        assert_eq!(times, [60_000, 90_000]);
    }

    #[test]
    fn load_snapshot_round_trip_preserves_order_and_content() {
        let mut store = SampleStore::new(RetentionPolicy::default());
        for ts in [1_000i64, 2_000, 3_000] {
            store.append(at(ts, ts as f32), 3_000);
        }
        let snapshot = store.snapshot();

        let mut restored = SampleStore::new(RetentionPolicy::default());
        restored.load(snapshot.clone(), 3_000);
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn load_repairs_unordered_expired_and_oversized_input() {
        let mut store = SampleStore::new(RetentionPolicy {
            capacity: 2,
            max_age_ms: 50_000,
        });
        let records = alloc::vec![
            at(90_000, 9.0),
            at(10_000, 1.0), // expired at now = 100_000
            at(70_000, 7.0),
            at(80_000, 8.0),
        ];
        store.load(records, 100_000);
        let times: Vec<i64> = store.iter().map(|s| s.timestamp_ms).collect();
        // Newest two survive the cap, in sorted order.
        assert_eq!(times, [80_000, 90_000]);
    }
}
