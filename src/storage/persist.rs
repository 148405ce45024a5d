//! Key/value persistence for the sample snapshot and legend flags.
//!
//! Encoding is JSON under the same two keys earlier releases wrote to
//! browser local storage, so existing snapshots keep hydrating. Persistence
//! is best-effort throughout: a failed write leaves the in-memory state
//! authoritative, and corrupt data loads as empty/default. Neither case is
//! ever fatal to rendering.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use log::warn;
use serde_json::Value;
use thiserror_no_std::Error;

use crate::sample::Sample;
use crate::visibility::VisibilityFlags;

/// Storage key for the sample snapshot (JSON array of records).
pub const HISTORY_KEY: &str = "weatherHistory";
/// Storage key for the legend visibility flags (JSON object of booleans).
pub const VISIBILITY_KEY: &str = "chartVisibility";

/// Minimal key/value backend: browser local storage, NVS, a file, anything
/// that stores small strings.
pub trait KvStore {
    type Error: core::fmt::Display;

    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// In-memory [`KvStore`], the reference backend and test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: alloc::collections::BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    type Error = core::convert::Infallible;

    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries.insert(String::from(key), String::from(value));
        Ok(())
    }
}

/// Codec failures surfaced to the log, never to callers.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot encode failed: {0}")]
    Encode(serde_json::Error),
    #[error("snapshot decode failed: {0}")]
    Decode(serde_json::Error),
}

fn encode_history(samples: &[Sample]) -> Result<String, PersistError> {
    serde_json::to_string(samples).map_err(PersistError::Encode)
}

fn decode_history(raw: &str) -> Result<Vec<Sample>, PersistError> {
    // Decode entry-by-entry so one mangled record does not poison the rest.
    let entries: Vec<Value> = serde_json::from_str(raw).map_err(PersistError::Decode)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<Sample>(entry).ok())
        .map(Sample::sanitized)
        .collect())
}

/// Load the persisted sample snapshot; corruption degrades to empty.
pub fn load_history<K: KvStore>(kv: &K) -> Vec<Sample> {
    let Some(raw) = kv.get(HISTORY_KEY) else {
        return Vec::new();
    };
    match decode_history(&raw) {
        Ok(samples) => samples,
        Err(err) => {
            warn!("discarding persisted history: {err}");
            Vec::new()
        }
    }
}

/// Persist the sample snapshot, swallowing failures.
pub fn save_history<K: KvStore>(kv: &mut K, samples: &[Sample]) {
    match encode_history(samples) {
        Ok(encoded) => {
            if let Err(err) = kv.put(HISTORY_KEY, &encoded) {
                warn!("history write failed: {err}");
            }
        }
        Err(err) => warn!("{err}"),
    }
}

/// Load the persisted visibility flags; corruption degrades to all-visible.
pub fn load_visibility<K: KvStore>(kv: &K) -> VisibilityFlags {
    let Some(raw) = kv.get(VISIBILITY_KEY) else {
        return VisibilityFlags::default();
    };
    match serde_json::from_str(&raw) {
        Ok(flags) => flags,
        Err(err) => {
            warn!("discarding persisted visibility flags: {err}");
            VisibilityFlags::default()
        }
    }
}

/// Persist the visibility flags, swallowing failures.
pub fn save_visibility<K: KvStore>(kv: &mut K, flags: &VisibilityFlags) {
    match serde_json::to_string(flags) {
        Ok(encoded) => {
            if let Err(err) = kv.put(VISIBILITY_KEY, &encoded) {
                warn!("visibility write failed: {err}");
            }
        }
        Err(err) => warn!("visibility encode failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_round_trips_through_the_store() {
        let mut kv = MemoryStore::new();
        let samples = vec![
            Sample {
                timestamp_ms: 1_000,
                temperature_c: Some(20.5),
                ..Sample::default()
            },
            Sample {
                timestamp_ms: 2_000,
                humidity_out_pct: Some(81.0),
                ..Sample::default()
            },
        ];
        save_history(&mut kv, &samples);
        assert_eq!(load_history(&kv), samples);
    }

    #[test]
    fn missing_and_corrupt_history_load_as_empty() {
        let mut kv = MemoryStore::new();
        assert!(load_history(&kv).is_empty());

        kv.put(HISTORY_KEY, "not json at all").unwrap();
        assert!(load_history(&kv).is_empty());

        kv.put(HISTORY_KEY, r#"{"unexpected": "object"}"#).unwrap();
        assert!(load_history(&kv).is_empty());
    }

    #[test]
    fn mangled_entries_are_skipped_not_fatal() {
        let mut kv = MemoryStore::new();
        kv.put(
            HISTORY_KEY,
            r#"[{"timestamp": 1000, "temperatureC": 20.0}, "garbage", {"timestamp": "oops"}, {"timestamp": 2000}]"#,
        )
        .unwrap();
        let samples = load_history(&kv);
        let times: Vec<i64> = samples.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(times, [1_000, 2_000]);
    }

    #[test]
    fn visibility_defaults_when_missing_or_corrupt() {
        let mut kv = MemoryStore::new();
        assert_eq!(load_visibility(&kv), VisibilityFlags::default());

        kv.put(VISIBILITY_KEY, "[]").unwrap();
        assert_eq!(load_visibility(&kv), VisibilityFlags::default());

        kv.put(VISIBILITY_KEY, r#"{ "humIn": false }"#).unwrap();
        let flags = load_visibility(&kv);
        assert!(!flags.hum_in);
        assert!(flags.temp_in);
    }
}
