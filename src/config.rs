//! Engine configuration.
//!
//! Defaults reproduce the behavior of the shipped dashboard. The scaling
//! choices (humidity clamp, pressure padding, label precision threshold)
//! are empirical UI tuning, so they are configuration rather than
//! invariants.

use serde::{Deserialize, Serialize};

use crate::storage::RetentionPolicy;

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum number of samples retained, enforced on every mutation.
    pub history_capacity: usize,
    /// Maximum sample age in milliseconds, enforced on every mutation.
    pub history_max_age_ms: i64,
    /// Telemetry polling cadence.
    pub poll_interval_ms: u64,
    /// Trailing duration rendered by both charts.
    pub chart_window_ms: i64,
    /// Humidity axis always spans at least this floor...
    pub humidity_floor: f32,
    /// ...and this ceiling.
    pub humidity_ceiling: f32,
    /// Pressure axis padding as a fraction of the observed span.
    pub pressure_pad_factor: f32,
    /// Minimum pressure axis padding in mmHg.
    pub pressure_min_pad: f32,
    /// Time-axis labels include seconds when the domain is shorter than this.
    pub seconds_label_threshold_ms: i64,
    /// Idle time before a shown tooltip starts hiding.
    pub tooltip_idle_timeout_ms: i64,
    /// Duration of the tooltip fade-out.
    pub tooltip_fade_ms: i64,
    /// Margin kept between the tooltip and the surface edges.
    pub tooltip_margin_px: u32,
    /// Offset applied when formatting wall-clock labels.
    pub utc_offset_minutes: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: 2000,
            history_max_age_ms: DAY_MS,
            poll_interval_ms: 60_000,
            chart_window_ms: DAY_MS,
            humidity_floor: 0.0,
            humidity_ceiling: 100.0,
            pressure_pad_factor: 0.10,
            pressure_min_pad: 0.5,
            seconds_label_threshold_ms: 6 * HOUR_MS,
            tooltip_idle_timeout_ms: 3_000,
            tooltip_fade_ms: 180,
            tooltip_margin_px: 10,
            utc_offset_minutes: 0,
        }
    }
}

impl EngineConfig {
    /// Retention policy for the sample store.
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            capacity: self.history_capacity,
            max_age_ms: self.history_max_age_ms,
        }
    }
}
