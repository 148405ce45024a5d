//! Chart rendering for the telemetry dashboard.
//!
//! Two chart instances exist: the combined temperature/humidity chart with
//! independently scaled left/right axes, and the pressure chart. Both render
//! through any `embedded_graphics::DrawTarget<Color = Rgb565>`, so the
//! pipeline runs identically against a framebuffer, a display driver, or an
//! in-memory test target.
//!
//! Rendering is a full recomputation every pass: clear, grid, axis labels,
//! one polyline per eligible series, time ticks. Each pass leaves behind a
//! [`ProjectionFrame`] that the tooltip resolver inverts to answer pointer
//! queries without re-deriving geometry.

use core::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Utc};
use heapless::String;

pub mod constants;
mod frame;
pub mod projector;
mod renderer;
pub mod series;
pub mod tooltip;

pub use frame::ProjectionFrame;
pub use renderer::{Chart, ChartKind, ChartState};
pub use tooltip::{TooltipContent, TooltipLine, TooltipPhase, TooltipState};

/// Format a wall-clock label (`HH:MM` or `HH:MM:SS`) for a millisecond
/// timestamp, shifted by the configured UTC offset. Unrepresentable inputs
/// degrade to a placeholder rather than failing the render.
pub(crate) fn clock_label(
    ts_ms: i64,
    utc_offset_minutes: i32,
    with_seconds: bool,
) -> String<16> {
    let mut label: String<16> = String::new();
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
        .or_else(|| FixedOffset::east_opt(0));
    let (Some(offset), Some(utc)) = (offset, DateTime::<Utc>::from_timestamp_millis(ts_ms))
    else {
        let _ = label.push_str("--:--");
        return label;
    };
    let local = utc.with_timezone(&offset);
    let pattern = if with_seconds { "%H:%M:%S" } else { "%H:%M" };
    let _ = write!(label, "{}", local.format(pattern));
    label
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_labels_follow_the_offset_and_precision() {
        assert_eq!(clock_label(0, 0, true).as_str(), "00:00:00");
        assert_eq!(clock_label(0, 0, false).as_str(), "00:00");
        // 90 minutes east of UTC.
        assert_eq!(clock_label(0, 90, false).as_str(), "01:30");
        // 45_296_000 ms = 12:34:56 UTC.
        assert_eq!(clock_label(45_296_000, 0, true).as_str(), "12:34:56");
    }

    #[test]
    fn unrepresentable_timestamps_degrade_to_a_placeholder() {
        assert_eq!(clock_label(i64::MAX, 0, true).as_str(), "--:--");
    }
}
