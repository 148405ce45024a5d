//! Nearest-sample tooltip lookup and show/hide timing.

use core::fmt::Write as _;

use embedded_graphics::prelude::*;

use crate::config::EngineConfig;
use crate::sample::{AxisFamily, Sample, hpa_to_mmhg};
use crate::visibility::VisibilityController;

use super::clock_label;
use super::constants::{FONT_ADVANCE_PX, TOOLTIP_LINE_HEIGHT_PX, TOOLTIP_PADDING_PX};
use super::frame::ProjectionFrame;
use super::renderer::ChartKind;

/// Upper bounds for tooltip content buffers.
pub const MAX_TOOLTIP_LINES: usize = 6;
pub const MAX_TOOLTIP_TEXT: usize = 28;

/// One formatted row: a series label and its value (or `--` when absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipLine {
    pub label: &'static str,
    pub text: heapless::String<MAX_TOOLTIP_TEXT>,
}

/// Resolved tooltip: a time heading, one row per visible series, and an
/// anchor already clamped inside the chart surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipContent {
    pub time_label: heapless::String<16>,
    pub lines: heapless::Vec<TooltipLine, MAX_TOOLTIP_LINES>,
    pub anchor: Point,
}

/// Find the sample nearest to the pointer and format a summary.
///
/// The pointer's x is clamped into the plot area and inverted to a
/// timestamp; the frame's window is then scanned linearly for the closest
/// sample that has at least one finite value among this chart's visible
/// series. Symmetric-distance ties go to the later sample; duplicate
/// timestamps keep the first seen. Returns `None` when no sample qualifies,
/// leaving any currently shown tooltip untouched.
pub fn resolve(
    frame: &ProjectionFrame,
    kind: ChartKind,
    visibility: &VisibilityController,
    pointer: Point,
    config: &EngineConfig,
) -> Option<TooltipContent> {
    let target_ts = frame.domain.invert(pointer.x as f32, &frame.geometry);
    let specs = kind.series();

    let mut best: Option<&Sample> = None;
    let mut best_delta = i64::MAX;
    for sample in &frame.samples {
        let relevant = specs
            .iter()
            .any(|spec| visibility.is_visible(spec.key) && spec.key.plot_value(sample).is_some());
        if !relevant {
            continue;
        }
        let delta = (sample.timestamp_ms - target_ts).abs();
        let wins = delta < best_delta
            || (delta == best_delta
                && best.is_some_and(|held| sample.timestamp_ms > held.timestamp_ms));
        if wins {
            best = Some(sample);
            best_delta = delta;
        }
    }
    let sample = best?;

    let time_label = clock_label(sample.timestamp_ms, config.utc_offset_minutes, true);
    let mut lines: heapless::Vec<TooltipLine, MAX_TOOLTIP_LINES> = heapless::Vec::new();
    for spec in specs {
        if !visibility.is_visible(spec.key) {
            continue;
        }
        let mut text: heapless::String<MAX_TOOLTIP_TEXT> = heapless::String::new();
        match (spec.key.axis(), spec.key.sample_value(sample)) {
            (AxisFamily::Pressure, Some(hpa)) => {
                let _ = write!(text, "{:.1} mmHg ({hpa:.1} hPa)", hpa_to_mmhg(hpa));
            }
            (family, Some(value)) => {
                let _ = write!(text, "{value:.1}{}", family.unit());
            }
            (_, None) => {
                let _ = text.push_str("--");
            }
        }
        let _ = lines.push(TooltipLine {
            label: spec.key.label(),
            text,
        });
    }

    let anchor = clamp_anchor(pointer, frame, &time_label, &lines, config);
    Some(TooltipContent {
        time_label,
        lines,
        anchor,
    })
}

/// Rough pixel extent of the rendered tooltip, from its mono-font content.
fn estimate_extent(time_label: &str, lines: &[TooltipLine]) -> (i32, i32) {
    let mut widest = time_label.chars().count();
    for line in lines {
        widest = widest.max(line.label.chars().count() + 2 + line.text.chars().count());
    }
    let width = widest as i32 * FONT_ADVANCE_PX + 2 * TOOLTIP_PADDING_PX;
    let height = (lines.len() as i32 + 1) * TOOLTIP_LINE_HEIGHT_PX + 2 * TOOLTIP_PADDING_PX;
    (width, height)
}

/// Offset the tooltip from the pointer and keep it inside the chart bounds
/// minus the configured margin.
fn clamp_anchor(
    pointer: Point,
    frame: &ProjectionFrame,
    time_label: &str,
    lines: &[TooltipLine],
    config: &EngineConfig,
) -> Point {
    let bounds = frame.geometry.bounds;
    let margin = config.tooltip_margin_px as i32;
    let (width, height) = estimate_extent(time_label, lines);

    let rel_x = pointer.x - bounds.top_left.x;
    let rel_y = pointer.y - bounds.top_left.y;
    let left = (rel_x + margin)
        .max(margin)
        .min(bounds.size.width as i32 - width - margin);
    let top = (rel_y + margin)
        .max(margin)
        .min(bounds.size.height as i32 - height - margin);
    bounds.top_left + Point::new(left, top)
}

/// Tooltip lifecycle, driven by an injected clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPhase {
    Hidden,
    Visible,
    /// Fading out; treated as still shown until the fade elapses.
    Fading,
}

/// Hide timing for the tooltip overlay: content idles out after a timeout,
/// fades briefly, and any re-show cancels the pending hide.
#[derive(Debug, Clone, Copy)]
pub struct TooltipState {
    phase: TooltipPhase,
    deadline_ms: i64,
}

impl Default for TooltipState {
    fn default() -> Self {
        Self {
            phase: TooltipPhase::Hidden,
            deadline_ms: 0,
        }
    }
}

impl TooltipState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    /// Content was (re)shown; restarts the idle countdown.
    pub fn shown(&mut self, now_ms: i64, idle_timeout_ms: i64) {
        self.phase = TooltipPhase::Visible;
        self.deadline_ms = now_ms + idle_timeout_ms;
    }

    /// Pointer left the chart; start fading immediately.
    pub fn pointer_left(&mut self, now_ms: i64, fade_ms: i64) {
        if self.phase == TooltipPhase::Visible {
            self.phase = TooltipPhase::Fading;
            self.deadline_ms = now_ms + fade_ms;
        }
    }

    /// Advance the state machine and return the current phase.
    pub fn tick(&mut self, now_ms: i64, fade_ms: i64) -> TooltipPhase {
        match self.phase {
            TooltipPhase::Visible if now_ms >= self.deadline_ms => {
                self.phase = TooltipPhase::Fading;
                self.deadline_ms = now_ms + fade_ms;
            }
            TooltipPhase::Fading if now_ms >= self.deadline_ms => {
                self.phase = TooltipPhase::Hidden;
            }
            _ => {}
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::constants::WEATHER_MARGINS;
    use crate::chart::projector::{PlotGeometry, TimeDomain, ValueScale};
    use embedded_graphics::primitives::Rectangle;

    fn temp_sample(ts: i64, temp: Option<f32>) -> Sample {
        Sample {
            timestamp_ms: ts,
            temperature_c: temp,
            ..Sample::default()
        }
    }

    fn frame_over(samples: &[Sample]) -> ProjectionFrame {
        let geometry = PlotGeometry::new(
            Rectangle::new(Point::zero(), Size::new(640, 320)),
            WEATHER_MARGINS,
        )
        .unwrap();
        ProjectionFrame {
            domain: TimeDomain {
                first_ts: samples[0].timestamp_ms,
                last_ts: samples[samples.len() - 1].timestamp_ms,
            },
            geometry,
            temperature: ValueScale::tight(&[10.0, 12.0]),
            humidity: None,
            pressure: None,
            samples: samples.to_vec(),
        }
    }

    fn pointer_at(frame: &ProjectionFrame, ts: i64) -> Point {
        Point::new(frame.domain.project(ts, &frame.geometry) as i32, 60)
    }

    #[test]
    fn resolves_the_nearest_sample() {
        let samples = [
            temp_sample(0, Some(10.0)),
            temp_sample(1_000, Some(11.0)),
            temp_sample(2_000, Some(12.0)),
        ];
        let frame = frame_over(&samples);
        let visibility = VisibilityController::new();
        let config = EngineConfig::default();

        // 900 is nearest to 1000.
        let content = resolve(
            &frame,
            ChartKind::Weather,
            &visibility,
            pointer_at(&frame, 900),
            &config,
        )
        .unwrap();
        assert_eq!(content.time_label.as_str(), "00:00:01");

        // 1500 sits exactly between 1000 and 2000; the later sample wins.
        let content = resolve(
            &frame,
            ChartKind::Weather,
            &visibility,
            pointer_at(&frame, 1_500),
            &config,
        )
        .unwrap();
        assert_eq!(content.time_label.as_str(), "00:00:02");
    }

    #[test]
    fn skips_samples_with_no_visible_finite_series() {
        let samples = [
            temp_sample(0, Some(10.0)),
            temp_sample(1_000, None), // nothing to show here
            temp_sample(2_000, Some(12.0)),
        ];
        let frame = frame_over(&samples);
        let content = resolve(
            &frame,
            ChartKind::Weather,
            &VisibilityController::new(),
            pointer_at(&frame, 1_100),
            &EngineConfig::default(),
        )
        .unwrap();
        // 1000 would be nearest but is blank; 2000 is the nearest eligible.
        assert_eq!(content.time_label.as_str(), "00:00:02");
    }

    #[test]
    fn no_eligible_sample_resolves_to_none() {
        let samples = [temp_sample(0, None), temp_sample(1_000, None)];
        let frame = frame_over(&samples);
        assert!(
            resolve(
                &frame,
                ChartKind::Weather,
                &VisibilityController::new(),
                pointer_at(&frame, 500),
                &EngineConfig::default(),
            )
            .is_none()
        );
    }

    #[test]
    fn lines_cover_visible_series_with_dashes_for_absent_values() {
        let mut samples = [temp_sample(0, Some(10.0)), temp_sample(1_000, Some(12.0))];
        samples[1].humidity_pct = Some(55.0);
        let frame = frame_over(&samples);
        let content = resolve(
            &frame,
            ChartKind::Weather,
            &VisibilityController::new(),
            pointer_at(&frame, 1_000),
            &EngineConfig::default(),
        )
        .unwrap();

        assert_eq!(content.lines.len(), 4);
        assert_eq!(content.lines[0].label, "Temp in");
        assert_eq!(content.lines[0].text.as_str(), "12.0°C");
        assert_eq!(content.lines[1].text.as_str(), "--");
        assert_eq!(content.lines[2].text.as_str(), "55.0%");
    }

    #[test]
    fn pressure_lines_show_both_units() {
        let sample = Sample {
            timestamp_ms: 1_000,
            pressure_hpa: Some(1000.0),
            ..Sample::default()
        };
        let samples = [sample, Sample {
            timestamp_ms: 2_000,
            pressure_hpa: Some(1001.0),
            ..Sample::default()
        }];
        let frame = frame_over(&samples);
        let content = resolve(
            &frame,
            ChartKind::Pressure,
            &VisibilityController::new(),
            pointer_at(&frame, 1_000),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(content.lines[0].label, "Indoor");
        assert_eq!(content.lines[0].text.as_str(), "750.1 mmHg (1000.0 hPa)");
    }

    #[test]
    fn anchor_stays_inside_the_surface() {
        let samples = [temp_sample(0, Some(10.0)), temp_sample(1_000, Some(12.0))];
        let frame = frame_over(&samples);
        let config = EngineConfig::default();
        let bounds = frame.geometry.bounds;

        // Pointer in the far bottom-right corner.
        let content = resolve(
            &frame,
            ChartKind::Weather,
            &VisibilityController::new(),
            Point::new(639, 319),
            &config,
        )
        .unwrap();
        let margin = config.tooltip_margin_px as i32;
        assert!(content.anchor.x + margin < bounds.size.width as i32);
        assert!(content.anchor.y + margin < bounds.size.height as i32);
    }

    #[test]
    fn hide_timing_idles_fades_and_cancels_on_reshow() {
        let mut state = TooltipState::new();
        assert_eq!(state.phase(), TooltipPhase::Hidden);

        state.shown(0, 3_000);
        assert_eq!(state.tick(2_999, 180), TooltipPhase::Visible);
        assert_eq!(state.tick(3_000, 180), TooltipPhase::Fading);
        assert_eq!(state.tick(3_179, 180), TooltipPhase::Fading);
        assert_eq!(state.tick(3_180, 180), TooltipPhase::Hidden);

        // Re-show cancels a pending hide.
        state.shown(4_000, 3_000);
        assert_eq!(state.tick(6_000, 180), TooltipPhase::Visible);
        state.shown(6_500, 3_000);
        assert_eq!(state.tick(7_400, 180), TooltipPhase::Visible);

        // Pointer leave fades straight away.
        state.pointer_left(7_500, 180);
        assert_eq!(state.tick(7_679, 180), TooltipPhase::Fading);
        assert_eq!(state.tick(7_680, 180), TooltipPhase::Hidden);
    }
}
