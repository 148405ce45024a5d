//! Constants for chart rendering.
//!
//! All magic numbers live here with descriptive names and units. Scaling
//! behavior that is tunable (humidity clamp, pressure padding, label
//! precision threshold) lives in [`crate::config::EngineConfig`] instead.

use embedded_graphics::pixelcolor::{Rgb565, WebColors};
use embedded_graphics::prelude::*;

use super::projector::Margins;

/// Plot margins of the combined temperature/humidity chart, in pixels
/// (top, right, bottom, left). The wide flanks hold the two value axes.
pub const WEATHER_MARGINS: Margins = Margins::new(24, 56, 40, 60);

/// Plot margins of the pressure chart, in pixels (top, right, bottom, left).
pub const PRESSURE_MARGINS: Margins = Margins::new(24, 40, 36, 68);

/// Horizontal grid subdivisions on the weather chart (lines at `i / N`).
pub const GRID_ROWS: usize = 4;

/// Grid line / left-axis label count on the pressure chart.
pub const PRESSURE_TICK_COUNT: usize = 3;

/// Maximum number of time-axis labels.
pub const TIME_TICK_COUNT: usize = 3;

/// Fixed right-axis humidity ticks, in percent.
pub const HUMIDITY_AXIS_TICKS: [f32; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];

/// A series needs this many finite points in the window to be scaled/drawn.
pub const MIN_FINITE_POINTS: usize = 2;

/// Synthetic second point offset when the window holds a single sample.
pub const SINGLE_SAMPLE_TWIN_OFFSET_MS: i64 = 60_000;

/// Value-axis span used when every observed value is identical.
pub const FLAT_SPAN_FALLBACK: f32 = 1.0;

/// Series polyline width in pixels.
pub const SERIES_LINE_WIDTH_PX: u32 = 2;

/// Grid line width in pixels.
pub const GRID_LINE_WIDTH_PX: u32 = 1;

/// Dash pattern for outdoor series and dashed lines generally.
pub const DASH_LENGTH_PX: u32 = 6;
pub const DASH_GAP_PX: u32 = 4;

/// Gap between the plot edge and value-axis labels.
pub const AXIS_LABEL_GAP_PX: i32 = 12;

/// Gap between the plot bottom and time-axis labels.
pub const TIME_LABEL_GAP_PX: i32 = 10;

/// Maximum length of formatted axis labels (characters).
pub const MAX_AXIS_LABEL_LENGTH: usize = 16;

/// Mono font advance used to estimate tooltip extents.
pub const FONT_ADVANCE_PX: i32 = 6;

/// Tooltip line height and inner padding used for extent estimation.
pub const TOOLTIP_LINE_HEIGHT_PX: i32 = 12;
pub const TOOLTIP_PADDING_PX: i32 = 8;

/// Placeholder shown when samples exist but no series qualifies.
pub const NO_SERIES_MESSAGE: &str = "Enable a series to view chart...";

/// Default chart surface before the embedder reports its real layout.
pub const DEFAULT_CHART_SIZE: Size = Size::new(640, 320);

pub const COLOR_BACKGROUND: Rgb565 = Rgb565::BLACK;
pub const COLOR_GRID: Rgb565 = Rgb565::CSS_DARK_SLATE_GRAY;
pub const COLOR_LABEL: Rgb565 = Rgb565::CSS_LIGHT_SLATE_GRAY;

pub const COLOR_TEMP_IN: Rgb565 = Rgb565::CSS_DARK_ORANGE;
pub const COLOR_TEMP_OUT: Rgb565 = Rgb565::CSS_MEDIUM_AQUAMARINE;
pub const COLOR_HUM_IN: Rgb565 = Rgb565::CSS_MEDIUM_SLATE_BLUE;
pub const COLOR_HUM_OUT: Rgb565 = Rgb565::CSS_DARK_TURQUOISE;
pub const COLOR_PRESS_IN: Rgb565 = Rgb565::CSS_GOLD;
pub const COLOR_PRESS_OUT: Rgb565 = Rgb565::CSS_DEEP_SKY_BLUE;
