//! Pure coordinate projection: timestamps and metric values to drawing
//! surface pixels, and back again for tooltip lookup.
//!
//! Everything here is a total function over well-formed geometry; the
//! renderer guarantees a non-degenerate plot area and a non-empty window
//! before projecting.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::constants::FLAT_SPAN_FALLBACK;

/// Padding around the plot area reserved for axis labels, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Margins {
    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Drawing-surface geometry of one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotGeometry {
    /// Full chart bounds on the surface, margins included.
    pub bounds: Rectangle,
    pub margins: Margins,
    /// Plot area width in pixels.
    pub plot_w: f32,
    /// Plot area height in pixels.
    pub plot_h: f32,
}

impl PlotGeometry {
    /// Returns `None` when the margins leave no plot area.
    pub fn new(bounds: Rectangle, margins: Margins) -> Option<Self> {
        let plot_w = bounds.size.width as f32 - (margins.left + margins.right) as f32;
        let plot_h = bounds.size.height as f32 - (margins.top + margins.bottom) as f32;
        if plot_w <= 0.0 || plot_h <= 0.0 {
            return None;
        }
        Some(Self {
            bounds,
            margins,
            plot_w,
            plot_h,
        })
    }

    pub fn plot_left(&self) -> f32 {
        self.bounds.top_left.x as f32 + self.margins.left as f32
    }

    pub fn plot_top(&self) -> f32 {
        self.bounds.top_left.y as f32 + self.margins.top as f32
    }

    pub fn plot_right(&self) -> f32 {
        self.plot_left() + self.plot_w
    }

    pub fn plot_bottom(&self) -> f32 {
        self.plot_top() + self.plot_h
    }
}

/// Linear time axis over `[first_ts, last_ts]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeDomain {
    pub first_ts: i64,
    pub last_ts: i64,
}

impl TimeDomain {
    /// Domain span, never zero so projection cannot divide by zero.
    pub fn span_ms(&self) -> i64 {
        (self.last_ts - self.first_ts).max(1)
    }

    /// Project a timestamp onto the plot's x range.
    pub fn project(&self, ts_ms: i64, geometry: &PlotGeometry) -> f32 {
        let ratio = (ts_ms - self.first_ts) as f32 / self.span_ms() as f32;
        geometry.plot_left() + ratio * geometry.plot_w
    }

    /// Recover the timestamp under an x pixel, clamped to the plot area.
    pub fn invert(&self, x: f32, geometry: &PlotGeometry) -> i64 {
        let offset = (x - geometry.plot_left()).clamp(0.0, geometry.plot_w);
        let ratio = offset / geometry.plot_w.max(1.0);
        self.first_ts + (ratio * self.span_ms() as f32) as i64
    }
}

/// One value axis as `(min, range)`. Larger values project to smaller y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    pub min: f32,
    pub range: f32,
}

impl ValueScale {
    fn from_min_max(min: f32, max: f32) -> Self {
        let mut range = max - min;
        if range <= 0.0 {
            range = FLAT_SPAN_FALLBACK;
        }
        Self { min, range }
    }

    fn min_max(values: &[f32]) -> Option<(f32, f32)> {
        let first = *values.first()?;
        let mut min = first;
        let mut max = first;
        for &v in &values[1..] {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Tight fit around the observed values; temperature framing.
    pub fn tight(values: &[f32]) -> Option<Self> {
        let (min, max) = Self::min_max(values)?;
        Some(Self::from_min_max(min, max))
    }

    /// Fit expanded to always include `[floor, ceiling]`; humidity framing.
    pub fn clamped_to(values: &[f32], floor: f32, ceiling: f32) -> Option<Self> {
        let (min, max) = Self::min_max(values)?;
        Some(Self::from_min_max(min.min(floor), max.max(ceiling)))
    }

    /// Fit padded on both sides by `span * pad_factor`, at least `min_pad`;
    /// pressure framing, so sensor noise does not fill the plot.
    pub fn padded(values: &[f32], pad_factor: f32, min_pad: f32) -> Option<Self> {
        let (min, max) = Self::min_max(values)?;
        let pad = ((max - min) * pad_factor).max(min_pad);
        Some(Self::from_min_max(min - pad, max + pad))
    }

    pub fn max(&self) -> f32 {
        self.min + self.range
    }

    /// Axis value at a fractional position measured from the top.
    pub fn value_at(&self, ratio_from_top: f32) -> f32 {
        self.max() - self.range * ratio_from_top
    }

    /// Project a value onto the plot's y range (inverted).
    pub fn project(&self, value: f32, geometry: &PlotGeometry) -> f32 {
        let ratio = (value - self.min) / self.range;
        geometry.plot_top() + (1.0 - ratio) * geometry.plot_h
    }
}
