//! Chart state machine and the full render pass.

extern crate alloc;
use alloc::vec::Vec;
use core::fmt::Write as _;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::String;

use crate::config::EngineConfig;
use crate::sample::{AxisFamily, Sample};
use crate::visibility::VisibilityController;

use super::clock_label;
use super::constants::{
    AXIS_LABEL_GAP_PX, COLOR_BACKGROUND, COLOR_GRID, COLOR_LABEL, DASH_GAP_PX, DASH_LENGTH_PX,
    GRID_LINE_WIDTH_PX, GRID_ROWS, HUMIDITY_AXIS_TICKS, MAX_AXIS_LABEL_LENGTH, NO_SERIES_MESSAGE,
    PRESSURE_MARGINS, PRESSURE_TICK_COUNT, SERIES_LINE_WIDTH_PX, SINGLE_SAMPLE_TWIN_OFFSET_MS,
    TIME_LABEL_GAP_PX, TIME_TICK_COUNT, WEATHER_MARGINS,
};
use super::frame::ProjectionFrame;
use super::projector::{Margins, PlotGeometry, TimeDomain, ValueScale};
use super::series::{PRESSURE_SERIES, SeriesSpec, WEATHER_SERIES};

/// Which of the two dashboard charts an instance renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Temperature and humidity overlaid, independently scaled axes.
    Weather,
    /// Pressure (mmHg) alone.
    Pressure,
}

impl ChartKind {
    /// Series drawn on this chart, in draw order.
    pub const fn series(self) -> &'static [SeriesSpec] {
        match self {
            Self::Weather => &WEATHER_SERIES,
            Self::Pressure => &PRESSURE_SERIES,
        }
    }

    const fn margins(self) -> Margins {
        match self {
            Self::Weather => WEATHER_MARGINS,
            Self::Pressure => PRESSURE_MARGINS,
        }
    }

    const fn empty_message(self) -> &'static str {
        match self {
            Self::Weather => "Collecting 24-hour history...",
            Self::Pressure => "Collecting pressure history...",
        }
    }
}

/// Render outcome of a chart, re-derived on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartState {
    /// The window held no samples at all.
    Empty,
    /// Samples exist but no series qualifies to draw.
    InsufficientSeries,
    Drawn,
}

/// One chart surface: bounds, last render state, and the projection frame
/// the tooltip inverts.
#[derive(Debug)]
pub struct Chart {
    kind: ChartKind,
    bounds: Rectangle,
    state: ChartState,
    frame: Option<ProjectionFrame>,
    dirty: bool,
}

impl Chart {
    pub fn new(kind: ChartKind, bounds: Rectangle) -> Self {
        Self {
            kind,
            bounds,
            state: ChartState::Empty,
            frame: None,
            dirty: true,
        }
    }

    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn state(&self) -> ChartState {
        self.state
    }

    pub fn frame(&self) -> Option<&ProjectionFrame> {
        self.frame.as_ref()
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Resize the chart surface; takes effect on the next render.
    pub fn set_bounds(&mut self, bounds: Rectangle) {
        if bounds != self.bounds {
            self.bounds = bounds;
            self.dirty = true;
        }
    }

    /// Full render pass over `samples` (the current window, oldest first).
    ///
    /// Idempotent: the pass starts from a cleared surface and recomputes
    /// everything from its inputs, so it is safe to call on every poll,
    /// resize and legend toggle.
    pub fn render<D>(
        &mut self,
        display: &mut D,
        samples: &[Sample],
        visibility: &VisibilityController,
        config: &EngineConfig,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.clear(display)?;
        self.dirty = false;

        if samples.is_empty() {
            self.state = ChartState::Empty;
            self.frame = None;
            return self.draw_placeholder(display, self.kind.empty_message());
        }

        // A lone sample cannot span a time domain; give it a twin one
        // minute later so it still draws as a visible segment.
        let mut window: Vec<Sample> = samples.to_vec();
        if window.len() == 1 {
            let mut twin = window[0];
            twin.timestamp_ms += SINGLE_SAMPLE_TWIN_OFFSET_MS;
            window.push(twin);
        }

        let eligible: Vec<&SeriesSpec> = self
            .kind
            .series()
            .iter()
            .filter(|spec| spec.eligible(&window, visibility))
            .collect();
        if eligible.is_empty() {
            self.state = ChartState::InsufficientSeries;
            self.frame = None;
            return self.draw_placeholder(display, NO_SERIES_MESSAGE);
        }

        let Some(geometry) = PlotGeometry::new(self.bounds, self.kind.margins()) else {
            // Surface too small to host a plot; nothing sensible to draw.
            self.frame = None;
            return Ok(());
        };

        let domain = TimeDomain {
            first_ts: window[0].timestamp_ms,
            last_ts: window[window.len() - 1].timestamp_ms,
        };

        let temperature = ValueScale::tight(&family_values(
            &eligible,
            &window,
            AxisFamily::Temperature,
        ));
        let humidity = ValueScale::clamped_to(
            &family_values(&eligible, &window, AxisFamily::Humidity),
            config.humidity_floor,
            config.humidity_ceiling,
        );
        let pressure = ValueScale::padded(
            &family_values(&eligible, &window, AxisFamily::Pressure),
            config.pressure_pad_factor,
            config.pressure_min_pad,
        );

        self.draw_grid_and_axes(
            display,
            &geometry,
            temperature.as_ref(),
            humidity.as_ref(),
            pressure.as_ref(),
        )?;

        for spec in &eligible {
            let scale = match spec.key.axis() {
                AxisFamily::Temperature => temperature.as_ref(),
                AxisFamily::Humidity => humidity.as_ref(),
                AxisFamily::Pressure => pressure.as_ref(),
            };
            // Eligible series always have a scale; guard anyway so a future
            // series/axis mismatch cannot panic the render.
            let Some(scale) = scale else { continue };
            draw_polyline(display, &window, spec, &domain, scale, &geometry)?;
        }

        self.draw_time_labels(display, &window, &domain, &geometry, config)?;

        self.state = ChartState::Drawn;
        self.frame = Some(ProjectionFrame {
            domain,
            geometry,
            temperature,
            humidity,
            pressure,
            samples: window,
        });
        Ok(())
    }

    fn clear<D>(&self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        self.bounds
            .into_styled(PrimitiveStyle::with_fill(COLOR_BACKGROUND))
            .draw(display)
    }

    fn draw_placeholder<D>(&self, display: &mut D, message: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let centered = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        Text::with_text_style(
            message,
            self.bounds.center(),
            MonoTextStyle::new(&FONT_6X10, COLOR_LABEL),
            centered,
        )
        .draw(display)?;
        Ok(())
    }

    fn draw_grid_and_axes<D>(
        &self,
        display: &mut D,
        geometry: &PlotGeometry,
        temperature: Option<&ValueScale>,
        humidity: Option<&ValueScale>,
        pressure: Option<&ValueScale>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let label_style = MonoTextStyle::new(&FONT_6X10, COLOR_LABEL);
        let right_aligned = TextStyleBuilder::new()
            .alignment(Alignment::Right)
            .baseline(Baseline::Middle)
            .build();
        let left_aligned = TextStyleBuilder::new()
            .alignment(Alignment::Left)
            .baseline(Baseline::Middle)
            .build();

        match self.kind {
            ChartKind::Weather => {
                // Left axis follows the dominant family: temperature when it
                // is on the chart, humidity otherwise.
                let dominant: Option<(&ValueScale, &'static str)> = match (temperature, humidity) {
                    (Some(scale), _) => Some((scale, AxisFamily::Temperature.unit())),
                    (None, Some(scale)) => Some((scale, AxisFamily::Humidity.unit())),
                    (None, None) => None,
                };

                for i in 0..=GRID_ROWS {
                    let ratio = i as f32 / GRID_ROWS as f32;
                    let y = geometry.plot_top() + geometry.plot_h * ratio;
                    self.draw_grid_row(display, geometry, y)?;

                    if let Some((scale, unit)) = dominant {
                        let mut label: String<MAX_AXIS_LABEL_LENGTH> = String::new();
                        let _ = write!(label, "{:.1}{unit}", scale.value_at(ratio));
                        Text::with_text_style(
                            &label,
                            Point::new(
                                geometry.plot_left() as i32 - AXIS_LABEL_GAP_PX,
                                y as i32,
                            ),
                            label_style,
                            right_aligned,
                        )
                        .draw(display)?;
                    }
                }

                // Humidity rides the right axis when temperature holds the
                // left one.
                if let (Some(_), Some(humidity)) = (temperature, humidity) {
                    for tick in HUMIDITY_AXIS_TICKS {
                        let y = humidity.project(tick, geometry);
                        let mut label: String<MAX_AXIS_LABEL_LENGTH> = String::new();
                        let _ = write!(label, "{tick:.0}%");
                        Text::with_text_style(
                            &label,
                            Point::new(
                                geometry.plot_right() as i32 + AXIS_LABEL_GAP_PX,
                                y as i32,
                            ),
                            label_style,
                            left_aligned,
                        )
                        .draw(display)?;
                    }
                }
            }
            ChartKind::Pressure => {
                if let Some(scale) = pressure {
                    for i in 0..PRESSURE_TICK_COUNT {
                        let ratio = i as f32 / (PRESSURE_TICK_COUNT - 1) as f32;
                        let value = scale.value_at(ratio);
                        let y = scale.project(value, geometry);
                        self.draw_grid_row(display, geometry, y)?;

                        let mut label: String<MAX_AXIS_LABEL_LENGTH> = String::new();
                        let _ = write!(label, "{value:.1} mmHg");
                        Text::with_text_style(
                            &label,
                            Point::new(
                                geometry.plot_left() as i32 - AXIS_LABEL_GAP_PX,
                                y as i32,
                            ),
                            label_style,
                            right_aligned,
                        )
                        .draw(display)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn draw_grid_row<D>(
        &self,
        display: &mut D,
        geometry: &PlotGeometry,
        y: f32,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        Line::new(
            Point::new(geometry.plot_left() as i32, y as i32),
            Point::new(geometry.plot_right() as i32, y as i32),
        )
        .into_styled(PrimitiveStyle::with_stroke(COLOR_GRID, GRID_LINE_WIDTH_PX))
        .draw(display)
    }

    fn draw_time_labels<D>(
        &self,
        display: &mut D,
        window: &[Sample],
        domain: &TimeDomain,
        geometry: &PlotGeometry,
        config: &EngineConfig,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let centered_top = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();
        let label_style = MonoTextStyle::new(&FONT_6X10, COLOR_LABEL);

        let tick_count = TIME_TICK_COUNT.min(window.len());
        let with_seconds = domain.span_ms() < config.seconds_label_threshold_ms;
        let y = self.bounds.top_left.y + self.bounds.size.height as i32
            - self.kind.margins().bottom as i32
            + TIME_LABEL_GAP_PX;

        for i in 0..tick_count {
            let ratio = i as f32 / tick_count.saturating_sub(1).max(1) as f32;
            let ts = domain.first_ts + (ratio * domain.span_ms() as f32) as i64;
            let x = domain.project(ts, geometry);
            let label = clock_label(ts, config.utc_offset_minutes, with_seconds);
            Text::with_text_style(&label, Point::new(x as i32, y), label_style, centered_top)
                .draw(display)?;
        }
        Ok(())
    }
}

/// Collect the plotted values of every eligible series in one axis family.
fn family_values(eligible: &[&SeriesSpec], window: &[Sample], family: AxisFamily) -> Vec<f32> {
    eligible
        .iter()
        .filter(|spec| spec.key.axis() == family)
        .flat_map(|spec| window.iter().filter_map(|s| spec.key.plot_value(s)))
        .collect()
}

/// Draw one series as line segments between consecutive finite samples.
/// Absent values break the polyline instead of interpolating across the gap.
fn draw_polyline<D>(
    display: &mut D,
    window: &[Sample],
    spec: &SeriesSpec,
    domain: &TimeDomain,
    scale: &ValueScale,
    geometry: &PlotGeometry,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut prev: Option<Point> = None;
    for sample in window {
        match spec.key.plot_value(sample) {
            Some(value) => {
                let x = domain.project(sample.timestamp_ms, geometry);
                let y = scale.project(value, geometry);
                let point = Point::new(x as i32, y as i32);
                if let Some(from) = prev {
                    draw_segment(display, from, point, spec.color, spec.dashed)?;
                }
                prev = Some(point);
            }
            None => prev = None,
        }
    }
    Ok(())
}

fn draw_segment<D>(
    display: &mut D,
    from: Point,
    to: Point,
    color: Rgb565,
    dashed: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = PrimitiveStyle::with_stroke(color, SERIES_LINE_WIDTH_PX);
    if !dashed {
        return Line::new(from, to).into_styled(style).draw(display);
    }

    let dx = (to.x - from.x) as f32;
    let dy = (to.y - from.y) as f32;
    let total_length = sqrt_approx(dx * dx + dy * dy);
    if total_length < 0.1 {
        return Ok(());
    }

    let pattern_length = (DASH_LENGTH_PX + DASH_GAP_PX) as f32;
    let mut distance = 0.0;
    while distance < total_length {
        let t_start = distance / total_length;
        let t_end = (distance + DASH_LENGTH_PX as f32).min(total_length) / total_length;

        let dash_from = Point::new(
            from.x + (dx * t_start) as i32,
            from.y + (dy * t_start) as i32,
        );
        let dash_to = Point::new(from.x + (dx * t_end) as i32, from.y + (dy * t_end) as i32);

        Line::new(dash_from, dash_to).into_styled(style).draw(display)?;

        distance += pattern_length;
    }
    Ok(())
}

/// Square root via Newton-Raphson; `core` has no `sqrt` and three rounds are
/// plenty at pixel precision.
fn sqrt_approx(x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    let mut guess = x / 2.0;
    for _ in 0..3 {
        guess = (guess + x / guess) / 2.0;
    }
    guess
}
