//! The dashboard engine: one explicitly constructed object owning the
//! sample history, legend visibility, both charts and the tooltip timing,
//! with storage and clock injected so the whole pipeline runs
//! deterministically under test.
//!
//! Control flow stays callback-shaped on purpose: the embedder calls
//! [`DashboardEngine::ingest`] when a poll completes and then renders
//! whatever is dirty. There is no implicit reactivity to trace through.

extern crate alloc;
use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::chart::constants::DEFAULT_CHART_SIZE;
use crate::chart::{
    Chart, ChartKind, TooltipContent, TooltipPhase, TooltipState, tooltip,
};
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::sample::{Sample, SeriesKey};
use crate::storage::{KvStore, SampleStore, persist};
use crate::visibility::VisibilityController;

/// Engine facade wiring the core components together.
pub struct DashboardEngine<K: KvStore, C: Clock> {
    config: EngineConfig,
    clock: C,
    kv: K,
    store: SampleStore,
    visibility: VisibilityController,
    weather: Chart,
    pressure: Chart,
    tooltip: TooltipState,
}

impl<K: KvStore, C: Clock> DashboardEngine<K, C> {
    /// Construct the engine and hydrate history and visibility from the
    /// key/value store. Persisted state is repaired on the way in
    /// (re-sorted, re-capped, defaulted when corrupt), never trusted.
    pub fn new(config: EngineConfig, kv: K, clock: C) -> Self {
        let now = clock.now_ms();
        let mut store = SampleStore::new(config.retention());
        store.load(persist::load_history(&kv), now);
        let visibility = VisibilityController::from_flags(persist::load_visibility(&kv));

        let bounds = Rectangle::new(Point::zero(), DEFAULT_CHART_SIZE);
        Self {
            config,
            clock,
            kv,
            store,
            visibility,
            weather: Chart::new(ChartKind::Weather, bounds),
            pressure: Chart::new(ChartKind::Pressure, bounds),
            tooltip: TooltipState::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn weather_chart(&self) -> &Chart {
        &self.weather
    }

    pub fn pressure_chart(&self) -> &Chart {
        &self.pressure
    }

    /// Append a freshly polled sample, persist the snapshot, and flag both
    /// charts for redraw.
    pub fn ingest(&mut self, sample: Sample) {
        let now = self.clock.now_ms();
        self.store.append(sample, now);
        persist::save_history(&mut self.kv, &self.store.snapshot());
        self.weather.mark_dirty();
        self.pressure.mark_dirty();
    }

    pub fn is_series_visible(&self, key: SeriesKey) -> bool {
        self.visibility.is_visible(key)
    }

    /// Legend click: flip a series, persist the flags, and flag both charts
    /// so eligibility is re-evaluated on the next render.
    pub fn toggle_series(&mut self, key: SeriesKey) -> bool {
        let enabled = self.visibility.toggle(key);
        persist::save_visibility(&mut self.kv, &self.visibility.snapshot());
        self.weather.mark_dirty();
        self.pressure.mark_dirty();
        enabled
    }

    /// Layout change for the weather chart surface.
    pub fn resize_weather(&mut self, bounds: Rectangle) {
        self.weather.set_bounds(bounds);
    }

    /// Layout change for the pressure chart surface.
    pub fn resize_pressure(&mut self, bounds: Rectangle) {
        self.pressure.set_bounds(bounds);
    }

    /// Render the weather chart from the current window.
    pub fn render_weather<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let window = self.current_window();
        self.weather
            .render(display, &window, &self.visibility, &self.config)
    }

    /// Render the pressure chart from the current window.
    pub fn render_pressure<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let window = self.current_window();
        self.pressure
            .render(display, &window, &self.visibility, &self.config)
    }

    /// Pointer moved over a chart: resolve the nearest-sample summary from
    /// that chart's last projection frame. `None` (no frame yet, or no
    /// eligible sample) leaves any shown tooltip as it is.
    pub fn tooltip_at(&mut self, kind: ChartKind, pointer: Point) -> Option<TooltipContent> {
        let chart = match kind {
            ChartKind::Weather => &self.weather,
            ChartKind::Pressure => &self.pressure,
        };
        let frame = chart.frame()?;
        let content = tooltip::resolve(frame, kind, &self.visibility, pointer, &self.config)?;
        self.tooltip
            .shown(self.clock.now_ms(), self.config.tooltip_idle_timeout_ms);
        Some(content)
    }

    /// Pointer left the chart area: fade the tooltip out.
    pub fn pointer_left(&mut self) {
        self.tooltip
            .pointer_left(self.clock.now_ms(), self.config.tooltip_fade_ms);
    }

    /// Advance tooltip hide timing; call from the UI tick.
    pub fn tooltip_phase(&mut self) -> TooltipPhase {
        self.tooltip
            .tick(self.clock.now_ms(), self.config.tooltip_fade_ms)
    }

    fn current_window(&self) -> Vec<Sample> {
        let now = self.clock.now_ms();
        self.store
            .window(self.config.chart_window_ms, now)
            .copied()
            .collect()
    }
}
