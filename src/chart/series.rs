//! Series styling and eligibility.

use embedded_graphics::pixelcolor::Rgb565;

use crate::sample::{Sample, SeriesKey};
use crate::visibility::VisibilityController;

use super::constants::{
    COLOR_HUM_IN, COLOR_HUM_OUT, COLOR_PRESS_IN, COLOR_PRESS_OUT, COLOR_TEMP_IN, COLOR_TEMP_OUT,
    MIN_FINITE_POINTS,
};

/// Visual spec of one chart series. Outdoor streams draw dashed so the two
/// sides of a pair stay distinguishable when their colors wash out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    pub key: SeriesKey,
    pub color: Rgb565,
    pub dashed: bool,
}

impl SeriesSpec {
    /// Number of finite points this series has in `window`.
    pub fn finite_points(&self, window: &[Sample]) -> usize {
        window
            .iter()
            .filter(|s| self.key.plot_value(s).is_some())
            .count()
    }

    /// A series is drawn (and contributes to axis scaling) only when it is
    /// visible and has at least two finite points; fewer cannot define a
    /// line.
    pub fn eligible(&self, window: &[Sample], visibility: &VisibilityController) -> bool {
        visibility.is_visible(self.key) && self.finite_points(window) >= MIN_FINITE_POINTS
    }
}

/// Series of the combined temperature/humidity chart, in draw order.
pub const WEATHER_SERIES: [SeriesSpec; 4] = [
    SeriesSpec {
        key: SeriesKey::IndoorTemp,
        color: COLOR_TEMP_IN,
        dashed: false,
    },
    SeriesSpec {
        key: SeriesKey::OutdoorTemp,
        color: COLOR_TEMP_OUT,
        dashed: true,
    },
    SeriesSpec {
        key: SeriesKey::IndoorHumidity,
        color: COLOR_HUM_IN,
        dashed: false,
    },
    SeriesSpec {
        key: SeriesKey::OutdoorHumidity,
        color: COLOR_HUM_OUT,
        dashed: true,
    },
];

/// Series of the pressure chart, in draw order.
pub const PRESSURE_SERIES: [SeriesSpec; 2] = [
    SeriesSpec {
        key: SeriesKey::IndoorPressure,
        color: COLOR_PRESS_IN,
        dashed: false,
    },
    SeriesSpec {
        key: SeriesKey::OutdoorPressure,
        color: COLOR_PRESS_OUT,
        dashed: true,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64, temp: Option<f32>) -> Sample {
        Sample {
            timestamp_ms: ts,
            temperature_c: temp,
            ..Sample::default()
        }
    }

    #[test]
    fn eligibility_needs_visibility_and_two_finite_points() {
        let spec = WEATHER_SERIES[0]; // indoor temperature
        let mut visibility = VisibilityController::new();

        let sparse = [sample(0, Some(20.0)), sample(1_000, None)];
        assert!(!spec.eligible(&sparse, &visibility));

        let dense = [sample(0, Some(20.0)), sample(1_000, Some(21.0))];
        assert!(spec.eligible(&dense, &visibility));

        visibility.toggle(SeriesKey::IndoorTemp);
        assert!(!spec.eligible(&dense, &visibility));
    }
}
