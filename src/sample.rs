//! Telemetry sample records and the series taxonomy drawn from them.
//!
//! A [`Sample`] is one timestamped observation from the station: the indoor
//! sensor block plus an optional outdoor block mirrored from the weather
//! provider. Every metric is `Option<f32>`; "absent" is a first-class value
//! and never a sentinel that could leak into arithmetic. Derived units
//! (mmHg, °F) are computed on demand and never stored, so the buffer stays
//! canonical.

use serde::{Deserialize, Serialize};

/// Hectopascals per millimetre of mercury.
pub const HPA_PER_MMHG: f32 = 1.33322;

/// Convert a pressure reading from hPa to mmHg.
pub fn hpa_to_mmhg(hpa: f32) -> f32 {
    hpa / HPA_PER_MMHG
}

/// Convert a temperature reading from °C to °F.
pub fn celsius_to_fahrenheit(celsius: f32) -> f32 {
    celsius * 9.0 / 5.0 + 32.0
}

/// One telemetry observation.
///
/// The serde layout matches legacy history records (`timestamp`,
/// `temperatureC`, `humidity`, ...), so snapshots written by earlier
/// firmware hydrate cleanly. Unknown fields in old records (pre-derived
/// mmHg values and the like) are ignored on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sample {
    /// Wall-clock capture time in milliseconds. Uniqueness is not required.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    /// Indoor temperature in °C.
    #[serde(rename = "temperatureC")]
    pub temperature_c: Option<f32>,
    /// Indoor relative humidity in %.
    #[serde(rename = "humidity")]
    pub humidity_pct: Option<f32>,
    /// Indoor pressure in hPa.
    #[serde(rename = "pressureHpa")]
    pub pressure_hpa: Option<f32>,
    /// Outdoor temperature in °C.
    #[serde(rename = "temperatureOutC")]
    pub temperature_out_c: Option<f32>,
    /// Outdoor relative humidity in %.
    #[serde(rename = "humidityOut")]
    pub humidity_out_pct: Option<f32>,
    /// Outdoor pressure in hPa.
    #[serde(rename = "pressureOutHpa")]
    pub pressure_out_hpa: Option<f32>,
}

impl Sample {
    /// Replace any non-finite metric with `None`.
    ///
    /// Applied at every construction boundary (wire decode, snapshot load,
    /// store append) so downstream math only ever sees finite numbers.
    pub fn sanitized(mut self) -> Self {
        let finite = |v: Option<f32>| v.filter(|v| v.is_finite());
        self.temperature_c = finite(self.temperature_c);
        self.humidity_pct = finite(self.humidity_pct);
        self.pressure_hpa = finite(self.pressure_hpa);
        self.temperature_out_c = finite(self.temperature_out_c);
        self.humidity_out_pct = finite(self.humidity_out_pct);
        self.pressure_out_hpa = finite(self.pressure_out_hpa);
        self
    }

    /// Build a sample from a device payload, stamping the capture time.
    pub fn from_payload(payload: &TelemetryPayload, now_ms: i64) -> Self {
        let outdoor = payload.outdoor.unwrap_or_default();
        Sample {
            timestamp_ms: now_ms,
            temperature_c: payload.indoor.temperature_c,
            humidity_pct: payload.indoor.humidity_pct,
            pressure_hpa: payload.indoor.pressure_hpa,
            temperature_out_c: outdoor.temperature_c,
            humidity_out_pct: outdoor.humidity_pct,
            pressure_out_hpa: outdoor.pressure_hpa,
        }
        .sanitized()
    }
}

/// One sensor block of the `GET /telemetry` payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsBlock {
    #[serde(rename = "temperatureC")]
    pub temperature_c: Option<f32>,
    #[serde(rename = "humidity")]
    pub humidity_pct: Option<f32>,
    #[serde(rename = "pressureHpa")]
    pub pressure_hpa: Option<f32>,
}

/// Wire shape of the telemetry endpoint: an indoor block and an optional
/// outdoor block. Extra payload fields (sensor health, derived units) are
/// ignored; missing fields default to absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryPayload {
    pub indoor: MetricsBlock,
    pub outdoor: Option<MetricsBlock>,
}

impl TelemetryPayload {
    /// Decode a telemetry response body.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Axis family a series is scaled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisFamily {
    Temperature,
    Humidity,
    Pressure,
}

impl AxisFamily {
    /// Unit suffix used for axis and tooltip labels.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Pressure => "mmHg",
        }
    }
}

/// The six independently-toggleable value streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKey {
    IndoorTemp,
    OutdoorTemp,
    IndoorHumidity,
    OutdoorHumidity,
    IndoorPressure,
    OutdoorPressure,
}

impl SeriesKey {
    /// All keys, in legend order.
    pub const ALL: [SeriesKey; 6] = [
        Self::IndoorTemp,
        Self::OutdoorTemp,
        Self::IndoorHumidity,
        Self::OutdoorHumidity,
        Self::IndoorPressure,
        Self::OutdoorPressure,
    ];

    /// Short display label, as shown in tooltips.
    pub const fn label(self) -> &'static str {
        match self {
            Self::IndoorTemp => "Temp in",
            Self::OutdoorTemp => "Temp out",
            Self::IndoorHumidity => "Hum in",
            Self::OutdoorHumidity => "Hum out",
            Self::IndoorPressure => "Indoor",
            Self::OutdoorPressure => "Outdoor",
        }
    }

    /// Axis family this series is scaled against.
    pub const fn axis(self) -> AxisFamily {
        match self {
            Self::IndoorTemp | Self::OutdoorTemp => AxisFamily::Temperature,
            Self::IndoorHumidity | Self::OutdoorHumidity => AxisFamily::Humidity,
            Self::IndoorPressure | Self::OutdoorPressure => AxisFamily::Pressure,
        }
    }

    /// The stored (canonical) value of this series in `sample`.
    pub fn sample_value(self, sample: &Sample) -> Option<f32> {
        match self {
            Self::IndoorTemp => sample.temperature_c,
            Self::OutdoorTemp => sample.temperature_out_c,
            Self::IndoorHumidity => sample.humidity_pct,
            Self::OutdoorHumidity => sample.humidity_out_pct,
            Self::IndoorPressure => sample.pressure_hpa,
            Self::OutdoorPressure => sample.pressure_out_hpa,
        }
    }

    /// The value plotted on the chart: canonical for temperature and
    /// humidity, derived mmHg for pressure.
    pub fn plot_value(self, sample: &Sample) -> Option<f32> {
        let value = self.sample_value(sample)?;
        match self.axis() {
            AxisFamily::Pressure => Some(hpa_to_mmhg(value)),
            _ => Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_drops_non_finite_metrics() {
        let sample = Sample {
            timestamp_ms: 1,
            temperature_c: Some(f32::NAN),
            humidity_pct: Some(55.0),
            pressure_hpa: Some(f32::INFINITY),
            ..Sample::default()
        }
        .sanitized();

        assert_eq!(sample.temperature_c, None);
        assert_eq!(sample.humidity_pct, Some(55.0));
        assert_eq!(sample.pressure_hpa, None);
    }

    #[test]
    fn payload_decode_tolerates_missing_and_extra_fields() {
        let raw = r#"{
            "indoor": { "temperatureC": 21.5, "pressureHpa": 1002.0, "dewPointC": 11.0 },
            "sensors": { "sht31": { "present": true } }
        }"#;
        let payload = TelemetryPayload::from_json(raw).unwrap();
        assert_eq!(payload.indoor.temperature_c, Some(21.5));
        assert_eq!(payload.indoor.humidity_pct, None);
        assert!(payload.outdoor.is_none());

        let sample = Sample::from_payload(&payload, 42_000);
        assert_eq!(sample.timestamp_ms, 42_000);
        assert_eq!(sample.temperature_out_c, None);
    }

    #[test]
    fn persisted_record_layout_matches_legacy_snapshots() {
        // A legacy record, derived fields included.
        let raw = r#"{
            "timestamp": 1000,
            "temperatureC": 20.0,
            "humidity": 40.0,
            "pressureHpa": 1000.0,
            "pressureMmHg": 750.1,
            "temperatureOutC": 5.5,
            "humidityOut": 80.0,
            "pressureOutHpa": 990.0,
            "pressureOutMmHg": 742.6
        }"#;
        let sample: Sample = serde_json::from_str(raw).unwrap();
        assert_eq!(sample.timestamp_ms, 1000);
        assert_eq!(sample.temperature_out_c, Some(5.5));
        assert_eq!(sample.pressure_out_hpa, Some(990.0));
    }

    #[test]
    fn unit_conversions() {
        let mmhg = hpa_to_mmhg(1000.0);
        assert!((mmhg - 750.06).abs() < 0.01);
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
    }

    #[test]
    fn pressure_series_plots_in_mmhg() {
        let sample = Sample {
            timestamp_ms: 0,
            pressure_hpa: Some(1000.0),
            ..Sample::default()
        };
        assert_eq!(SeriesKey::IndoorPressure.sample_value(&sample), Some(1000.0));
        let plotted = SeriesKey::IndoorPressure.plot_value(&sample).unwrap();
        assert!((plotted - 750.06).abs() < 0.01);
        assert_eq!(SeriesKey::OutdoorPressure.plot_value(&sample), None);
    }
}
