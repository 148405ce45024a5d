//! Per-series visibility flags, toggled from the chart legend and persisted
//! across sessions.

use serde::{Deserialize, Serialize};

use crate::sample::SeriesKey;

/// Persisted flag set. Field names match the legend keys legacy snapshots
/// carry, and every flag defaults to `true` so partial or stale JSON loads
/// cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityFlags {
    #[serde(rename = "tempIn")]
    pub temp_in: bool,
    #[serde(rename = "tempOut")]
    pub temp_out: bool,
    #[serde(rename = "humIn")]
    pub hum_in: bool,
    #[serde(rename = "humOut")]
    pub hum_out: bool,
    #[serde(rename = "pressIn")]
    pub press_in: bool,
    #[serde(rename = "pressOut")]
    pub press_out: bool,
}

impl Default for VisibilityFlags {
    fn default() -> Self {
        Self {
            temp_in: true,
            temp_out: true,
            hum_in: true,
            hum_out: true,
            press_in: true,
            press_out: true,
        }
    }
}

/// Tracks which series are enabled.
///
/// The controller itself is storage-agnostic; the engine persists
/// [`VisibilityFlags`] after every toggle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityController {
    flags: VisibilityFlags,
}

impl VisibilityController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flags(flags: VisibilityFlags) -> Self {
        Self { flags }
    }

    pub fn is_visible(&self, key: SeriesKey) -> bool {
        *self.flag(key)
    }

    /// Flip one series and return its new state.
    pub fn toggle(&mut self, key: SeriesKey) -> bool {
        let flag = self.flag_mut(key);
        *flag = !*flag;
        *flag
    }

    pub fn snapshot(&self) -> VisibilityFlags {
        self.flags
    }

    pub fn load(&mut self, flags: VisibilityFlags) {
        self.flags = flags;
    }

    fn flag(&self, key: SeriesKey) -> &bool {
        match key {
            SeriesKey::IndoorTemp => &self.flags.temp_in,
            SeriesKey::OutdoorTemp => &self.flags.temp_out,
            SeriesKey::IndoorHumidity => &self.flags.hum_in,
            SeriesKey::OutdoorHumidity => &self.flags.hum_out,
            SeriesKey::IndoorPressure => &self.flags.press_in,
            SeriesKey::OutdoorPressure => &self.flags.press_out,
        }
    }

    fn flag_mut(&mut self, key: SeriesKey) -> &mut bool {
        match key {
            SeriesKey::IndoorTemp => &mut self.flags.temp_in,
            SeriesKey::OutdoorTemp => &mut self.flags.temp_out,
            SeriesKey::IndoorHumidity => &mut self.flags.hum_in,
            SeriesKey::OutdoorHumidity => &mut self.flags.hum_out,
            SeriesKey::IndoorPressure => &mut self.flags.press_in,
            SeriesKey::OutdoorPressure => &mut self.flags.press_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_all_visible() {
        let controller = VisibilityController::new();
        for key in SeriesKey::ALL {
            assert!(controller.is_visible(key));
        }
    }

    #[test]
    fn toggle_flips_and_reports_new_state() {
        let mut controller = VisibilityController::new();
        assert!(!controller.toggle(SeriesKey::OutdoorTemp));
        assert!(!controller.is_visible(SeriesKey::OutdoorTemp));
        assert!(controller.is_visible(SeriesKey::IndoorTemp));
        assert!(controller.toggle(SeriesKey::OutdoorTemp));
    }

    #[test]
    fn partial_flag_json_defaults_missing_fields_to_true() {
        let flags: VisibilityFlags = serde_json::from_str(r#"{ "tempOut": false }"#).unwrap();
        assert!(!flags.temp_out);
        assert!(flags.temp_in);
        assert!(flags.press_out);
    }
}
