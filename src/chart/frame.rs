//! Projection metadata snapshot of one render pass.

extern crate alloc;
use alloc::vec::Vec;

use crate::sample::{AxisFamily, Sample};

use super::projector::{PlotGeometry, TimeDomain, ValueScale};

/// Everything the tooltip needs to invert the last render: the time domain,
/// the plot geometry, one scale per axis family that was present, and the
/// sample window the pass drew from. Replaced wholesale on every render and
/// never outlives the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionFrame {
    pub domain: TimeDomain,
    pub geometry: PlotGeometry,
    pub temperature: Option<ValueScale>,
    pub humidity: Option<ValueScale>,
    pub pressure: Option<ValueScale>,
    /// Window rendered by this pass, oldest first.
    pub samples: Vec<Sample>,
}

impl ProjectionFrame {
    pub fn scale_for(&self, family: AxisFamily) -> Option<&ValueScale> {
        match family {
            AxisFamily::Temperature => self.temperature.as_ref(),
            AxisFamily::Humidity => self.humidity.as_ref(),
            AxisFamily::Pressure => self.pressure.as_ref(),
        }
    }
}
