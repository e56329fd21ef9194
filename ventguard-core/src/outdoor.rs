//! Outdoor Conditions
//!
//! A weather collaborator pushes its latest fetch here. The advice layer
//! reads it to decide whether outside air would actually dry the room;
//! everything is optional because the fetch can fail or go stale, and the
//! monitor must keep advising on indoor data alone.

use crate::physics;

/// Capacity of the status string, enough for short fetch diagnostics
pub const OUTDOOR_STATUS_LEN: usize = 32;

/// Latest known outdoor conditions
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutdoorConditions {
    /// Outdoor temperature (°C), if the last fetch succeeded
    pub temperature_c: Option<f32>,
    /// Outdoor relative humidity (%), if the last fetch succeeded
    pub humidity_pct: Option<f32>,
    /// Short diagnostic from the collaborator ("ok", "http 500", ...)
    pub status: heapless::String<OUTDOOR_STATUS_LEN>,
}

impl OutdoorConditions {
    /// Conditions from a successful fetch.
    pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            temperature_c: Some(temperature_c),
            humidity_pct: Some(humidity_pct),
            status: heapless::String::new(),
        }
    }

    /// Replace the diagnostic string, truncating to capacity.
    pub fn set_status(&mut self, status: &str) {
        self.status.clear();
        for c in status.chars() {
            if self.status.push(c).is_err() {
                break;
            }
        }
    }

    /// Builder form of [`set_status`](Self::set_status).
    pub fn with_status(mut self, status: &str) -> Self {
        self.set_status(status);
        self
    }

    /// True when both readings are present and finite.
    pub fn is_valid(&self) -> bool {
        self.temperature_c.is_some_and(f32::is_finite)
            && self.humidity_pct.is_some_and(f32::is_finite)
    }

    /// Outdoor absolute humidity (g/m³), when the readings allow it.
    pub fn abs_humidity(&self) -> Option<f32> {
        let temp = self.temperature_c?;
        let hum = self.humidity_pct?;
        physics::absolute_humidity(temp, hum)
    }
}
