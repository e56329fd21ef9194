//! Core traits for the sensor boundary
//!
//! One seam, kept simple: the engine pulls raw pairs out of a
//! [`ClimateProbe`] and everything after that point is deterministic,
//! testable code. Probe implementations live with the embedding
//! application (DHT driver, I²C sensor, replay file); the engine only
//! cares that a blocking read eventually yields a pair or an error.

use crate::errors::ProbeResult;

/// One raw (temperature, humidity) pair exactly as the hardware reported it
///
/// Not yet calibrated, filtered, or plausibility-checked. NaN is possible
/// here and nowhere else in the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Temperature in °C
    pub temperature_c: f32,
    /// Relative humidity in %
    pub humidity_pct: f32,
}

impl RawSample {
    /// Build a sample from a raw pair.
    pub fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            temperature_c,
            humidity_pct,
        }
    }

    /// Both values are real numbers. Samples failing this are dropped at
    /// the worker boundary before any processing happens.
    pub fn is_finite(&self) -> bool {
        self.temperature_c.is_finite() && self.humidity_pct.is_finite()
    }
}

/// Blocking hardware read boundary
///
/// `read` may take hundreds of milliseconds (single-wire sensors do); it is
/// called from the dedicated acquisition worker and must never be called
/// while holding the engine lock.
pub trait ClimateProbe {
    /// Perform one blocking read.
    fn read(&mut self) -> ProbeResult<RawSample>;
}
