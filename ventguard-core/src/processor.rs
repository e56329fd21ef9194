//! Reading Pipeline
//!
//! Turns raw probe samples into the filtered values every other module
//! consumes. The order is fixed: calibration offsets, humidity clamp,
//! temperature spike filter, exponential blend, derived physics, and the
//! long-term humidity average.
//!
//! The spike filter exists because cheap RH/T probes occasionally emit a
//! single wild temperature while the bus is noisy. A jump larger than
//! [`MAX_TEMP_JUMP_C`] within one sample period is physically implausible
//! indoors, so the previous value is held instead. Legitimate fast changes
//! (an opened window) still get through: they arrive as several sub-jump
//! steps and the blend follows them.
//!
//! Raw samples are expected to hold finite values; the acquisition side
//! rejects anything else before it reaches this pipeline.

use crate::constants::thresholds::{AVG_EMA_ALPHA, MAX_TEMP_JUMP_C, TEMP_BLEND_ALPHA};
use crate::constants::time::SAMPLE_INTERVAL_MS;
use crate::physics;
use crate::traits::RawSample;

/// Calibration and pacing settings for one monitor instance
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorConfig {
    /// Added to every raw temperature before filtering (°C)
    pub temp_offset_c: f32,
    /// Added to every raw humidity before clamping (% RH)
    pub hum_offset_pct: f32,
    /// Probe sampling period used by the acquisition loop (ms)
    pub sample_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            temp_offset_c: 0.0,
            hum_offset_pct: 0.0,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
        }
    }
}

/// Filtered values derived from the most recent sample
///
/// Everything is optional: before the first sample nothing is known, and
/// the physics can decline to produce a value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessedState {
    /// Spike-filtered, blended temperature (°C)
    pub temperature_c: Option<f32>,
    /// Offset and clamped relative humidity (%)
    pub humidity_pct: Option<f32>,
    /// Absolute humidity derived from the two above (g/m³)
    pub abs_humidity: Option<f32>,
    /// Dew point derived from the two above (°C)
    pub dew_point_c: Option<f32>,
    /// Long-term exponential average of relative humidity (%)
    pub avg_humidity_pct: Option<f32>,
}

/// Stateful sample pipeline
///
/// Carries the last accepted temperature for the spike filter and the
/// long-term average across samples.
pub struct ReadingProcessor {
    config: MonitorConfig,
    last_accepted_temp: Option<f32>,
    state: ProcessedState,
}

impl ReadingProcessor {
    /// Pipeline with the given calibration settings.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            last_accepted_temp: None,
            state: ProcessedState::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Filtered values from the most recent sample.
    pub fn state(&self) -> ProcessedState {
        self.state
    }

    /// Run one raw sample through the pipeline and return the result.
    pub fn process(&mut self, raw: RawSample) -> ProcessedState {
        let offset_temp = raw.temperature_c + self.config.temp_offset_c;
        let humidity = (raw.humidity_pct + self.config.hum_offset_pct).clamp(0.0, 100.0);

        let temperature = match self.last_accepted_temp {
            // Implausible single-period jump: hold the previous value
            Some(last) if (offset_temp - last).abs() > MAX_TEMP_JUMP_C => last,
            Some(last) => {
                last * (1.0 - TEMP_BLEND_ALPHA) + offset_temp * TEMP_BLEND_ALPHA
            }
            None => offset_temp,
        };
        self.last_accepted_temp = Some(temperature);

        let abs_humidity = physics::absolute_humidity(temperature, humidity);
        let dew_point_c = physics::dew_point(temperature, humidity);

        let avg_humidity_pct = match self.state.avg_humidity_pct {
            Some(avg) => Some(avg * (1.0 - AVG_EMA_ALPHA) + humidity * AVG_EMA_ALPHA),
            // First sample seeds the average
            None => Some(humidity),
        };

        self.state = ProcessedState {
            temperature_c: Some(temperature),
            humidity_pct: Some(humidity),
            abs_humidity,
            dew_point_c,
            avg_humidity_pct,
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor() -> ReadingProcessor {
        ReadingProcessor::new(MonitorConfig::default())
    }

    #[test]
    fn first_sample_passes_unfiltered() {
        let mut p = processor();
        let out = p.process(RawSample::new(21.3, 48.0));
        assert_eq!(out.temperature_c, Some(21.3));
        assert_eq!(out.humidity_pct, Some(48.0));
        assert!(out.abs_humidity.is_some());
        assert!(out.dew_point_c.is_some());
    }

    #[test]
    fn offsets_apply_before_filtering() {
        let mut p = ReadingProcessor::new(MonitorConfig {
            temp_offset_c: -1.5,
            hum_offset_pct: 4.0,
            ..MonitorConfig::default()
        });
        let out = p.process(RawSample::new(22.5, 50.0));
        assert_eq!(out.temperature_c, Some(21.0));
        assert_eq!(out.humidity_pct, Some(54.0));
    }

    #[test]
    fn humidity_clamps_to_percent_range() {
        let mut p = ReadingProcessor::new(MonitorConfig {
            hum_offset_pct: 10.0,
            ..MonitorConfig::default()
        });
        assert_eq!(p.process(RawSample::new(20.0, 95.0)).humidity_pct, Some(100.0));

        let mut p = ReadingProcessor::new(MonitorConfig {
            hum_offset_pct: -10.0,
            ..MonitorConfig::default()
        });
        assert_eq!(p.process(RawSample::new(20.0, 3.0)).humidity_pct, Some(0.0));
    }

    #[test]
    fn steady_readings_blend_toward_new_value() {
        let mut p = processor();
        p.process(RawSample::new(20.0, 50.0));
        let out = p.process(RawSample::new(21.0, 50.0));
        // 0.8 * 20.0 + 0.2 * 21.0
        let t = out.temperature_c.unwrap();
        assert!((t - 20.2).abs() < 1e-5, "got {t}");
    }

    #[test]
    fn spike_holds_previous_temperature() {
        let mut p = processor();
        p.process(RawSample::new(20.0, 50.0));
        let out = p.process(RawSample::new(27.4, 50.0));
        assert_eq!(out.temperature_c, Some(20.0));

        // The held value stays the filter reference
        let out = p.process(RawSample::new(20.5, 50.0));
        let t = out.temperature_c.unwrap();
        assert!((t - 20.1).abs() < 1e-5, "got {t}");
    }

    #[test]
    fn jump_at_threshold_still_blends() {
        let mut p = processor();
        p.process(RawSample::new(20.0, 50.0));
        // Exactly the limit is plausible; only strictly larger jumps drop
        let out = p.process(RawSample::new(21.0, 50.0));
        let t = out.temperature_c.unwrap();
        assert!((t - 20.2).abs() < 1e-5, "got {t}");
    }

    #[test]
    fn window_opening_tracks_through_blend() {
        // A real 3-degree drop arriving as 0.2°C sample steps is followed,
        // just smoothed; the lag settles near four steps and never trips
        // the spike filter
        let mut p = processor();
        p.process(RawSample::new(21.0, 50.0));
        let mut last = 21.0;
        for i in 1..=15 {
            let raw = 21.0 - 0.2 * i as f32;
            last = p.process(RawSample::new(raw, 50.0)).temperature_c.unwrap();
        }
        assert!(last < 19.2, "blend failed to follow the drop: {last}");
    }

    #[test]
    fn average_seeds_then_moves_slowly() {
        let mut p = processor();
        let first = p.process(RawSample::new(20.0, 50.0));
        assert_eq!(first.avg_humidity_pct, Some(50.0));

        // One humid sample barely moves a 1% EMA
        let second = p.process(RawSample::new(20.8, 70.0));
        let avg = second.avg_humidity_pct.unwrap();
        let expected = 50.0 * 0.99 + 70.0 * 0.01;
        assert!((avg - expected).abs() < 1e-5, "got {avg}");
        assert!(avg < 51.0);
    }

    #[test]
    fn state_accessor_matches_last_process_result() {
        let mut p = processor();
        let out = p.process(RawSample::new(19.0, 61.0));
        assert_eq!(p.state(), out);
    }
}
