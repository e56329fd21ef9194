//! Ventilation Advice
//!
//! Turns (current readings, active state, outdoor conditions) into a
//! human-facing recommendation with a severity code. The computation is a
//! pure decision tree; a small cache in front of it throttles refreshes
//! so displays and APIs always see a stable answer for at least two
//! seconds at a time.
//!
//! Outside a ventilation session the tree splits on the outdoor
//! temperature regime, because the right advice inverts with the seasons:
//! in winter, outside air is almost always drier once warmed up, so high
//! indoor humidity means "open"; in summer, warm outside air can carry
//! more water than the room does, so the same indoor reading can mean
//! "keep closed".

use crate::constants::thresholds::{
    COLD_REGIME_MAX_C, CONDENSATION_MARGIN_COLD_C, CONDENSATION_MARGIN_MILD_C, DRY_PCT,
    HUMID_COLD_PCT, HUMID_MILD_PCT, OUTDOOR_FALLBACK_TEMP_C, WARM_REGIME_MIN_C,
};
use crate::constants::time::ADVICE_REFRESH_MS;
use crate::outdoor::OutdoorConditions;
use crate::processor::ProcessedState;
use crate::time::Timestamp;
use crate::ventilation::StateId;

/// Severity code attached to every recommendation
///
/// The numeric values are part of the external contract; displays map
/// them to colors and the messaging collaborator maps them to urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Severity {
    /// No data yet, nothing to say
    Pending = 0,
    /// Worth acting on soon
    Caution = 1,
    /// Act now
    Critical = 2,
    /// All fine, or a deliberate "do nothing" recommendation
    Normal = 3,
}

impl Severity {
    /// Stable numeric code (0..=3).
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Severity::code`].
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Caution),
            2 => Some(Self::Critical),
            3 => Some(Self::Normal),
            _ => None,
        }
    }
}

/// Recommendation texts
///
/// Static so the cache and every snapshot can hold them without
/// allocation.
pub mod messages {
    /// No humidity reading yet
    pub const ANALYZING: &str = "Analyzing indoor climate...";
    /// INEFFICIENT state
    pub const VENTILATION_STALLED: &str = "Ventilation no longer effective - close the window";
    /// TARGET_MET state
    pub const TARGET_REACHED: &str = "Target humidity reached - window can be closed";
    /// VENTILATING state
    pub const DRYING_IN_PROGRESS: &str = "Drying in progress - leave the window open";
    /// Cold regime, dew point spread too small
    pub const CONDENSATION_WINTER: &str = "Condensation risk on cold surfaces - ventilate briefly now";
    /// Cold regime, humidity creeping up
    pub const WINTER_HUMID: &str = "Humidity is elevated - a short airing would help";
    /// Cold regime, all fine
    pub const WINTER_OK: &str = "Indoor climate is good - ventilate as usual";
    /// Warm regime, outdoor air carries more water
    pub const SUMMER_KEEP_CLOSED: &str = "Outdoor air is more humid - keep windows closed";
    /// Warm regime, indoors humid and outdoor air would help
    pub const SUMMER_HUMID: &str = "Humid indoors - ventilate during the cooler hours";
    /// Warm regime, all fine
    pub const SUMMER_OK: &str = "Indoor climate is good";
    /// Transitional regime, dew point spread too small
    pub const CONDENSATION_RISK: &str = "Air is close to the dew point - ventilate now";
    /// Transitional regime, humidity elevated
    pub const MILD_HUMID: &str = "Humidity is elevated - consider airing out";
    /// Transitional regime, unusually dry air
    pub const TOO_DRY: &str = "Air is quite dry - no need to ventilate";
    /// Transitional regime, all fine
    pub const MILD_OK: &str = "Indoor climate is comfortable";
}

/// One recommendation with its severity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advice {
    /// Human-facing recommendation text
    pub message: &'static str,
    /// Matching severity code
    pub severity: Severity,
}

impl Default for Advice {
    fn default() -> Self {
        Self {
            message: messages::ANALYZING,
            severity: Severity::Pending,
        }
    }
}

/// Compute the recommendation for the given inputs.
///
/// Pure; the throttling lives in [`AdviceCache`].
pub fn evaluate(
    current: &ProcessedState,
    state: StateId,
    outdoor: &OutdoorConditions,
) -> Advice {
    let Some(humidity) = current.humidity_pct else {
        return Advice::default();
    };

    match state {
        StateId::Inefficient => Advice {
            message: messages::VENTILATION_STALLED,
            severity: Severity::Critical,
        },
        StateId::TargetMet => Advice {
            message: messages::TARGET_REACHED,
            severity: Severity::Normal,
        },
        StateId::Ventilating => Advice {
            message: messages::DRYING_IN_PROGRESS,
            severity: Severity::Caution,
        },
        StateId::Stable => stable_advice(current, humidity, outdoor),
    }
}

fn stable_advice(
    current: &ProcessedState,
    humidity: f32,
    outdoor: &OutdoorConditions,
) -> Advice {
    let reference_temp = if outdoor.is_valid() {
        outdoor.temperature_c.unwrap_or(OUTDOOR_FALLBACK_TEMP_C)
    } else {
        OUTDOOR_FALLBACK_TEMP_C
    };

    if reference_temp < COLD_REGIME_MAX_C {
        if spread_below(current, CONDENSATION_MARGIN_COLD_C) {
            return Advice {
                message: messages::CONDENSATION_WINTER,
                severity: Severity::Critical,
            };
        }
        if humidity > HUMID_COLD_PCT {
            return Advice {
                message: messages::WINTER_HUMID,
                severity: Severity::Caution,
            };
        }
        return Advice {
            message: messages::WINTER_OK,
            severity: Severity::Normal,
        };
    }

    if reference_temp > WARM_REGIME_MIN_C {
        if let (Some(out_abs), Some(in_abs)) = (outdoor.abs_humidity(), current.abs_humidity)
        {
            // Opening would import water, not remove it
            if out_abs >= in_abs {
                return Advice {
                    message: messages::SUMMER_KEEP_CLOSED,
                    severity: Severity::Normal,
                };
            }
        }
        if humidity > HUMID_MILD_PCT {
            return Advice {
                message: messages::SUMMER_HUMID,
                severity: Severity::Caution,
            };
        }
        return Advice {
            message: messages::SUMMER_OK,
            severity: Severity::Normal,
        };
    }

    if spread_below(current, CONDENSATION_MARGIN_MILD_C) {
        return Advice {
            message: messages::CONDENSATION_RISK,
            severity: Severity::Critical,
        };
    }
    if humidity > HUMID_MILD_PCT {
        return Advice {
            message: messages::MILD_HUMID,
            severity: Severity::Caution,
        };
    }
    if humidity < DRY_PCT {
        return Advice {
            message: messages::TOO_DRY,
            severity: Severity::Normal,
        };
    }
    Advice {
        message: messages::MILD_OK,
        severity: Severity::Normal,
    }
}

/// True when the temperature sits closer to the dew point than `margin`.
fn spread_below(current: &ProcessedState, margin: f32) -> bool {
    match (current.temperature_c, current.dew_point_c) {
        (Some(temp), Some(dew)) => (temp - dew) < margin,
        _ => false,
    }
}

/// Throttled recommendation cache
///
/// Holds the last computed [`Advice`] and refuses to recompute more than
/// once per [`ADVICE_REFRESH_MS`]. Starts out pending, which also covers
/// the boot window before the first refresh interval elapses.
pub struct AdviceCache {
    current: Advice,
    last_refresh: Timestamp,
}

impl AdviceCache {
    /// Cache in the pending state.
    pub fn new() -> Self {
        Self {
            current: Advice::default(),
            last_refresh: 0,
        }
    }

    /// Last computed recommendation.
    pub fn current(&self) -> Advice {
        self.current
    }

    /// Whether enough time has passed for a recompute.
    pub fn refresh_due(&self, now: Timestamp) -> bool {
        now.saturating_sub(self.last_refresh) > ADVICE_REFRESH_MS
    }

    /// Recompute if the throttle allows it; true when a recompute ran
    /// (so the caller can republish the severity).
    pub fn maybe_refresh(
        &mut self,
        now: Timestamp,
        current: &ProcessedState,
        state: StateId,
        outdoor: &OutdoorConditions,
    ) -> bool {
        if !self.refresh_due(now) {
            return false;
        }
        self.current = evaluate(current, state, outdoor);
        self.last_refresh = now;
        true
    }
}

impl Default for AdviceCache {
    fn default() -> Self {
        Self::new()
    }
}
