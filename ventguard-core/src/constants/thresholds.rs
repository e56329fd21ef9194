//! Decision Thresholds
//!
//! Filter limits, state-machine triggers, and advice bands. These were
//! tuned against DHT22-class sensors sampling every 6 seconds in a heated
//! European apartment. The engine exposes no tuning knobs, so change them
//! here only together with the state machine's tests.

// ===== READING FILTER =====

/// Largest plausible temperature step between two 6 s samples (°C).
///
/// DHT22-class sensors are accurate to ±0.5°C; room air cannot move a
/// whole degree in six seconds, so a bigger step is electrical noise and
/// the previous filtered value is reused for that cycle.
pub const MAX_TEMP_JUMP_C: f32 = 1.0;

/// Weight of the incoming sample in the temperature smoothing blend.
///
/// The remaining 0.8 stays on the previous filtered value. Gives a time
/// constant of roughly 30 s at the 6 s cadence.
pub const TEMP_BLEND_ALPHA: f32 = 0.2;

/// Per-sample EMA factor for the rolling daily humidity average.
pub const AVG_EMA_ALPHA: f32 = 0.01;

// ===== VENTILATION START (STABLE state) =====

/// Humidity drop versus the last history record that signals an opened
/// window (percentage points).
pub const HUM_DROP_TRIGGER_PCT: f32 = 3.0;

/// Temperature drop versus the tracked baseline that signals an opened
/// window (°C). Catches winter ventilation where cold dry air lowers
/// temperature faster than relative humidity.
pub const TEMP_DROP_TRIGGER_C: f32 = 0.5;

/// Processed samples between slow-drift baseline refreshes in STABLE
/// (about 5 minutes at the 6 s cadence).
pub const BASELINE_REFRESH_SAMPLES: u32 = 50;

// ===== VENTILATION TARGET =====

/// Lowest humidity the adaptive target will ever ask for (%RH).
pub const TARGET_FLOOR_PCT: f32 = 50.0;

/// Drop below the entry humidity that counts as success (percentage
/// points). Target = max(floor, entry - drop).
pub const TARGET_DROP_PCT: f32 = 15.0;

// ===== PLATEAU DETECTION =====

/// Slope across the window above which drying counts as stalled (g/m³).
///
/// Over the ~3 min window this is under 0.05 g/m³ per minute, too slow to
/// justify the heat loss of an open window.
pub const PLATEAU_SLOPE_G_M3: f32 = -0.15;

/// Consecutive stalled readings required before declaring INEFFICIENT
/// (~90 s at the 6 s cadence). One good-slope sample resets the count.
pub const PLATEAU_CONFIRMATIONS: u32 = 15;

/// Minimum slope-window samples before the plateau check runs.
pub const PLATEAU_MIN_WINDOW_SAMPLES: usize = 3;

// ===== REBOUND DETECTION (window closed) =====

/// Temperature rise above the baseline that starts a rebound track (°C).
pub const REBOUND_WATCH_DELTA_C: f32 = 0.05;

/// Temperature rise above the baseline that, sustained, confirms the
/// window is closed (°C).
pub const REBOUND_RISE_C: f32 = 0.15;

/// Absolute-humidity rise above the baseline that confirms closure
/// immediately (g/m³). Humid-air reflow shows up here well before the
/// room warms back up.
pub const ABS_HUM_REBOUND_G_M3: f32 = 0.3;

// ===== ADVICE REGIMES =====

/// Outdoor temperature below which winter guidance applies (°C).
pub const COLD_REGIME_MAX_C: f32 = 10.0;

/// Outdoor temperature above which summer guidance applies (°C).
pub const WARM_REGIME_MIN_C: f32 = 18.0;

/// Reference outdoor temperature assumed when no valid outdoor data is
/// available (°C).
pub const OUTDOOR_FALLBACK_TEMP_C: f32 = 20.0;

/// Dew-point margin below which condensation is imminent in the cold
/// regime (°C).
pub const CONDENSATION_MARGIN_COLD_C: f32 = 3.0;

/// Dew-point margin below which condensation is imminent in the
/// transitional regime (°C).
pub const CONDENSATION_MARGIN_MILD_C: f32 = 2.5;

/// Indoor humidity that earns a caution in the cold regime (%RH).
pub const HUMID_COLD_PCT: f32 = 55.0;

/// Indoor humidity that earns a caution in the warm and transitional
/// regimes (%RH).
pub const HUMID_MILD_PCT: f32 = 60.0;

/// Indoor humidity below which the air is flagged as too dry (%RH).
pub const DRY_PCT: f32 = 35.0;
