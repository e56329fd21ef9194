//! Constants for VentGuard Core
//!
//! This module centralizes every fixed numeric value in the engine. The
//! system is deliberately non-configurable beyond calibration offsets, so
//! tuning lives here, documented, instead of being scattered through the
//! decision code as magic numbers.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Physics**: Magnus-formula coefficients and unit conversions
//! - **Thresholds**: state-machine triggers, filter limits, advice bands
//! - **Time**: cadences, lockouts, and lock timeouts
//! - **Buffers**: ring-buffer capacities
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. When adding new constants, document purpose and rationale
//! 3. Group related constants together

/// Magnus-formula coefficients and physical conversion factors.
pub mod physics;

/// Decision thresholds for filtering, state transitions, and advice.
pub mod thresholds;

/// Cadences, lockout periods, and lock-acquisition timeouts.
pub mod time;

/// Ring-buffer capacities.
pub mod buffers;

// Re-export commonly used constants for convenience
pub use physics::{
    MAGNUS_SVP_BASE_HPA, MAGNUS_SVP_COEFF, MAGNUS_SVP_TEMP_OFFSET_C,
    ABS_HUMIDITY_FACTOR, CELSIUS_TO_KELVIN,
};

pub use thresholds::{
    MAX_TEMP_JUMP_C, TEMP_BLEND_ALPHA, AVG_EMA_ALPHA,
    HUM_DROP_TRIGGER_PCT, TEMP_DROP_TRIGGER_C,
    TARGET_FLOOR_PCT, TARGET_DROP_PCT,
};

pub use time::{
    MS_PER_SECOND, MS_PER_MINUTE, MS_PER_HOUR,
    SAMPLE_INTERVAL_MS, ADVICE_REFRESH_MS,
};

pub use buffers::{HISTORY_CAPACITY, SLOPE_WINDOW_LEN};
