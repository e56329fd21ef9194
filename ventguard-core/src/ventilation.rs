//! Ventilation State Machine
//!
//! ## Overview
//!
//! The decision core. Four states track one physical question: is a window
//! open right now, and is keeping it open still worth the heat loss?
//!
//! ```text
//!             hum drop >3pt vs last record
//!             or temp drop >0.5°C vs baseline        hum ≤ target
//!   STABLE ────────────────────────────► VENTILATING ───────────► TARGET_MET
//!     ▲         (after 60 s lockout)         │    │                   │
//!     │                                      │    │ slope stalled     │
//!     │         rebound slow/fast            │    │ ×15 confirms      │
//!     ◄──────────────────────────────────────┘    ▼                   │
//!     │                                      INEFFICIENT              │
//!     │                                           │                   │
//!     └──────────── rebound slow/fast, or 1 h timeout ◄───────────────┘
//! ```
//!
//! ## Signals
//!
//! - **Trigger**: opening a window in winter shows up as a sharp relative
//!   humidity drop or a temperature drop. Both are measured against slowly
//!   refreshed baselines so normal household drift never trips them.
//! - **Plateau**: drying effectiveness is the slope of absolute humidity
//!   across the slope window. Once the slope flattens past the threshold
//!   for 15 consecutive samples, further ventilation wastes heat.
//! - **Rebound**: a closed window shows up either as temperature creeping
//!   back up (slow path, sustained two minutes) or absolute humidity
//!   snapping back (fast path, immediate).
//!
//! ## Shape
//!
//! The state is a sum type carrying its own entry data; stepping is a
//! deterministic function of (machine, input, now). No clock is read and
//! no hardware is touched here, which is what makes the transition table
//! testable sample by sample.
//!
//! Baselines and the slope window live on the machine rather than in a
//! variant: the window must survive the VENTILATING → TARGET_MET edge,
//! and baselines are refreshed by every transition.

use crate::buffer::{Record, SlopeWindow};
use crate::constants::thresholds::{
    ABS_HUM_REBOUND_G_M3, BASELINE_REFRESH_SAMPLES, HUM_DROP_TRIGGER_PCT,
    PLATEAU_CONFIRMATIONS, PLATEAU_MIN_WINDOW_SAMPLES, PLATEAU_SLOPE_G_M3,
    REBOUND_RISE_C, REBOUND_WATCH_DELTA_C, TARGET_DROP_PCT, TARGET_FLOOR_PCT,
    TEMP_DROP_TRIGGER_C,
};
use crate::constants::time::{
    PLATEAU_MIN_ELAPSED_MS, REBOUND_SUSTAIN_MS, SETTLED_TIMEOUT_MS, VENT_LOCKOUT_MS,
};
use crate::time::Timestamp;

// Macro for optional logging
#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

/// Discriminant of the active state, for reporting and publication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StateId {
    /// Window closed, watching for a ventilation trigger
    Stable = 0,
    /// Window open, drying in progress
    Ventilating = 1,
    /// Target humidity reached, waiting for the window to be closed
    TargetMet = 2,
    /// Drying has stalled, ventilation is wasting heat
    Inefficient = 3,
}

impl StateId {
    /// Stable numeric code used by collaborators (0..=3).
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`StateId::code`].
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Stable),
            1 => Some(Self::Ventilating),
            2 => Some(Self::TargetMet),
            3 => Some(Self::Inefficient),
            _ => None,
        }
    }

    /// Short display tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "STABLE",
            Self::Ventilating => "VENT",
            Self::TargetMet => "TARGET",
            Self::Inefficient => "INEFFICIENT",
        }
    }

    /// True in any non-STABLE state. Collaborators shorten their refresh
    /// intervals while this holds.
    pub const fn is_rapid_change(self) -> bool {
        !matches!(self, Self::Stable)
    }
}

/// Temperature rebound tracking (the slow window-closed path)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReboundTrack {
    /// No rise observed yet
    Idle,
    /// Temperature crossed the watch threshold; waiting for a sustained
    /// rise above the baseline recorded here
    Rising {
        /// Window-check temperature baseline at the moment the rise began
        baseline_c: f32,
        /// Monotonic time the rise began
        started_at: Timestamp,
    },
}

/// Active state with its entry payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClimateState {
    /// Window closed, trigger surveillance active
    Stable {
        /// Monotonic entry time; the trigger lockout counts from here
        entered_at: Timestamp,
    },
    /// Window open, drying toward the adaptive target
    Ventilating {
        /// Monotonic entry time; plateau detection arms from here
        entered_at: Timestamp,
        /// Relative humidity when ventilation began (sets the target)
        entry_humidity_pct: f32,
        /// Absolute humidity when ventilation began (for efficiency
        /// reporting)
        entry_abs_humidity: f32,
        /// Consecutive stalled-slope confirmations
        plateau_confirms: u32,
        /// Slow-path rebound tracking
        rebound: ReboundTrack,
    },
    /// Success; window assumed still open until a rebound confirms closure
    TargetMet {
        /// Monotonic entry time; the settled timeout counts from here
        entered_at: Timestamp,
        /// Slow-path rebound tracking
        rebound: ReboundTrack,
    },
    /// Drying stalled; window should be closed
    Inefficient {
        /// Monotonic entry time; the settled timeout counts from here
        entered_at: Timestamp,
        /// Slow-path rebound tracking
        rebound: ReboundTrack,
    },
}

impl ClimateState {
    /// Discriminant of this state.
    pub const fn id(&self) -> StateId {
        match self {
            Self::Stable { .. } => StateId::Stable,
            Self::Ventilating { .. } => StateId::Ventilating,
            Self::TargetMet { .. } => StateId::TargetMet,
            Self::Inefficient { .. } => StateId::Inefficient,
        }
    }

    /// Monotonic time this state was entered.
    pub const fn entered_at(&self) -> Timestamp {
        match self {
            Self::Stable { entered_at }
            | Self::Ventilating { entered_at, .. }
            | Self::TargetMet { entered_at, .. }
            | Self::Inefficient { entered_at, .. } => *entered_at,
        }
    }
}

/// What fired a transition, for logs and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    /// Humidity or temperature drop signalled an opened window
    VentilationDetected,
    /// Humidity reached the adaptive target
    TargetReached,
    /// Stalled drying slope confirmed repeatedly
    PlateauConfirmed,
    /// Sustained temperature rise above baseline
    ReboundConfirmed,
    /// Absolute humidity snapped back above baseline
    HumidityRebound,
    /// Settled state exceeded the one-hour safety timeout
    SettledTimeout,
}

impl TransitionCause {
    /// Short display tag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VentilationDetected => "ventilation detected",
            Self::TargetReached => "target reached",
            Self::PlateauConfirmed => "plateau confirmed",
            Self::ReboundConfirmed => "temperature rebound",
            Self::HumidityRebound => "humidity rebound",
            Self::SettledTimeout => "settled timeout",
        }
    }
}

/// One completed state change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State before the step
    pub from: StateId,
    /// State after the step
    pub to: StateId,
    /// Which rule fired
    pub cause: TransitionCause,
}

/// One filtered sample as the machine consumes it
///
/// All fields are defined values; the processor only steps the machine
/// when the physics produced a result.
#[derive(Debug, Clone, Copy)]
pub struct StepInput {
    /// Filtered temperature (°C)
    pub temperature_c: f32,
    /// Clamped relative humidity (%)
    pub humidity_pct: f32,
    /// Derived absolute humidity (g/m³)
    pub abs_humidity: f32,
}

/// Window-check baselines, refreshed on every transition and on slow
/// drift while STABLE
#[derive(Debug, Clone, Copy, Default)]
struct Baseline {
    temperature_c: Option<f32>,
    abs_humidity: Option<f32>,
}

impl Baseline {
    fn at(input: StepInput) -> Self {
        Self {
            temperature_c: Some(input.temperature_c),
            abs_humidity: Some(input.abs_humidity),
        }
    }
}

/// The four-state decision core
///
/// Owns the active [`ClimateState`], the window-check baselines, and the
/// slope window. Stepped once per processed sample under the engine lock;
/// fed one slope sample per active logging tick.
pub struct VentilationMachine {
    state: ClimateState,
    baseline: Baseline,
    window: SlopeWindow,
    /// Samples since the last slow-drift baseline refresh. Deliberately
    /// not reset by transitions; it resumes where it left off on the next
    /// STABLE stretch.
    samples_since_refresh: u32,
}

impl VentilationMachine {
    /// Machine starting in STABLE at the given monotonic time.
    pub fn new(now: Timestamp) -> Self {
        Self {
            state: ClimateState::Stable { entered_at: now },
            baseline: Baseline::default(),
            window: SlopeWindow::new(),
            samples_since_refresh: 0,
        }
    }

    /// The active state with its payload.
    pub fn state(&self) -> ClimateState {
        self.state
    }

    /// Discriminant of the active state.
    pub fn state_id(&self) -> StateId {
        self.state.id()
    }

    /// Adaptive stop target while ventilating: never below the floor,
    /// otherwise entry humidity minus the fixed drop.
    pub fn ventilation_target(&self) -> Option<f32> {
        match self.state {
            ClimateState::Ventilating {
                entry_humidity_pct, ..
            } => Some(target_humidity(entry_humidity_pct)),
            _ => None,
        }
    }

    /// Drying rate in g/m³ per minute, read off the slope window.
    ///
    /// `None` while STABLE (the window is dedicated to active sessions)
    /// or before two window samples exist.
    pub fn drying_rate(&self) -> Option<f32> {
        match self.state {
            ClimateState::Stable { .. } => None,
            _ => self.window.rate_per_minute(),
        }
    }

    /// Record one absolute-humidity sample into the slope window.
    ///
    /// Called once per logging tick while a non-STABLE state is active.
    pub fn push_slope_sample(&mut self, abs_humidity: f32) {
        self.window.push(abs_humidity);
    }

    /// Advance the machine by one filtered sample.
    ///
    /// `last_record` is the newest history record, the reference for the
    /// ventilation trigger. Deterministic in (`self`, `input`,
    /// `last_record`, `now`); `now` is monotonic milliseconds.
    pub fn step(
        &mut self,
        input: StepInput,
        last_record: Option<Record>,
        now: Timestamp,
    ) -> Option<Transition> {
        let transition = match self.state {
            ClimateState::Stable { entered_at } => {
                self.step_stable(entered_at, input, last_record, now)
            }
            ClimateState::Ventilating { .. } => self.step_ventilating(input, now),
            ClimateState::TargetMet {
                entered_at,
                rebound,
            } => self.step_settled(StateId::TargetMet, entered_at, rebound, input, now),
            ClimateState::Inefficient {
                entered_at,
                rebound,
            } => self.step_settled(StateId::Inefficient, entered_at, rebound, input, now),
        };

        match transition {
            Some(t) => {
                log_info!(
                    "climate state {} -> {} ({})",
                    t.from.as_str(),
                    t.to.as_str(),
                    t.cause.as_str()
                );
                Some(t)
            }
            None => None,
        }
    }

    fn step_stable(
        &mut self,
        entered_at: Timestamp,
        input: StepInput,
        last_record: Option<Record>,
        now: Timestamp,
    ) -> Option<Transition> {
        let lockout_elapsed = now.saturating_sub(entered_at) >= VENT_LOCKOUT_MS;

        // The trigger needs a history record to compare against; before the
        // first log there is nothing to drop from
        if lockout_elapsed {
            if let Some(last) = last_record {
                let hum_drop =
                    (last.humidity_pct - input.humidity_pct) > HUM_DROP_TRIGGER_PCT;
                let temp_drop = self
                    .baseline
                    .temperature_c
                    .map(|base| (base - input.temperature_c) > TEMP_DROP_TRIGGER_C)
                    .unwrap_or(false);

                if hum_drop || temp_drop {
                    return Some(self.enter_ventilating(input, now));
                }
            }
        }

        // Slow-drift baseline refresh, ~5 minutes at the sample cadence
        self.samples_since_refresh += 1;
        if self.samples_since_refresh >= BASELINE_REFRESH_SAMPLES {
            self.samples_since_refresh = 0;
            self.baseline = Baseline::at(input);
        }

        None
    }

    fn step_ventilating(&mut self, input: StepInput, now: Timestamp) -> Option<Transition> {
        let ClimateState::Ventilating {
            entered_at,
            entry_humidity_pct,
            entry_abs_humidity,
            plateau_confirms,
            rebound,
        } = self.state
        else {
            return None;
        };

        // a. Success: adaptive target reached
        if input.humidity_pct <= target_humidity(entry_humidity_pct) {
            return Some(self.enter_settled(StateId::TargetMet, input, now));
        }

        // b. Plateau: armed after three minutes with enough window samples
        let mut plateau_confirms = plateau_confirms;
        if now.saturating_sub(entered_at) >= PLATEAU_MIN_ELAPSED_MS
            && self.window.len() >= PLATEAU_MIN_WINDOW_SAMPLES
        {
            if let Some(slope) = self.window.slope() {
                if slope > PLATEAU_SLOPE_G_M3 {
                    plateau_confirms += 1;
                    if plateau_confirms >= PLATEAU_CONFIRMATIONS {
                        return Some(self.enter_settled(StateId::Inefficient, input, now));
                    }
                } else {
                    // Still drying effectively
                    plateau_confirms = 0;
                }
            }
        }

        // c. Rebound, slow path: sustained temperature rise
        let mut rebound = rebound;
        if track_rebound(&mut rebound, self.baseline.temperature_c, input, now) {
            return Some(self.enter_stable(input, now, TransitionCause::ReboundConfirmed));
        }

        // d. Rebound, fast path: checked every sample regardless of a-c
        if self.abs_humidity_rebounded(input) {
            return Some(self.enter_stable(input, now, TransitionCause::HumidityRebound));
        }

        self.state = ClimateState::Ventilating {
            entered_at,
            entry_humidity_pct,
            entry_abs_humidity,
            plateau_confirms,
            rebound,
        };
        None
    }

    fn step_settled(
        &mut self,
        id: StateId,
        entered_at: Timestamp,
        rebound: ReboundTrack,
        input: StepInput,
        now: Timestamp,
    ) -> Option<Transition> {
        let mut rebound = rebound;
        if track_rebound(&mut rebound, self.baseline.temperature_c, input, now) {
            return Some(self.enter_stable(input, now, TransitionCause::ReboundConfirmed));
        }

        if self.abs_humidity_rebounded(input) {
            return Some(self.enter_stable(input, now, TransitionCause::HumidityRebound));
        }

        // Safety net against a window left open with the sensor parked on a
        // plateau, or a rebound the thresholds missed
        if now.saturating_sub(entered_at) > SETTLED_TIMEOUT_MS {
            return Some(self.enter_stable(input, now, TransitionCause::SettledTimeout));
        }

        self.state = match id {
            StateId::TargetMet => ClimateState::TargetMet {
                entered_at,
                rebound,
            },
            _ => ClimateState::Inefficient {
                entered_at,
                rebound,
            },
        };
        None
    }

    fn abs_humidity_rebounded(&self, input: StepInput) -> bool {
        self.baseline
            .abs_humidity
            .map(|base| (input.abs_humidity - base) > ABS_HUM_REBOUND_G_M3)
            .unwrap_or(false)
    }

    fn enter_ventilating(&mut self, input: StepInput, now: Timestamp) -> Transition {
        let from = self.state.id();
        self.state = ClimateState::Ventilating {
            entered_at: now,
            entry_humidity_pct: input.humidity_pct,
            entry_abs_humidity: input.abs_humidity,
            plateau_confirms: 0,
            rebound: ReboundTrack::Idle,
        };
        self.baseline = Baseline::at(input);
        self.window.clear();
        Transition {
            from,
            to: StateId::Ventilating,
            cause: TransitionCause::VentilationDetected,
        }
    }

    fn enter_settled(&mut self, id: StateId, input: StepInput, now: Timestamp) -> Transition {
        let from = self.state.id();
        self.state = match id {
            StateId::TargetMet => ClimateState::TargetMet {
                entered_at: now,
                rebound: ReboundTrack::Idle,
            },
            _ => ClimateState::Inefficient {
                entered_at: now,
                rebound: ReboundTrack::Idle,
            },
        };
        self.baseline = Baseline::at(input);
        // The slope window is kept: it still describes the session and
        // feeds the drying-rate readout until the next session starts
        let cause = if id == StateId::TargetMet {
            TransitionCause::TargetReached
        } else {
            TransitionCause::PlateauConfirmed
        };
        Transition {
            from,
            to: id,
            cause,
        }
    }

    fn enter_stable(
        &mut self,
        input: StepInput,
        now: Timestamp,
        cause: TransitionCause,
    ) -> Transition {
        let from = self.state.id();
        self.state = ClimateState::Stable { entered_at: now };
        self.baseline = Baseline::at(input);
        self.window.clear();
        Transition {
            from,
            to: StateId::Stable,
            cause,
        }
    }
}

/// Adaptive stop target: entry humidity minus the fixed drop, floored.
fn target_humidity(entry_pct: f32) -> f32 {
    (entry_pct - TARGET_DROP_PCT).max(TARGET_FLOOR_PCT)
}

/// Advance rebound tracking by one sample; true when a sustained rise
/// confirms the window closed.
fn track_rebound(
    rebound: &mut ReboundTrack,
    baseline_temp: Option<f32>,
    input: StepInput,
    now: Timestamp,
) -> bool {
    match *rebound {
        ReboundTrack::Rising {
            baseline_c,
            started_at,
        } => {
            let rise = input.temperature_c - baseline_c;
            if rise > REBOUND_RISE_C && now.saturating_sub(started_at) >= REBOUND_SUSTAIN_MS {
                return true;
            }
            // Fell back under the baseline: that was drift, not closure
            if input.temperature_c < baseline_c {
                *rebound = ReboundTrack::Idle;
            }
        }
        ReboundTrack::Idle => {
            if let Some(base) = baseline_temp {
                if input.temperature_c > base + REBOUND_WATCH_DELTA_C {
                    *rebound = ReboundTrack::Rising {
                        baseline_c: base,
                        started_at: now,
                    };
                }
            }
        }
    }
    false
}
