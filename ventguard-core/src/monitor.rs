//! Shared Monitor Engine
//!
//! One `ClimateMonitor` is shared between the acquisition worker and every
//! reader (display, web API, messaging). The concurrency contract:
//!
//! - **One exclusive lock** guards the pipeline, history, state machine,
//!   advice cache and outdoor data as a single critical region. Every
//!   mutation (sample ingest, maintenance tick, outdoor submit) runs
//!   entirely inside it, so readers can never observe a half-updated
//!   engine.
//! - **Every acquisition is bounded.** Mutating paths give up and skip
//!   the cycle when the lock does not arrive in time; the next sample or
//!   tick covers for them. Blocking forever is never an option on a
//!   device that must keep sampling.
//! - **Readers never touch the main lock for scalars.** At the end of
//!   each critical section the engine publishes a consistent
//!   [`ClimateSnapshot`] into a read-mostly cell and mirrors the severity
//!   and state codes into atomics. [`snapshot`](ClimateMonitor::snapshot)
//!   reads the cell (last-known-good on contention);
//!   [`advice_severity`](ClimateMonitor::advice_severity) and
//!   [`state_code`](ClimateMonitor::state_code) are plain atomic loads.
//! - **History accessors** need the real buffer and therefore the main
//!   lock, each with its own timeout and a zero-items fallback. Bulk
//!   export of large ranges should use repeated
//!   [`copy_history`](ClimateMonitor::copy_history) calls so no consumer
//!   holds the engine across a slow transport.
//!
//! Lock order is `inner` then `published`; the publication cell is only
//! written while the main guard is held, and only read without it.

use core::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use std::vec::Vec;

use parking_lot::{Mutex, RwLock};

use crate::advice::{Advice, AdviceCache, Severity};
use crate::buffer::{CircularBuffer, Record};
use crate::constants::buffers::HISTORY_CAPACITY;
use crate::constants::time::{
    COPY_LOCK_TIMEOUT_MS, EPOCH_SANITY_FLOOR_MS, INGEST_LOCK_TIMEOUT_MS,
    LOG_INTERVAL_ACTIVE_MS, LOG_INTERVAL_STABLE_MS, LOOKUP_LOCK_TIMEOUT_MS,
    PUBLISH_LOCK_TIMEOUT_MS, SNAPSHOT_LOCK_TIMEOUT_MS, TICK_LOCK_TIMEOUT_MS,
};
use crate::outdoor::OutdoorConditions;
use crate::processor::{MonitorConfig, ReadingProcessor};
use crate::time::{MonitorClock, Timestamp};
use crate::traits::RawSample;
use crate::ventilation::{StateId, StepInput, VentilationMachine};

type HistoryLog = CircularBuffer<Record, HISTORY_CAPACITY>;

/// Owned, internally consistent view of the engine at one instant
///
/// Composed under the engine lock and handed out by value; holding one
/// never blocks or aliases the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClimateSnapshot {
    /// Filtered indoor temperature (°C)
    pub temperature_c: Option<f32>,
    /// Clamped indoor relative humidity (%)
    pub humidity_pct: Option<f32>,
    /// Indoor absolute humidity (g/m³)
    pub abs_humidity: Option<f32>,
    /// Indoor dew point (°C)
    pub dew_point_c: Option<f32>,
    /// Long-term average relative humidity (%)
    pub avg_humidity_pct: Option<f32>,
    /// Cached recommendation text
    pub advice_message: &'static str,
    /// Cached recommendation severity
    pub advice_severity: Severity,
    /// Active ventilation state
    pub state: StateId,
    /// Current drying rate (g/m³ per minute) during active states
    pub drying_rate: Option<f32>,
    /// Humidity the active session is driving toward (%)
    pub ventilation_target: Option<f32>,
    /// Last submitted outdoor conditions
    pub outdoor: OutdoorConditions,
    /// Number of records currently stored
    pub history_len: usize,
}

impl ClimateSnapshot {
    /// Short display tag of the active state.
    pub fn state_str(&self) -> &'static str {
        self.state.as_str()
    }

    /// True while any non-STABLE state is active; readers shorten their
    /// own refresh intervals on this.
    pub fn is_rapid_change(&self) -> bool {
        self.state.is_rapid_change()
    }
}

impl Default for ClimateSnapshot {
    fn default() -> Self {
        let advice = Advice::default();
        Self {
            temperature_c: None,
            humidity_pct: None,
            abs_humidity: None,
            dew_point_c: None,
            avg_humidity_pct: None,
            advice_message: advice.message,
            advice_severity: advice.severity,
            state: StateId::Stable,
            drying_rate: None,
            ventilation_target: None,
            outdoor: OutdoorConditions::default(),
            history_len: 0,
        }
    }
}

/// Everything the engine lock protects
struct MonitorShared {
    processor: ReadingProcessor,
    history: HistoryLog,
    machine: VentilationMachine,
    advice: AdviceCache,
    outdoor: OutdoorConditions,
    last_log_at: Timestamp,
}

impl MonitorShared {
    /// Adaptive logging decision plus advice refresh. Called at the end of
    /// every mutation so the worker and the maintenance tick are
    /// interchangeable drivers.
    fn run_maintenance(&mut self, now_mono: Timestamp, now_wall: Timestamp) {
        self.maybe_log(now_mono, now_wall);
        self.advice.maybe_refresh(
            now_mono,
            &self.processor.state(),
            self.machine.state_id(),
            &self.outdoor,
        );
    }

    fn maybe_log(&mut self, now_mono: Timestamp, now_wall: Timestamp) {
        let interval = if self.machine.state_id().is_rapid_change() {
            LOG_INTERVAL_ACTIVE_MS
        } else {
            LOG_INTERVAL_STABLE_MS
        };
        if now_mono.saturating_sub(self.last_log_at) < interval {
            return;
        }

        let current = self.processor.state();
        let (Some(temperature_c), Some(humidity_pct)) =
            (current.temperature_c, current.humidity_pct)
        else {
            // Nothing measured yet; leave the cadence armed
            return;
        };

        if self.machine.state_id().is_rapid_change() {
            if let Some(abs) = current.abs_humidity {
                self.machine.push_slope_sample(abs);
            }
        }

        // Garbage timestamps from a not-yet-synced clock would corrupt the
        // series; the slot is skipped, not deferred
        if now_wall >= EPOCH_SANITY_FLOOR_MS {
            self.history.push(Record {
                timestamp_ms: now_wall,
                temperature_c,
                humidity_pct,
            });
        } else {
            log::debug!("history append suppressed, wall clock not synced yet");
        }

        self.last_log_at = now_mono;
    }

    fn compose_snapshot(&self) -> ClimateSnapshot {
        let current = self.processor.state();
        let advice = self.advice.current();
        ClimateSnapshot {
            temperature_c: current.temperature_c,
            humidity_pct: current.humidity_pct,
            abs_humidity: current.abs_humidity,
            dew_point_c: current.dew_point_c,
            avg_humidity_pct: current.avg_humidity_pct,
            advice_message: advice.message,
            advice_severity: advice.severity,
            state: self.machine.state_id(),
            drying_rate: self.machine.drying_rate(),
            ventilation_target: self.machine.ventilation_target(),
            outdoor: self.outdoor.clone(),
            history_len: self.history.len(),
        }
    }
}

/// The shared decision engine
///
/// Construct once, wrap in an `Arc`, hand clones to the acquisition
/// worker and every reader. See the module docs for the locking contract.
pub struct ClimateMonitor {
    inner: Mutex<MonitorShared>,
    published: RwLock<ClimateSnapshot>,
    severity_code: AtomicU8,
    state_code: AtomicU8,
    clock: MonitorClock,
    config: MonitorConfig,
}

impl ClimateMonitor {
    /// Engine on the production clock pair.
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_clock(config, MonitorClock::real())
    }

    /// Engine on an explicit clock pair.
    pub fn with_clock(config: MonitorConfig, clock: MonitorClock) -> Self {
        let start = clock.now_monotonic();
        let initial = ClimateSnapshot::default();
        Self {
            inner: Mutex::new(MonitorShared {
                processor: ReadingProcessor::new(config),
                history: HistoryLog::new(),
                machine: VentilationMachine::new(start),
                advice: AdviceCache::new(),
                outdoor: OutdoorConditions::default(),
                last_log_at: start,
            }),
            severity_code: AtomicU8::new(initial.advice_severity.code()),
            state_code: AtomicU8::new(initial.state.code()),
            published: RwLock::new(initial),
            clock,
            config,
        }
    }

    /// Feed one raw probe sample through the pipeline.
    ///
    /// Runs filtering, physics, the state-machine step and maintenance as
    /// one critical section. Samples with non-finite fields are dropped at
    /// the door; on lock timeout the sample is dropped and the next cycle
    /// covers the gap.
    pub fn ingest(&self, raw: RawSample) {
        if !raw.is_finite() {
            log::warn!(
                "discarding non-finite sample t={} h={}",
                raw.temperature_c,
                raw.humidity_pct
            );
            return;
        }

        let now = self.clock.now_monotonic();
        let Some(mut shared) = self
            .inner
            .try_lock_for(Duration::from_millis(INGEST_LOCK_TIMEOUT_MS))
        else {
            log::warn!("sample dropped, engine busy past {INGEST_LOCK_TIMEOUT_MS}ms");
            return;
        };

        let processed = shared.processor.process(raw);
        if let (Some(temperature_c), Some(humidity_pct), Some(abs_humidity)) = (
            processed.temperature_c,
            processed.humidity_pct,
            processed.abs_humidity,
        ) {
            let input = StepInput {
                temperature_c,
                humidity_pct,
                abs_humidity,
            };
            let last = shared.history.last();
            shared.machine.step(input, last, now);
        }

        shared.run_maintenance(now, self.clock.now_wall());
        self.publish(&shared);
    }

    /// Periodic maintenance: adaptive logging decision and advice refresh.
    ///
    /// Cheap and idempotent; drive it from the control loop a few times
    /// per second. Skipped silently on lock timeout.
    pub fn tick(&self) {
        let now = self.clock.now_monotonic();
        let Some(mut shared) = self
            .inner
            .try_lock_for(Duration::from_millis(TICK_LOCK_TIMEOUT_MS))
        else {
            return;
        };
        shared.run_maintenance(now, self.clock.now_wall());
        self.publish(&shared);
    }

    /// Replace the outdoor conditions used by the advice tree.
    pub fn submit_outdoor(&self, conditions: OutdoorConditions) {
        let Some(mut shared) = self
            .inner
            .try_lock_for(Duration::from_millis(INGEST_LOCK_TIMEOUT_MS))
        else {
            log::warn!("outdoor update dropped, engine busy");
            return;
        };
        shared.outdoor = conditions;
        self.publish(&shared);
    }

    /// Consistent owned view of the engine.
    ///
    /// Reads the publication cell, never the main lock, so it cannot
    /// stall the worker. Under write contention past the bounded wait it
    /// falls back to the default (pending) snapshot.
    pub fn snapshot(&self) -> ClimateSnapshot {
        self.published
            .try_read_for(Duration::from_millis(PUBLISH_LOCK_TIMEOUT_MS))
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Severity of the cached advice, as a lock-free load.
    pub fn advice_severity(&self) -> Severity {
        Severity::from_code(self.severity_code.load(Ordering::Acquire))
            .unwrap_or(Severity::Pending)
    }

    /// Numeric code of the active state, as a lock-free load.
    pub fn state_code(&self) -> u8 {
        self.state_code.load(Ordering::Acquire)
    }

    /// Active state, as a lock-free load.
    pub fn state_id(&self) -> StateId {
        StateId::from_code(self.state_code()).unwrap_or(StateId::Stable)
    }

    /// Number of records currently stored, from the publication cell.
    pub fn history_len(&self) -> usize {
        self.published
            .try_read_for(Duration::from_millis(PUBLISH_LOCK_TIMEOUT_MS))
            .map(|guard| guard.history_len)
            .unwrap_or(0)
    }

    /// Full ordered history copy, oldest first.
    ///
    /// Takes the main lock with the long accessor timeout; an empty vector
    /// means the engine stayed busy, not that history is empty. Pair with
    /// [`history_len`](Self::history_len) when that matters.
    pub fn history_snapshot(&self) -> Vec<Record> {
        self.inner
            .try_lock_for(Duration::from_millis(SNAPSHOT_LOCK_TIMEOUT_MS))
            .map(|shared| shared.history.iter().collect())
            .unwrap_or_default()
    }

    /// Copy records starting at logical `offset` (0 = oldest) into `dest`.
    ///
    /// Returns how many were copied: capped to what exists, zero when
    /// `offset` is out of range or the lock timed out. Large exports
    /// should loop over moderate chunks so each call stays lock-bounded.
    pub fn copy_history(&self, offset: usize, dest: &mut [Record]) -> usize {
        self.inner
            .try_lock_for(Duration::from_millis(COPY_LOCK_TIMEOUT_MS))
            .map(|shared| shared.history.copy_range(offset, dest))
            .unwrap_or(0)
    }

    /// Best-effort single record lookup at logical `index` (0 = oldest).
    ///
    /// The wait is one millisecond; `None` means out of range or busy.
    /// Meant for approximate probing, not iteration.
    pub fn record_at(&self, index: usize) -> Option<Record> {
        self.inner
            .try_lock_for(Duration::from_millis(LOOKUP_LOCK_TIMEOUT_MS))
            .and_then(|shared| shared.history.get(index))
    }

    /// Calibration and pacing settings the engine was built with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn publish(&self, shared: &MonitorShared) {
        let snapshot = shared.compose_snapshot();
        self.severity_code
            .store(snapshot.advice_severity.code(), Ordering::Release);
        self.state_code.store(snapshot.state.code(), Ordering::Release);
        if let Some(mut cell) = self
            .published
            .try_write_for(Duration::from_millis(PUBLISH_LOCK_TIMEOUT_MS))
        {
            *cell = snapshot;
        }
        // A missed publish leaves the previous consistent snapshot in
        // place; the atomics above are already current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::messages;
    use crate::constants::time::{ADVICE_REFRESH_MS, EPOCH_SANITY_FLOOR_MS};
    use crate::time::TimeSource;
    use core::sync::atomic::AtomicU64;
    use std::sync::Arc;

    struct TestClock {
        ms: Arc<AtomicU64>,
        wall: bool,
    }

    impl TimeSource for TestClock {
        fn now(&self) -> Timestamp {
            self.ms.load(Ordering::Relaxed)
        }
        fn is_wall_clock(&self) -> bool {
            self.wall
        }
        fn precision_ms(&self) -> u32 {
            1
        }
    }

    const WALL_START: u64 = 1_700_000_000_000;

    fn test_monitor() -> (ClimateMonitor, Arc<AtomicU64>, Arc<AtomicU64>) {
        let mono = Arc::new(AtomicU64::new(0));
        let wall = Arc::new(AtomicU64::new(WALL_START));
        let clock = MonitorClock::new(
            Box::new(TestClock {
                ms: mono.clone(),
                wall: false,
            }),
            Box::new(TestClock {
                ms: wall.clone(),
                wall: true,
            }),
        );
        let monitor = ClimateMonitor::with_clock(MonitorConfig::default(), clock);
        (monitor, mono, wall)
    }

    fn advance(mono: &AtomicU64, wall: &AtomicU64, ms: u64) {
        mono.fetch_add(ms, Ordering::Relaxed);
        wall.fetch_add(ms, Ordering::Relaxed);
    }

    #[test]
    fn fresh_monitor_reports_pending_defaults() {
        let (monitor, _, _) = test_monitor();
        let snap = monitor.snapshot();
        assert_eq!(snap.state, StateId::Stable);
        assert_eq!(snap.advice_severity, Severity::Pending);
        assert_eq!(snap.advice_message, messages::ANALYZING);
        assert!(snap.temperature_c.is_none());
        assert_eq!(monitor.history_len(), 0);
        assert_eq!(monitor.state_code(), 0);
    }

    #[test]
    fn ingest_publishes_readings_and_throttled_advice() {
        let (monitor, mono, wall) = test_monitor();

        monitor.ingest(RawSample::new(21.0, 48.0));
        let snap = monitor.snapshot();
        assert_eq!(snap.temperature_c, Some(21.0));
        assert_eq!(snap.humidity_pct, Some(48.0));
        // Still inside the boot throttle window
        assert_eq!(snap.advice_severity, Severity::Pending);

        advance(&mono, &wall, ADVICE_REFRESH_MS + 1);
        monitor.tick();
        let snap = monitor.snapshot();
        assert_ne!(snap.advice_severity, Severity::Pending);
        assert_eq!(monitor.advice_severity(), snap.advice_severity);
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let (monitor, _, _) = test_monitor();
        monitor.ingest(RawSample::new(f32::NAN, 50.0));
        assert!(monitor.snapshot().temperature_c.is_none());
    }

    #[test]
    fn history_waits_for_epoch_floor() {
        let (monitor, mono, wall) = test_monitor();
        // Far enough below the floor that the cadence advances cannot
        // cross it
        wall.store(EPOCH_SANITY_FLOOR_MS - 100 * LOG_INTERVAL_STABLE_MS, Ordering::Relaxed);

        monitor.ingest(RawSample::new(21.0, 48.0));
        advance(&mono, &wall, LOG_INTERVAL_STABLE_MS);
        monitor.ingest(RawSample::new(21.0, 48.0));
        // Cadence fired but the clock was unsynced: slot skipped
        assert_eq!(monitor.history_len(), 0);

        wall.store(WALL_START, Ordering::Relaxed);
        advance(&mono, &wall, LOG_INTERVAL_STABLE_MS);
        monitor.ingest(RawSample::new(21.0, 48.0));
        assert_eq!(monitor.history_len(), 1);

        let record = monitor.record_at(0).unwrap();
        assert_eq!(record.timestamp_ms, WALL_START + LOG_INTERVAL_STABLE_MS);
        assert_eq!(record.humidity_pct, 48.0);
    }

    #[test]
    fn ventilation_shortens_log_cadence_and_feeds_slope() {
        let (monitor, mono, wall) = test_monitor();

        monitor.ingest(RawSample::new(21.0, 70.0));
        advance(&mono, &wall, LOG_INTERVAL_STABLE_MS);
        monitor.ingest(RawSample::new(21.0, 70.0));
        assert_eq!(monitor.history_len(), 1);

        // Sharp humidity drop versus the stored record: session starts
        advance(&mono, &wall, 60_000);
        monitor.ingest(RawSample::new(21.0, 66.0));
        assert_eq!(monitor.state_id(), StateId::Ventilating);
        let snap = monitor.snapshot();
        assert!(snap.is_rapid_change());
        assert_eq!(snap.state_str(), "VENT");
        assert_eq!(snap.ventilation_target, Some(51.0));
        // That ingest was also a logging tick at the active cadence
        assert_eq!(snap.history_len, 2);

        advance(&mono, &wall, LOG_INTERVAL_ACTIVE_MS);
        monitor.ingest(RawSample::new(21.0, 64.5));
        let snap = monitor.snapshot();
        assert_eq!(snap.history_len, 3);
        let rate = snap.drying_rate.expect("two slope samples by now");
        assert!(rate < 0.0, "drying rate should be negative, got {rate}");
    }

    #[test]
    fn partial_copy_matches_snapshot_slice() {
        let (monitor, mono, wall) = test_monitor();

        for i in 0..5 {
            monitor.ingest(RawSample::new(21.0, 48.0 + i as f32 * 0.1));
            advance(&mono, &wall, LOG_INTERVAL_STABLE_MS);
        }
        monitor.ingest(RawSample::new(21.0, 48.5));
        let full = monitor.history_snapshot();
        assert_eq!(full.len(), monitor.history_len());
        assert!(full.len() >= 3);

        let mut chunk = [Record::default(); 2];
        let copied = monitor.copy_history(1, &mut chunk);
        assert_eq!(copied, 2);
        assert_eq!(&chunk[..], &full[1..3]);

        assert_eq!(monitor.copy_history(full.len(), &mut chunk), 0);
    }

    #[test]
    fn record_lookup_is_bounds_checked() {
        let (monitor, mono, wall) = test_monitor();
        monitor.ingest(RawSample::new(21.0, 48.0));
        advance(&mono, &wall, LOG_INTERVAL_STABLE_MS);
        monitor.ingest(RawSample::new(21.0, 48.0));

        assert!(monitor.record_at(0).is_some());
        assert!(monitor.record_at(7).is_none());
    }

    #[test]
    fn outdoor_conditions_echo_and_steer_advice() {
        let (monitor, mono, wall) = test_monitor();
        monitor.submit_outdoor(OutdoorConditions::new(2.0, 85.0).with_status("ok"));

        monitor.ingest(RawSample::new(21.0, 45.0));
        advance(&mono, &wall, ADVICE_REFRESH_MS + 1);
        monitor.tick();

        let snap = monitor.snapshot();
        assert!(snap.outdoor.is_valid());
        assert_eq!(snap.outdoor.status.as_str(), "ok");
        // Cold outdoor reference selects the winter branch
        assert_eq!(snap.advice_message, messages::WINTER_OK);
        assert_eq!(snap.advice_severity, Severity::Normal);
    }
}
