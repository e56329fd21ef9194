//! Shared helpers for the integration tests
//!
//! Provides a monitor bench on a scripted clock pair so multi-minute
//! device timelines (log cadences, lockouts, the settled timeout) run
//! instantly, plus small feeding shortcuts for scenario scripts.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ventguard_core::monitor::ClimateMonitor;
use ventguard_core::time::{MonitorClock, TimeSource, Timestamp};
use ventguard_core::{MonitorConfig, RawSample};

/// Wall-clock start for scripted timelines, safely past the epoch floor
pub const WALL_START: u64 = 1_700_000_000_000;

/// Milliseconds between probe samples on the scripted timeline
pub const SAMPLE_MS: u64 = 6_000;

struct ScriptedClock {
    ms: Arc<AtomicU64>,
    wall: bool,
}

impl TimeSource for ScriptedClock {
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

/// A monitor wired to externally driven monotonic and wall clocks
pub struct TestBench {
    pub monitor: Arc<ClimateMonitor>,
    mono: Arc<AtomicU64>,
    wall: Arc<AtomicU64>,
}

impl TestBench {
    pub fn new() -> Self {
        Self::with_config(MonitorConfig::default())
    }

    pub fn with_config(config: MonitorConfig) -> Self {
        let mono = Arc::new(AtomicU64::new(0));
        let wall = Arc::new(AtomicU64::new(WALL_START));
        let clock = MonitorClock::new(
            Box::new(ScriptedClock {
                ms: mono.clone(),
                wall: false,
            }),
            Box::new(ScriptedClock {
                ms: wall.clone(),
                wall: true,
            }),
        );
        Self {
            monitor: Arc::new(ClimateMonitor::with_clock(config, clock)),
            mono,
            wall,
        }
    }

    /// Advance both clocks together.
    pub fn advance(&self, ms: u64) {
        self.mono.fetch_add(ms, Ordering::Relaxed);
        self.wall.fetch_add(ms, Ordering::Relaxed);
    }

    /// Current scripted monotonic time.
    pub fn now(&self) -> u64 {
        self.mono.load(Ordering::Relaxed)
    }

    /// Ingest one sample at the current instant.
    pub fn feed(&self, temp: f32, hum: f32) {
        self.monitor.ingest(RawSample::new(temp, hum));
    }

    /// Advance, then ingest: one probe cycle.
    pub fn feed_after(&self, ms: u64, temp: f32, hum: f32) {
        self.advance(ms);
        self.feed(temp, hum);
    }

    /// Establish readings and a first history record at the given values,
    /// leaving the engine in STABLE with the trigger lockout long expired.
    pub fn prime(&self, temp: f32, hum: f32) {
        self.feed(temp, hum);
        self.feed_after(ventguard_core::constants::time::LOG_INTERVAL_STABLE_MS, temp, hum);
        assert_eq!(self.monitor.history_len(), 1, "priming should log one record");
    }
}
