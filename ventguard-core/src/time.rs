//! Clock Abstraction
//!
//! The engine runs interval arithmetic (lockouts, plateau timing, refresh
//! throttles) on a monotonic clock and stamps stored history with the wall
//! clock. Keeping the two apart means an NTP resynchronization can reorder
//! chart timestamps at worst; it can never fire or suppress a state
//! transition.
//!
//! `TimeSource` is the seam: production code uses [`MonotonicClock`] and
//! [`SystemClock`], tests inject [`FixedClock`] and drive it by hand.

/// Timestamp in milliseconds since epoch (or since start for monotonic)
pub type Timestamp = u64;

/// Source of time for the engine
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    fn is_wall_clock(&self) -> bool;

    /// Get precision in milliseconds
    fn precision_ms(&self) -> u32;
}

/// Monotonic time source anchored at its own construction.
///
/// Starts at 0, never goes backwards, unaffected by clock adjustments.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    started: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Create a clock reading 0 now.
    pub fn new() -> Self {
        Self {
            started: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.started.elapsed().as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Wall-clock time source (milliseconds since the Unix epoch).
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime, UNIX_EPOCH};

        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedClock {
    timestamp: Timestamp,
}

impl FixedClock {
    /// Create a clock frozen at the given timestamp.
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp.
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`.
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }

    fn precision_ms(&self) -> u32 {
        1
    }
}

/// The monotonic/wall clock pair the monitor runs on.
///
/// Production uses [`MonitorClock::real`]; tests swap in whatever sources
/// they need via [`MonitorClock::new`].
#[cfg(feature = "std")]
pub struct MonitorClock {
    monotonic: Box<dyn TimeSource + Send + Sync>,
    wall: Box<dyn TimeSource + Send + Sync>,
}

#[cfg(feature = "std")]
impl MonitorClock {
    /// Pair an arbitrary monotonic source with an arbitrary wall source.
    pub fn new(
        monotonic: Box<dyn TimeSource + Send + Sync>,
        wall: Box<dyn TimeSource + Send + Sync>,
    ) -> Self {
        Self { monotonic, wall }
    }

    /// The production pairing: `Instant`-based monotonic + system wall clock.
    pub fn real() -> Self {
        Self::new(Box::new(MonotonicClock::new()), Box::new(SystemClock))
    }

    /// Milliseconds on the monotonic clock. Drives every interval decision.
    pub fn now_monotonic(&self) -> Timestamp {
        self.monotonic.now()
    }

    /// Milliseconds on the wall clock. Used only for stored timestamps and
    /// the epoch sanity floor.
    pub fn now_wall(&self) -> Timestamp {
        self.wall.now()
    }
}
