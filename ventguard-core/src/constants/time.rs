//! Time-Related Constants
//!
//! Cadences, lockout periods, and lock-acquisition timeouts. Interval
//! arithmetic throughout the engine runs on a monotonic clock; the wall
//! clock appears only in stored history timestamps and the epoch floor
//! check below.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

// ===== CADENCES =====

/// Interval between hardware reads (milliseconds).
///
/// DHT22-class sensors need 2 s between reads; 6 s leaves margin and sets
/// the sample cadence all confirmation counts are tuned against.
pub const SAMPLE_INTERVAL_MS: u64 = 6000;

/// History logging interval while STABLE (milliseconds).
pub const LOG_INTERVAL_STABLE_MS: u64 = 3 * MS_PER_MINUTE;

/// History logging interval while any non-STABLE state is active
/// (milliseconds). Also the spacing of slope-window samples, which the
/// plateau threshold assumes.
pub const LOG_INTERVAL_ACTIVE_MS: u64 = 30 * MS_PER_SECOND;

/// Minimum interval between advice recomputations (milliseconds).
pub const ADVICE_REFRESH_MS: u64 = 2000;

// ===== STATE MACHINE TIMING =====

/// Lockout after entering STABLE before a new ventilation trigger is
/// honored (milliseconds). Suppresses immediate retriggering on the
/// residual gradients left by the previous session.
pub const VENT_LOCKOUT_MS: u64 = 60 * MS_PER_SECOND;

/// Time in VENTILATING before plateau detection arms (milliseconds).
pub const PLATEAU_MIN_ELAPSED_MS: u64 = 3 * MS_PER_MINUTE;

/// How long a temperature rebound must be sustained before it confirms a
/// closed window (milliseconds).
pub const REBOUND_SUSTAIN_MS: u64 = 2 * MS_PER_MINUTE;

/// Unconditional fallback from TARGET_MET or INEFFICIENT back to STABLE
/// (milliseconds).
pub const SETTLED_TIMEOUT_MS: u64 = MS_PER_HOUR;

// ===== WALL CLOCK SANITY =====

/// Wall-clock floor below which history logging is suppressed
/// (milliseconds since the Unix epoch; 2020-09-13).
///
/// Before time synchronization completes, the wall clock reads some time
/// near the epoch; recording such timestamps would corrupt the chart
/// x-axis permanently, so logging waits.
pub const EPOCH_SANITY_FLOOR_MS: u64 = 1_600_000_000_000;

// ===== LOCK TIMEOUTS =====

/// Lock timeout for the acquisition hand-off (milliseconds). Generous:
/// losing a 6 s sample matters more than a worker stall of this length.
pub const INGEST_LOCK_TIMEOUT_MS: u64 = 100;

/// Lock timeout for the maintenance tick (milliseconds). Short: the tick
/// reruns on the next loop pass anyway.
pub const TICK_LOCK_TIMEOUT_MS: u64 = 10;

/// Lock timeout for a full history snapshot (milliseconds).
pub const SNAPSHOT_LOCK_TIMEOUT_MS: u64 = 200;

/// Lock timeout for a partial history copy (milliseconds). Shorter than
/// the full snapshot so paginated exports stay responsive under load.
pub const COPY_LOCK_TIMEOUT_MS: u64 = 100;

/// Lock timeout for the published snapshot cell, both the post-mutation
/// write and reader copies (milliseconds).
pub const PUBLISH_LOCK_TIMEOUT_MS: u64 = 10;

/// Lock timeout for the best-effort single-record lookup (milliseconds).
pub const LOOKUP_LOCK_TIMEOUT_MS: u64 = 1;
