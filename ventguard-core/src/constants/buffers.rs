//! Buffer Capacities
//!
//! Both rings are sized at compile time; neither ever allocates.

/// History ring capacity in records.
///
/// 480 records cover 24 hours at the 3-minute stable logging cadence.
/// At 16 bytes per record that is ~7.5 KiB, fine for a small heap-free
/// target and trivial on a host.
pub const HISTORY_CAPACITY: usize = 480;

/// Slope window capacity in absolute-humidity samples.
///
/// Six samples at the 30 s active logging cadence span ~3 minutes, the
/// window the plateau slope threshold was tuned for.
pub const SLOPE_WINDOW_LEN: usize = 6;
