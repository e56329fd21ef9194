//! Fixed-Size Ring Buffers for Climate History
//!
//! ## Overview
//!
//! Two rings back the decision engine, both built on the same const-generic
//! buffer:
//!
//! - the **history log**: the last 24 hours of (timestamp, temperature,
//!   humidity) records for charting and for the ventilation trigger, which
//!   compares the live reading against the most recent record;
//! - the **slope window**: the last six absolute-humidity samples taken at
//!   the 30-second active logging cadence, from which plateau detection and
//!   the drying rate read their slope.
//!
//! ## Design Rationale
//!
//! A ring with a write cursor and a saturating length gives exactly the
//! retention policy climate history wants: once full, every write evicts
//! the oldest record, and recent data always wins. Operations are O(1)
//! writes and O(1) indexed reads with zero heap allocation, so the same
//! code runs on a host and on a heap-free target.
//!
//! `heapless::Vec` was considered and rejected: it errors when full instead
//! of evicting, which is the opposite of what a sliding history needs.
//!
//! ## Memory Layout
//!
//! ```text
//! CircularBuffer<Record, 5> after 7 pushes (A..G):
//!
//! physical: │ F │ G │ C │ D │ E │     write_pos = 2, len = 5
//!             0   1   2   3   4
//!                     ↑
//!                     └─ oldest lives at write_pos once full
//!
//! logical:  │ C │ D │ E │ F │ G │     oldest → newest
//!             0   1   2   3   4
//!
//! logical i → physical (write_pos + i) % N    (when full)
//! logical i → physical i                      (while filling)
//! ```
//!
//! The mapping is what every accessor in this module is built on; the
//! partial-copy operation exposes it directly for paginated exports.

use crate::constants::buffers::SLOPE_WINDOW_LEN;
use crate::constants::time::LOG_INTERVAL_ACTIVE_MS;
use crate::time::Timestamp;

/// One history record, immutable once written
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    /// Wall-clock timestamp in milliseconds since the Unix epoch
    pub timestamp_ms: Timestamp,
    /// Filtered temperature in °C
    pub temperature_c: f32,
    /// Clamped relative humidity in %
    pub humidity_pct: f32,
}

/// Fixed-size circular buffer that evicts the oldest element when full
///
/// ## Internal Invariants
///
/// - `write_pos < N` (next write position is always valid)
/// - `len <= N` (never claims more items than capacity)
/// - logical iteration order is always oldest to newest
///
/// ## Thread Safety
///
/// Not thread-safe on its own; the monitor wraps it in the engine lock.
#[derive(Clone)]
pub struct CircularBuffer<T: Copy, const N: usize> {
    /// Storage array using Option for uninitialized slots
    /// (Option instead of MaybeUninit keeps the crate free of unsafe code)
    data: [Option<T>; N],

    /// Index where the next write will occur, wraps at N
    write_pos: usize,

    /// Current number of valid elements, saturates at N
    len: usize,
}

impl<T: Copy, const N: usize> CircularBuffer<T, N> {
    /// Creates a new empty buffer.
    ///
    /// Const, so buffers can live in statics on embedded targets.
    pub const fn new() -> Self {
        Self {
            data: [None; N],
            write_pos: 0,
            len: 0,
        }
    }

    /// Adds an element, evicting the oldest when full.
    pub fn push(&mut self, value: T) {
        self.data[self.write_pos] = Some(value);
        self.write_pos = (self.write_pos + 1) % N;

        if self.len < N {
            self.len += 1;
        }
    }

    /// Number of stored elements
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if nothing has been stored yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True once the buffer has wrapped at least once
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Compile-time capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The most recently pushed element
    pub fn last(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let idx = if self.write_pos == 0 {
            N - 1
        } else {
            self.write_pos - 1
        };

        self.data[idx]
    }

    /// Element at a logical index (0 = oldest, len-1 = newest).
    ///
    /// While filling, logical and physical indices coincide; once full the
    /// oldest element sits at `write_pos` and indices wrap from there (see
    /// the module-level diagram).
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < N {
            index
        } else {
            (self.write_pos + index) % N
        };

        self.data[actual_index]
    }

    /// Copies elements starting at a logical offset into `dest`.
    ///
    /// Returns how many were actually copied: `min(dest.len(), len - offset)`.
    /// An offset at or past the stored count copies nothing; that is the
    /// normal end-of-pagination signal, not a fault.
    pub fn copy_range(&self, offset: usize, dest: &mut [T]) -> usize {
        if offset >= self.len {
            return 0;
        }

        let available = self.len - offset;
        let to_copy = dest.len().min(available);

        for (i, slot) in dest.iter_mut().take(to_copy).enumerate() {
            match self.get(offset + i) {
                Some(value) => *slot = value,
                // Unreachable while the invariants hold; stop rather than
                // hand the caller an uninitialized tail
                None => return i,
            }
        }

        to_copy
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> CircularBufferIter<'_, T, N> {
        CircularBufferIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all elements.
    pub fn clear(&mut self) {
        self.write_pos = 0;
        self.len = 0;
    }
}

impl<T: Copy, const N: usize> Default for CircularBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over buffer contents, oldest to newest
pub struct CircularBufferIter<'a, T: Copy, const N: usize> {
    buffer: &'a CircularBuffer<T, N>,
    index: usize,
}

impl<'a, T: Copy, const N: usize> Iterator for CircularBufferIter<'a, T, N> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }
}

/// Ring of recent absolute-humidity samples for slope analysis
///
/// Fed once per logging tick during non-STABLE states, so consecutive
/// samples are ~30 s apart and the full window spans ~3 minutes. Reset on
/// entry to STABLE or VENTILATING so a new session never sees stale slope.
#[derive(Clone, Default)]
pub struct SlopeWindow {
    samples: CircularBuffer<f32, SLOPE_WINDOW_LEN>,
}

impl SlopeWindow {
    /// Empty window.
    pub const fn new() -> Self {
        Self {
            samples: CircularBuffer::new(),
        }
    }

    /// Record one absolute-humidity sample (g/m³).
    pub fn push(&mut self, abs_humidity: f32) {
        self.samples.push(abs_humidity);
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no samples have been recorded yet
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Forget all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Newest minus oldest sample (g/m³ across the window).
    ///
    /// Negative while drying. `None` until at least two samples exist.
    pub fn slope(&self) -> Option<f32> {
        if self.samples.len() < 2 {
            return None;
        }

        let oldest = self.samples.get(0)?;
        let newest = self.samples.last()?;
        Some(newest - oldest)
    }

    /// Drying rate in g/m³ per minute, derived from the slope and the
    /// 30-second sample spacing. Negative while drying.
    pub fn rate_per_minute(&self) -> Option<f32> {
        let slope = self.slope()?;
        let intervals = (self.samples.len() - 1) as f32;
        let minutes = intervals * (LOG_INTERVAL_ACTIVE_MS as f32 / 60_000.0);
        Some(slope / minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(n: u64) -> Record {
        Record {
            timestamp_ms: 1_700_000_000_000 + n * 1000,
            temperature_c: 20.0 + n as f32 * 0.1,
            humidity_pct: 50.0,
        }
    }

    #[test]
    fn empty_buffer() {
        let buffer: CircularBuffer<Record, 5> = CircularBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.last().is_none());
        assert!(buffer.get(0).is_none());
    }

    #[test]
    fn push_and_retrieve() {
        let mut buffer: CircularBuffer<Record, 5> = CircularBuffer::new();

        buffer.push(record(0));
        assert_eq!(buffer.len(), 1);
        assert!(!buffer.is_empty());

        let last = buffer.last().unwrap();
        assert_eq!(last.timestamp_ms, record(0).timestamp_ms);
    }

    #[test]
    fn fifo_eviction_keeps_newest() {
        let mut buffer: CircularBuffer<Record, 3> = CircularBuffer::new();

        for n in 0..5 {
            buffer.push(record(n));
        }

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());

        // 0 and 1 evicted; 2, 3, 4 remain in insertion order
        let times: std::vec::Vec<u64> =
            buffer.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(
            times,
            vec![record(2).timestamp_ms, record(3).timestamp_ms, record(4).timestamp_ms]
        );
    }

    #[test]
    fn logical_order_is_strictly_increasing() {
        let mut buffer: CircularBuffer<Record, 8> = CircularBuffer::new();
        for n in 0..20 {
            buffer.push(record(n));
        }

        let times: std::vec::Vec<u64> =
            buffer.iter().map(|r| r.timestamp_ms).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn copy_range_matches_iteration() {
        let mut buffer: CircularBuffer<Record, 4> = CircularBuffer::new();
        for n in 0..7 {
            buffer.push(record(n));
        }

        let all: std::vec::Vec<Record> = buffer.iter().collect();

        let mut chunk = [record(99); 2];
        let copied = buffer.copy_range(1, &mut chunk);
        assert_eq!(copied, 2);
        assert_eq!(&chunk[..], &all[1..3]);
    }

    #[test]
    fn copy_range_caps_to_available() {
        let mut buffer: CircularBuffer<Record, 8> = CircularBuffer::new();
        for n in 0..5 {
            buffer.push(record(n));
        }

        let mut dest = [record(99); 8];
        assert_eq!(buffer.copy_range(3, &mut dest), 2);
        assert_eq!(buffer.copy_range(5, &mut dest), 0);
        assert_eq!(buffer.copy_range(100, &mut dest), 0);
    }

    #[test]
    fn clear_resets_cursor() {
        let mut buffer: CircularBuffer<Record, 3> = CircularBuffer::new();
        for n in 0..5 {
            buffer.push(record(n));
        }
        buffer.clear();
        assert!(buffer.is_empty());

        buffer.push(record(10));
        assert_eq!(buffer.get(0).unwrap().timestamp_ms, record(10).timestamp_ms);
    }

    #[test]
    fn slope_needs_two_samples() {
        let mut window = SlopeWindow::new();
        assert!(window.slope().is_none());

        window.push(9.0);
        assert!(window.slope().is_none());

        window.push(8.5);
        assert_eq!(window.slope(), Some(-0.5));
    }

    #[test]
    fn slope_spans_oldest_to_newest_across_wrap() {
        let mut window = SlopeWindow::new();
        for i in 0..9 {
            window.push(10.0 - i as f32 * 0.2);
        }

        // Window holds samples 3..=8: oldest 9.4, newest 8.4
        assert_eq!(window.len(), SLOPE_WINDOW_LEN);
        let slope = window.slope().unwrap();
        assert!((slope - (-1.0)).abs() < 1e-5, "got {slope}");
    }

    #[test]
    fn drying_rate_uses_sample_spacing() {
        let mut window = SlopeWindow::new();
        window.push(10.0);
        window.push(9.7);
        window.push(9.4);

        // 0.6 g/m³ over two 30 s intervals = 0.6 g/m³ per minute
        let rate = window.rate_per_minute().unwrap();
        assert!((rate - (-0.6)).abs() < 1e-5, "got {rate}");
    }

    proptest! {
        #[test]
        fn len_saturates_and_order_holds(pushes in 0usize..40) {
            let mut buffer: CircularBuffer<Record, 8> = CircularBuffer::new();
            for n in 0..pushes {
                buffer.push(record(n as u64));
            }

            prop_assert_eq!(buffer.len(), pushes.min(8));

            let times: std::vec::Vec<u64> =
                buffer.iter().map(|r| r.timestamp_ms).collect();
            prop_assert!(times.windows(2).all(|w| w[0] < w[1]));

            if pushes > 0 {
                // Newest element is always the last push
                prop_assert_eq!(
                    buffer.last().unwrap().timestamp_ms,
                    record(pushes as u64 - 1).timestamp_ms
                );
            }
        }

        #[test]
        fn copy_range_equals_snapshot_slice(
            pushes in 1usize..30,
            offset in 0usize..35,
            want in 1usize..12,
        ) {
            let mut buffer: CircularBuffer<Record, 8> = CircularBuffer::new();
            for n in 0..pushes {
                buffer.push(record(n as u64));
            }

            let snapshot: std::vec::Vec<Record> = buffer.iter().collect();
            let mut dest = vec![record(999); want];
            let copied = buffer.copy_range(offset, &mut dest);

            if offset >= buffer.len() {
                prop_assert_eq!(copied, 0);
            } else {
                prop_assert_eq!(copied, want.min(buffer.len() - offset));
                prop_assert_eq!(&dest[..copied], &snapshot[offset..offset + copied]);
            }
        }
    }
}
