//! VentGuard Core - indoor climate decision engine
//!
//! Turns noisy periodic temperature/humidity samples into a stable,
//! physics-informed answer to one question: should this room be
//! ventilated right now, and is an open window still earning its heat
//! loss?
//!
//! The pipeline: an acquisition worker reads the probe and feeds the
//! [`ReadingProcessor`] (calibration, spike filter, smoothing, Magnus
//! physics), which drives the [`VentilationMachine`] (STABLE /
//! VENTILATING / TARGET_MET / INEFFICIENT), a bounded history of
//! [`Record`]s, and a throttled [`AdviceCache`]. With the `std` feature
//! the [`ClimateMonitor`] wraps all of it behind one timed-acquisition
//! lock for concurrent readers.
//!
//! ## Features
//!
//! - `std` (default): the shared [`ClimateMonitor`] engine, worker
//!   threads, `parking_lot` locking, `log` output
//! - `embedded`: `defmt` formatting for error types
//! - `serde`: serialization for records, snapshots and outdoor data
//!
//! ## Example
//!
//! ```
//! use ventguard_core::{ClimateMonitor, MonitorConfig, RawSample};
//!
//! let monitor = ClimateMonitor::new(MonitorConfig::default());
//! monitor.ingest(RawSample::new(21.4, 52.0));
//!
//! let snap = monitor.snapshot();
//! assert_eq!(snap.state_str(), "STABLE");
//! assert_eq!(snap.humidity_pct, Some(52.0));
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod advice;
pub mod buffer;
pub mod constants;
pub mod errors;
pub mod outdoor;
pub mod physics;
pub mod processor;
pub mod time;
pub mod traits;
pub mod ventilation;

#[cfg(feature = "std")]
pub mod monitor;
#[cfg(feature = "std")]
pub mod worker;

pub use advice::{Advice, AdviceCache, Severity};
pub use buffer::{CircularBuffer, Record, SlopeWindow};
pub use errors::{ProbeError, ProbeResult};
pub use outdoor::OutdoorConditions;
pub use processor::{MonitorConfig, ProcessedState, ReadingProcessor};
pub use time::{TimeSource, Timestamp};
pub use traits::{ClimateProbe, RawSample};
pub use ventilation::{
    ClimateState, StateId, StepInput, Transition, TransitionCause, VentilationMachine,
};

#[cfg(feature = "std")]
pub use monitor::{ClimateMonitor, ClimateSnapshot};
#[cfg(feature = "std")]
pub use worker::{spawn_acquisition, spawn_maintenance};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
