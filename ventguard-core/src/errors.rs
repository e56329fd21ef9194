//! Error Types for the Hardware Boundary
//!
//! The engine itself never fails: undefined readings travel as `None`,
//! lock timeouts degrade to documented fallbacks, and implausible samples
//! are filtered, not rejected. The only genuine error surface is the probe
//! read, and even that is handled by logging and skipping the cycle.
//!
//! Errors follow the same rules as the rest of the crate: small, `Copy`,
//! no heap, `&'static str` detail only.

use thiserror_no_std::Error;

/// Result type for probe reads
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Failure modes of a blocking hardware read
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// Sensor not ready yet (power-up stabilization or minimum re-read
    /// interval not elapsed)
    #[error("Sensor not ready")]
    NotReady,

    /// No response on the wire within the protocol deadline
    #[error("Sensor read timed out")]
    Timeout,

    /// Transfer completed but the checksum did not match
    #[error("Checksum mismatch")]
    Checksum,

    /// Transfer decoded to values the sensor cannot produce
    #[error("Implausible raw reading: {reason}")]
    InvalidReading {
        /// Which plausibility check failed
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ProbeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NotReady => defmt::write!(fmt, "Sensor not ready"),
            Self::Timeout => defmt::write!(fmt, "Sensor read timed out"),
            Self::Checksum => defmt::write!(fmt, "Checksum mismatch"),
            Self::InvalidReading { reason } => {
                defmt::write!(fmt, "Implausible reading: {}", reason)
            }
        }
    }
}
