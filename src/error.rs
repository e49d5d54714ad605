//! Error types for simd4f
//!
//! Kernel operations themselves never fail: they follow IEEE-754 propagation.
//! These errors come from the safe, slice-checked surface of [`crate::Simd4`]
//! and from the measurement utilities in [`crate::tolerance`].

use thiserror::Error;

/// Result type for simd4f operations
pub type Result<T> = std::result::Result<T, Simd4fError>;

/// Errors reported by the checked load/store surface and the tolerance utilities
#[derive(Debug, Error, PartialEq)]
pub enum Simd4fError {
    /// Buffer holds fewer floats than the transfer needs
    #[error("Buffer too short: need {required} floats, got {actual}")]
    BufferTooShort {
        /// Floats the load/store reads or writes
        required: usize,
        /// Floats the buffer actually holds
        actual: usize,
    },

    /// Slice length is not one of the loadable widths (2, 3 or 4)
    #[error("Unsupported length: {0} (expected 2, 3 or 4)")]
    UnsupportedLength(usize),

    /// Measurement range must be positive, ordered and sampled at least once
    #[error("Invalid sample range: [{low}, {high}] with {samples} samples")]
    InvalidSampleRange {
        /// Lower bound of the sweep
        low: f32,
        /// Upper bound of the sweep
        high: f32,
        /// Requested sample count
        samples: usize,
    },
}
