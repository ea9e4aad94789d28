//! Error types for the DSP crate.

use thiserror::Error;

/// Result type alias for DSP operations.
pub type Result<T> = std::result::Result<T, DspError>;

/// Errors reported by window, transform and scaling constructors.
///
/// Kernels themselves are infallible by contract; everything that can go
/// wrong is rejected when the owning object is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DspError {
    /// A length parameter was zero or otherwise unusable.
    #[error("invalid length {len} for {what}")]
    InvalidLength {
        /// Offending length.
        len: usize,
        /// What the length was for.
        what: &'static str,
    },

    /// FFT frames must be a power of two.
    #[error("transform length {len} is not a power of two")]
    NotPowerOfTwo {
        /// Requested transform length.
        len: usize,
    },

    /// Sliding windows cannot shift further than they are long.
    #[error("window shift {shift} exceeds window size {size}")]
    ShiftExceedsWindow {
        /// Configured shift in samples per axis.
        shift: usize,
        /// Window capacity in samples per axis.
        size: usize,
    },

    /// Fed sample count must be a whole number of axis groups.
    #[error("sample count {count} is not a multiple of {axes} axes")]
    AxisMisaligned {
        /// Number of samples in the rejected feed call.
        count: usize,
        /// Number of interleaved axes expected.
        axes: usize,
    },

    /// An output slice was too small for the requested operation.
    #[error("output buffer holds {have} values, {need} required")]
    BufferTooSmall {
        /// Required capacity.
        need: usize,
        /// Provided capacity.
        have: usize,
    },
}
