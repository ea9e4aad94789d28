//! Runtime status taxonomy.
//!
//! Errors are statuses handed back to the caller, never aborts; the
//! caller decides whether a failure halts its pipeline. "Window still
//! filling" is an expected outcome of feeding, not an error — it lives
//! in [`FeedProgress`], on the success side of the `Result`.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime status codes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The operation failed for an unclassified reason.
    #[error("unspecified failure: {0}")]
    Unspecified(String),

    /// An argument was present but unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required piece of the solution description is absent.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// The operation is not available in the current state.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The operation is not supported in this build or configuration.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// A buffer violates an alignment requirement.
    #[error("wrong memory alignment: {0}")]
    WrongAlignment(String),

    /// The solution was produced for an incompatible runtime version.
    #[error("runtime {runtime} is incompatible with solution {solution}")]
    Incompatible {
        /// Version of this runtime library.
        runtime: String,
        /// Version the solution was compiled for.
        solution: String,
    },

    /// Error bubbled up from the DSP layer.
    #[error(transparent)]
    Dsp(#[from] neurite_dsp::DspError),

    /// Error bubbled up from the inference engine.
    #[error(transparent)]
    Nn(#[from] neurite_nn::NnError),
}

/// Successful outcome of a feed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedProgress {
    /// The window still needs `remaining` sample groups.
    Collecting {
        /// Sample groups still required before the window is ready.
        remaining: usize,
    },
    /// A full window is ready; inference may proceed.
    WindowReady,
}

impl FeedProgress {
    /// Whether a window became ready.
    pub fn is_ready(self) -> bool {
        matches!(self, FeedProgress::WindowReady)
    }
}
