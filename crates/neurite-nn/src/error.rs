//! Error types for the inference engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, NnError>;

/// Errors raised while loading or evaluating a neuron graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NnError {
    /// Two model tables disagree about a count.
    #[error("model table length mismatch: {what} holds {got}, expected {expected}")]
    LengthMismatch {
        /// Which table was inconsistent.
        what: &'static str,
        /// Length found.
        got: usize,
        /// Length required by the rest of the model.
        expected: usize,
    },

    /// An output-neuron index points past the last neuron.
    #[error("output neuron index {index} out of range for {neurons} neurons")]
    OutputIndexOutOfRange {
        /// Offending index.
        index: u16,
        /// Number of neurons in the graph.
        neurons: usize,
    },

    /// An internal link references the neuron itself or a later neuron.
    #[error("neuron {neuron} has an internal link to {target}, breaking evaluation order")]
    LinkOrdering {
        /// Neuron owning the link.
        neuron: usize,
        /// Link target.
        target: u16,
    },

    /// An external link references past the input vector (and past the
    /// bias slot).
    #[error("neuron {neuron} pulls external input {index}, only {inputs} provided")]
    ExternalIndexOutOfRange {
        /// Neuron owning the link.
        neuron: usize,
        /// Link target.
        index: u16,
        /// Inputs provided to the inference call.
        inputs: usize,
    },

    /// Output buffer requested before any inference completed.
    #[error("no inference has completed yet")]
    NotEvaluated,

    /// An output slice was too small for the requested copy.
    #[error("output buffer holds {have} values, {need} required")]
    BufferTooSmall {
        /// Required capacity.
        need: usize,
        /// Provided capacity.
        have: usize,
    },
}
