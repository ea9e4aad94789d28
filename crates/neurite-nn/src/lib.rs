//! # Neurite NN
//!
//! Sparse neuron-graph inference for the Neurite edge runtime.
//!
//! A trained model is an ordered list of neurons, each owning a slice of
//! links: an *external* prefix pulling from the feature/raw input vector
//! and an *internal* suffix pulling from earlier neurons' outputs. One
//! weight per link, consumed strictly in link order from a flat array.
//! Because internal links only ever point backwards, evaluating neurons
//! `0..N-1` in index order is the one and only valid schedule — no layer
//! walk, no topological sort at runtime.
//!
//! The same algorithm runs at three precisions ([`Q8`], [`Q16`],
//! [`F32`]); only accumulator width, weight width and the fixed-point
//! activation scaling differ.

pub mod activation;
pub mod engine;
pub mod error;
pub mod graph;
pub mod precision;

pub use activation::ActivationKind;
pub use engine::{EngineState, SparseEngine};
pub use error::{NnError, Result};
pub use graph::{GraphTopology, NeuronGraph};
pub use precision::{Precision, F32, Q16, Q8};
