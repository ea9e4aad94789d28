//! # Neurite RT
//!
//! The Neurite edge inference runtime: feeds a stream of raw multi-axis
//! sensor samples through windowed ingestion, statistical/spectral
//! feature extraction, saturating scaling and a sparse neuron-graph
//! model, and decodes the result into a classification, regression or
//! anomaly score.
//!
//! One [`NeuriteRuntime`] executes one compiled solution, described by a
//! [`SolutionDescriptor`] (the model compiler's output). All buffers are
//! sized at load; the steady-state cycle performs no allocation and no
//! I/O.
//!
//! ## Lifecycle
//!
//! ```rust,ignore
//! let mut rt = NeuriteRuntime::from_descriptor(descriptor)?;
//! rt.init()?;
//! loop {
//!     if rt.feed_inputs(SampleBlock::I16(&samples))?.is_ready() {
//!         match rt.run_inference()? {
//!             DecodedOutput::Classification(c) => handle(c.predicted_class),
//!             _ => {}
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod features;
pub mod output;
pub mod runtime;
pub mod solution;
pub mod version;

pub use error::{Error, FeedProgress, Result};
pub use features::{ArgProvider, FeatureArgs, FeatureMask, FreqFeature, TableArgs, TimeFeature};
pub use output::{
    AnomalyOutput, ClassificationOutput, DecodedOutput, Probabilities, RegressionOutput,
};
pub use runtime::{NeuriteRuntime, SampleBlock};
pub use solution::{
    DspDescriptor, FeatureScaleTable, InputDescriptor, InputDomain, ModelDescriptor, ModelParams,
    ModelTask, ScaleTable, SolutionDescriptor, WindowKind,
};
pub use version::{runtime_version, RtVersion};
