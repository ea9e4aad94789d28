//! # Neurite DSP
//!
//! Fixed-cost signal-processing kernels for the Neurite edge inference
//! runtime: memoized statistics over i8/i16/f32 sample vectors, an in-place
//! FFT with mel-spectrogram accumulation, spectral descriptors, axis-major
//! sample windowing and saturating scaling/quantization between numeric
//! domains.
//!
//! Every kernel runs in bounded, input-proportional time and allocates
//! nothing after construction; working buffers are owned by plan/window
//! objects created once at solution-load time.
//!
//! ## Example
//!
//! ```rust
//! use neurite_dsp::stat::{fixed, StatCtx};
//!
//! let samples: [i16; 6] = [3, -1, 4, -1, 5, -9];
//! let mut ctx = StatCtx::<i16>::default();
//!
//! // `mean` leaves the running sum behind, `var` picks it up for free.
//! let mean = fixed::mean(&samples[..], Some(&mut ctx));
//! let var = fixed::var(&samples[..], Some(&mut ctx));
//! assert_eq!(mean, 0);
//! assert!(var > 0);
//! ```

pub mod error;
pub mod f24;
pub mod num;
pub mod scale;
pub mod spectral;
pub mod stat;
pub mod transform;
pub mod window;

pub use error::{DspError, Result};
pub use f24::F24;
pub use num::{IntSample, Samples, SampleStats, Strided, PERCENT_SCALE, UNIT_SCALE};
pub use spectral::{SpectralCtx, SpectralCtxQ15};
pub use stat::StatCtx;
pub use window::{DiscreteWindow, SlidingWindow};
