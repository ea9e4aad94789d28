//! Frequency-domain transforms.
//!
//! The FFT plans own their twiddle and permutation tables, built once at
//! load time; processing is strictly in place. The mel module layers a
//! filterbank spectrogram accumulator on top of the real FFT.

pub mod fft;
pub mod mel;

pub use fft::{CfftPlan, CfftPlanQ15, RfftPlan, RfftPlanQ15};
pub use mel::MelSpectrogram;
