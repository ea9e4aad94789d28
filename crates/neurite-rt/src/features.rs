//! Feature masks, kernel arguments and the mask-driven extraction driver.
//!
//! A 64-bit mask per input axis selects which derived features the
//! pipeline computes for that axis: the low 16 bits address the
//! frequency-domain kinds, the high 32 bits the time-domain kinds. Bit
//! order is the canonical output order — extraction walks the time bits
//! ascending, then the frequency bits ascending, per subwindow, per axis.
//!
//! Kernel parameters that are not fixed constants (thresholds, lags,
//! sigma multipliers, peak counts) come from a [`FeatureArgs`] record per
//! axis, defaulted sensibly and overridable through the solution
//! descriptor or an [`ArgProvider`].

use serde::{Deserialize, Serialize};

use neurite_dsp::num::IntSample;
use neurite_dsp::spectral::{self, EnergyBands, SpectralCtx, SpectralCtxQ15};
use neurite_dsp::stat::{fixed, float, StatCtx};
use neurite_dsp::transform::fft::{
    amplitude_spectrum, amplitude_spectrum_q15, RfftPlan, RfftPlanQ15,
};
use neurite_dsp::DspError;

/// Time-domain feature kinds, in canonical mask-bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TimeFeature {
    /// Minimum sample value.
    Min = 0,
    /// Maximum sample value.
    Max,
    /// Max minus min.
    Range,
    /// Arithmetic mean.
    Mean,
    /// Mean absolute deviation.
    Mad,
    /// Skewness.
    Skew,
    /// Excess kurtosis.
    Kur,
    /// Standard deviation.
    Std,
    /// Root mean square.
    Rms,
    /// Mean-crossing rate.
    Mcr,
    /// Zero-crossing rate.
    Zcr,
    /// Threshold-crossing rate.
    Tcr,
    /// Peak-to-peak of the smoothed (low-frequency) signal.
    P2pLf,
    /// Peak-to-peak of the smoothing residual (high-frequency part).
    P2pHf,
    /// Mean of absolute values.
    AbsMean,
    /// Average magnitude difference.
    Amdf,
    /// Positive sigma-crossing rate.
    PosScr,
    /// Negative sigma-crossing rate.
    NegScr,
    /// Fraction of signal over zero.
    Psoz,
    /// Fraction of signal over mean.
    Psom,
    /// Fraction of signal over sigma.
    Psos,
    /// Crest factor.
    Crest,
    /// Root mean difference square.
    Rmds,
    /// Autocorrelation at a configured lag.
    AutoCorr,
    /// Hjorth mobility.
    HjorthMobility,
    /// Hjorth complexity.
    HjorthComplexity,
    /// Linear-regression slope.
    LrSlope,
    /// Linear-regression intercept.
    LrIntercept,
}

impl TimeFeature {
    /// All kinds in canonical bit order.
    pub const ALL: [TimeFeature; 28] = [
        TimeFeature::Min,
        TimeFeature::Max,
        TimeFeature::Range,
        TimeFeature::Mean,
        TimeFeature::Mad,
        TimeFeature::Skew,
        TimeFeature::Kur,
        TimeFeature::Std,
        TimeFeature::Rms,
        TimeFeature::Mcr,
        TimeFeature::Zcr,
        TimeFeature::Tcr,
        TimeFeature::P2pLf,
        TimeFeature::P2pHf,
        TimeFeature::AbsMean,
        TimeFeature::Amdf,
        TimeFeature::PosScr,
        TimeFeature::NegScr,
        TimeFeature::Psoz,
        TimeFeature::Psom,
        TimeFeature::Psos,
        TimeFeature::Crest,
        TimeFeature::Rmds,
        TimeFeature::AutoCorr,
        TimeFeature::HjorthMobility,
        TimeFeature::HjorthComplexity,
        TimeFeature::LrSlope,
        TimeFeature::LrIntercept,
    ];
}

/// Frequency-domain feature kinds, in canonical mask-bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FreqFeature {
    /// Indices of the dominant spectrum peaks.
    DomFreqs = 0,
    /// Amplitudes of the dominant peaks.
    DomFreqsAmpl,
    /// Total harmonic distortion of the strongest peak.
    DomFreqsThd,
    /// Signal-to-noise ratio of the dominant peaks.
    DomFreqsSnr,
    /// Mean distance between dominant peaks.
    DomFreqsMeanDist,
    /// Energy ratio of the low over the mid spectrum third.
    FerLowMid,
    /// Energy ratio of the mid over the high spectrum third.
    FerMidHigh,
    /// Energy ratio of the low over the high spectrum third.
    FerLowHigh,
    /// RMS of the amplitude spectrum.
    SpectralRms,
    /// Crest factor of the amplitude spectrum.
    SpectralCrest,
    /// Spectral centroid.
    SpectralCentroid,
    /// Spectral spread.
    SpectralSpread,
    /// First bins of the raw amplitude spectrum.
    SpectrumBins,
}

impl FreqFeature {
    /// All kinds in canonical bit order.
    pub const ALL: [FreqFeature; 13] = [
        FreqFeature::DomFreqs,
        FreqFeature::DomFreqsAmpl,
        FreqFeature::DomFreqsThd,
        FreqFeature::DomFreqsSnr,
        FreqFeature::DomFreqsMeanDist,
        FreqFeature::FerLowMid,
        FreqFeature::FerMidHigh,
        FreqFeature::FerLowHigh,
        FreqFeature::SpectralRms,
        FreqFeature::SpectralCrest,
        FreqFeature::SpectralCentroid,
        FreqFeature::SpectralSpread,
        FreqFeature::SpectrumBins,
    ];
}

/// Per-axis feature selection: low 16 bits frequency kinds, high 32 bits
/// time kinds (bits 16..32 are padding, as laid out by the compiler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMask(pub u64);

impl FeatureMask {
    /// Empty selection.
    pub const EMPTY: FeatureMask = FeatureMask(0);

    /// Select one time-domain kind.
    pub fn with_time(self, f: TimeFeature) -> Self {
        FeatureMask(self.0 | 1u64 << (32 + f as u32))
    }

    /// Select one frequency-domain kind.
    pub fn with_freq(self, f: FreqFeature) -> Self {
        FeatureMask(self.0 | 1u64 << (f as u32))
    }

    /// Whether a time-domain kind is selected.
    pub fn has_time(self, f: TimeFeature) -> bool {
        self.0 >> (32 + f as u32) & 1 != 0
    }

    /// Whether a frequency-domain kind is selected.
    pub fn has_freq(self, f: FreqFeature) -> bool {
        self.0 >> (f as u32) & 1 != 0
    }

    /// Whether any time-domain kind is selected.
    pub fn any_time(self) -> bool {
        self.0 >> 32 != 0
    }

    /// Whether any frequency-domain kind is selected.
    pub fn any_freq(self) -> bool {
        self.0 & 0xFFFF != 0
    }

    /// Whether the spectrum peak search is needed.
    fn needs_peaks(self) -> bool {
        self.has_freq(FreqFeature::DomFreqs)
            || self.has_freq(FreqFeature::DomFreqsAmpl)
            || self.has_freq(FreqFeature::DomFreqsThd)
            || self.has_freq(FreqFeature::DomFreqsSnr)
            || self.has_freq(FreqFeature::DomFreqsMeanDist)
    }

    /// Number of feature values this mask produces per subwindow.
    pub fn feature_count(self, args: &FeatureArgs) -> usize {
        let mut count = TimeFeature::ALL.iter().filter(|&&f| self.has_time(f)).count();
        for f in FreqFeature::ALL {
            if self.has_freq(f) {
                count += match f {
                    FreqFeature::DomFreqs | FreqFeature::DomFreqsAmpl => args.peaks as usize,
                    FreqFeature::SpectrumBins => args.spectrum_bins as usize,
                    _ => 1,
                };
            }
        }
        count
    }
}

/// Parameters for the kernels that take one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureArgs {
    /// Threshold for the threshold-crossing rate, in raw sample units.
    pub threshold: f32,
    /// Lag for autocorrelation and average magnitude difference.
    pub lag: u8,
    /// Sigma multiplier magnitude for the over-sigma kernels.
    pub sigma: i8,
    /// Moving-average span for the low/high-frequency peak-to-peak pair.
    pub smooth_span: u8,
    /// Number of dominant peaks to search for.
    pub peaks: u8,
    /// Minimum distance between dominant peaks, in bins.
    pub peak_distance: u8,
    /// Number of harmonics for total harmonic distortion.
    pub harmonics: u8,
    /// Number of raw spectrum bins to emit.
    pub spectrum_bins: u8,
}

impl Default for FeatureArgs {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            lag: 1,
            sigma: 1,
            smooth_span: 4,
            peaks: 3,
            peak_distance: 1,
            harmonics: 3,
            spectrum_bins: 8,
        }
    }
}

/// Source of kernel arguments during extraction.
///
/// The runtime's default provider serves the solution's argument table;
/// an application can substitute its own when parameters must vary at
/// run time.
pub trait ArgProvider {
    /// Arguments for the given collected-axis index.
    fn args(&self, axis: usize) -> FeatureArgs;
}

/// [`ArgProvider`] over a per-axis table; missing axes fall back to the
/// last entry or the defaults.
#[derive(Debug, Clone, Default)]
pub struct TableArgs {
    /// Per-axis argument records.
    pub table: Vec<FeatureArgs>,
}

impl ArgProvider for TableArgs {
    fn args(&self, axis: usize) -> FeatureArgs {
        self.table
            .get(axis)
            .or_else(|| self.table.last())
            .copied()
            .unwrap_or_default()
    }
}

/// Peak-to-peak of the `span`-sample moving average and of its residual.
fn p2p_smoothed_fixed<D: IntSample>(v: &[D], span: usize) -> (D::Feature, D::Feature) {
    let span = span.max(1);
    if v.len() < span {
        return (fixed::pk2pk(v), D::Feature::default());
    }
    let mut window_sum: i64 = v[..span].iter().map(|x| x.widen() as i64).sum();
    let mut lo_s = i64::MAX;
    let mut hi_s = i64::MIN;
    let mut lo_r = i64::MAX;
    let mut hi_r = i64::MIN;
    for i in span - 1..v.len() {
        if i >= span {
            window_sum += v[i].widen() as i64 - v[i - span].widen() as i64;
        }
        let smoothed = window_sum / span as i64;
        let residual = v[i].widen() as i64 - smoothed;
        lo_s = lo_s.min(smoothed);
        hi_s = hi_s.max(smoothed);
        lo_r = lo_r.min(residual);
        hi_r = hi_r.max(residual);
    }
    (
        D::feature_from_i64(hi_s - lo_s),
        D::feature_from_i64(hi_r - lo_r),
    )
}

fn p2p_smoothed_f32(v: &[f32], span: usize) -> (f32, f32) {
    let span = span.max(1);
    if v.len() < span {
        return (float::pk2pk(v), 0.0);
    }
    let mut window_sum: f32 = v[..span].iter().sum();
    let mut lo_s = f32::MAX;
    let mut hi_s = f32::MIN;
    let mut lo_r = f32::MAX;
    let mut hi_r = f32::MIN;
    for i in span - 1..v.len() {
        if i >= span {
            window_sum += v[i] - v[i - span];
        }
        let smoothed = window_sum / span as f32;
        let residual = v[i] - smoothed;
        lo_s = lo_s.min(smoothed);
        hi_s = hi_s.max(smoothed);
        lo_r = lo_r.min(residual);
        hi_r = hi_r.max(residual);
    }
    (hi_s - lo_s, hi_r - lo_r)
}

/// Extract the selected time-domain features of one axis slice,
/// integer domains.
pub(crate) fn extract_time_fixed<D: IntSample>(
    slice: &[D],
    mask: FeatureMask,
    args: &FeatureArgs,
    emit: &mut impl FnMut(D::Feature),
) {
    let mut ctx = StatCtx::<D>::default();
    fixed::tss_sum(slice, &mut ctx);
    for f in TimeFeature::ALL {
        if !mask.has_time(f) {
            continue;
        }
        let value: D::Feature = match f {
            TimeFeature::Min => D::feature_from_i64(fixed::min(slice).widen() as i64),
            TimeFeature::Max => D::feature_from_i64(fixed::max(slice).widen() as i64),
            TimeFeature::Range => fixed::range(slice),
            TimeFeature::Mean => {
                D::feature_from_i64(fixed::mean(slice, Some(&mut ctx)).widen() as i64)
            }
            TimeFeature::Mad => fixed::mad(slice, Some(&mut ctx)),
            TimeFeature::Skew => fixed::skew(slice, Some(&mut ctx)),
            TimeFeature::Kur => fixed::kur(slice, Some(&mut ctx)),
            TimeFeature::Std => fixed::stddev(slice, Some(&mut ctx)),
            TimeFeature::Rms => fixed::rms(slice, Some(&mut ctx)),
            TimeFeature::Mcr => fixed::mcr(slice, Some(&mut ctx)),
            TimeFeature::Zcr => fixed::zcr(slice),
            TimeFeature::Tcr => fixed::tcr(slice, D::from_i32_sat(args.threshold as i32)),
            TimeFeature::P2pLf => p2p_smoothed_fixed(slice, args.smooth_span as usize).0,
            TimeFeature::P2pHf => p2p_smoothed_fixed(slice, args.smooth_span as usize).1,
            TimeFeature::AbsMean => {
                D::feature_from_i64(fixed::absmean(slice, Some(&mut ctx)).widen() as i64)
            }
            TimeFeature::Amdf => fixed::amdf(slice, args.lag as usize),
            TimeFeature::PosScr => fixed::scr(slice, args.sigma.abs(), Some(&mut ctx)),
            TimeFeature::NegScr => fixed::scr(slice, -args.sigma.abs(), Some(&mut ctx)),
            TimeFeature::Psoz => fixed::psoz(slice),
            TimeFeature::Psom => fixed::psom(slice, Some(&mut ctx)),
            TimeFeature::Psos => fixed::psos(slice, args.sigma, Some(&mut ctx)),
            TimeFeature::Crest => fixed::crest(slice, None, Some(&mut ctx)),
            TimeFeature::Rmds => fixed::rmds(slice),
            TimeFeature::AutoCorr => fixed::autocorr(slice, args.lag as usize, Some(&mut ctx)),
            TimeFeature::HjorthMobility => fixed::hjorth(slice, Some(&mut ctx)).mobility,
            TimeFeature::HjorthComplexity => fixed::hjorth(slice, Some(&mut ctx)).complexity,
            TimeFeature::LrSlope => fixed::linreg(slice, Some(&mut ctx)).slope,
            TimeFeature::LrIntercept => fixed::linreg(slice, Some(&mut ctx)).intercept,
        };
        emit(value);
    }
}

/// Extract the selected time-domain features of one axis slice, floats.
pub(crate) fn extract_time_f32(
    slice: &[f32],
    mask: FeatureMask,
    args: &FeatureArgs,
    emit: &mut impl FnMut(f32),
) {
    let mut ctx = StatCtx::<f32>::default();
    float::tss_sum(slice, &mut ctx);
    for f in TimeFeature::ALL {
        if !mask.has_time(f) {
            continue;
        }
        let value = match f {
            TimeFeature::Min => float::min(slice),
            TimeFeature::Max => float::max(slice),
            TimeFeature::Range => float::range(slice),
            TimeFeature::Mean => float::mean(slice, Some(&mut ctx)),
            TimeFeature::Mad => float::mad(slice, Some(&mut ctx)),
            TimeFeature::Skew => float::skew(slice, Some(&mut ctx)),
            TimeFeature::Kur => float::kur(slice, Some(&mut ctx)),
            TimeFeature::Std => float::stddev(slice, Some(&mut ctx)),
            TimeFeature::Rms => float::rms(slice, Some(&mut ctx)),
            TimeFeature::Mcr => float::mcr(slice, Some(&mut ctx)),
            TimeFeature::Zcr => float::zcr(slice),
            TimeFeature::Tcr => float::tcr(slice, args.threshold),
            TimeFeature::P2pLf => p2p_smoothed_f32(slice, args.smooth_span as usize).0,
            TimeFeature::P2pHf => p2p_smoothed_f32(slice, args.smooth_span as usize).1,
            TimeFeature::AbsMean => float::absmean(slice, Some(&mut ctx)),
            TimeFeature::Amdf => float::amdf(slice, args.lag as usize),
            TimeFeature::PosScr => float::scr(slice, args.sigma.abs(), Some(&mut ctx)),
            TimeFeature::NegScr => float::scr(slice, -args.sigma.abs(), Some(&mut ctx)),
            TimeFeature::Psoz => float::psoz(slice),
            TimeFeature::Psom => float::psom(slice, Some(&mut ctx)),
            TimeFeature::Psos => float::psos(slice, args.sigma, Some(&mut ctx)),
            TimeFeature::Crest => float::crest(slice, None, Some(&mut ctx)),
            TimeFeature::Rmds => float::rmds(slice),
            TimeFeature::AutoCorr => float::autocorr(slice, args.lag as usize, Some(&mut ctx)),
            TimeFeature::HjorthMobility => float::hjorth(slice, Some(&mut ctx)).mobility,
            TimeFeature::HjorthComplexity => float::hjorth(slice, Some(&mut ctx)).complexity,
            TimeFeature::LrSlope => float::linreg(slice, Some(&mut ctx)).slope,
            TimeFeature::LrIntercept => float::linreg(slice, Some(&mut ctx)).intercept,
        };
        emit(value);
    }
}

/// FFT scratch of the floating-point frequency path. The frame buffer is
/// the FFT workspace and, after the spectrum is derived, the peak-search
/// scratch; this aliasing mirrors the window-as-workspace layout of the
/// target hardware.
pub(crate) struct SpectralScratchF32 {
    pub plan: RfftPlan,
    pub frame: Vec<f32>,
    pub spectrum: Vec<f32>,
    pub peaks: Vec<i16>,
}

impl SpectralScratchF32 {
    pub fn new(fft_len: usize, max_peaks: usize) -> std::result::Result<Self, DspError> {
        let plan = RfftPlan::new(fft_len)?;
        Ok(Self {
            frame: vec![0.0; fft_len],
            spectrum: vec![0.0; fft_len / 2],
            peaks: vec![-1; max_peaks.max(1)],
            plan,
        })
    }
}

/// Extract the selected frequency-domain features of one axis slice,
/// floats.
pub(crate) fn extract_freq_f32(
    slice: &[f32],
    mask: FeatureMask,
    args: &FeatureArgs,
    scratch: &mut SpectralScratchF32,
    emit: &mut impl FnMut(f32),
) {
    let fft_len = scratch.plan.len();
    let take = slice.len().min(fft_len);
    scratch.frame[..take].copy_from_slice(&slice[..take]);
    scratch.frame[take..].fill(0.0);
    scratch.plan.process(&mut scratch.frame);
    amplitude_spectrum(&scratch.frame, fft_len, &mut scratch.spectrum);

    let peaks_wanted = (args.peaks as usize).min(scratch.peaks.len());
    let peaks = &mut scratch.peaks[..peaks_wanted.max(1)];
    if mask.needs_peaks() {
        // search on a copy so the spectrum survives for the kernels below
        let bins = scratch.spectrum.len();
        scratch.frame[..bins].copy_from_slice(&scratch.spectrum);
        spectral::find_peaks(
            &mut scratch.frame[..bins],
            0.0,
            args.peak_distance as usize,
            peaks,
        );
    }

    let mut ctx = SpectralCtx::default();
    for f in FreqFeature::ALL {
        if !mask.has_freq(f) {
            continue;
        }
        match f {
            FreqFeature::DomFreqs => {
                for &p in peaks[..peaks_wanted].iter() {
                    emit(p as f32);
                }
            }
            FreqFeature::DomFreqsAmpl => {
                for &p in peaks[..peaks_wanted].iter() {
                    emit(if p >= 0 { scratch.spectrum[p as usize] } else { 0.0 });
                }
            }
            FreqFeature::DomFreqsThd => {
                let base = peaks.first().copied().unwrap_or(-1);
                emit(if base > 0 {
                    spectral::thd_f32(&scratch.spectrum, base as usize, args.harmonics as usize)
                } else {
                    0.0
                });
            }
            FreqFeature::DomFreqsSnr => emit(spectral::snr_f32(&scratch.spectrum, peaks)),
            FreqFeature::DomFreqsMeanDist => emit(spectral::peaks_mean_distance(peaks) as f32),
            FreqFeature::FerLowMid => {
                emit(spectral::energy_ratio_f32(&scratch.spectrum, EnergyBands::LowOverMid))
            }
            FreqFeature::FerMidHigh => {
                emit(spectral::energy_ratio_f32(&scratch.spectrum, EnergyBands::MidOverHigh))
            }
            FreqFeature::FerLowHigh => {
                emit(spectral::energy_ratio_f32(&scratch.spectrum, EnergyBands::LowOverHigh))
            }
            FreqFeature::SpectralRms => emit(float::rms(&scratch.spectrum[..], None)),
            FreqFeature::SpectralCrest => emit(float::crest(&scratch.spectrum[..], None, None)),
            FreqFeature::SpectralCentroid => {
                emit(spectral::centroid_f32(&scratch.spectrum, Some(&mut ctx)))
            }
            FreqFeature::SpectralSpread => {
                emit(spectral::spread_f32(&scratch.spectrum, Some(&mut ctx)))
            }
            FreqFeature::SpectrumBins => {
                for k in 0..(args.spectrum_bins as usize).min(scratch.spectrum.len()) {
                    emit(scratch.spectrum[k]);
                }
            }
        }
    }
}

/// FFT scratch of the fixed-point frequency path (shared by the i8 and
/// i16 input domains; i8 samples are widened into the Q15 frame).
pub(crate) struct SpectralScratchQ15 {
    pub plan: RfftPlanQ15,
    pub frame: Vec<i16>,
    pub spectrum: Vec<i16>,
    pub peaks: Vec<i16>,
}

impl SpectralScratchQ15 {
    pub fn new(fft_len: usize, max_peaks: usize) -> std::result::Result<Self, DspError> {
        let plan = RfftPlanQ15::new(fft_len)?;
        Ok(Self {
            frame: vec![0; fft_len],
            spectrum: vec![0; fft_len / 2],
            peaks: vec![-1; max_peaks.max(1)],
            plan,
        })
    }
}

/// Extract the selected frequency-domain features of one axis slice,
/// integer domains.
pub(crate) fn extract_freq_fixed<D: IntSample>(
    slice: &[D],
    mask: FeatureMask,
    args: &FeatureArgs,
    scratch: &mut SpectralScratchQ15,
    emit: &mut impl FnMut(D::Feature),
) {
    let fft_len = scratch.plan.len();
    let take = slice.len().min(fft_len);
    for (dst, src) in scratch.frame[..take].iter_mut().zip(slice.iter()) {
        *dst = src.widen() as i16;
    }
    scratch.frame[take..].fill(0);
    scratch.plan.process(&mut scratch.frame);
    amplitude_spectrum_q15(&scratch.frame, fft_len, &mut scratch.spectrum);

    let peaks_wanted = (args.peaks as usize).min(scratch.peaks.len());
    let peaks = &mut scratch.peaks[..peaks_wanted.max(1)];
    if mask.needs_peaks() {
        let bins = scratch.spectrum.len();
        scratch.frame[..bins].copy_from_slice(&scratch.spectrum);
        spectral::find_peaks_q15(
            &mut scratch.frame[..bins],
            0,
            args.peak_distance as usize,
            peaks,
        );
    }

    let mut ctx = SpectralCtxQ15::default();
    for f in FreqFeature::ALL {
        if !mask.has_freq(f) {
            continue;
        }
        match f {
            FreqFeature::DomFreqs => {
                for &p in peaks[..peaks_wanted].iter() {
                    emit(D::feature_from_i64(p as i64));
                }
            }
            FreqFeature::DomFreqsAmpl => {
                for &p in peaks[..peaks_wanted].iter() {
                    let a = if p >= 0 { scratch.spectrum[p as usize] } else { 0 };
                    emit(D::feature_from_i64(a as i64));
                }
            }
            FreqFeature::DomFreqsThd => {
                let base = peaks.first().copied().unwrap_or(-1);
                let v = if base > 0 {
                    spectral::thd_q15(&scratch.spectrum, base as usize, args.harmonics as usize)
                } else {
                    0
                };
                emit(D::feature_from_i64(v as i64));
            }
            FreqFeature::DomFreqsSnr => {
                emit(D::feature_from_i64(spectral::snr_q15(&scratch.spectrum, peaks) as i64))
            }
            FreqFeature::DomFreqsMeanDist => {
                emit(D::feature_from_i64(spectral::peaks_mean_distance(peaks) as i64))
            }
            FreqFeature::FerLowMid => emit(D::feature_from_i64(
                spectral::energy_ratio_q15(&scratch.spectrum, EnergyBands::LowOverMid) as i64,
            )),
            FreqFeature::FerMidHigh => emit(D::feature_from_i64(
                spectral::energy_ratio_q15(&scratch.spectrum, EnergyBands::MidOverHigh) as i64,
            )),
            FreqFeature::FerLowHigh => emit(D::feature_from_i64(
                spectral::energy_ratio_q15(&scratch.spectrum, EnergyBands::LowOverHigh) as i64,
            )),
            FreqFeature::SpectralRms => {
                emit(D::feature_from_i64(fixed::rms(&scratch.spectrum[..], None) as i64))
            }
            FreqFeature::SpectralCrest => {
                emit(D::feature_from_i64(fixed::crest(&scratch.spectrum[..], None, None) as i64))
            }
            FreqFeature::SpectralCentroid => {
                emit(D::feature_from_i64(spectral::centroid_q15(&scratch.spectrum, Some(&mut ctx)) as i64))
            }
            FreqFeature::SpectralSpread => {
                emit(D::feature_from_i64(spectral::spread_q15(&scratch.spectrum, Some(&mut ctx)) as i64))
            }
            FreqFeature::SpectrumBins => {
                for k in 0..(args.spectrum_bins as usize).min(scratch.spectrum.len()) {
                    emit(D::feature_from_i64(scratch.spectrum[k] as i64));
                }
            }
        }
    }
}

/// Expected feature total over a set of per-axis masks.
pub fn total_features(
    masks: &[FeatureMask],
    provider: &dyn ArgProvider,
    subwindows: usize,
) -> usize {
    let subwindows = subwindows.max(1);
    masks
        .iter()
        .enumerate()
        .map(|(axis, m)| m.feature_count(&provider.args(axis)) * subwindows)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_layout_matches_compiler() {
        // time-only mask from a generated solution: bits land in the
        // high 32-bit half
        let m = FeatureMask(0x0000_0001_0000_0000);
        assert!(m.has_time(TimeFeature::Min));
        assert!(!m.any_freq());
        let m = FeatureMask::EMPTY
            .with_time(TimeFeature::Mean)
            .with_freq(FreqFeature::SpectralCentroid);
        assert_eq!(m.0 & 0xFFFF_FFFF, 1 << 10);
        assert!(m.any_time() && m.any_freq());
    }

    #[test]
    fn test_feature_count() {
        let args = FeatureArgs::default();
        let m = FeatureMask::EMPTY
            .with_time(TimeFeature::Mean)
            .with_time(TimeFeature::Std);
        assert_eq!(m.feature_count(&args), 2);
        let m = m.with_freq(FreqFeature::DomFreqs).with_freq(FreqFeature::SpectrumBins);
        assert_eq!(
            m.feature_count(&args),
            2 + args.peaks as usize + args.spectrum_bins as usize
        );
    }

    #[test]
    fn test_time_extraction_order_is_bit_order() {
        let slice: [i16; 8] = [10, 20, 30, 40, 30, 20, 10, 0];
        let mask = FeatureMask::EMPTY
            .with_time(TimeFeature::Max)
            .with_time(TimeFeature::Min)
            .with_time(TimeFeature::Mean);
        let mut got = Vec::new();
        extract_time_fixed(&slice, mask, &FeatureArgs::default(), &mut |v| got.push(v));
        // Min (bit 0) before Max (bit 1) before Mean (bit 3)
        assert_eq!(got, vec![0, 40, 20]);
    }

    #[test]
    fn test_time_extraction_f32_matches_kernels() {
        let slice: [f32; 6] = [0.5, -0.5, 1.5, -1.5, 2.5, -2.5];
        let mask = FeatureMask::EMPTY
            .with_time(TimeFeature::Rms)
            .with_time(TimeFeature::Zcr);
        let mut got = Vec::new();
        extract_time_f32(&slice, mask, &FeatureArgs::default(), &mut |v| got.push(v));
        assert_eq!(got.len(), 2);
        assert!((got[0] - float::rms(&slice[..], None)).abs() < 1e-6);
        assert!((got[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_freq_extraction_peak_of_sine() {
        let n = 64usize;
        let bin = 6usize;
        let slice: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * bin as f32 * i as f32 / n as f32).sin())
            .collect();
        let mut scratch = SpectralScratchF32::new(n, 4).unwrap();
        let mask = FeatureMask::EMPTY
            .with_freq(FreqFeature::DomFreqs)
            .with_freq(FreqFeature::SpectralCentroid);
        let mut args = FeatureArgs::default();
        args.peaks = 1;
        let mut got = Vec::new();
        extract_freq_f32(&slice, mask, &args, &mut scratch, &mut |v| got.push(v));
        assert_eq!(got.len(), 2);
        assert!((got[0] - bin as f32).abs() <= 1.0, "peak at {}", got[0]);
        assert!((got[1] - bin as f32).abs() <= 2.0, "centroid at {}", got[1]);
    }

    #[test]
    fn test_p2p_smoothed_splits_bands() {
        // slow ramp plus fast alternation: the smoothed p2p sees the ramp,
        // the residual p2p sees the alternation
        let v: Vec<f32> = (0..32)
            .map(|i| i as f32 * 0.1 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let (lf, hf) = p2p_smoothed_f32(&v, 4);
        assert!(lf < 3.5);
        assert!(hf > 1.5);
    }

    #[test]
    fn test_table_args_fallback() {
        let p = TableArgs {
            table: vec![FeatureArgs {
                lag: 7,
                ..FeatureArgs::default()
            }],
        };
        assert_eq!(p.args(0).lag, 7);
        assert_eq!(p.args(5).lag, 7); // falls back to last entry
        let empty = TableArgs::default();
        assert_eq!(empty.args(0).lag, FeatureArgs::default().lag);
    }
}
