//! Spectral descriptors over amplitude spectra.
//!
//! All kernels take an amplitude spectrum (as produced by
//! [`crate::transform::fft::amplitude_spectrum`]) indexed in bins.
//! Centroid and spread share a [`SpectralCtx`] the same way the time
//! kernels share a statistics context: magnitude sum and centroid are
//! computed once per cycle and reused.
//!
//! [`find_peaks`] deliberately scratches over its input spectrum while
//! searching; the buffer is transform scratch by that point of the
//! pipeline and the original values are not needed again.

use crate::num::{isqrt_u64, UNIT_SCALE};

/// Memoized spectral intermediates, floating point.
#[derive(Debug, Clone, Default)]
pub struct SpectralCtx {
    /// Sum of spectrum magnitudes.
    pub magnitude_sum: Option<f32>,
    /// Spectral centroid in bins.
    pub centroid: Option<f32>,
}

impl SpectralCtx {
    /// Forget every cached value.
    pub fn reset(&mut self) {
        self.magnitude_sum = None;
        self.centroid = None;
    }
}

/// Memoized spectral intermediates, Q15 fixed point.
#[derive(Debug, Clone, Default)]
pub struct SpectralCtxQ15 {
    /// Sum of spectrum magnitudes.
    pub magnitude_sum: Option<u32>,
    /// Spectral centroid in bins.
    pub centroid: Option<i16>,
}

impl SpectralCtxQ15 {
    /// Forget every cached value.
    pub fn reset(&mut self) {
        self.magnitude_sum = None;
        self.centroid = None;
    }
}

/// Spectral centroid in bins.
pub fn centroid_f32(spectrum: &[f32], ctx: Option<&mut SpectralCtx>) -> f32 {
    if let Some(c) = &ctx {
        if let Some(cent) = c.centroid {
            return cent;
        }
    }
    let mut mag = 0.0f32;
    let mut weighted = 0.0f32;
    for (k, &a) in spectrum.iter().enumerate() {
        mag += a;
        weighted += k as f32 * a;
    }
    let cent = if mag > 0.0 { weighted / mag } else { 0.0 };
    if let Some(c) = ctx {
        c.magnitude_sum = Some(mag);
        c.centroid = Some(cent);
    }
    cent
}

/// Spectral spread (standard deviation around the centroid) in bins.
pub fn spread_f32(spectrum: &[f32], mut ctx: Option<&mut SpectralCtx>) -> f32 {
    let cent = centroid_f32(spectrum, ctx.as_deref_mut());
    let mag = match ctx.as_deref_mut().and_then(|c| c.magnitude_sum) {
        Some(m) => m,
        None => spectrum.iter().sum(),
    };
    if mag <= 0.0 {
        return 0.0;
    }
    let mut acc = 0.0f32;
    for (k, &a) in spectrum.iter().enumerate() {
        let d = k as f32 - cent;
        acc += a * d * d;
    }
    (acc / mag).sqrt()
}

/// Spectral centroid in bins, Q15 spectrum.
pub fn centroid_q15(spectrum: &[i16], ctx: Option<&mut SpectralCtxQ15>) -> i16 {
    if let Some(c) = &ctx {
        if let Some(cent) = c.centroid {
            return cent;
        }
    }
    let mut mag = 0u64;
    let mut weighted = 0u64;
    for (k, &a) in spectrum.iter().enumerate() {
        let a = a.max(0) as u64;
        mag += a;
        weighted += k as u64 * a;
    }
    let cent = if mag > 0 { (weighted / mag) as i16 } else { 0 };
    if let Some(c) = ctx {
        c.magnitude_sum = Some(mag.min(u32::MAX as u64) as u32);
        c.centroid = Some(cent);
    }
    cent
}

/// Spectral spread in bins, Q15 spectrum.
pub fn spread_q15(spectrum: &[i16], mut ctx: Option<&mut SpectralCtxQ15>) -> i16 {
    let cent = centroid_q15(spectrum, ctx.as_deref_mut()) as i64;
    let mag = match ctx.as_deref_mut().and_then(|c| c.magnitude_sum) {
        Some(m) => m as u64,
        None => spectrum.iter().map(|&a| a.max(0) as u64).sum(),
    };
    if mag == 0 {
        return 0;
    }
    let mut acc = 0u64;
    for (k, &a) in spectrum.iter().enumerate() {
        let d = k as i64 - cent;
        acc += a.max(0) as u64 * (d * d) as u64;
    }
    isqrt_u64(acc / mag).min(i16::MAX as u64) as i16
}

/// Find up to `out.len()` dominant peaks, highest first.
///
/// A peak must rise above `min_height`; once taken, bins closer than
/// `min_distance` are suppressed. Unfilled slots receive `-1`. The
/// spectrum buffer is scratched during the search.
pub fn find_peaks(spectrum: &mut [f32], min_height: f32, min_distance: usize, out: &mut [i16]) {
    for slot in out.iter_mut() {
        *slot = -1;
    }
    let dist = min_distance.max(1);
    for slot in out.iter_mut() {
        let mut best = None;
        let mut best_val = min_height;
        for (k, &a) in spectrum.iter().enumerate() {
            if a > best_val {
                best = Some(k);
                best_val = a;
            }
        }
        let Some(k) = best else { break };
        *slot = k as i16;
        let lo = k.saturating_sub(dist - 1);
        let hi = (k + dist).min(spectrum.len());
        for a in &mut spectrum[lo..hi] {
            *a = f32::MIN;
        }
    }
}

/// Q15 variant of [`find_peaks`].
pub fn find_peaks_q15(spectrum: &mut [i16], min_height: i16, min_distance: usize, out: &mut [i16]) {
    for slot in out.iter_mut() {
        *slot = -1;
    }
    let dist = min_distance.max(1);
    for slot in out.iter_mut() {
        let mut best = None;
        let mut best_val = min_height;
        for (k, &a) in spectrum.iter().enumerate() {
            if a > best_val {
                best = Some(k);
                best_val = a;
            }
        }
        let Some(k) = best else { break };
        *slot = k as i16;
        let lo = k.saturating_sub(dist - 1);
        let hi = (k + dist).min(spectrum.len());
        for a in &mut spectrum[lo..hi] {
            *a = i16::MIN;
        }
    }
}

/// Total harmonic distortion of the tone at `base`: amplitude of the
/// first `harmonics` overtones relative to the fundamental.
pub fn thd_f32(spectrum: &[f32], base: usize, harmonics: usize) -> f32 {
    if base == 0 || base >= spectrum.len() || spectrum[base] <= 0.0 {
        return 0.0;
    }
    let mut acc = 0.0f32;
    for h in 2..=harmonics.max(2) {
        let k = base * h;
        if k >= spectrum.len() {
            break;
        }
        acc += spectrum[k] * spectrum[k];
    }
    acc.sqrt() / spectrum[base]
}

/// Q15 variant of [`thd_f32`], scaled by [`UNIT_SCALE`].
pub fn thd_q15(spectrum: &[i16], base: usize, harmonics: usize) -> i32 {
    if base == 0 || base >= spectrum.len() || spectrum[base] <= 0 {
        return 0;
    }
    let mut acc = 0u64;
    for h in 2..=harmonics.max(2) {
        let k = base * h;
        if k >= spectrum.len() {
            break;
        }
        let a = spectrum[k].max(0) as u64;
        acc += a * a;
    }
    (isqrt_u64(acc) as i64 * UNIT_SCALE / spectrum[base] as i64) as i32
}

/// Signal-to-noise power ratio: energy at the listed bins over energy
/// everywhere else. Bins outside the spectrum and `-1` sentinels are
/// ignored.
pub fn snr_f32(spectrum: &[f32], signal_bins: &[i16]) -> f32 {
    let mut signal = 0.0f32;
    let mut noise = 0.0f32;
    for (k, &a) in spectrum.iter().enumerate() {
        let p = a * a;
        if signal_bins.iter().any(|&b| b >= 0 && b as usize == k) {
            signal += p;
        } else {
            noise += p;
        }
    }
    if noise <= 0.0 {
        return 0.0;
    }
    signal / noise
}

/// Q15 variant of [`snr_f32`], scaled by [`UNIT_SCALE`].
pub fn snr_q15(spectrum: &[i16], signal_bins: &[i16]) -> i32 {
    let mut signal = 0u64;
    let mut noise = 0u64;
    for (k, &a) in spectrum.iter().enumerate() {
        let a = a.max(0) as u64;
        let p = a * a;
        if signal_bins.iter().any(|&b| b >= 0 && b as usize == k) {
            signal += p;
        } else {
            noise += p;
        }
    }
    if noise == 0 {
        return 0;
    }
    (signal.saturating_mul(UNIT_SCALE as u64) / noise).min(i32::MAX as u64) as i32
}

/// Mean distance in bins between consecutive peaks; `-1` sentinels are
/// skipped.
pub fn peaks_mean_distance(peaks: &[i16]) -> i16 {
    let mut prev: Option<i16> = None;
    let mut acc = 0i32;
    let mut count = 0i32;
    for &p in peaks {
        if p < 0 {
            continue;
        }
        if let Some(q) = prev {
            acc += (p - q).abs() as i32;
            count += 1;
        }
        prev = Some(p);
    }
    if count == 0 {
        0
    } else {
        (acc / count) as i16
    }
}

/// Energy within a bin range.
fn band_energy_f32(spectrum: &[f32], from: usize, to: usize) -> f32 {
    spectrum[from.min(spectrum.len())..to.min(spectrum.len())]
        .iter()
        .map(|&a| a * a)
        .sum()
}

/// Which pair of spectrum thirds a frequency-energy ratio compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyBands {
    /// Lower third over middle third.
    LowOverMid,
    /// Middle third over upper third.
    MidOverHigh,
    /// Lower third over upper third.
    LowOverHigh,
}

/// Energy ratio between two thirds of the spectrum.
pub fn energy_ratio_f32(spectrum: &[f32], bands: EnergyBands) -> f32 {
    let n = spectrum.len();
    let third = n / 3;
    let (num, den) = match bands {
        EnergyBands::LowOverMid => (
            band_energy_f32(spectrum, 0, third),
            band_energy_f32(spectrum, third, 2 * third),
        ),
        EnergyBands::MidOverHigh => (
            band_energy_f32(spectrum, third, 2 * third),
            band_energy_f32(spectrum, 2 * third, n),
        ),
        EnergyBands::LowOverHigh => (
            band_energy_f32(spectrum, 0, third),
            band_energy_f32(spectrum, 2 * third, n),
        ),
    };
    if den <= 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Q15 variant of [`energy_ratio_f32`], scaled by [`UNIT_SCALE`].
pub fn energy_ratio_q15(spectrum: &[i16], bands: EnergyBands) -> i32 {
    let energy = |from: usize, to: usize| -> u64 {
        spectrum[from.min(spectrum.len())..to.min(spectrum.len())]
            .iter()
            .map(|&a| {
                let a = a.max(0) as u64;
                a * a
            })
            .sum()
    };
    let n = spectrum.len();
    let third = n / 3;
    let (num, den) = match bands {
        EnergyBands::LowOverMid => (energy(0, third), energy(third, 2 * third)),
        EnergyBands::MidOverHigh => (energy(third, 2 * third), energy(2 * third, n)),
        EnergyBands::LowOverHigh => (energy(0, third), energy(2 * third, n)),
    };
    if den == 0 {
        0
    } else {
        (num.saturating_mul(UNIT_SCALE as u64) / den).min(i32::MAX as u64) as i32
    }
}
