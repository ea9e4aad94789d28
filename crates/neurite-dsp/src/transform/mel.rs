//! Mel-spectrogram accumulation over audio frames.
//!
//! One frame of `fft_len` samples becomes one spectrogram column: real
//! FFT (in place over the caller's frame buffer), amplitude spectrum,
//! triangular mel filterbank. Columns accumulate until `time_bands`
//! frames have been pushed; [`MelSpectrogram::shift`] then drops the
//! oldest columns so the accumulator can keep streaming.

use ndarray::Array2;

use crate::error::{DspError, Result};
use crate::transform::fft::{amplitude_spectrum, RfftPlan};

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Streaming mel-spectrogram accumulator, 32-bit floating point.
pub struct MelSpectrogram {
    rfft: RfftPlan,
    /// Triangular filters, `freq_bands x (fft_len / 2)`.
    filterbank: Array2<f32>,
    /// Accumulated spectrogram, `freq_bands x time_bands`.
    spectrogram: Array2<f32>,
    spectrum: Vec<f32>,
    sample_rate: u16,
    freq_bands: usize,
    time_bands: usize,
    fill: usize,
}

impl MelSpectrogram {
    /// Build an accumulator for `freq_bands x time_bands` cells over
    /// frames of `fft_len` samples at `sample_rate` Hz.
    pub fn new(
        sample_rate: u16,
        fft_len: usize,
        freq_bands: usize,
        time_bands: usize,
    ) -> Result<Self> {
        if freq_bands == 0 {
            return Err(DspError::InvalidLength {
                len: freq_bands,
                what: "mel frequency bands",
            });
        }
        if time_bands == 0 {
            return Err(DspError::InvalidLength {
                len: time_bands,
                what: "mel time bands",
            });
        }
        let rfft = RfftPlan::new(fft_len)?;
        let bins = fft_len / 2;
        let filterbank = build_filterbank(sample_rate, fft_len, freq_bands);
        Ok(Self {
            rfft,
            filterbank,
            spectrogram: Array2::zeros((freq_bands, time_bands)),
            spectrum: vec![0.0; bins],
            sample_rate,
            freq_bands,
            time_bands,
            fill: 0,
        })
    }

    /// Audio sample rate the filterbank was built for.
    pub fn sample_rate(&self) -> u16 {
        self.sample_rate
    }

    /// Number of mel bands per column.
    pub fn freq_bands(&self) -> usize {
        self.freq_bands
    }

    /// Number of columns held by the accumulator.
    pub fn time_bands(&self) -> usize {
        self.time_bands
    }

    /// Columns currently filled.
    pub fn fill(&self) -> usize {
        self.fill
    }

    /// Accumulated spectrogram, `freq_bands x time_bands`; columns at and
    /// past [`MelSpectrogram::fill`] are stale.
    pub fn spectrogram(&self) -> &Array2<f32> {
        &self.spectrogram
    }

    /// Process one frame into the next column.
    ///
    /// The FFT runs in place: `frame` is consumed as scratch and holds the
    /// packed spectrum afterwards. Returns `true` once the spectrogram is
    /// fully populated; further frames are rejected until [`shift`] makes
    /// room.
    ///
    /// [`shift`]: MelSpectrogram::shift
    pub fn push_frame(&mut self, frame: &mut [f32]) -> bool {
        if self.fill == self.time_bands {
            return true;
        }
        self.rfft.process(frame);
        amplitude_spectrum(frame, self.rfft.len(), &mut self.spectrum);

        for band in 0..self.freq_bands {
            let mut acc = 0.0f32;
            for (bin, &a) in self.spectrum.iter().enumerate() {
                acc += self.filterbank[(band, bin)] * a;
            }
            self.spectrogram[(band, self.fill)] = acc;
        }
        self.fill += 1;
        self.fill == self.time_bands
    }

    /// Drop the oldest `shift` columns and move the rest left.
    pub fn shift(&mut self, shift: usize) {
        let shift = shift.min(self.fill);
        if shift == 0 {
            return;
        }
        for band in 0..self.freq_bands {
            for col in shift..self.fill {
                self.spectrogram[(band, col - shift)] = self.spectrogram[(band, col)];
            }
        }
        self.fill -= shift;
    }

    /// Clear the accumulator.
    pub fn reset(&mut self) {
        self.spectrogram.fill(0.0);
        self.fill = 0;
    }
}

fn build_filterbank(sample_rate: u16, fft_len: usize, freq_bands: usize) -> Array2<f32> {
    let bins = fft_len / 2;
    let nyquist = sample_rate as f32 / 2.0;
    let mel_max = hz_to_mel(nyquist);

    // band edge frequencies, evenly spaced on the mel scale
    let edges: Vec<f32> = (0..freq_bands + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (freq_bands + 1) as f32))
        .collect();
    let hz_per_bin = sample_rate as f32 / fft_len as f32;

    let mut fb = Array2::zeros((freq_bands, bins));
    for band in 0..freq_bands {
        let (lo, mid, hi) = (edges[band], edges[band + 1], edges[band + 2]);
        for bin in 0..bins {
            let f = bin as f32 * hz_per_bin;
            let w = if f <= lo || f >= hi {
                0.0
            } else if f <= mid {
                (f - lo) / (mid - lo)
            } else {
                (hi - f) / (hi - mid)
            };
            fb[(band, bin)] = w;
        }
    }
    fb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine_frame(len: usize, bin: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * bin as f32 * i as f32 / len as f32).sin())
            .collect()
    }

    #[test]
    fn test_readiness_after_time_bands_frames() {
        let mut mel = MelSpectrogram::new(16_000, 64, 8, 3).unwrap();
        let mut frame = sine_frame(64, 4);
        assert!(!mel.push_frame(&mut frame.clone()));
        assert!(!mel.push_frame(&mut frame.clone()));
        assert!(mel.push_frame(&mut frame));
        assert_eq!(mel.fill(), 3);
        // full accumulator rejects further frames until shifted
        assert!(mel.push_frame(&mut sine_frame(64, 4)));
        assert_eq!(mel.fill(), 3);
    }

    #[test]
    fn test_shift_drops_oldest_columns() {
        let mut mel = MelSpectrogram::new(16_000, 64, 4, 3).unwrap();
        for bin in [2usize, 8, 14] {
            let mut frame = sine_frame(64, bin);
            mel.push_frame(&mut frame);
        }
        let col1: Vec<f32> = (0..4).map(|b| mel.spectrogram()[(b, 1)]).collect();
        let col2: Vec<f32> = (0..4).map(|b| mel.spectrogram()[(b, 2)]).collect();
        mel.shift(1);
        assert_eq!(mel.fill(), 2);
        for b in 0..4 {
            assert_eq!(mel.spectrogram()[(b, 0)], col1[b]);
            assert_eq!(mel.spectrogram()[(b, 1)], col2[b]);
        }
    }

    #[test]
    fn test_energy_lands_in_matching_band() {
        // low sine excites lower mel bands than a high sine
        let mut mel = MelSpectrogram::new(16_000, 128, 10, 1).unwrap();
        let mut low = sine_frame(128, 3);
        mel.push_frame(&mut low);
        let low_centroid: f32 = {
            let col: Vec<f32> = (0..10).map(|b| mel.spectrogram()[(b, 0)]).collect();
            let total: f32 = col.iter().sum();
            col.iter().enumerate().map(|(b, &e)| b as f32 * e).sum::<f32>() / total
        };
        mel.reset();
        let mut high = sine_frame(128, 50);
        mel.push_frame(&mut high);
        let high_centroid: f32 = {
            let col: Vec<f32> = (0..10).map(|b| mel.spectrogram()[(b, 0)]).collect();
            let total: f32 = col.iter().sum();
            col.iter().enumerate().map(|(b, &e)| b as f32 * e).sum::<f32>() / total
        };
        assert!(high_centroid > low_centroid);
    }

    #[test]
    fn test_filterbank_rejects_zero_bands() {
        assert!(MelSpectrogram::new(16_000, 64, 0, 3).is_err());
        assert!(MelSpectrogram::new(16_000, 60, 4, 3).is_err());
    }
}
