//! In-place complex and real FFT, floating point and Q15 fixed point.
//!
//! Buffers hold interleaved complex values `[re0, im0, re1, im1, ...]`.
//! Every `process` call writes its result over the input buffer — the
//! aliasing is the contract, not an accident: the window memory doubles
//! as the transform workspace on the target hardware, and callers rely
//! on that footprint.
//!
//! Power-of-two lengths only; rejected at plan construction. The
//! floating-point complex plan picks a radix-4 schedule when `log2(len)`
//! is even and radix-2 otherwise; both produce identical spectra.

use crate::error::{DspError, Result};
use crate::num::isqrt_u64;

const TAU: f64 = std::f64::consts::PI * 2.0;

fn is_pow2(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Digit-reversal permutation table for the given radix.
fn digit_reverse(n: usize, radix: usize) -> Vec<u32> {
    let mut digits = 0;
    let mut m = 1;
    while m < n {
        m *= radix;
        digits += 1;
    }
    (0..n)
        .map(|i| {
            let mut v = i;
            let mut r = 0;
            for _ in 0..digits {
                r = r * radix + v % radix;
                v /= radix;
            }
            r as u32
        })
        .collect()
}

fn permute_complex_f32(data: &mut [f32], table: &[u32]) {
    for (i, &r) in table.iter().enumerate() {
        let r = r as usize;
        if i < r {
            data.swap(2 * i, 2 * r);
            data.swap(2 * i + 1, 2 * r + 1);
        }
    }
}

#[inline]
fn cmul(ar: f32, ai: f32, br: f32, bi: f32) -> (f32, f32) {
    (ar * br - ai * bi, ar * bi + ai * br)
}

/// Complex FFT plan, 32-bit floating point.
pub struct CfftPlan {
    len: usize,
    /// Full-circle forward twiddles: `tw[k] = (cos, -sin)(2πk/len)`.
    twiddle: Vec<(f32, f32)>,
    permute: Vec<u32>,
    radix4: bool,
}

impl CfftPlan {
    /// Build a plan for `len` complex points. `len` must be a power of
    /// two; odd powers fall back to the radix-2 schedule.
    pub fn new(len: usize) -> Result<Self> {
        if !is_pow2(len) || len < 2 {
            return Err(DspError::NotPowerOfTwo { len });
        }
        let radix4 = len.trailing_zeros() % 2 == 0;
        let twiddle = (0..len)
            .map(|k| {
                let phi = TAU * k as f64 / len as f64;
                (phi.cos() as f32, (-phi.sin()) as f32)
            })
            .collect();
        let permute = digit_reverse(len, if radix4 { 4 } else { 2 });
        Ok(Self {
            len,
            twiddle,
            permute,
            radix4,
        })
    }

    /// Transform length in complex points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the plan runs the radix-4 schedule.
    pub fn is_radix4(&self) -> bool {
        self.radix4
    }

    /// Forward transform, in place over `data` (`2 * len` floats,
    /// interleaved re/im).
    pub fn process(&self, data: &mut [f32]) {
        #[cfg(feature = "runtime-checks")]
        assert_eq!(data.len(), 2 * self.len, "cfft buffer length mismatch");
        debug_assert_eq!(data.len(), 2 * self.len);

        permute_complex_f32(data, &self.permute);
        if self.radix4 {
            self.stages_radix4(data);
        } else {
            self.stages_radix2(data);
        }
    }

    fn stages_radix2(&self, data: &mut [f32]) {
        let n = self.len;
        let mut m = 2;
        while m <= n {
            let step = n / m;
            let half = m / 2;
            for k in (0..n).step_by(m) {
                for j in 0..half {
                    let (wr, wi) = self.twiddle[j * step];
                    let i1 = 2 * (k + j);
                    let i2 = 2 * (k + j + half);
                    let (tr, ti) = cmul(data[i2], data[i2 + 1], wr, wi);
                    let (ur, ui) = (data[i1], data[i1 + 1]);
                    data[i1] = ur + tr;
                    data[i1 + 1] = ui + ti;
                    data[i2] = ur - tr;
                    data[i2 + 1] = ui - ti;
                }
            }
            m <<= 1;
        }
    }

    fn stages_radix4(&self, data: &mut [f32]) {
        let n = self.len;
        let mut m = 4;
        while m <= n {
            let step = n / m;
            let q = m / 4;
            for k in (0..n).step_by(m) {
                for j in 0..q {
                    let (w1r, w1i) = self.twiddle[j * step];
                    let (w2r, w2i) = self.twiddle[2 * j * step];
                    let (w3r, w3i) = self.twiddle[3 * j * step];
                    let ia = 2 * (k + j);
                    let ib = 2 * (k + j + q);
                    let ic = 2 * (k + j + 2 * q);
                    let id = 2 * (k + j + 3 * q);

                    let (ar, ai) = (data[ia], data[ia + 1]);
                    let (br, bi) = cmul(data[ib], data[ib + 1], w1r, w1i);
                    let (cr, ci) = cmul(data[ic], data[ic + 1], w2r, w2i);
                    let (dr, di) = cmul(data[id], data[id + 1], w3r, w3i);

                    let (t0r, t0i) = (ar + cr, ai + ci);
                    let (t1r, t1i) = (ar - cr, ai - ci);
                    let (t2r, t2i) = (br + dr, bi + di);
                    let (t3r, t3i) = (br - dr, bi - di);

                    data[ia] = t0r + t2r;
                    data[ia + 1] = t0i + t2i;
                    // t1 - i*t3
                    data[ib] = t1r + t3i;
                    data[ib + 1] = t1i - t3r;
                    data[ic] = t0r - t2r;
                    data[ic + 1] = t0i - t2i;
                    // t1 + i*t3
                    data[id] = t1r - t3i;
                    data[id + 1] = t1i + t3r;
                }
            }
            m <<= 2;
        }
    }
}

/// Real FFT plan, 32-bit floating point.
///
/// Processes `len` real samples through a half-length complex FFT plus a
/// recombination stage. Output is packed in place: slot 0 holds
/// `(DC, Nyquist)`, slots `1..len/2` hold the interleaved re/im of bins
/// `1..len/2`.
pub struct RfftPlan {
    cfft: CfftPlan,
    len: usize,
    /// Recombination twiddles: `tw[k] = (cos, -sin)(2πk/len)`.
    twiddle: Vec<(f32, f32)>,
}

impl RfftPlan {
    /// Build a plan for `len` real points (power of two, at least 4).
    pub fn new(len: usize) -> Result<Self> {
        if !is_pow2(len) || len < 4 {
            return Err(DspError::NotPowerOfTwo { len });
        }
        let twiddle = (0..len / 2)
            .map(|k| {
                let phi = TAU * k as f64 / len as f64;
                (phi.cos() as f32, (-phi.sin()) as f32)
            })
            .collect();
        Ok(Self {
            cfft: CfftPlan::new(len / 2)?,
            len,
            twiddle,
        })
    }

    /// Transform length in real samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of spectrum bins produced (`len / 2`).
    pub fn bins(&self) -> usize {
        self.len / 2
    }

    /// Forward transform, in place over `data` (`len` floats).
    pub fn process(&self, data: &mut [f32]) {
        #[cfg(feature = "runtime-checks")]
        assert_eq!(data.len(), self.len, "rfft buffer length mismatch");
        debug_assert_eq!(data.len(), self.len);

        let half = self.len / 2;
        self.cfft.process(data);

        // DC and Nyquist fold into slot 0
        let (z0r, z0i) = (data[0], data[1]);
        data[0] = z0r + z0i;
        data[1] = z0r - z0i;

        let quarter = half / 2;
        for k in 1..=quarter {
            let m = half - k;
            let (zkr, zki) = (data[2 * k], data[2 * k + 1]);
            let (zmr, zmi) = (data[2 * m], data[2 * m + 1]);

            // even part (Zk + conj(Zm)) / 2, odd part -(i/2)(Zk - conj(Zm))
            let er = 0.5 * (zkr + zmr);
            let ei = 0.5 * (zki - zmi);
            let or_ = 0.5 * (zki + zmi);
            let oi = -0.5 * (zkr - zmr);

            let (wr, wi) = self.twiddle[k];
            let (twr, twi) = cmul(or_, oi, wr, wi);

            // X[k] = E + W*O,  X[half - k] = conj(E - W*O)
            data[2 * k] = er + twr;
            data[2 * k + 1] = ei + twi;
            if m != k {
                data[2 * m] = er - twr;
                data[2 * m + 1] = -(ei - twi);
            }
        }
    }
}

/// Amplitude spectrum of a packed real-FFT buffer.
///
/// `out` receives `fft_len / 2` bins scaled so that a full-scale sine at
/// bin `k` yields its amplitude at `out[k]` (2/N per bin, 1/N at DC).
pub fn amplitude_spectrum(packed: &[f32], fft_len: usize, out: &mut [f32]) {
    let bins = fft_len / 2;
    debug_assert!(packed.len() >= fft_len && out.len() >= bins);
    let scale = 2.0 / fft_len as f32;
    out[0] = packed[0].abs() / fft_len as f32;
    for k in 1..bins {
        let re = packed[2 * k];
        let im = packed[2 * k + 1];
        out[k] = (re * re + im * im).sqrt() * scale;
    }
}

// ---------------------------------------------------------------------------
// Q15 fixed point
// ---------------------------------------------------------------------------

#[inline]
fn q15_mul(a: i16, b: i16) -> i16 {
    ((a as i32 * b as i32) >> 15) as i16
}

#[inline]
fn q15_cmul(ar: i16, ai: i16, br: i16, bi: i16) -> (i16, i16) {
    (
        (((ar as i32 * br as i32) - (ai as i32 * bi as i32)) >> 15) as i16,
        (((ar as i32 * bi as i32) + (ai as i32 * br as i32)) >> 15) as i16,
    )
}

/// Complex FFT plan, Q15 fixed point, radix-2.
///
/// Each butterfly stage halves the data to stay inside i16, so the
/// result carries an overall `1/len` scaling.
pub struct CfftPlanQ15 {
    len: usize,
    twiddle: Vec<(i16, i16)>,
    permute: Vec<u32>,
}

impl CfftPlanQ15 {
    /// Build a plan for `len` complex points (power of two).
    pub fn new(len: usize) -> Result<Self> {
        if !is_pow2(len) || len < 2 {
            return Err(DspError::NotPowerOfTwo { len });
        }
        let twiddle = (0..len / 2)
            .map(|k| {
                let phi = TAU * k as f64 / len as f64;
                (
                    (phi.cos() * 32767.0).round() as i16,
                    (-phi.sin() * 32767.0).round() as i16,
                )
            })
            .collect();
        Ok(Self {
            len,
            twiddle,
            permute: digit_reverse(len, 2),
        })
    }

    /// Transform length in complex points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Forward transform, in place over `data` (`2 * len` i16 values,
    /// interleaved re/im). Output is scaled by `1/len`.
    pub fn process(&self, data: &mut [i16]) {
        debug_assert_eq!(data.len(), 2 * self.len);
        for (i, &r) in self.permute.iter().enumerate() {
            let r = r as usize;
            if i < r {
                data.swap(2 * i, 2 * r);
                data.swap(2 * i + 1, 2 * r + 1);
            }
        }
        let n = self.len;
        let mut m = 2;
        while m <= n {
            let step = n / m;
            let half = m / 2;
            for k in (0..n).step_by(m) {
                for j in 0..half {
                    let (wr, wi) = self.twiddle[j * step];
                    let i1 = 2 * (k + j);
                    let i2 = 2 * (k + j + half);
                    let (tr, ti) = q15_cmul(data[i2], data[i2 + 1], wr, wi);
                    // stage scaling: halve both operands before combining
                    let ur = data[i1] >> 1;
                    let ui = data[i1 + 1] >> 1;
                    let tr = tr >> 1;
                    let ti = ti >> 1;
                    data[i1] = ur.wrapping_add(tr);
                    data[i1 + 1] = ui.wrapping_add(ti);
                    data[i2] = ur.wrapping_sub(tr);
                    data[i2 + 1] = ui.wrapping_sub(ti);
                }
            }
            m <<= 1;
        }
    }
}

/// Real FFT plan, Q15 fixed point.
///
/// Packing matches [`RfftPlan`]; the recombination stage halves once
/// more, so the output carries an overall `1/len` scaling relative to
/// the input sequence.
pub struct RfftPlanQ15 {
    cfft: CfftPlanQ15,
    len: usize,
    twiddle: Vec<(i16, i16)>,
}

impl RfftPlanQ15 {
    /// Build a plan for `len` real points (power of two, at least 4).
    pub fn new(len: usize) -> Result<Self> {
        if !is_pow2(len) || len < 4 {
            return Err(DspError::NotPowerOfTwo { len });
        }
        let twiddle = (0..len / 2)
            .map(|k| {
                let phi = TAU * k as f64 / len as f64;
                (
                    (phi.cos() * 32767.0).round() as i16,
                    (-phi.sin() * 32767.0).round() as i16,
                )
            })
            .collect();
        Ok(Self {
            cfft: CfftPlanQ15::new(len / 2)?,
            len,
            twiddle,
        })
    }

    /// Transform length in real samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of spectrum bins produced (`len / 2`).
    pub fn bins(&self) -> usize {
        self.len / 2
    }

    /// Forward transform, in place over `data` (`len` i16 values).
    pub fn process(&self, data: &mut [i16]) {
        debug_assert_eq!(data.len(), self.len);
        let half = self.len / 2;
        self.cfft.process(data);

        let (z0r, z0i) = (data[0] >> 1, data[1] >> 1);
        data[0] = z0r + z0i;
        data[1] = z0r - z0i;

        let quarter = half / 2;
        for k in 1..=quarter {
            let m = half - k;
            let (zkr, zki) = (data[2 * k] as i32, data[2 * k + 1] as i32);
            let (zmr, zmi) = (data[2 * m] as i32, data[2 * m + 1] as i32);

            let er = ((zkr + zmr) >> 2) as i16;
            let ei = ((zki - zmi) >> 2) as i16;
            let or_ = ((zki + zmi) >> 2) as i16;
            let oi = (-(zkr - zmr) >> 2) as i16;

            let (wr, wi) = self.twiddle[k];
            let (twr, twi) = q15_cmul(or_, oi, wr, wi);

            data[2 * k] = er + twr;
            data[2 * k + 1] = ei + twi;
            if m != k {
                data[2 * m] = er - twr;
                data[2 * m + 1] = -(ei - twi);
            }
        }
    }
}

/// Amplitude spectrum of a packed Q15 real-FFT buffer.
pub fn amplitude_spectrum_q15(packed: &[i16], fft_len: usize, out: &mut [i16]) {
    let bins = fft_len / 2;
    debug_assert!(packed.len() >= fft_len && out.len() >= bins);
    out[0] = (packed[0] as i32).unsigned_abs().min(i16::MAX as u32) as i16;
    for k in 1..bins {
        let re = packed[2 * k] as i64;
        let im = packed[2 * k + 1] as i64;
        out[k] = isqrt_u64((re * re + im * im) as u64).min(i16::MAX as u64) as i16;
    }
}
