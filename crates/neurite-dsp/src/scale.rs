//! Saturating scaling and quantization between numeric domains.
//!
//! Integer min-max and z-score kernels pre-multiply by the domain's
//! quantization factor before dividing, so the unit range survives
//! integer division. Every kernel here saturates out-of-range results to
//! the domain extreme; nothing wraps. Float-to-int casts truncate toward
//! zero — rounding is a build-wide choice and this build does not round,
//! consistently across the whole pipeline.

use crate::num::IntSample;

/// Min-max scale a single float: `(x - min) / (max - min)`.
#[inline]
pub fn minmax_float(x: f32, min: f32, max: f32) -> f32 {
    if max == min {
        return 0.0;
    }
    (x - min) / (max - min)
}

/// Min-max scale a single float into a quantized unit range
/// `[0, qfactor]`, truncating.
#[inline]
pub fn minmax_float_q(x: f32, min: f32, max: f32, qfactor: i32) -> i32 {
    if max == min {
        return 0;
    }
    let v = (x - min) * qfactor as f32 / (max - min);
    sat_i32_from_f32(v).clamp(0, qfactor)
}

/// Min-max scale a single widened integer into `[0, qfactor]`.
///
/// The difference is pre-multiplied by `qfactor` to preserve precision
/// under the integer division.
#[inline]
pub fn minmax_int_q(x: i64, min: i64, max: i64, qfactor: i32) -> i32 {
    if max == min {
        return 0;
    }
    let v = (x - min) * qfactor as i64 / (max - min);
    v.clamp(0, qfactor as i64) as i32
}

/// Min-max scale a float vector.
pub fn minmax_f32(input: &[f32], min: f32, max: f32, out: &mut [f32]) {
    for (o, &x) in out.iter_mut().zip(input.iter()) {
        *o = minmax_float(x, min, max);
    }
}

/// Min-max scale an integer vector within its own domain, results in
/// `[0, QFACTOR]`.
pub fn minmax_fixed<D: IntSample>(input: &[D], min: D, max: D, out: &mut [D]) {
    for (o, &x) in out.iter_mut().zip(input.iter()) {
        let v = minmax_int_q(
            x.widen() as i64,
            min.widen() as i64,
            max.widen() as i64,
            D::QFACTOR,
        );
        *o = D::from_i32_sat(v);
    }
}

/// Z-score scale a single float: `(x - mean) / stddev`.
#[inline]
pub fn zscore_float(x: f32, mean: f32, stddev: f32) -> f32 {
    if stddev == 0.0 {
        return 0.0;
    }
    (x - mean) / stddev
}

/// Z-score scale a single widened integer with quantized output,
/// pre-multiplied by `qfactor` before the division.
#[inline]
pub fn zscore_int_q(x: i64, mean: i64, stddev: i64, qfactor: i32) -> i32 {
    if stddev == 0 {
        return 0;
    }
    let v = (x - mean) * qfactor as i64 / stddev;
    v.clamp(-(qfactor as i64), qfactor as i64) as i32
}

/// Z-score scale a float vector.
pub fn zscore_f32(input: &[f32], mean: f32, stddev: f32, out: &mut [f32]) {
    for (o, &x) in out.iter_mut().zip(input.iter()) {
        *o = zscore_float(x, mean, stddev);
    }
}

/// Z-score scale an integer vector within its own domain.
pub fn zscore_fixed<D: IntSample>(input: &[D], mean: D, stddev: D, out: &mut [D]) {
    for (o, &x) in out.iter_mut().zip(input.iter()) {
        let v = zscore_int_q(
            x.widen() as i64,
            mean.widen() as i64,
            stddev.widen() as i64,
            D::QFACTOR,
        );
        *o = D::from_i32_sat(v);
    }
}

#[inline]
fn sat_i32_from_f32(v: f32) -> i32 {
    // `as` casts saturate since Rust 1.45; NaN maps to 0
    v as i32
}

/// Quantize floats to i8, saturating to `[-128, 127]`, truncating.
pub fn quantize_f32_to_i8(input: &[f32], out: &mut [i8]) {
    for (o, &x) in out.iter_mut().zip(input.iter()) {
        *o = x as i8;
    }
}

/// Quantize floats to i16, saturating to `[-32768, 32767]`, truncating.
pub fn quantize_f32_to_i16(input: &[f32], out: &mut [i16]) {
    for (o, &x) in out.iter_mut().zip(input.iter()) {
        *o = x as i16;
    }
}

/// Quantize floats to i32, saturating, truncating.
pub fn quantize_f32_to_i32(input: &[f32], out: &mut [i32]) {
    for (o, &x) in out.iter_mut().zip(input.iter()) {
        *o = x as i32;
    }
}

/// Dequantize a unit-range integer back to float: `v / qfactor`.
#[inline]
pub fn dequantize(v: i64, qfactor: i32) -> f32 {
    v as f32 / qfactor as f32
}

/// Clip a float vector in place.
pub fn clip_f32(data: &mut [f32], min: f32, max: f32) {
    for x in data.iter_mut() {
        *x = x.clamp(min, max);
    }
}

/// Clip an integer vector in place.
pub fn clip_fixed<D: IntSample>(data: &mut [D], min: D, max: D) {
    for x in data.iter_mut() {
        if *x < min {
            *x = min;
        } else if *x > max {
            *x = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minmax_float_unit_range() {
        assert_eq!(minmax_float(5.0, 0.0, 10.0), 0.5);
        assert_eq!(minmax_float(0.0, 0.0, 10.0), 0.0);
        assert_eq!(minmax_float(10.0, 0.0, 10.0), 1.0);
        // degenerate scale collapses to zero instead of dividing by zero
        assert_eq!(minmax_float(3.0, 7.0, 7.0), 0.0);
    }

    #[test]
    fn test_minmax_int_premultiply_preserves_precision() {
        // (x - min) = 1 over a span of 4: naive integer division loses it
        let v = minmax_int_q(1, 0, 4, 32767);
        assert_eq!(v, 32767 / 4);
        assert_eq!(minmax_int_q(4, 0, 4, 32767), 32767);
        // out-of-range inputs clamp to the boundary, no wrap
        assert_eq!(minmax_int_q(9, 0, 4, 32767), 32767);
        assert_eq!(minmax_int_q(-3, 0, 4, 32767), 0);
    }

    #[test]
    fn test_minmax_fixed_vector() {
        let input: [i8; 4] = [-100, 0, 50, 100];
        let mut out = [0i8; 4];
        minmax_fixed(&input, -100, 100, &mut out);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 63); // 127/2 truncated
        assert_eq!(out[3], 127);
    }

    #[test]
    fn test_zscore() {
        assert_eq!(zscore_float(7.0, 5.0, 2.0), 1.0);
        assert_eq!(zscore_float(7.0, 5.0, 0.0), 0.0);
        assert_eq!(zscore_int_q(70, 50, 10, 127), 127); // clamped at +1.0
        assert_eq!(zscore_int_q(55, 50, 10, 127), 63);
    }

    #[test]
    fn test_quantize_saturates_not_wraps() {
        let input = [300.0f32, -300.0, 100.4, -0.9];
        let mut out = [0i8; 4];
        quantize_f32_to_i8(&input, &mut out);
        assert_eq!(out, [127, -128, 100, 0]);

        let input16 = [1e9f32, -1e9, 1234.9];
        let mut out16 = [0i16; 3];
        quantize_f32_to_i16(&input16, &mut out16);
        assert_eq!(out16, [32767, -32768, 1234]);
    }

    #[test]
    fn test_quantize_roundtrip_within_one_step() {
        let values = [0.1f32, 0.45, 0.9, -0.3];
        let mut q = [0i16; 4];
        let scaled: Vec<f32> = values.iter().map(|v| v * 32767.0).collect();
        quantize_f32_to_i16(&scaled, &mut q);
        for (i, &v) in values.iter().enumerate() {
            let back = dequantize(q[i] as i64, 32767);
            assert!((back - v).abs() <= 1.0 / 32767.0, "{back} vs {v}");
        }
    }

    #[test]
    fn test_clip() {
        let mut v = [-2.0f32, 0.5, 2.0];
        clip_f32(&mut v, -1.0, 1.0);
        assert_eq!(v, [-1.0, 0.5, 1.0]);

        let mut w: [i16; 3] = [-500, 100, 500];
        clip_fixed(&mut w, -300, 300);
        assert_eq!(w, [-300, 100, 300]);
    }
}
