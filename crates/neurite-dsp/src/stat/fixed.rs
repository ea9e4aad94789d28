//! Integer-domain statistic kernels, generic over [`IntSample`].
//!
//! Intermediate arithmetic runs in i64/u64 and is narrowed through the
//! domain trait, so i8 and i16 keep their native cached widths and
//! saturation points. Fraction-valued results are scaled by
//! [`PERCENT_SCALE`], unit-range results by [`UNIT_SCALE`]; the scale is
//! part of each kernel's contract.

use crate::f24::F24;
use crate::num::{isqrt_u64, IntSample, Samples, PERCENT_SCALE, UNIT_SCALE};
use crate::stat::{Hjorth, LinReg, Moments, StatCtx};

fn raw_sum<D: IntSample>(v: impl Samples<D>) -> i64 {
    let mut acc = 0i64;
    for i in 0..v.len() {
        acc += v.get(i).widen() as i64;
    }
    acc
}

fn raw_tss<D: IntSample>(v: impl Samples<D>) -> u64 {
    let mut acc = 0u64;
    for i in 0..v.len() {
        let x = v.get(i).widen() as i64;
        acc += (x * x) as u64;
    }
    acc
}

fn raw_abssum<D: IntSample>(v: impl Samples<D>) -> u64 {
    let mut acc = 0u64;
    for i in 0..v.len() {
        acc += v.get(i).widen().unsigned_abs() as u64;
    }
    acc
}

fn sum_cached<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> i64 {
    match ctx {
        Some(c) => {
            if let Some(s) = c.sum {
                D::sum_widen(s)
            } else {
                let s = raw_sum(v);
                c.sum = Some(D::sum_narrow(s));
                s
            }
        }
        None => raw_sum(v),
    }
}

fn tss_cached<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> u64 {
    match ctx {
        Some(c) => {
            if let Some(t) = c.tss {
                D::tss_widen(t)
            } else {
                let t = raw_tss(v);
                c.tss = Some(D::tss_narrow(t));
                t
            }
        }
        None => raw_tss(v),
    }
}

fn var_cached<D: IntSample>(v: impl Samples<D>, mut ctx: Option<&mut StatCtx<D>>) -> u64 {
    if let Some(c) = ctx.as_deref_mut() {
        if let Some(var) = c.var {
            return D::var_widen(var);
        }
    }
    let n = v.len() as i64;
    if n == 0 {
        return 0;
    }
    let sum = sum_cached(v, ctx.as_deref_mut());
    let tss = tss_cached(v, ctx.as_deref_mut()) as i64;
    let var = ((tss - sum * sum / n) / n).max(0) as u64;
    if let Some(c) = ctx {
        c.var = Some(D::var_narrow(var));
    }
    var
}

/// Sum of the vector elements.
pub fn sum<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Sum {
    D::sum_narrow(sum_cached(v, ctx))
}

/// Sum of absolute values of the vector elements.
pub fn abssum<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Abs {
    match ctx {
        Some(c) => {
            if let Some(a) = c.abssum {
                a
            } else {
                let a = D::abs_narrow(raw_abssum(v));
                c.abssum = Some(a);
                a
            }
        }
        None => D::abs_narrow(raw_abssum(v)),
    }
}

/// Total sum of squares of the vector elements.
pub fn tss<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Tss {
    D::tss_narrow(tss_cached(v, ctx))
}

/// Utility pre-pass: computes sum and total sum of squares in one sweep
/// and stores both in the context for every later kernel in the cycle.
pub fn tss_sum<D: IntSample>(v: impl Samples<D>, ctx: &mut StatCtx<D>) {
    let mut s = 0i64;
    let mut t = 0u64;
    for i in 0..v.len() {
        let x = v.get(i).widen() as i64;
        s += x;
        t += (x * x) as u64;
    }
    ctx.sum = Some(D::sum_narrow(s));
    ctx.tss = Some(D::tss_narrow(t));
}

/// Arithmetic mean, truncated toward zero.
pub fn mean<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D {
    let n = v.len() as i64;
    if n == 0 {
        return D::ZERO;
    }
    D::from_i32_sat((sum_cached(v, ctx) / n) as i32)
}

/// Mean of absolute values, truncated toward zero.
pub fn absmean<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D {
    let n = v.len() as u64;
    if n == 0 {
        return D::ZERO;
    }
    let a = match ctx {
        Some(c) => D::abs_widen(abssum(v, Some(c))),
        None => raw_abssum(v),
    };
    D::from_i32_sat((a / n) as i32)
}

/// Smallest element.
pub fn min<D: IntSample>(v: impl Samples<D>) -> D {
    let mut m = D::MAX;
    for i in 0..v.len() {
        let x = v.get(i);
        if x < m {
            m = x;
        }
    }
    m
}

/// Largest element.
pub fn max<D: IntSample>(v: impl Samples<D>) -> D {
    let mut m = D::MIN;
    for i in 0..v.len() {
        let x = v.get(i);
        if x > m {
            m = x;
        }
    }
    m
}

/// Smallest and largest element in one sweep.
pub fn min_max<D: IntSample>(v: impl Samples<D>) -> (D, D) {
    let mut lo = D::MAX;
    let mut hi = D::MIN;
    for i in 0..v.len() {
        let x = v.get(i);
        if x < lo {
            lo = x;
        }
        if x > hi {
            hi = x;
        }
    }
    (lo, hi)
}

/// Largest absolute value.
pub fn absmax<D: IntSample>(v: impl Samples<D>) -> D {
    let mut m = 0i32;
    for i in 0..v.len() {
        let a = v.get(i).widen().abs();
        if a > m {
            m = a;
        }
    }
    D::from_i32_sat(m)
}

/// Smallest absolute value.
pub fn absmin<D: IntSample>(v: impl Samples<D>) -> D {
    let mut m = i32::MAX;
    for i in 0..v.len() {
        let a = v.get(i).widen().abs();
        if a < m {
            m = a;
        }
    }
    if m == i32::MAX {
        D::ZERO
    } else {
        D::from_i32_sat(m)
    }
}

/// Spread between largest and smallest element, widened.
pub fn range<D: IntSample>(v: impl Samples<D>) -> D::Feature {
    let (lo, hi) = min_max(v);
    D::feature_from_i64(hi.widen() as i64 - lo.widen() as i64)
}

/// Peak-to-peak amplitude, widened. Identical to [`range`] in value; kept
/// as its own kernel because the feature mask addresses it separately.
pub fn pk2pk<D: IntSample>(v: impl Samples<D>) -> D::Feature {
    range(v)
}

/// Mean absolute deviation around the mean.
pub fn mad<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Feature {
    let n = v.len() as i64;
    if n == 0 {
        return D::Feature::default();
    }
    let mu = sum_cached(v, ctx) / n;
    let mut acc = 0u64;
    for i in 0..v.len() {
        acc += (v.get(i).widen() as i64 - mu).unsigned_abs();
    }
    D::feature_from_i64((acc / n as u64) as i64)
}

/// Variance, in the domain's widened variance type.
pub fn var<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Var {
    D::var_narrow(var_cached(v, ctx))
}

/// Standard deviation: integer square root of the variance.
pub fn stddev<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Feature {
    D::feature_from_i64(isqrt_u64(var_cached(v, ctx)) as i64)
}

/// Root mean square: integer square root of `tss / n`.
pub fn rms<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Feature {
    let n = v.len() as u64;
    if n == 0 {
        return D::Feature::default();
    }
    let t = tss_cached(v, ctx);
    D::feature_from_i64(isqrt_u64(t / n) as i64)
}

/// Skewness, scaled by [`UNIT_SCALE`]. Accumulates central moments in
/// [`F24`] so the result correlates with the float kernel.
pub fn skew<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Feature {
    moments(v, ctx).skew
}

/// Excess kurtosis, scaled by [`UNIT_SCALE`]. Accumulates central moments
/// in [`F24`] so the result correlates with the float kernel.
pub fn kur<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Feature {
    moments(v, ctx).kur
}

/// Variance, skewness and excess kurtosis in one pass over the vector.
///
/// Variance is reported through the exact integer path; the third and
/// fourth moments go through [`F24`], scaled by [`UNIT_SCALE`].
pub fn moments<D: IntSample>(
    v: impl Samples<D>,
    mut ctx: Option<&mut StatCtx<D>>,
) -> Moments<D::Var, D::Feature> {
    let n = v.len() as i64;
    if n < 2 {
        return Moments {
            var: D::var_narrow(0),
            skew: D::Feature::default(),
            kur: D::Feature::default(),
        };
    }
    let mu = sum_cached(v, ctx.as_deref_mut()) / n;
    let var_wide = var_cached(v, ctx);

    let mut m2 = F24::ZERO;
    let mut m3 = F24::ZERO;
    let mut m4 = F24::ZERO;
    for i in 0..v.len() {
        let d = v.get(i).widen() as i64 - mu;
        let d2 = (d * d) as u64;
        let f2 = F24::from_u64(d2);
        m2 = m2.add(f2);
        let f3 = F24::from_i64(d * d * d);
        m3 = m3.add(f3);
        m4 = m4.add(f2.mul(f2));
    }
    if m2.is_zero() {
        return Moments {
            var: D::var_narrow(var_wide),
            skew: D::Feature::default(),
            kur: D::Feature::default(),
        };
    }
    let nf = F24::from_i64(n);
    let mm2 = m2.div(nf);
    let mm3 = m3.div(nf);
    let mm4 = m4.div(nf);
    let unit = F24::from_i64(UNIT_SCALE);

    let skew_f = mm3.div(mm2.mul(mm2.sqrt())).mul(unit);
    let kur_f = mm4.div(mm2.mul(mm2)).sub(F24::from_i32(3)).mul(unit);

    Moments {
        var: D::var_narrow(var_wide),
        skew: D::feature_from_i64(skew_f.to_i32(0) as i64),
        kur: D::feature_from_i64(kur_f.to_i32(0) as i64),
    }
}

fn crossings_about<D: IntSample>(v: impl Samples<D>, level: i64) -> i64 {
    let n = v.len();
    if n < 2 {
        return 0;
    }
    let mut count = 0i64;
    let mut prev_over = v.get(0).widen() as i64 > level;
    for i in 1..n {
        let over = v.get(i).widen() as i64 > level;
        if over != prev_over {
            count += 1;
        }
        prev_over = over;
    }
    count
}

fn rate<D: IntSample>(count: i64, transitions: i64) -> D::Feature {
    if transitions <= 0 {
        return D::Feature::default();
    }
    D::feature_from_i64(count * PERCENT_SCALE / transitions)
}

/// Zero-crossing rate as a fraction of `len - 1` transitions, scaled by
/// [`PERCENT_SCALE`]; bounded in `[0, PERCENT_SCALE]`.
pub fn zcr<D: IntSample>(v: impl Samples<D>) -> D::Feature {
    rate::<D>(crossings_about(v, 0), v.len() as i64 - 1)
}

/// Mean-crossing rate, scaled by [`PERCENT_SCALE`].
pub fn mcr<D: IntSample>(v: impl Samples<D>, mut ctx: Option<&mut StatCtx<D>>) -> D::Feature {
    let n = v.len() as i64;
    if n < 2 {
        return D::Feature::default();
    }
    let mu = sum_cached(v, ctx.as_deref_mut()) / n;
    rate::<D>(crossings_about(v, mu), n - 1)
}

/// Threshold-crossing rate, scaled by [`PERCENT_SCALE`].
pub fn tcr<D: IntSample>(v: impl Samples<D>, threshold: D) -> D::Feature {
    rate::<D>(crossings_about(v, threshold.widen() as i64), v.len() as i64 - 1)
}

/// Sigma-crossing rate around `mean + sigma_factor * stddev`, scaled by
/// [`PERCENT_SCALE`]. `sigma_factor` is a small signed multiplier
/// (±1..±3).
pub fn scr<D: IntSample>(
    v: impl Samples<D>,
    sigma_factor: i8,
    mut ctx: Option<&mut StatCtx<D>>,
) -> D::Feature {
    let n = v.len() as i64;
    if n < 2 {
        return D::Feature::default();
    }
    let mu = sum_cached(v, ctx.as_deref_mut()) / n;
    let sd = isqrt_u64(var_cached(v, ctx)) as i64;
    rate::<D>(crossings_about(v, mu + sigma_factor as i64 * sd), n - 1)
}

fn fraction_over<D: IntSample>(v: impl Samples<D>, level: i64) -> D::Feature {
    let n = v.len() as i64;
    if n == 0 {
        return D::Feature::default();
    }
    let mut count = 0i64;
    for i in 0..v.len() {
        if v.get(i).widen() as i64 > level {
            count += 1;
        }
    }
    D::feature_from_i64(count * PERCENT_SCALE / n)
}

/// Fraction of samples above zero, scaled by [`PERCENT_SCALE`].
pub fn psoz<D: IntSample>(v: impl Samples<D>) -> D::Feature {
    fraction_over(v, 0)
}

/// Fraction of samples above the mean, scaled by [`PERCENT_SCALE`].
pub fn psom<D: IntSample>(v: impl Samples<D>, ctx: Option<&mut StatCtx<D>>) -> D::Feature {
    let n = v.len() as i64;
    if n == 0 {
        return D::Feature::default();
    }
    let mu = sum_cached(v, ctx) / n;
    fraction_over(v, mu)
}

/// Fraction of samples above `mean + sigma_factor * stddev`, scaled by
/// [`PERCENT_SCALE`].
pub fn psos<D: IntSample>(
    v: impl Samples<D>,
    sigma_factor: i8,
    mut ctx: Option<&mut StatCtx<D>>,
) -> D::Feature {
    let n = v.len() as i64;
    if n == 0 {
        return D::Feature::default();
    }
    let mu = sum_cached(v, ctx.as_deref_mut()) / n;
    let sd = isqrt_u64(var_cached(v, ctx)) as i64;
    fraction_over(v, mu + sigma_factor as i64 * sd)
}

/// Fraction of samples above a fixed threshold, scaled by
/// [`PERCENT_SCALE`].
pub fn psot<D: IntSample>(v: impl Samples<D>, threshold: D) -> D::Feature {
    fraction_over(v, threshold.widen() as i64)
}

/// Crest factor (peak over RMS), scaled by [`UNIT_SCALE`].
///
/// `peak` may carry a precomputed absolute maximum; when absent the
/// kernel scans for it.
pub fn crest<D: IntSample>(
    v: impl Samples<D>,
    peak: Option<D>,
    ctx: Option<&mut StatCtx<D>>,
) -> D::Feature {
    let n = v.len() as u64;
    if n == 0 {
        return D::Feature::default();
    }
    let amax = peak.unwrap_or_else(|| absmax(v)).widen().abs() as i64;
    let t = tss_cached(v, ctx);
    let rms_f = F24::from_u64(t / n).sqrt();
    let out = F24::from_i64(amax * UNIT_SCALE).div(rms_f);
    D::feature_from_i64(out.to_i32(0) as i64)
}

/// Average magnitude difference over `lag` samples.
pub fn amdf<D: IntSample>(v: impl Samples<D>, lag: usize) -> D::Feature {
    let n = v.len();
    let lag = lag.max(1);
    if n <= lag {
        return D::Feature::default();
    }
    let mut acc = 0u64;
    for i in 0..n - lag {
        acc += (v.get(i + lag).widen() as i64 - v.get(i).widen() as i64).unsigned_abs();
    }
    D::feature_from_i64((acc / (n - lag) as u64) as i64)
}

/// Root mean difference square: RMS of the first difference.
pub fn rmds<D: IntSample>(v: impl Samples<D>) -> D::Feature {
    let n = v.len();
    if n < 2 {
        return D::Feature::default();
    }
    let mut acc = 0u64;
    for i in 0..n - 1 {
        let d = v.get(i + 1).widen() as i64 - v.get(i).widen() as i64;
        acc += (d * d) as u64;
    }
    D::feature_from_i64(isqrt_u64(acc / (n - 1) as u64) as i64)
}

/// Normalized autocorrelation at `lag`, scaled by [`PERCENT_SCALE`];
/// bounded in `[-PERCENT_SCALE, PERCENT_SCALE]`.
pub fn autocorr<D: IntSample>(
    v: impl Samples<D>,
    lag: usize,
    ctx: Option<&mut StatCtx<D>>,
) -> D::Feature {
    let n = v.len();
    let lag = lag.max(1);
    if n <= lag {
        return D::Feature::default();
    }
    let mu = sum_cached(v, ctx) / n as i64;
    let mut num = 0i64;
    let mut den = 0i64;
    for i in 0..n {
        let d = v.get(i).widen() as i64 - mu;
        den += d * d;
        if i + lag < n {
            let dl = v.get(i + lag).widen() as i64 - mu;
            num += d * dl;
        }
    }
    if den == 0 {
        return D::Feature::default();
    }
    D::feature_from_i64(num.saturating_mul(PERCENT_SCALE) / den)
}

fn diff_var<D: IntSample>(v: impl Samples<D>, order: usize) -> u64 {
    // variance of the first or second difference, without materializing it
    let n = v.len();
    if n <= order {
        return 0;
    }
    let m = (n - order) as i64;
    let mut s = 0i64;
    let mut t = 0u64;
    for i in 0..n - order {
        let d = if order == 1 {
            v.get(i + 1).widen() as i64 - v.get(i).widen() as i64
        } else {
            v.get(i + 2).widen() as i64 - 2 * v.get(i + 1).widen() as i64 + v.get(i).widen() as i64
        };
        s += d;
        t += (d * d) as u64;
    }
    ((t as i64 - s * s / m) / m).max(0) as u64
}

/// Hjorth mobility and complexity, both scaled by [`UNIT_SCALE`].
pub fn hjorth<D: IntSample>(
    v: impl Samples<D>,
    ctx: Option<&mut StatCtx<D>>,
) -> Hjorth<D::Feature> {
    let var_x = var_cached(v, ctx);
    let var_d1 = diff_var(v, 1);
    let var_d2 = diff_var(v, 2);
    let unit = F24::from_i64(UNIT_SCALE);

    let mob_x = F24::from_u64(var_d1).div(F24::from_u64(var_x)).sqrt();
    let mob_d = F24::from_u64(var_d2).div(F24::from_u64(var_d1)).sqrt();
    Hjorth {
        mobility: D::feature_from_i64(mob_x.mul(unit).to_i32(0) as i64),
        complexity: D::feature_from_i64(mob_d.div(mob_x).mul(unit).to_i32(0) as i64),
    }
}

/// Least-squares line over sample index: slope scaled by
/// [`UNIT_SCALE`], intercept in sample units.
pub fn linreg<D: IntSample>(
    v: impl Samples<D>,
    ctx: Option<&mut StatCtx<D>>,
) -> LinReg<D::Feature> {
    let n = v.len() as i128;
    if n < 2 {
        return LinReg {
            slope: D::Feature::default(),
            intercept: D::Feature::default(),
        };
    }
    let sum_x = sum_cached(v, ctx) as i128;
    let sum_i = n * (n - 1) / 2;
    let sum_ii = (n - 1) * n * (2 * n - 1) / 6;
    let mut sum_ix = 0i128;
    for i in 0..v.len() {
        sum_ix += i as i128 * v.get(i).widen() as i128;
    }
    let num = n * sum_ix - sum_i * sum_x;
    let den = n * sum_ii - sum_i * sum_i;
    let slope_scaled = num * UNIT_SCALE as i128 / den;
    let intercept = (sum_x - num * sum_i / den) / n;
    LinReg {
        slope: D::feature_from_i64(slope_scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64),
        intercept: D::feature_from_i64(intercept.clamp(i64::MIN as i128, i64::MAX as i128) as i64),
    }
}
