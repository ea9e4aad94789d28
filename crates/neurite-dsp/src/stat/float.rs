//! Floating-point statistic kernels.
//!
//! Same family as [`crate::stat::fixed`], returning real-valued results
//! with no scale factors. The variance path accumulates its sum of
//! squares in f32, so inputs with magnitudes below roughly 1e-4 lose
//! precision; this trade is part of the kernel contract and downstream
//! scaling tables are calibrated against it.

use crate::num::Samples;
use crate::stat::{Hjorth, LinReg, Moments, StatCtx};

type Ctx = StatCtx<f32>;

fn raw_sum(v: impl Samples<f32>) -> f32 {
    let mut acc = 0.0f32;
    for i in 0..v.len() {
        acc += v.get(i);
    }
    acc
}

fn raw_tss(v: impl Samples<f32>) -> f32 {
    let mut acc = 0.0f32;
    for i in 0..v.len() {
        let x = v.get(i);
        acc += x * x;
    }
    acc
}

fn sum_cached(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    match ctx {
        Some(c) => {
            if let Some(s) = c.sum {
                s
            } else {
                let s = raw_sum(v);
                c.sum = Some(s);
                s
            }
        }
        None => raw_sum(v),
    }
}

fn tss_cached(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    match ctx {
        Some(c) => {
            if let Some(t) = c.tss {
                t
            } else {
                let t = raw_tss(v);
                c.tss = Some(t);
                t
            }
        }
        None => raw_tss(v),
    }
}

fn var_cached(v: impl Samples<f32>, mut ctx: Option<&mut Ctx>) -> f32 {
    if let Some(c) = ctx.as_deref_mut() {
        if let Some(var) = c.var {
            return var;
        }
    }
    let n = v.len() as f32;
    if n == 0.0 {
        return 0.0;
    }
    let s = sum_cached(v, ctx.as_deref_mut());
    let t = tss_cached(v, ctx.as_deref_mut());
    let var = ((t - s * s / n) / n).max(0.0);
    if let Some(c) = ctx {
        c.var = Some(var);
    }
    var
}

/// Sum of the vector elements.
pub fn sum(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    sum_cached(v, ctx)
}

/// Sum of absolute values of the vector elements.
pub fn abssum(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    match ctx {
        Some(c) => {
            if let Some(a) = c.abssum {
                a
            } else {
                let mut acc = 0.0f32;
                for i in 0..v.len() {
                    acc += v.get(i).abs();
                }
                c.abssum = Some(acc);
                acc
            }
        }
        None => {
            let mut acc = 0.0f32;
            for i in 0..v.len() {
                acc += v.get(i).abs();
            }
            acc
        }
    }
}

/// Total sum of squares of the vector elements.
pub fn tss(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    tss_cached(v, ctx)
}

/// Utility pre-pass: computes sum and total sum of squares in one sweep
/// and stores both in the context.
pub fn tss_sum(v: impl Samples<f32>, ctx: &mut Ctx) {
    let mut s = 0.0f32;
    let mut t = 0.0f32;
    for i in 0..v.len() {
        let x = v.get(i);
        s += x;
        t += x * x;
    }
    ctx.sum = Some(s);
    ctx.tss = Some(t);
}

/// Arithmetic mean.
pub fn mean(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len() as f32;
    if n == 0.0 {
        return 0.0;
    }
    sum_cached(v, ctx) / n
}

/// Mean of absolute values.
pub fn absmean(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len() as f32;
    if n == 0.0 {
        return 0.0;
    }
    abssum(v, ctx) / n
}

/// Smallest element.
pub fn min(v: impl Samples<f32>) -> f32 {
    let mut m = f32::MAX;
    for i in 0..v.len() {
        m = m.min(v.get(i));
    }
    m
}

/// Largest element.
pub fn max(v: impl Samples<f32>) -> f32 {
    let mut m = f32::MIN;
    for i in 0..v.len() {
        m = m.max(v.get(i));
    }
    m
}

/// Smallest and largest element in one sweep.
pub fn min_max(v: impl Samples<f32>) -> (f32, f32) {
    let mut lo = f32::MAX;
    let mut hi = f32::MIN;
    for i in 0..v.len() {
        let x = v.get(i);
        lo = lo.min(x);
        hi = hi.max(x);
    }
    (lo, hi)
}

/// Largest absolute value.
pub fn absmax(v: impl Samples<f32>) -> f32 {
    let mut m = 0.0f32;
    for i in 0..v.len() {
        m = m.max(v.get(i).abs());
    }
    m
}

/// Smallest absolute value.
pub fn absmin(v: impl Samples<f32>) -> f32 {
    let mut m = f32::MAX;
    for i in 0..v.len() {
        m = m.min(v.get(i).abs());
    }
    if m == f32::MAX {
        0.0
    } else {
        m
    }
}

/// Spread between largest and smallest element.
pub fn range(v: impl Samples<f32>) -> f32 {
    let (lo, hi) = min_max(v);
    hi - lo
}

/// Peak-to-peak amplitude; same value as [`range`], addressed separately
/// by the feature mask.
pub fn pk2pk(v: impl Samples<f32>) -> f32 {
    range(v)
}

/// Mean absolute deviation around the mean.
pub fn mad(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len() as f32;
    if n == 0.0 {
        return 0.0;
    }
    let mu = sum_cached(v, ctx) / n;
    let mut acc = 0.0f32;
    for i in 0..v.len() {
        acc += (v.get(i) - mu).abs();
    }
    acc / n
}

/// Variance.
///
/// Accumulates the sum of squares in f32; loses precision for values
/// below roughly 1e-4 magnitude. Deliberate speed/precision trade.
pub fn var(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    var_cached(v, ctx)
}

/// Standard deviation.
pub fn stddev(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    var_cached(v, ctx).sqrt()
}

/// Root mean square.
pub fn rms(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len() as f32;
    if n == 0.0 {
        return 0.0;
    }
    (tss_cached(v, ctx) / n).sqrt()
}

/// Skewness.
pub fn skew(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    moments(v, ctx).skew
}

/// Excess kurtosis.
pub fn kur(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    moments(v, ctx).kur
}

/// Variance, skewness and excess kurtosis in one pass.
pub fn moments(v: impl Samples<f32>, mut ctx: Option<&mut Ctx>) -> Moments<f32, f32> {
    let n = v.len() as f32;
    if v.len() < 2 {
        return Moments {
            var: 0.0,
            skew: 0.0,
            kur: 0.0,
        };
    }
    let mu = sum_cached(v, ctx.as_deref_mut()) / n;
    let var = var_cached(v, ctx);
    let mut m2 = 0.0f32;
    let mut m3 = 0.0f32;
    let mut m4 = 0.0f32;
    for i in 0..v.len() {
        let d = v.get(i) - mu;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    m2 /= n;
    m3 /= n;
    m4 /= n;
    if m2 <= f32::EPSILON {
        return Moments {
            var,
            skew: 0.0,
            kur: 0.0,
        };
    }
    Moments {
        var,
        skew: m3 / (m2 * m2.sqrt()),
        kur: m4 / (m2 * m2) - 3.0,
    }
}

fn crossings_about(v: impl Samples<f32>, level: f32) -> usize {
    let n = v.len();
    if n < 2 {
        return 0;
    }
    let mut count = 0;
    let mut prev_over = v.get(0) > level;
    for i in 1..n {
        let over = v.get(i) > level;
        if over != prev_over {
            count += 1;
        }
        prev_over = over;
    }
    count
}

fn rate(count: usize, transitions: usize) -> f32 {
    if transitions == 0 {
        return 0.0;
    }
    count as f32 / transitions as f32
}

/// Zero-crossing rate as a fraction of `len - 1` transitions; in `[0, 1]`.
pub fn zcr(v: impl Samples<f32>) -> f32 {
    rate(crossings_about(v, 0.0), v.len().saturating_sub(1))
}

/// Mean-crossing rate; in `[0, 1]`.
pub fn mcr(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len();
    if n < 2 {
        return 0.0;
    }
    let mu = sum_cached(v, ctx) / n as f32;
    rate(crossings_about(v, mu), n - 1)
}

/// Threshold-crossing rate; in `[0, 1]`.
pub fn tcr(v: impl Samples<f32>, threshold: f32) -> f32 {
    rate(crossings_about(v, threshold), v.len().saturating_sub(1))
}

/// Sigma-crossing rate around `mean + sigma_factor * stddev`; in `[0, 1]`.
pub fn scr(v: impl Samples<f32>, sigma_factor: i8, mut ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len();
    if n < 2 {
        return 0.0;
    }
    let mu = sum_cached(v, ctx.as_deref_mut()) / n as f32;
    let sd = var_cached(v, ctx).sqrt();
    rate(crossings_about(v, mu + sigma_factor as f32 * sd), n - 1)
}

fn fraction_over(v: impl Samples<f32>, level: f32) -> f32 {
    let n = v.len();
    if n == 0 {
        return 0.0;
    }
    let mut count = 0;
    for i in 0..n {
        if v.get(i) > level {
            count += 1;
        }
    }
    count as f32 / n as f32
}

/// Fraction of samples above zero; in `[0, 1]`.
pub fn psoz(v: impl Samples<f32>) -> f32 {
    fraction_over(v, 0.0)
}

/// Fraction of samples above the mean; in `[0, 1]`.
pub fn psom(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len();
    if n == 0 {
        return 0.0;
    }
    let mu = sum_cached(v, ctx) / n as f32;
    fraction_over(v, mu)
}

/// Fraction of samples above `mean + sigma_factor * stddev`; in `[0, 1]`.
pub fn psos(v: impl Samples<f32>, sigma_factor: i8, mut ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len();
    if n == 0 {
        return 0.0;
    }
    let mu = sum_cached(v, ctx.as_deref_mut()) / n as f32;
    let sd = var_cached(v, ctx).sqrt();
    fraction_over(v, mu + sigma_factor as f32 * sd)
}

/// Fraction of samples above a fixed threshold; in `[0, 1]`.
pub fn psot(v: impl Samples<f32>, threshold: f32) -> f32 {
    fraction_over(v, threshold)
}

/// Crest factor: peak over RMS. `peak` may carry a precomputed absolute
/// maximum; when absent the kernel scans for it.
pub fn crest(v: impl Samples<f32>, peak: Option<f32>, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len() as f32;
    if n == 0.0 {
        return 0.0;
    }
    let amax = peak.unwrap_or_else(|| absmax(v));
    let r = (tss_cached(v, ctx) / n).sqrt();
    if r == 0.0 {
        return 0.0;
    }
    amax / r
}

/// Average magnitude difference over `lag` samples.
pub fn amdf(v: impl Samples<f32>, lag: usize) -> f32 {
    let n = v.len();
    let lag = lag.max(1);
    if n <= lag {
        return 0.0;
    }
    let mut acc = 0.0f32;
    for i in 0..n - lag {
        acc += (v.get(i + lag) - v.get(i)).abs();
    }
    acc / (n - lag) as f32
}

/// Root mean difference square: RMS of the first difference.
pub fn rmds(v: impl Samples<f32>) -> f32 {
    let n = v.len();
    if n < 2 {
        return 0.0;
    }
    let mut acc = 0.0f32;
    for i in 0..n - 1 {
        let d = v.get(i + 1) - v.get(i);
        acc += d * d;
    }
    (acc / (n - 1) as f32).sqrt()
}

/// Normalized autocorrelation at `lag`; in `[-1, 1]`.
pub fn autocorr(v: impl Samples<f32>, lag: usize, ctx: Option<&mut Ctx>) -> f32 {
    let n = v.len();
    let lag = lag.max(1);
    if n <= lag {
        return 0.0;
    }
    let mu = sum_cached(v, ctx) / n as f32;
    let mut num = 0.0f32;
    let mut den = 0.0f32;
    for i in 0..n {
        let d = v.get(i) - mu;
        den += d * d;
        if i + lag < n {
            num += d * (v.get(i + lag) - mu);
        }
    }
    if den == 0.0 {
        return 0.0;
    }
    num / den
}

fn diff_var(v: impl Samples<f32>, order: usize) -> f32 {
    let n = v.len();
    if n <= order {
        return 0.0;
    }
    let m = (n - order) as f32;
    let mut s = 0.0f32;
    let mut t = 0.0f32;
    for i in 0..n - order {
        let d = if order == 1 {
            v.get(i + 1) - v.get(i)
        } else {
            v.get(i + 2) - 2.0 * v.get(i + 1) + v.get(i)
        };
        s += d;
        t += d * d;
    }
    ((t - s * s / m) / m).max(0.0)
}

/// Hjorth mobility and complexity.
pub fn hjorth(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> Hjorth<f32> {
    let var_x = var_cached(v, ctx);
    let var_d1 = diff_var(v, 1);
    let var_d2 = diff_var(v, 2);
    if var_x == 0.0 || var_d1 == 0.0 {
        return Hjorth {
            mobility: 0.0,
            complexity: 0.0,
        };
    }
    let mob_x = (var_d1 / var_x).sqrt();
    let mob_d = (var_d2 / var_d1).sqrt();
    Hjorth {
        mobility: mob_x,
        complexity: mob_d / mob_x,
    }
}

/// Least-squares line over sample index.
pub fn linreg(v: impl Samples<f32>, ctx: Option<&mut Ctx>) -> LinReg<f32> {
    let n = v.len();
    if n < 2 {
        return LinReg {
            slope: 0.0,
            intercept: 0.0,
        };
    }
    let nf = n as f32;
    let sum_x = sum_cached(v, ctx);
    let sum_i = nf * (nf - 1.0) / 2.0;
    let sum_ii = (nf - 1.0) * nf * (2.0 * nf - 1.0) / 6.0;
    let mut sum_ix = 0.0f32;
    for i in 0..n {
        sum_ix += i as f32 * v.get(i);
    }
    let den = nf * sum_ii - sum_i * sum_i;
    let slope = (nf * sum_ix - sum_i * sum_x) / den;
    LinReg {
        slope,
        intercept: (sum_x - slope * sum_i) / nf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} !~ {b}");
    }

    const V: [f32; 6] = [1.0, -2.0, 3.0, -4.0, 5.0, -6.0];

    #[test]
    fn test_basic_sums() {
        close(sum(&V[..], None), -3.0);
        close(abssum(&V[..], None), 21.0);
        close(mean(&V[..], None), -0.5);
        close(absmean(&V[..], None), 3.5);
        close(tss(&V[..], None), 91.0);
    }

    #[test]
    fn test_minmax_range() {
        assert_eq!(min_max(&V[..]), (-6.0, 5.0));
        close(range(&V[..]), 11.0);
        close(absmax(&V[..]), 6.0);
        close(absmin(&V[..]), 1.0);
    }

    #[test]
    fn test_var_with_and_without_ctx() {
        let mut ctx = StatCtx::<f32>::default();
        ctx.sum = Some(raw_sum(&V[..]));
        let a = var(&V[..], Some(&mut ctx));
        let b = var(&V[..], None);
        close(a, b);
        // second call is served from the cache
        close(var(&V[..], Some(&mut ctx)), b);
    }

    #[test]
    fn test_var_definition() {
        // E[x^2] - E[x]^2
        let n = V.len() as f32;
        let mu = V.iter().sum::<f32>() / n;
        let expected = V.iter().map(|x| (x - mu) * (x - mu)).sum::<f32>() / n;
        close(var(&V[..], None), expected);
    }

    #[test]
    fn test_tss_sum_prepopulates() {
        let mut ctx = StatCtx::<f32>::default();
        tss_sum(&V[..], &mut ctx);
        close(ctx.sum.unwrap(), -3.0);
        close(ctx.tss.unwrap(), 91.0);
        close(var(&V[..], Some(&mut ctx)), var(&V[..], None));
    }

    #[test]
    fn test_rates_bounded() {
        let r = zcr(&V[..]);
        assert!((0.0..=1.0).contains(&r));
        close(r, 1.0);
        let flat = [2.0f32; 5];
        close(zcr(&flat[..]), 0.0);
        assert!((0.0..=1.0).contains(&mcr(&V[..], None)));
        assert!((0.0..=1.0).contains(&scr(&V[..], 1, None)));
        assert!((0.0..=1.0).contains(&scr(&V[..], -1, None)));
    }

    #[test]
    fn test_percent_over() {
        close(psoz(&V[..]), 0.5);
        close(psot(&V[..], 4.5), 1.0 / 6.0);
        assert!((0.0..=1.0).contains(&psom(&V[..], None)));
        assert!((0.0..=1.0).contains(&psos(&V[..], 2, None)));
    }

    #[test]
    fn test_moments_of_symmetric_signal() {
        let sym: [f32; 7] = [-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0];
        let m = moments(&sym[..], None);
        close(m.skew, 0.0);
        assert!(m.kur < 0.0); // flatter than normal
    }

    #[test]
    fn test_crest_of_sine_like() {
        let v: Vec<f32> = (0..64)
            .map(|i| (2.0 * std::f32::consts::PI * i as f32 / 64.0).sin())
            .collect();
        let c = crest(&v[..], None, None);
        // sine crest factor is sqrt(2)
        assert!((c - std::f32::consts::SQRT_2).abs() < 0.05, "crest = {c}");
    }

    #[test]
    fn test_amdf_rmds_autocorr() {
        let ramp: Vec<f32> = (0..10).map(|i| i as f32).collect();
        close(amdf(&ramp[..], 1), 1.0);
        close(rmds(&ramp[..]), 1.0);
        let alt: Vec<f32> = (0..16).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert!(autocorr(&alt[..], 2, None) > 0.7);
        assert!(autocorr(&alt[..], 1, None) < 0.0);
    }

    #[test]
    fn test_hjorth_and_linreg() {
        let line: Vec<f32> = (0..20).map(|i| 1.5 + 0.25 * i as f32).collect();
        let lr = linreg(&line[..], None);
        close(lr.slope, 0.25);
        close(lr.intercept, 1.5);
        let h = hjorth(&line[..], None);
        // pure line has zero second difference
        close(h.complexity, 0.0);
    }

    #[test]
    fn test_mad() {
        let v: [f32; 4] = [1.0, 3.0, 5.0, 7.0];
        close(mad(&v[..], None), 2.0);
    }
}
