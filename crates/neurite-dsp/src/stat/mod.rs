//! Memoized statistic kernels over sample vectors.
//!
//! Dozens of derived features share the same handful of partial sums. A
//! [`StatCtx`] rides along one vector for one extraction cycle: the first
//! kernel that needs a sum computes and caches it, every later kernel in
//! the cycle reuses it. The context never watches the vector — a caller
//! that mutates the data is responsible for resetting the context first.
//!
//! Integer kernels live in [`fixed`] (generic over the i8/i16 domains),
//! float kernels in [`float`]. Return-value scaling of the integer
//! kernels follows the domain contract: unit-range results carry
//! [`crate::num::UNIT_SCALE`], fraction-valued results carry
//! [`crate::num::PERCENT_SCALE`].

pub mod fixed;
pub mod float;

use crate::num::SampleStats;

/// Per-vector cache of partial statistics.
///
/// Each field is `Some` only after a kernel has computed it from the
/// current vector contents. [`StatCtx::reset`] clears all of them.
#[derive(Debug, Clone)]
pub struct StatCtx<D: SampleStats> {
    /// Running sum of the vector elements.
    pub sum: Option<D::Sum>,
    /// Total sum of squares of the vector elements.
    pub tss: Option<D::Tss>,
    /// Variance of the vector elements.
    pub var: Option<D::Var>,
    /// Sum of absolute values of the vector elements.
    pub abssum: Option<D::Abs>,
}

impl<D: SampleStats> Default for StatCtx<D> {
    fn default() -> Self {
        Self {
            sum: None,
            tss: None,
            var: None,
            abssum: None,
        }
    }
}

impl<D: SampleStats> StatCtx<D> {
    /// Forget every cached value.
    ///
    /// Must be called by whoever mutates the vector the context was fed
    /// from; the context has no way to notice the change itself.
    pub fn reset(&mut self) {
        self.sum = None;
        self.tss = None;
        self.var = None;
        self.abssum = None;
    }
}

/// Higher statistical moments of one vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments<V, F> {
    /// Variance.
    pub var: V,
    /// Skewness.
    pub skew: F,
    /// Excess kurtosis.
    pub kur: F,
}

/// Hjorth parameters of one vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hjorth<F> {
    /// Mobility: `sqrt(var(dx) / var(x))`.
    pub mobility: F,
    /// Complexity: `mobility(dx) / mobility(x)`.
    pub complexity: F,
}

/// Least-squares line fitted over sample index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinReg<F> {
    /// Slope per sample step.
    pub slope: F,
    /// Value of the fitted line at index 0.
    pub intercept: F,
}
