//! Axis-major sample windows for interleaved multi-axis streams.
//!
//! Incoming samples arrive interleaved by sample (`x0 y0 z0 x1 y1 z1 …`)
//! and are stored contiguous by axis (`x0 x1 … y0 y1 … z0 z1 …`), so the
//! statistic kernels can run over plain slices instead of strided views.
//!
//! Two flavors: [`DiscreteWindow`] fills, signals ready, then restarts
//! empty on the next feed; [`SlidingWindow`] shifts its content left by a
//! configured amount and keeps collecting. Feeding a sample count that is
//! not a whole number of axis groups is a contract violation and fails
//! fast.

use crate::error::{DspError, Result};

/// Test a 1-bit-per-axis usage mask, LSB-first.
#[inline]
pub fn usage_bit(mask: &[u8], axis: usize) -> bool {
    mask.get(axis / 8).map_or(false, |b| b >> (axis % 8) & 1 != 0)
}

/// Number of axes selected by a usage mask, over `axes` total.
pub fn used_axes(mask: &[u8], axes: usize) -> usize {
    (0..axes).filter(|&a| usage_bit(mask, a)).count()
}

/// Non-overlapping axis-major window.
#[derive(Debug, Clone)]
pub struct DiscreteWindow<T> {
    buf: Vec<T>,
    window_size: usize,
    axes: usize,
    collected_axes: usize,
    current: usize,
}

impl<T: Copy + Default> DiscreteWindow<T> {
    /// Window of `window_size` sample groups over `axes` interleaved axes.
    pub fn new(window_size: usize, axes: usize) -> Result<Self> {
        Self::with_collected(window_size, axes, axes)
    }

    /// Window that stores only `collected_axes` of the incoming `axes`
    /// (masked feeding).
    pub fn with_collected(window_size: usize, axes: usize, collected_axes: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(DspError::InvalidLength {
                len: window_size,
                what: "window size",
            });
        }
        if axes == 0 || collected_axes == 0 || collected_axes > axes {
            return Err(DspError::InvalidLength {
                len: collected_axes,
                what: "window axes",
            });
        }
        Ok(Self {
            buf: vec![T::default(); window_size * collected_axes],
            window_size,
            axes,
            collected_axes,
            current: 0,
        })
    }

    /// Window capacity in sample groups.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of axes stored per sample group.
    pub fn collected_axes(&self) -> usize {
        self.collected_axes
    }

    /// Whether a full window is available for processing.
    pub fn is_ready(&self) -> bool {
        self.current == self.window_size
    }

    /// All stored samples, axis-major.
    pub fn samples(&self) -> &[T] {
        &self.buf
    }

    /// Mutable view of the stored samples, axis-major. Mutating the
    /// window invalidates any statistics context derived from it.
    pub fn samples_mut(&mut self) -> &mut [T] {
        &mut self.buf
    }

    /// One axis column (by collected-axis index).
    pub fn axis(&self, idx: usize) -> &[T] {
        &self.buf[idx * self.window_size..(idx + 1) * self.window_size]
    }

    /// Discard all collected samples.
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Append interleaved samples; all axes collected.
    ///
    /// Returns the number of sample groups still needed before the
    /// window is ready (0 = ready). A ready window restarts empty on the
    /// next call.
    pub fn feed(&mut self, input: &[T]) -> Result<usize> {
        self.feed_impl(input, None)
    }

    /// Append interleaved samples, storing only the axes whose bit is
    /// set in `usage_mask` (LSB-first, one bit per incoming axis).
    pub fn feed_masked(&mut self, input: &[T], usage_mask: &[u8]) -> Result<usize> {
        self.feed_impl(input, Some(usage_mask))
    }

    fn feed_impl(&mut self, input: &[T], usage_mask: Option<&[u8]>) -> Result<usize> {
        if input.len() % self.axes != 0 {
            return Err(DspError::AxisMisaligned {
                count: input.len(),
                axes: self.axes,
            });
        }
        if self.is_ready() {
            self.current = 0;
        }
        for group in input.chunks_exact(self.axes) {
            if self.is_ready() {
                // overflow within one call rolls into a fresh window
                self.current = 0;
            }
            self.store_group(group, usage_mask);
        }
        Ok(self.window_size - self.current)
    }

    fn store_group(&mut self, group: &[T], usage_mask: Option<&[u8]>) {
        let mut stored = 0;
        for (a, &v) in group.iter().enumerate() {
            let keep = usage_mask.map_or(true, |m| usage_bit(m, a));
            if keep && stored < self.collected_axes {
                self.buf[stored * self.window_size + self.current] = v;
                stored += 1;
            }
        }
        self.current += 1;
    }
}

/// Overlapping axis-major window: once full, each refill round first
/// evicts the oldest `window_shift` sample groups per axis.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    inner: DiscreteWindow<T>,
    window_shift: usize,
    shift_pending: bool,
}

impl<T: Copy + Default> SlidingWindow<T> {
    /// Sliding window of `window_size` groups shifted by `window_shift`
    /// once full. `window_shift` must be in `1..=window_size`.
    pub fn new(window_size: usize, axes: usize, window_shift: usize) -> Result<Self> {
        Self::with_collected(window_size, axes, axes, window_shift)
    }

    /// Masked-feeding variant of [`SlidingWindow::new`].
    pub fn with_collected(
        window_size: usize,
        axes: usize,
        collected_axes: usize,
        window_shift: usize,
    ) -> Result<Self> {
        if window_shift == 0 || window_shift > window_size {
            return Err(DspError::ShiftExceedsWindow {
                shift: window_shift,
                size: window_size,
            });
        }
        Ok(Self {
            inner: DiscreteWindow::with_collected(window_size, axes, collected_axes)?,
            window_shift,
            shift_pending: false,
        })
    }

    /// Window capacity in sample groups.
    pub fn window_size(&self) -> usize {
        self.inner.window_size()
    }

    /// Shift applied per refill round.
    pub fn window_shift(&self) -> usize {
        self.window_shift
    }

    /// Number of axes stored per sample group.
    pub fn collected_axes(&self) -> usize {
        self.inner.collected_axes()
    }

    /// Whether a full window is available for processing.
    pub fn is_ready(&self) -> bool {
        self.inner.is_ready()
    }

    /// All stored samples, axis-major.
    pub fn samples(&self) -> &[T] {
        self.inner.samples()
    }

    /// Mutable view of the stored samples, axis-major.
    pub fn samples_mut(&mut self) -> &mut [T] {
        self.inner.samples_mut()
    }

    /// One axis column (by collected-axis index).
    pub fn axis(&self, idx: usize) -> &[T] {
        self.inner.axis(idx)
    }

    /// Discard all collected samples and any pending shift.
    pub fn reset(&mut self) {
        self.inner.reset();
        self.shift_pending = false;
    }

    /// Append interleaved samples; all axes collected.
    pub fn feed(&mut self, input: &[T]) -> Result<usize> {
        self.feed_impl(input, None)
    }

    /// Masked-feeding variant of [`SlidingWindow::feed`].
    pub fn feed_masked(&mut self, input: &[T], usage_mask: &[u8]) -> Result<usize> {
        self.feed_impl(input, Some(usage_mask))
    }

    fn feed_impl(&mut self, input: &[T], usage_mask: Option<&[u8]>) -> Result<usize> {
        if input.len() % self.inner.axes != 0 {
            return Err(DspError::AxisMisaligned {
                count: input.len(),
                axes: self.inner.axes,
            });
        }
        for group in input.chunks_exact(self.inner.axes) {
            if self.shift_pending {
                self.shift_left();
                self.shift_pending = false;
            }
            self.inner.store_group(group, usage_mask);
            if self.inner.is_ready() {
                self.shift_pending = true;
            }
        }
        Ok(self.inner.window_size - self.inner.current)
    }

    fn shift_left(&mut self) {
        let size = self.inner.window_size;
        let shift = self.window_shift;
        for axis in 0..self.inner.collected_axes {
            let col = &mut self.inner.buf[axis * size..(axis + 1) * size];
            col.copy_within(shift.., 0);
        }
        self.inner.current = size - shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_fill_reorders_axis_major() {
        let mut w = DiscreteWindow::<i16>::new(3, 2).unwrap();
        assert_eq!(w.feed(&[1, 10, 2, 20]).unwrap(), 1);
        assert!(!w.is_ready());
        assert_eq!(w.feed(&[3, 30]).unwrap(), 0);
        assert!(w.is_ready());
        assert_eq!(w.axis(0), &[1, 2, 3]);
        assert_eq!(w.axis(1), &[10, 20, 30]);
    }

    #[test]
    fn test_discrete_ready_exactly_once_then_restarts() {
        let mut w = DiscreteWindow::<f32>::new(2, 1).unwrap();
        assert_eq!(w.feed(&[1.0]).unwrap(), 1);
        assert_eq!(w.feed(&[2.0]).unwrap(), 0);
        assert!(w.is_ready());
        // next feed starts an entirely new window
        assert_eq!(w.feed(&[5.0]).unwrap(), 1);
        assert!(!w.is_ready());
        assert_eq!(w.feed(&[6.0]).unwrap(), 0);
        assert_eq!(w.axis(0), &[5.0, 6.0]);
    }

    #[test]
    fn test_misaligned_feed_fails_fast() {
        let mut w = DiscreteWindow::<i8>::new(4, 3).unwrap();
        let err = w.feed(&[1, 2]).unwrap_err();
        assert_eq!(err, DspError::AxisMisaligned { count: 2, axes: 3 });
        // nothing was stored
        assert_eq!(w.feed(&[1, 2, 3]).unwrap(), 3);
    }

    #[test]
    fn test_sliding_evicts_oldest_fifo() {
        let mut w = SlidingWindow::<i16>::new(4, 1, 2).unwrap();
        assert_eq!(w.feed(&[1, 2, 3, 4]).unwrap(), 0);
        assert!(w.is_ready());
        assert_eq!(w.axis(0), &[1, 2, 3, 4]);
        // next feed shifts [1, 2] out first
        assert_eq!(w.feed(&[5]).unwrap(), 1);
        assert_eq!(&w.axis(0)[..3], &[3, 4, 5]);
        assert_eq!(w.feed(&[6]).unwrap(), 0);
        assert_eq!(w.axis(0), &[3, 4, 5, 6]);
    }

    #[test]
    fn test_sliding_multi_axis_shift() {
        let mut w = SlidingWindow::<i16>::new(3, 2, 1).unwrap();
        w.feed(&[1, 10, 2, 20, 3, 30]).unwrap();
        assert!(w.is_ready());
        w.feed(&[4, 40]).unwrap();
        assert_eq!(w.axis(0), &[2, 3, 4]);
        assert_eq!(w.axis(1), &[20, 30, 40]);
    }

    #[test]
    fn test_shift_bounds_enforced() {
        assert!(SlidingWindow::<f32>::new(4, 1, 5).is_err());
        assert!(SlidingWindow::<f32>::new(4, 1, 0).is_err());
        assert!(SlidingWindow::<f32>::new(4, 1, 4).is_ok());
    }

    #[test]
    fn test_masked_feed_skips_unused_axes() {
        // 3 incoming axes, mask keeps axes 0 and 2
        let mask = [0b0000_0101u8];
        let mut w = DiscreteWindow::<i16>::with_collected(2, 3, 2).unwrap();
        assert_eq!(w.feed_masked(&[1, 99, 10, 2, 98, 20], &mask).unwrap(), 0);
        assert!(w.is_ready());
        assert_eq!(w.axis(0), &[1, 2]);
        assert_eq!(w.axis(1), &[10, 20]);
    }

    #[test]
    fn test_usage_bits() {
        let mask = [0b1000_0001u8, 0b0000_0010];
        assert!(usage_bit(&mask, 0));
        assert!(usage_bit(&mask, 7));
        assert!(usage_bit(&mask, 9));
        assert!(!usage_bit(&mask, 3));
        assert_eq!(used_axes(&mask, 16), 3);
    }
}
