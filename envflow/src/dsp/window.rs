//! Sliding-window statistics over a zero-padded channel.
//!
//! Output index `j` covers input indices `j - lookback ..= j + lookahead`;
//! positions outside the channel read as 0, so the output has the input's
//! length. Window extents past the channel length only add padding, so both
//! statistics clamp them to the channel and run in O(n) time and memory.

use std::collections::VecDeque;

use ndarray::{ArrayView1, ArrayViewMut1};

/// Window extent in samples on each side of the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub lookback: usize,
    pub lookahead: usize,
}

impl Window {
    pub fn new(lookback: usize, lookahead: usize) -> Self {
        Self { lookback, lookahead }
    }

    /// Samples covered by one window, the current one included.
    #[inline]
    pub fn span(&self) -> usize {
        self.lookback.saturating_add(self.lookahead).saturating_add(1)
    }

    /// Exact window length, the divisor of the mean square.
    #[inline]
    fn span_f64(&self) -> f64 {
        self.lookback as f64 + self.lookahead as f64 + 1.0
    }

    #[inline]
    pub fn is_single_sample(&self) -> bool {
        self.lookback == 0 && self.lookahead == 0
    }

    /// Same coverage of a channel of length `n`: every extent of at least
    /// `n` already reaches the padding at that end.
    #[inline]
    fn clamped(&self, n: usize) -> Self {
        Self::new(self.lookback.min(n), self.lookahead.min(n))
    }
}

/// Value of the virtually padded channel at padded position `k`.
#[inline]
fn padded(x: &ArrayView1<f32>, lookback: usize, k: usize) -> f32 {
    k.checked_sub(lookback)
        .and_then(|i| x.get(i).copied())
        .unwrap_or(0.0)
}

/// Running maximum using a monotonic deque of padded positions.
pub fn sliding_max(x: ArrayView1<f32>, mut out: ArrayViewMut1<f32>, window: Window) {
    let n = x.len();
    let window = window.clamped(n);
    let span = window.span();
    let mut candidates: VecDeque<(usize, f32)> = VecDeque::with_capacity(span);
    // Padded position `k` enters the window whose last element it is.
    for k in 0..n + span - 1 {
        let v = padded(&x, window.lookback, k);
        while matches!(candidates.back(), Some(&(_, back)) if back <= v) {
            candidates.pop_back();
        }
        candidates.push_back((k, v));
        if k + 1 < span {
            continue;
        }
        let j = k + 1 - span;
        while matches!(candidates.front(), Some(&(pos, _)) if pos < j) {
            candidates.pop_front();
        }
        if let Some(&(_, max)) = candidates.front() {
            out[j] = max;
        }
    }
}

/// Running mean of squares using prefix sums accumulated in `f64`. The
/// divisor is always the full window length, padding included.
pub fn sliding_mean_square(x: ArrayView1<f32>, mut out: ArrayViewMut1<f32>, window: Window) {
    let n = x.len();
    let divisor = window.span_f64();
    let reach = window.clamped(n);
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0f64;
    for &v in x.iter() {
        acc += f64::from(v) * f64::from(v);
        prefix.push(acc);
    }
    for (j, slot) in out.iter_mut().enumerate() {
        let lo = j.saturating_sub(reach.lookback);
        let hi = (j + reach.lookahead + 1).min(n);
        let sum = prefix[hi] - prefix[lo];
        // Cancellation in the prefix difference can dip just below zero.
        *slot = (sum / divisor).max(0.0) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, ArrayView1};

    fn brute_max(x: &[f32], w: Window) -> Vec<f32> {
        (0..x.len())
            .map(|j| {
                (0..w.span())
                    .map(|o| {
                        let k = j + o;
                        if k < w.lookback || k - w.lookback >= x.len() {
                            0.0
                        } else {
                            x[k - w.lookback]
                        }
                    })
                    .fold(f32::NEG_INFINITY, f32::max)
            })
            .collect()
    }

    fn run_max(x: &[f32], w: Window) -> Vec<f32> {
        let mut out = Array1::zeros(x.len());
        sliding_max(ArrayView1::from(x), out.view_mut(), w);
        out.to_vec()
    }

    fn run_ms(x: &[f32], w: Window) -> Vec<f32> {
        let mut out = Array1::zeros(x.len());
        sliding_mean_square(ArrayView1::from(x), out.view_mut(), w);
        out.to_vec()
    }

    #[test]
    fn test_max_matches_brute_force() {
        let x: Vec<f32> = (0..257).map(|_| rand::random::<f32>() * 2.0 - 1.0).collect();
        for w in [
            Window::new(0, 0),
            Window::new(3, 0),
            Window::new(0, 5),
            Window::new(7, 2),
            Window::new(300, 300),
        ] {
            assert_eq!(run_max(&x, w), brute_max(&x, w), "window {:?}", w);
        }
    }

    #[test]
    fn test_max_sees_zero_padding() {
        let x = [-1.0f32, -2.0, -3.0];
        assert_eq!(run_max(&x, Window::new(1, 0)), vec![0.0, -1.0, -2.0]);
        assert_eq!(run_max(&x, Window::new(0, 0)), vec![-1.0, -2.0, -3.0]);
    }

    #[test]
    fn test_mean_square_center_window() {
        let x = [0.0f32, 0.0, 3.0, 0.0, 0.0];
        let ms = run_ms(&x, Window::new(1, 1));
        assert_eq!(ms, vec![0.0, 3.0, 3.0, 3.0, 0.0]);
    }

    #[test]
    fn test_mean_square_edges_divide_by_full_span() {
        let x = [2.0f32, 2.0];
        let ms = run_ms(&x, Window::new(1, 1));
        assert!((ms[0] - 8.0 / 3.0).abs() < 1e-6);
        assert!((ms[1] - 8.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_window_longer_than_channel() {
        let x = [0.3f32, -0.1, 0.2];
        let far = usize::MAX / 4;
        assert_eq!(run_max(&x, Window::new(far, 0)), vec![0.3, 0.3, 0.3]);
        assert_eq!(run_max(&x, Window::new(0, far)), vec![0.3, 0.2, 0.2]);
        assert_eq!(run_max(&[-1.0, -2.0], Window::new(far, far)), vec![0.0, 0.0]);
        // Clamping to the channel length changes nothing.
        assert_eq!(run_max(&x, Window::new(1_000, 2)), run_max(&x, Window::new(3, 2)));

        let ms = run_ms(&[2.0f32, 2.0], Window::new(0, 999));
        assert!((ms[0] - 8.0 / 1001.0).abs() < 1e-7);
        assert!((ms[1] - 4.0 / 1001.0).abs() < 1e-7);
        let ms = run_ms(&[1.0f32], Window::new(far, far));
        assert!(ms[0] > 0.0 && ms[0] < 1e-15);
    }

    #[test]
    fn test_empty_channel() {
        assert!(run_max(&[], Window::new(2, 2)).is_empty());
        assert!(run_ms(&[], Window::new(2, 2)).is_empty());
    }
}
