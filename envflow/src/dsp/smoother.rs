//! One-pole attack/release smoother.
//!
//! The same follower the transient shaper and AGC use: pick the attack
//! coefficient while the target is above the running value, the release
//! coefficient otherwise, then move a `(1 - coef)` step toward the target.

use ndarray::{Array2, ArrayView1, ArrayViewMut1};

/// Smooth every channel (row) of `signal`. State starts at zero and every
/// sample, index 0 included, updates it.
pub fn one_pole(signal: &Array2<f32>, rising: f32, falling: f32) -> Array2<f32> {
    let mut out = Array2::zeros(signal.raw_dim());
    for (x, y) in signal.outer_iter().zip(out.outer_iter_mut()) {
        smooth_channel(x, y, rising, falling);
    }
    out
}

fn smooth_channel(x: ArrayView1<f32>, mut y: ArrayViewMut1<f32>, rising: f32, falling: f32) {
    x.iter().zip(y.iter_mut()).fold(0.0f32, |env, (&target, slot)| {
        let coef = if target > env { rising } else { falling };
        let next = coef * env + (1.0 - coef) * target;
        *slot = next;
        next
    });
}
