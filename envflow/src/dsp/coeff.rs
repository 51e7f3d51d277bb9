//! Time-constant conversions.
//!
//! Attack and release times are given in milliseconds and turned into a
//! per-sample decay coefficient once per call. Smaller times give smaller
//! coefficients and a faster response.

use crate::error::{EnvelopeError, Result};

/// Largest coefficient handed out; a coefficient of exactly 1 would freeze
/// the envelope.
pub const MAX_COEFFICIENT: f32 = 0.999_999_94; // 0x3F7F_FFFF

/// Longest window side accepted, in samples. Keeps `lookback + lookahead + 1`
/// representable.
pub const MAX_WINDOW_SAMPLES: usize = usize::MAX / 4;

/// Decay coefficient for a one-pole section with the given time constant.
///
/// `exp(-1000 / (time_ms * sample_rate))`, evaluated in `f64` and kept below
/// 1 for very long time constants. A zero time constant gives `0.0`, i.e.
/// the envelope follows its target immediately.
#[inline]
pub fn time_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    if time_ms <= 0.0 {
        return 0.0;
    }
    let c = (-1000.0 / (f64::from(time_ms) * f64::from(sample_rate))).exp();
    (c as f32).min(MAX_COEFFICIENT)
}

/// Number of whole samples covered by `ms` milliseconds (truncated).
///
/// Fails with [`EnvelopeError::InvalidParameter`] naming `name` when the
/// count exceeds [`MAX_WINDOW_SAMPLES`].
pub fn ms_to_samples(name: &'static str, ms: f32, sample_rate: f32) -> Result<usize> {
    let samples = (f64::from(ms) * f64::from(sample_rate) / 1000.0).floor();
    if !(samples >= 0.0 && samples <= MAX_WINDOW_SAMPLES as f64) {
        return Err(EnvelopeError::invalid(
            name,
            ms,
            "window is too long to represent in samples",
        ));
    }
    Ok(samples as usize)
}

pub(crate) fn check_sample_rate(sample_rate: f32) -> Result<f32> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(EnvelopeError::invalid(
            "sample_rate",
            sample_rate,
            "must be a positive, finite frequency in Hz",
        ));
    }
    Ok(sample_rate)
}

pub(crate) fn check_time(name: &'static str, ms: f32) -> Result<f32> {
    if !ms.is_finite() || ms < 0.0 {
        return Err(EnvelopeError::invalid(
            name,
            ms,
            "must be a non-negative, finite duration in ms",
        ));
    }
    Ok(ms)
}
