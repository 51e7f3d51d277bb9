//! Peak envelope detectors.
//!
//! `digital` takes the literal maximum over a lookback/lookahead window.
//! The `analog_*` detectors emulate envelope-follower circuits with
//! independent attack and release time constants.
//!
//! All detectors return one row per channel (a single row when
//! `multichannel` is false, after averaging the channels) with the input's
//! length. State is call-local and starts at zero.

use ndarray::{Array2, ArrayView1, ArrayViewMut1};

use crate::ballistics::{recur, run_analog, run_digital, Ballistics, Law, Topology, Variant};
use crate::buffer::IntoChannels;
use crate::dsp::window::{sliding_max, Window};
use crate::error::Result;

pub(crate) struct PeakLaw;

impl Law for PeakLaw {
    const NAME: &'static str = "peak";

    #[inline]
    fn lift(x: f32) -> f32 {
        x
    }

    #[inline]
    fn lower(y: f32) -> f32 {
        y
    }

    fn window(x: ArrayView1<f32>, mut out: ArrayViewMut1<f32>, window: Window) {
        if window.is_single_sample() {
            out.assign(&x);
        } else {
            sliding_max(x, out, window);
        }
    }

    fn pure(lifted: &Array2<f32>, b: Ballistics) -> Array2<f32> {
        recur(lifted, |prev, x| {
            b.release * prev + (1.0 - b.attack) * (x - prev).max(0.0)
        })
    }

    #[inline]
    fn level_corrected_state(prev: f32, x: f32, release: f32) -> f32 {
        x.max(release * prev)
    }

    #[inline]
    fn smooth_state(prev: f32, x: f32, release: f32) -> f32 {
        x.max(release * prev + (1.0 - release) * x)
    }
}

/// Sliding-window maximum over `[j - lookback, j + lookahead]`, zero padded
/// at both ends. With both windows under one sample the input passes
/// through untouched.
pub fn digital(
    input: impl IntoChannels,
    sample_rate: f32,
    lookback_ms: f32,
    lookahead_ms: f32,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_digital::<PeakLaw>(input, sample_rate, lookback_ms, lookahead_ms, multichannel)
}

/// Classic diode-style peak detector:
///
/// `peak[j] = release * peak[j-1] + (1 - attack) * max(x[j] - peak[j-1], 0)`
///
/// The release coefficient scales the carried state on every sample, rising
/// or not, so this is not a plain one-pole follower in either direction. A
/// constant input settles at `x (1 - attack) / (2 - release - attack)`, below
/// the input level.
pub fn analog_pure(
    input: impl IntoChannels,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_analog::<PeakLaw>(
        input,
        sample_rate,
        attack_ms,
        release_ms,
        Variant::Pure,
        Topology::Branching,
        multichannel,
    )
}

/// Level-corrected peak detector.
///
/// * [`Topology::Decoupled`]: instant capture `max(x, release * prev)`,
///   then a one-pole pass at the attack rate.
/// * [`Topology::Branching`]: rise toward the input at the attack rate while
///   it exceeds the envelope, otherwise decay toward zero at the release rate.
///   Ties decay.
pub fn analog_level_corrected(
    input: impl IntoChannels,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    topology: Topology,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_analog::<PeakLaw>(
        input,
        sample_rate,
        attack_ms,
        release_ms,
        Variant::LevelCorrected,
        topology,
        multichannel,
    )
}

/// Smooth peak detector. Like [`analog_level_corrected`], but the release
/// pulls toward the input instead of toward zero, which rounds off the tail.
pub fn analog_smooth(
    input: impl IntoChannels,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    topology: Topology,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_analog::<PeakLaw>(
        input,
        sample_rate,
        attack_ms,
        release_ms,
        Variant::Smooth,
        topology,
        multichannel,
    )
}
