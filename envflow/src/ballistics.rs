//! Attack/release machinery shared by the peak and RMS families.
//!
//! Both families run the same recurrences; they differ only in what they
//! feed in (raw samples vs. squares), what they read out (identity vs.
//! square root) and in the state update of the decoupled topology. Those
//! differences live behind [`Law`]; everything else is written once here.

use log::debug;
use ndarray::{Array2, ArrayView1, ArrayViewMut1, Axis};
use serde::{Deserialize, Serialize};

use crate::buffer::{prepare, IntoChannels};
use crate::dsp::coeff::{check_sample_rate, check_time, ms_to_samples, time_coefficient};
use crate::dsp::smoother::one_pole;
use crate::dsp::window::Window;
use crate::error::{EnvelopeError, Result};

/// Structure of a two-stage analog detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Peak capture first, then a separate attack-smoothing pass (mode 0).
    Decoupled,
    /// One pass; each sample picks the rising or falling rule (mode 1).
    Branching,
}

impl TryFrom<u8> for Topology {
    type Error = EnvelopeError;

    fn try_from(mode: u8) -> Result<Self> {
        match mode {
            0 => Ok(Topology::Decoupled),
            1 => Ok(Topology::Branching),
            _ => Err(EnvelopeError::invalid("mode", mode, "must be 0 (decoupled) or 1 (branching)")),
        }
    }
}

impl From<Topology> for u8 {
    fn from(topology: Topology) -> u8 {
        match topology {
            Topology::Decoupled => 0,
            Topology::Branching => 1,
        }
    }
}

/// Analog detector flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Pure,
    LevelCorrected,
    Smooth,
}

/// Attack and release coefficients for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ballistics {
    pub attack: f32,
    pub release: f32,
}

impl Ballistics {
    /// Validate the time constants and convert them to per-sample coefficients.
    pub fn from_times(attack_ms: f32, release_ms: f32, sample_rate: f32) -> Result<Self> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let attack_ms = check_time("attack_ms", attack_ms)?;
        let release_ms = check_time("release_ms", release_ms)?;
        Ok(Self {
            attack: time_coefficient(attack_ms, sample_rate),
            release: time_coefficient(release_ms, sample_rate),
        })
    }

    /// Move from `prev` toward `target` at the attack rate.
    #[inline]
    pub fn rise(&self, prev: f32, target: f32) -> f32 {
        self.attack * prev + (1.0 - self.attack) * target
    }
}

/// What distinguishes a detector family.
pub(crate) trait Law {
    const NAME: &'static str;

    /// Sample -> detector domain.
    fn lift(x: f32) -> f32;

    /// Detector domain -> linear amplitude.
    fn lower(y: f32) -> f32;

    /// Windowed statistic of one channel, already in linear amplitude.
    fn window(x: ArrayView1<f32>, out: ArrayViewMut1<f32>, window: Window);

    /// The "pure" detector over a lifted signal.
    fn pure(lifted: &Array2<f32>, ballistics: Ballistics) -> Array2<f32>;

    /// Decoupled level-corrected capture step.
    fn level_corrected_state(prev: f32, x: f32, release: f32) -> f32;

    /// Decoupled smooth capture step.
    fn smooth_state(prev: f32, x: f32, release: f32) -> f32;
}

/// Run `step(prev, x)` along every channel. Index 0 keeps the zero initial
/// state; updates start at index 1.
pub(crate) fn recur<F>(signal: &Array2<f32>, step: F) -> Array2<f32>
where
    F: Fn(f32, f32) -> f32,
{
    let mut out = Array2::zeros(signal.raw_dim());
    for (x, mut y) in signal.outer_iter().zip(out.outer_iter_mut()) {
        x.iter()
            .zip(y.iter_mut())
            .skip(1)
            .fold(0.0f32, |prev, (&sample, slot)| {
                let next = step(prev, sample);
                *slot = next;
                next
            });
    }
    out
}

fn level_corrected<L: Law>(lifted: &Array2<f32>, b: Ballistics, topology: Topology) -> Array2<f32> {
    match topology {
        Topology::Decoupled => {
            let state = recur(lifted, |prev, x| L::level_corrected_state(prev, x, b.release));
            one_pole(&state, b.attack, b.attack)
        }
        Topology::Branching => recur(lifted, |prev, x| {
            if x > prev {
                b.rise(prev, x)
            } else {
                b.release * prev
            }
        }),
    }
}

fn smooth<L: Law>(lifted: &Array2<f32>, b: Ballistics, topology: Topology) -> Array2<f32> {
    match topology {
        Topology::Decoupled => {
            let state = recur(lifted, |prev, x| L::smooth_state(prev, x, b.release));
            one_pole(&state, b.attack, b.attack)
        }
        Topology::Branching => recur(lifted, |prev, x| {
            if x > prev {
                b.rise(prev, x)
            } else {
                b.release * prev + (1.0 - b.release) * x
            }
        }),
    }
}

/// Entry point for every analog detector. `topology` is ignored by
/// [`Variant::Pure`].
pub(crate) fn run_analog<L: Law>(
    input: impl IntoChannels,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    variant: Variant,
    topology: Topology,
    multichannel: bool,
) -> Result<Array2<f32>> {
    let ballistics = Ballistics::from_times(attack_ms, release_ms, sample_rate)?;
    let lifted = prepare(input, multichannel)?.mapv_into(L::lift);
    debug!(
        "{} analog {:?}/{:?}: {}x{} samples, attack={:.6} release={:.6}",
        L::NAME,
        variant,
        topology,
        lifted.len_of(Axis(0)),
        lifted.len_of(Axis(1)),
        ballistics.attack,
        ballistics.release
    );
    let envelope = match variant {
        Variant::Pure => L::pure(&lifted, ballistics),
        Variant::LevelCorrected => level_corrected::<L>(&lifted, ballistics, topology),
        Variant::Smooth => smooth::<L>(&lifted, ballistics, topology),
    };
    Ok(envelope.mapv_into(L::lower))
}

/// Entry point for the windowed detectors.
pub(crate) fn run_digital<L: Law>(
    input: impl IntoChannels,
    sample_rate: f32,
    lookback_ms: f32,
    lookahead_ms: f32,
    multichannel: bool,
) -> Result<Array2<f32>> {
    let sample_rate = check_sample_rate(sample_rate)?;
    let lookback_ms = check_time("lookback_ms", lookback_ms)?;
    let lookahead_ms = check_time("lookahead_ms", lookahead_ms)?;
    let window = Window::new(
        ms_to_samples("lookback_ms", lookback_ms, sample_rate)?,
        ms_to_samples("lookahead_ms", lookahead_ms, sample_rate)?,
    );
    let signal = prepare(input, multichannel)?;
    debug!(
        "{} digital: {}x{} samples, lookback={} lookahead={}",
        L::NAME,
        signal.nrows(),
        signal.ncols(),
        window.lookback,
        window.lookahead
    );
    let mut envelope = Array2::zeros(signal.raw_dim());
    for (x, y) in signal.outer_iter().zip(envelope.outer_iter_mut()) {
        L::window(x, y, window);
    }
    Ok(envelope)
}
