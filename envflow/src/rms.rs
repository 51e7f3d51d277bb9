//! RMS envelope detectors.
//!
//! Same detectors as [`crate::peak`], run on squared samples with a square
//! root on the way out. The decoupled capture steps average their terms
//! instead of taking a maximum; the divisors 2 and 3 are fixed.

use ndarray::{Array2, ArrayView1, ArrayViewMut1};

use crate::ballistics::{run_analog, run_digital, Ballistics, Law, Topology, Variant};
use crate::buffer::IntoChannels;
use crate::dsp::smoother::one_pole;
use crate::dsp::window::{sliding_mean_square, Window};
use crate::error::Result;

pub(crate) struct RmsLaw;

impl Law for RmsLaw {
    const NAME: &'static str = "rms";

    #[inline]
    fn lift(x: f32) -> f32 {
        x * x
    }

    #[inline]
    fn lower(y: f32) -> f32 {
        y.sqrt()
    }

    fn window(x: ArrayView1<f32>, mut out: ArrayViewMut1<f32>, window: Window) {
        sliding_mean_square(x, out.view_mut(), window);
        out.mapv_inplace(f32::sqrt);
    }

    fn pure(lifted: &Array2<f32>, b: Ballistics) -> Array2<f32> {
        one_pole(lifted, b.attack, b.release)
    }

    #[inline]
    fn level_corrected_state(prev: f32, x: f32, release: f32) -> f32 {
        (x + release * prev) / 2.0
    }

    #[inline]
    fn smooth_state(prev: f32, x: f32, release: f32) -> f32 {
        (x + release * prev + (1.0 - release) * x) / 3.0
    }
}

/// Windowed RMS over `[j - lookback, j + lookahead]`, zero padded at both
/// ends. The mean always divides by the full window length; a zero-length
/// window yields `|x|`.
pub fn digital(
    input: impl IntoChannels,
    sample_rate: f32,
    lookback_ms: f32,
    lookahead_ms: f32,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_digital::<RmsLaw>(input, sample_rate, lookback_ms, lookahead_ms, multichannel)
}

/// One-pole smoothing of the squared signal (attack while rising, release
/// while falling), then a square root.
pub fn analog_pure(
    input: impl IntoChannels,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_analog::<RmsLaw>(
        input,
        sample_rate,
        attack_ms,
        release_ms,
        Variant::Pure,
        Topology::Branching,
        multichannel,
    )
}

/// Level-corrected RMS detector.
///
/// * [`Topology::Decoupled`]: `state = (x² + release * prev) / 2`, then a
///   one-pole pass at the attack rate. A constant input settles at
///   `|x| / sqrt(2 - release)`.
/// * [`Topology::Branching`]: the peak branching rule applied to `x²`.
pub fn analog_level_corrected(
    input: impl IntoChannels,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    topology: Topology,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_analog::<RmsLaw>(
        input,
        sample_rate,
        attack_ms,
        release_ms,
        Variant::LevelCorrected,
        topology,
        multichannel,
    )
}

/// Smooth RMS detector.
///
/// * [`Topology::Decoupled`]: `state = (x² + release * prev + (1 - release) * x²) / 3`,
///   then a one-pole pass at the attack rate.
/// * [`Topology::Branching`]: the smooth peak rule applied to `x²`.
pub fn analog_smooth(
    input: impl IntoChannels,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
    topology: Topology,
    multichannel: bool,
) -> Result<Array2<f32>> {
    run_analog::<RmsLaw>(
        input,
        sample_rate,
        attack_ms,
        release_ms,
        Variant::Smooth,
        topology,
        multichannel,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::coeff::time_coefficient;
    use ndarray::{array, Array1};

    const SR: f32 = 1000.0;

    #[test]
    fn test_digital_centered_window() {
        let x = [0.0f32, 0.0, 3.0, 0.0, 0.0];
        let env = digital(&x[..], SR, 1.0, 1.0, false).unwrap();
        let expected = 3.0f32.sqrt();
        for j in 1..=3 {
            assert!((env[[0, j]] - expected).abs() < 1e-6, "index {j}");
        }
        assert_eq!(env[[0, 0]], 0.0);
        assert_eq!(env[[0, 4]], 0.0);
    }

    #[test]
    fn test_digital_zero_window_is_magnitude() {
        let x = array![[-0.5f32, 0.25, -1.0, 0.0]];
        let env = digital(&x, 48_000.0, 0.0, 0.0, true).unwrap();
        assert_eq!(env, x.mapv(f32::abs));
    }

    #[test]
    fn test_digital_matches_direct_mean() {
        let x: Vec<f32> = (0..600).map(|_| rand::random::<f32>() * 2.0 - 1.0).collect();
        let (back, ahead) = (3usize, 5usize);
        let env = digital(&x, SR, back as f32, ahead as f32, false).unwrap();
        for j in 0..x.len() {
            let sum: f32 = (j as isize - back as isize..=(j + ahead) as isize)
                .filter(|&k| k >= 0 && (k as usize) < x.len())
                .map(|k| x[k as usize] * x[k as usize])
                .sum();
            let direct = (sum / (back + ahead + 1) as f32).sqrt();
            assert!((env[[0, j]] - direct).abs() < 1e-5, "index {j}");
        }
    }

    #[test]
    fn test_pure_is_smoothed_power() {
        let x = [0.0f32, -1.0, 0.5, 0.5, 0.0];
        let env = analog_pure(&x[..], SR, 1.0, 4.0, false).unwrap();
        let a = time_coefficient(1.0, SR);
        let r = time_coefficient(4.0, SR);
        let mut p = 0.0f32;
        for (j, &v) in x.iter().enumerate() {
            let target = v * v;
            let c = if target > p { a } else { r };
            p = c * p + (1.0 - c) * target;
            assert!((env[[0, j]] - p.sqrt()).abs() < 1e-6, "index {j}");
        }
    }

    #[test]
    fn test_decoupled_states_average() {
        let x = [0.0f32, 1.0, 0.5];
        let r = time_coefficient(3.0, SR);
        let lc = analog_level_corrected(&x[..], SR, 0.0, 3.0, Topology::Decoupled, false).unwrap();
        let s1 = 0.5f32;
        let s2 = (0.25 + r * s1) / 2.0;
        assert!((lc[[0, 1]] - s1.sqrt()).abs() < 1e-6);
        assert!((lc[[0, 2]] - s2.sqrt()).abs() < 1e-6);

        let sm = analog_smooth(&x[..], SR, 0.0, 3.0, Topology::Decoupled, false).unwrap();
        let s1 = (1.0 + (1.0 - r)) / 3.0;
        let s2 = (0.25 + r * s1 + (1.0 - r) * 0.25) / 3.0;
        assert!((sm[[0, 1]] - s1.sqrt()).abs() < 1e-6);
        assert!((sm[[0, 2]] - s2.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_decoupled_fixed_points() {
        let x = Array1::from_elem(4000, -0.8f32);
        let r = time_coefficient(20.0, SR);
        let lc = analog_level_corrected(x.view(), SR, 5.0, 20.0, Topology::Decoupled, false).unwrap();
        let sm = analog_smooth(x.view(), SR, 5.0, 20.0, Topology::Decoupled, false).unwrap();
        let lc_fixed = 0.8 / (2.0 - r).sqrt();
        let sm_fixed = 0.8 * ((2.0 - r) / (3.0 - r)).sqrt();
        assert!((lc[[0, 3999]] - lc_fixed).abs() < 1e-4);
        assert!((sm[[0, 3999]] - sm_fixed).abs() < 1e-4);
    }

    #[test]
    fn test_steady_state_converges_to_magnitude() {
        let x = Array1::from_elem(3000, -0.6f32);
        let pure = analog_pure(x.view(), SR, 5.0, 1000.0, false).unwrap();
        let lc = analog_level_corrected(x.view(), SR, 5.0, 1000.0, Topology::Branching, false).unwrap();
        let sm = analog_smooth(x.view(), SR, 5.0, 1000.0, Topology::Branching, false).unwrap();
        for env in [&pure, &lc, &sm] {
            assert!((env[[0, 2999]] - 0.6).abs() < 1e-3);
        }
    }

    #[test]
    fn test_branching_matches_squared_peak_rule() {
        let x = [0.0f32, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let env = analog_level_corrected(&x[..], SR, 1.0, 1.0, Topology::Branching, false).unwrap();
        let peak = crate::peak::analog_level_corrected(&x[..], SR, 1.0, 1.0, Topology::Branching, false)
            .unwrap();
        // 0 and 1 square to themselves.
        for j in 0..x.len() {
            assert!((env[[0, j]] - peak[[0, j]].sqrt()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_non_negative_and_finite() {
        let x: Array2<f32> =
            Array2::from_shape_fn((2, 1024), |_| rand::random::<f32>() * 2.0 - 1.0);
        let mut outputs = vec![
            analog_pure(&x, 44_100.0, 1.0, 50.0, true).unwrap(),
            digital(&x, 44_100.0, 2.0, 1.0, true).unwrap(),
        ];
        for topology in [Topology::Decoupled, Topology::Branching] {
            outputs.push(analog_level_corrected(&x, 44_100.0, 1.0, 50.0, topology, true).unwrap());
            outputs.push(analog_smooth(&x, 44_100.0, 1.0, 50.0, topology, true).unwrap());
        }
        for env in outputs {
            assert_eq!(env.dim(), (2, 1024));
            assert!(env.iter().all(|v| v.is_finite() && *v >= 0.0));
        }
    }

    #[test]
    fn test_unrepresentable_window_rejected() {
        let x = [0.5f32, 1.0, 0.25, 0.0];
        assert!(matches!(
            digital(&x[..], 48_000.0, 0.0, f32::MAX, false),
            Err(crate::error::EnvelopeError::InvalidParameter { name: "lookahead_ms", .. })
        ));
    }

    #[test]
    fn test_window_longer_than_buffer_divides_by_full_span() {
        let x = [2.0f32, 2.0];
        let env = digital(&x[..], SR, 0.0, 999.0, false).unwrap();
        assert!((env[[0, 0]] - (8.0f32 / 1000.0).sqrt()).abs() < 1e-6);
        assert!((env[[0, 1]] - (4.0f32 / 1000.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_mono_collapse() {
        let x = array![[1.0f32, 1.0, 1.0], [-1.0, -1.0, 1.0]];
        let env = digital(&x, SR, 0.0, 0.0, false).unwrap();
        assert_eq!(env, array![[0.0f32, 0.0, 1.0]]);
    }
}
