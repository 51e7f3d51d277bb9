//! Channel-layout normalization.
//!
//! Every detector starts from the same preprocessing stage: promote the
//! caller's samples to a `(channels, samples)` matrix, optionally collapse it
//! to mono, and scrub non-finite values. The detectors only ever read the
//! caller's data; this stage hands them a private copy.

use log::warn;
use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, ArrayViewD, Axis, Ix2};

use crate::dsp::coeff::check_sample_rate;
use crate::error::{EnvelopeError, Result};

/// Samples plus the rate they were recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Array2<f32>,
    sample_rate: f32,
}

impl AudioBuffer {
    /// Build a buffer from anything convertible to a channel matrix.
    pub fn new(samples: impl IntoChannels, sample_rate: f32) -> Result<Self> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let samples = samples.into_channels()?;
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> ArrayView2<'_, f32> {
        self.samples.view()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.samples.nrows()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.samples.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Conversion into an owned `(channels, samples)` matrix.
///
/// Rank-1 inputs become a single channel; rank-2 inputs are taken as
/// channel-major. Anything else is a [`EnvelopeError::ShapeMismatch`].
pub trait IntoChannels {
    fn into_channels(self) -> Result<Array2<f32>>;
}

impl IntoChannels for Array2<f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        Ok(self)
    }
}

impl IntoChannels for ArrayView2<'_, f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        Ok(self.to_owned())
    }
}

impl IntoChannels for &Array2<f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        Ok(self.clone())
    }
}

impl IntoChannels for Array1<f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        Ok(self.insert_axis(Axis(0)))
    }
}

impl IntoChannels for ArrayView1<'_, f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        Ok(self.insert_axis(Axis(0)).to_owned())
    }
}

impl IntoChannels for &Array1<f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        self.view().into_channels()
    }
}

impl IntoChannels for &[f32] {
    fn into_channels(self) -> Result<Array2<f32>> {
        ArrayView1::from(self).into_channels()
    }
}

impl IntoChannels for &Vec<f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        self.as_slice().into_channels()
    }
}

impl IntoChannels for ArrayViewD<'_, f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        let ndim = self.ndim();
        let matrix = match ndim {
            1 => self.insert_axis(Axis(0)),
            2 => self,
            _ => return Err(EnvelopeError::ShapeMismatch { ndim }),
        };
        matrix
            .into_dimensionality::<Ix2>()
            .map(|m| m.to_owned())
            .map_err(|_| EnvelopeError::ShapeMismatch { ndim })
    }
}

impl IntoChannels for ArrayD<f32> {
    fn into_channels(self) -> Result<Array2<f32>> {
        self.view().into_channels()
    }
}

impl IntoChannels for &AudioBuffer {
    fn into_channels(self) -> Result<Array2<f32>> {
        Ok(self.samples.clone())
    }
}

/// Average all channels into one.
pub fn to_mono(channels: ArrayView2<f32>) -> Result<Array2<f32>> {
    channels
        .mean_axis(Axis(0))
        .map(|mono| mono.insert_axis(Axis(0)))
        .ok_or(EnvelopeError::EmptyChannels)
}

/// Preprocessing stage run by every detector before any state is touched.
pub(crate) fn prepare(input: impl IntoChannels, multichannel: bool) -> Result<Array2<f32>> {
    let mut channels = input.into_channels()?;
    if channels.nrows() == 0 {
        return Err(EnvelopeError::EmptyChannels);
    }
    sanitize_samples(&mut channels);
    if multichannel {
        Ok(channels)
    } else {
        to_mono(channels.view())
    }
}

fn sanitize_samples(signal: &mut Array2<f32>) {
    let mut found = 0usize;
    for sample in signal.iter_mut() {
        if !sample.is_finite() {
            *sample = 0.0;
            found += 1;
        }
    }
    if found > 0 {
        warn!("replaced {found} non-finite input samples with 0 before envelope detection");
    }
}
