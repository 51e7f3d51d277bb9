//! Configurable front end over the peak and RMS families.
//!
//! A [`Detector`] is built once from a [`DetectorConfig`] (which can come from
//! any serde format) and then applied to whole buffers. Parameters are
//! validated when the detector is built, so `process` only fails on the
//! buffer itself.

use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::ballistics::{Topology, Variant};
use crate::buffer::{AudioBuffer, IntoChannels};
use crate::dsp::coeff::check_time;
use crate::error::Result;
use crate::{peak, rms};

/// Which statistic the envelope tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Peak,
    Rms,
}

/// Detector structure and its timing parameters, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Style {
    /// Sliding window around each sample.
    Digital { lookback_ms: f32, lookahead_ms: f32 },
    /// Recursive attack/release follower. `topology` is ignored by
    /// [`Variant::Pure`].
    Analog {
        variant: Variant,
        attack_ms: f32,
        release_ms: f32,
        #[serde(default = "default_topology")]
        topology: Topology,
    },
}

fn default_topology() -> Topology {
    Topology::Branching
}

/// Full description of one detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub measure: Measure,
    pub style: Style,
    /// Track every channel separately instead of their mean.
    #[serde(default)]
    pub multichannel: bool,
}

impl DetectorConfig {
    /// Check every time parameter without touching any audio.
    pub fn validate(&self) -> Result<()> {
        match self.style {
            Style::Digital {
                lookback_ms,
                lookahead_ms,
            } => {
                check_time("lookback_ms", lookback_ms)?;
                check_time("lookahead_ms", lookahead_ms)?;
            }
            Style::Analog {
                attack_ms,
                release_ms,
                ..
            } => {
                check_time("attack_ms", attack_ms)?;
                check_time("release_ms", release_ms)?;
            }
        }
        Ok(())
    }
}

/// A validated detector configuration.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        debug!("detector configured: {:?}", config);
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Envelope of a buffer that carries its own sample rate.
    pub fn process(&self, buffer: &AudioBuffer) -> Result<Array2<f32>> {
        self.process_samples(buffer, buffer.sample_rate())
    }

    /// Envelope of raw samples at `sample_rate`.
    pub fn process_samples(&self, input: impl IntoChannels, sample_rate: f32) -> Result<Array2<f32>> {
        let multichannel = self.config.multichannel;
        match (self.config.measure, self.config.style) {
            (
                Measure::Peak,
                Style::Digital {
                    lookback_ms,
                    lookahead_ms,
                },
            ) => peak::digital(input, sample_rate, lookback_ms, lookahead_ms, multichannel),
            (
                Measure::Rms,
                Style::Digital {
                    lookback_ms,
                    lookahead_ms,
                },
            ) => rms::digital(input, sample_rate, lookback_ms, lookahead_ms, multichannel),
            (
                Measure::Peak,
                Style::Analog {
                    variant,
                    attack_ms,
                    release_ms,
                    topology,
                },
            ) => match variant {
                Variant::Pure => {
                    peak::analog_pure(input, sample_rate, attack_ms, release_ms, multichannel)
                }
                Variant::LevelCorrected => peak::analog_level_corrected(
                    input,
                    sample_rate,
                    attack_ms,
                    release_ms,
                    topology,
                    multichannel,
                ),
                Variant::Smooth => peak::analog_smooth(
                    input,
                    sample_rate,
                    attack_ms,
                    release_ms,
                    topology,
                    multichannel,
                ),
            },
            (
                Measure::Rms,
                Style::Analog {
                    variant,
                    attack_ms,
                    release_ms,
                    topology,
                },
            ) => match variant {
                Variant::Pure => {
                    rms::analog_pure(input, sample_rate, attack_ms, release_ms, multichannel)
                }
                Variant::LevelCorrected => rms::analog_level_corrected(
                    input,
                    sample_rate,
                    attack_ms,
                    release_ms,
                    topology,
                    multichannel,
                ),
                Variant::Smooth => rms::analog_smooth(
                    input,
                    sample_rate,
                    attack_ms,
                    release_ms,
                    topology,
                    multichannel,
                ),
            },
        }
    }
}
