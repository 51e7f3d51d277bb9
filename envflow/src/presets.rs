use serde::{Deserialize, Serialize};

use crate::ballistics::{Topology, Variant};
use crate::detector::{DetectorConfig, Measure, Style};

/// The dynamics processor a detector is meant to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicsRole {
    /// Program compression; follows loudness rather than transients.
    Compressor,
    /// Brickwall-style limiting; catches every peak.
    Limiter,
    /// Noise gate; opens fast, closes without chatter.
    Gate,
    /// Sibilance control, meant for a high-passed sidechain.
    DeEsser,
    /// Per-channel level display.
    Meter,
}

/// Return a detector configuration for the given role.
///
/// These are starting points, not tuned values. Stereo roles run on the
/// channel mean so that gain reduction stays linked across channels; the
/// meter keeps channels apart.
pub fn preset(role: DynamicsRole) -> DetectorConfig {
    match role {
        DynamicsRole::Compressor => DetectorConfig {
            measure: Measure::Rms,
            style: Style::Analog {
                variant: Variant::Smooth,
                attack_ms: 10.0,   // lets the first transient through
                release_ms: 120.0, // slow enough to avoid pumping
                topology: Topology::Branching,
            },
            multichannel: false,
        },
        DynamicsRole::Limiter => DetectorConfig {
            measure: Measure::Peak,
            style: Style::Analog {
                variant: Variant::LevelCorrected,
                attack_ms: 0.1,
                release_ms: 60.0,
                topology: Topology::Decoupled, // instant capture, smoothed attack
            },
            multichannel: false,
        },
        DynamicsRole::Gate => DetectorConfig {
            measure: Measure::Peak,
            style: Style::Analog {
                variant: Variant::LevelCorrected,
                attack_ms: 0.5,
                release_ms: 80.0,
                topology: Topology::Branching,
            },
            multichannel: false,
        },
        DynamicsRole::DeEsser => DetectorConfig {
            measure: Measure::Rms,
            style: Style::Analog {
                variant: Variant::LevelCorrected,
                attack_ms: 1.0,
                release_ms: 40.0,
                topology: Topology::Branching,
            },
            multichannel: false,
        },
        DynamicsRole::Meter => DetectorConfig {
            measure: Measure::Peak,
            style: Style::Digital {
                lookback_ms: 10.0,
                lookahead_ms: 0.0,
            },
            multichannel: true,
        },
    }
}
