//! Library crate for `envflow`: peak and RMS envelope detectors for
//! dynamics processing.
//!
//! Digital detectors compute a literal sliding-window statistic; analog
//! detectors emulate attack/release envelope followers in three variants,
//! each with a decoupled and a branching topology. Every detector takes a
//! whole buffer and returns an envelope of the same length.
//!
//! ```
//! use envflow::{peak, Topology};
//!
//! let input = vec![0.0f32, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
//! let env = peak::analog_level_corrected(&input, 1000.0, 1.0, 1.0, Topology::Branching, false)?;
//! assert_eq!(env.dim(), (1, 7));
//! # Ok::<(), envflow::EnvelopeError>(())
//! ```

pub mod ballistics;
pub mod buffer;
pub mod detector;
pub mod dsp;
pub mod error;
pub mod peak;
pub mod presets;
pub mod rms;

pub use ballistics::{Ballistics, Topology, Variant};
pub use buffer::{to_mono, AudioBuffer, IntoChannels};
pub use detector::{Detector, DetectorConfig, Measure, Style};
pub use error::{EnvelopeError, Result};
pub use presets::{preset, DynamicsRole};
