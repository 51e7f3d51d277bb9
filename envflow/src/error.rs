//! Error types shared by every detector.
//!
//! All checks run at call entry, before any sample is read, so a failing
//! call never produces partial output.

/// Errors reported by the envelope detectors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unsupported buffer rank {ndim}: expected 1 (samples) or 2 (channels x samples)")]
    ShapeMismatch { ndim: usize },

    #[error("buffer has no channels")]
    EmptyChannels,
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;

impl EnvelopeError {
    pub(crate) fn invalid(name: &'static str, value: impl Into<f64>, reason: &'static str) -> Self {
        EnvelopeError::InvalidParameter {
            name,
            value: value.into(),
            reason,
        }
    }
}
