//! Error types for DSP stages.

use thiserror::Error;

/// Result type for DSP operations.
pub type DspResult<T> = Result<T, DspError>;

/// Errors that can occur during preprocessing and pitch tracking.
#[derive(Debug, Error)]
pub enum DspError {
    /// The input buffer is empty or malformed.
    #[error("invalid audio: {reason}")]
    InvalidAudio {
        /// What made the buffer unusable.
        reason: String,
    },

    /// Frame sizing is non-positive or inconsistent with the signal.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameters {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },
}

impl DspError {
    /// Creates an invalid audio error.
    pub fn invalid_audio(reason: impl Into<String>) -> Self {
        Self::InvalidAudio {
            reason: reason.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            name: name.into(),
            message: message.into(),
        }
    }
}
