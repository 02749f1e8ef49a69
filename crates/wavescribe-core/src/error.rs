//! Error types for parameter validation.

use thiserror::Error;

/// Errors raised by [`crate::TranscriptionParams::validate`].
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The minimum note exceeds the maximum note.
    #[error("invalid note range: min {min} exceeds max {max}")]
    NoteRange {
        /// Configured minimum MIDI note.
        min: u8,
        /// Configured maximum MIDI note.
        max: u8,
    },

    /// Tempo is not a positive finite number.
    #[error("invalid tempo: {bpm} bpm")]
    Tempo {
        /// The rejected tempo.
        bpm: f64,
    },

    /// Velocity exceeds the MIDI data-byte range.
    #[error("invalid velocity: {velocity} (max 127)")]
    Velocity {
        /// The rejected velocity.
        velocity: u8,
    },

    /// Window length is zero.
    #[error("invalid window length: {0}")]
    WindowLength(usize),

    /// Hop length is zero.
    #[error("invalid hop length: {0}")]
    HopLength(usize),
}
