//! Error types for segmentation and encoding.

use thiserror::Error;

/// Errors raised by the note segmenter.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The configured note range is inverted.
    #[error("invalid note range: min {min} exceeds max {max}")]
    InvalidRange {
        /// Configured minimum MIDI note.
        min: u8,
        /// Configured maximum MIDI note.
        max: u8,
    },

    /// Tempo is not a positive finite number.
    #[error("invalid tempo: {bpm} bpm")]
    InvalidTempo {
        /// The rejected tempo.
        bpm: f64,
    },

    /// Time-base sizing is non-positive.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameters {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },
}

/// Errors raised by the sequencer-file encoder.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Tempo cannot be represented in the tempo meta-event.
    #[error("invalid tempo: {bpm} bpm")]
    InvalidTempo {
        /// The rejected tempo.
        bpm: f64,
    },

    /// An event field falls outside its valid byte range.
    #[error("{field} out of range: {value} (max {max})")]
    FieldOutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: u32,
        /// Largest permitted value.
        max: u32,
    },

    /// An event time is negative or not finite.
    #[error("invalid event time: {field} is {value}")]
    InvalidEventTime {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Writing the destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
