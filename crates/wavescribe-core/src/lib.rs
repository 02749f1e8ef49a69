//! Wavescribe canonical types.
//!
//! This crate defines the data model shared by every stage of the
//! transcription pipeline:
//!
//! - [`AudioBuffer`] - a decoded waveform handed in by the caller
//! - [`PitchObservation`] - one per-frame fundamental frequency estimate
//! - [`NoteEvent`] / [`Track`] - the symbolic transcription
//! - [`TranscriptionParams`] - the per-call configuration structure
//!
//! The types here carry no behavior beyond construction, accessors, and
//! parameter validation. The DSP and MIDI crates own the stage contracts.

pub mod buffer;
pub mod error;
pub mod events;
pub mod observation;
pub mod params;

pub use buffer::AudioBuffer;
pub use error::ParamsError;
pub use events::{NoteEvent, Track};
pub use observation::PitchObservation;
pub use params::TranscriptionParams;

/// Crate version for pipeline identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
