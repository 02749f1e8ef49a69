//! Wavescribe symbolic backend.
//!
//! This crate turns the per-frame pitch stream into discrete note events
//! and serializes them as a Standard MIDI File (format 0):
//!
//! - [`segment_notes`]: frame-synchronous sweep opening one
//!   [`wavescribe_core::NoteEvent`] per newly sighted pitch
//! - [`encode`]: tempo metadata plus the event list into a single-track
//!   binary file, with a BLAKE3 hash of the bytes for determinism checks
//! - [`smf`]: the chunk writers, variable-length-quantity codec, and a
//!   byte-stream validator used by tests and tooling
//!
//! # Determinism
//!
//! Encoding is fully deterministic: the same events and tempo always
//! produce byte-identical output. Beat values convert to ticks by
//! round-half-up at a fixed 960 ticks per beat, and events sharing a
//! tick are ordered by a fixed rank (note-offs ahead of note-ons).

pub mod encode;
pub mod error;
pub mod note;
pub mod segment;
pub mod smf;

pub use encode::{encode, encode_track, write_to_path, EncodeResult};
pub use error::{EncodeError, SegmentError};
pub use note::{hz_to_midi, midi_to_hz, note_name};
pub use segment::{segment_notes, SegmentParams};

/// Crate version for pipeline identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
