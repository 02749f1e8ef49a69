//! Sequencer-file encoding entry point.
//!
//! Converts beat-valued note events into a format-0 SMF byte stream.
//! Encoding is all-or-nothing: field validation happens before any
//! bytes are produced, and the path-writing wrapper goes through a
//! temporary file plus rename so a failure never leaves a truncated
//! file at the destination.

use std::io::Write;
use std::path::Path;

use wavescribe_core::{NoteEvent, Track};

use crate::error::EncodeError;
use crate::smf::track::{TrackChunk, TrackEvent};
use crate::smf::vlq::VLQ_MAX;
use crate::smf::{SmfFile, TICKS_PER_BEAT};

/// Result of an encoding call.
#[derive(Debug, Clone)]
pub struct EncodeResult {
    /// Complete file bytes.
    pub data: Vec<u8>,
    /// BLAKE3 hash of the bytes, for determinism checks.
    pub hash: String,
}

/// Encode a track name, tempo, and event list into a complete SMF
/// format-0 byte stream.
pub fn encode(
    track_name: &str,
    tempo_bpm: f64,
    events: &[NoteEvent],
) -> Result<EncodeResult, EncodeError> {
    let mut file = SmfFile::new(TICKS_PER_BEAT);
    build_track(&mut file.track, track_name, tempo_bpm, events)?;
    let data = file.to_bytes()?;
    let hash = blake3::hash(&data).to_hex().to_string();
    Ok(EncodeResult { data, hash })
}

/// Encode a [`Track`].
pub fn encode_track(track: &Track) -> Result<EncodeResult, EncodeError> {
    encode(&track.name, track.tempo_bpm, &track.events)
}

/// Encode and write the result to `path` atomically: the bytes land in
/// a temporary file in the destination directory and are renamed into
/// place only once complete.
pub fn write_to_path(
    path: &Path,
    track_name: &str,
    tempo_bpm: f64,
    events: &[NoteEvent],
) -> Result<EncodeResult, EncodeError> {
    let result = encode(track_name, tempo_bpm, events)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&result.data)?;
    tmp.persist(path).map_err(|err| EncodeError::Io(err.error))?;
    Ok(result)
}

fn build_track(
    chunk: &mut TrackChunk,
    track_name: &str,
    tempo_bpm: f64,
    events: &[NoteEvent],
) -> Result<(), EncodeError> {
    chunk.push(0, TrackEvent::TrackName(track_name.to_string()));
    chunk.push(
        0,
        TrackEvent::SetTempo {
            microseconds_per_beat: tempo_to_microseconds(tempo_bpm)?,
        },
    );

    let mut final_tick = 0u32;
    for event in events {
        validate_event(event)?;
        let on_tick = beats_to_ticks(event.onset, "onset")?;
        let off_tick = beats_to_ticks(event.end(), "duration")?;
        // A duration shorter than half a tick would otherwise round to a
        // zero-length pair; hold the note for at least one tick.
        let off_tick = off_tick.max(on_tick + 1);
        chunk.push(
            on_tick,
            TrackEvent::NoteOn {
                channel: event.channel,
                pitch: event.pitch,
                velocity: event.velocity,
            },
        );
        chunk.push(
            off_tick,
            TrackEvent::NoteOff {
                channel: event.channel,
                pitch: event.pitch,
            },
        );
        final_tick = final_tick.max(off_tick);
    }
    chunk.push(final_tick, TrackEvent::EndOfTrack);
    chunk.sort();
    Ok(())
}

fn validate_event(event: &NoteEvent) -> Result<(), EncodeError> {
    if event.pitch > 127 {
        return Err(EncodeError::FieldOutOfRange {
            field: "pitch",
            value: event.pitch as u32,
            max: 127,
        });
    }
    if event.velocity > 127 {
        return Err(EncodeError::FieldOutOfRange {
            field: "velocity",
            value: event.velocity as u32,
            max: 127,
        });
    }
    if event.channel > 15 {
        return Err(EncodeError::FieldOutOfRange {
            field: "channel",
            value: event.channel as u32,
            max: 15,
        });
    }
    if !event.duration.is_finite() || event.duration <= 0.0 {
        return Err(EncodeError::InvalidEventTime {
            field: "duration",
            value: event.duration,
        });
    }
    Ok(())
}

/// Convert a beat value to ticks, rounding half up so re-encoding the
/// same events is deterministic.
fn beats_to_ticks(beats: f64, field: &'static str) -> Result<u32, EncodeError> {
    if !beats.is_finite() || beats < 0.0 {
        return Err(EncodeError::InvalidEventTime {
            field,
            value: beats,
        });
    }
    let ticks = (beats * TICKS_PER_BEAT as f64 + 0.5).floor();
    if ticks > VLQ_MAX as f64 {
        return Err(EncodeError::FieldOutOfRange {
            field,
            value: u32::MAX,
            max: VLQ_MAX,
        });
    }
    Ok(ticks as u32)
}

/// Encode a tempo as the 24-bit microseconds-per-beat payload of the
/// tempo meta-event.
fn tempo_to_microseconds(tempo_bpm: f64) -> Result<u32, EncodeError> {
    if !tempo_bpm.is_finite() || tempo_bpm <= 0.0 {
        return Err(EncodeError::InvalidTempo { bpm: tempo_bpm });
    }
    let microseconds = (60_000_000.0 / tempo_bpm + 0.5).floor();
    if microseconds > 0x00FF_FFFF as f64 || microseconds < 1.0 {
        return Err(EncodeError::InvalidTempo { bpm: tempo_bpm });
    }
    Ok(microseconds as u32)
}
