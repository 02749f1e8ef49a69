//! Note segmentation.
//!
//! A frame-synchronous forward sweep over the pitch stream: the first
//! sighting of a pitch opens a note event one frame long; a pitch that
//! is already active stays held and emits nothing further. Unvoiced
//! frames close nothing. A sustained tone therefore yields exactly one
//! minimal-duration event rather than one event spanning the sustain.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use wavescribe_core::{NoteEvent, PitchObservation, TranscriptionParams};

use crate::error::SegmentError;
use crate::note::hz_to_midi;

/// Configuration for one segmentation sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentParams {
    /// Sample rate of the analyzed signal in Hz.
    pub sample_rate: u32,
    /// Hop between analysis frames in samples.
    pub hop_length: usize,
    /// Lowest emitted MIDI note; lower pitches clamp to it.
    pub min_note: u8,
    /// Highest emitted MIDI note; higher pitches clamp to it.
    pub max_note: u8,
    /// Tempo in beats per minute, used to express frame time in beats.
    pub tempo_bpm: f64,
    /// Velocity assigned to every emitted note.
    pub velocity: u8,
}

impl SegmentParams {
    /// Build segmentation parameters from the shared configuration and
    /// the analyzed signal's sample rate.
    pub fn new(sample_rate: u32, params: &TranscriptionParams) -> Self {
        Self {
            sample_rate,
            hop_length: params.hop_length,
            min_note: params.min_note,
            max_note: params.max_note,
            tempo_bpm: params.tempo_bpm,
            velocity: params.velocity,
        }
    }

    fn validate(&self) -> Result<(), SegmentError> {
        if self.min_note > self.max_note {
            return Err(SegmentError::InvalidRange {
                min: self.min_note,
                max: self.max_note,
            });
        }
        if !self.tempo_bpm.is_finite() || self.tempo_bpm <= 0.0 {
            return Err(SegmentError::InvalidTempo {
                bpm: self.tempo_bpm,
            });
        }
        if self.sample_rate == 0 {
            return Err(SegmentError::InvalidParameters {
                name: "sample_rate".into(),
                message: "must be positive".into(),
            });
        }
        if self.hop_length == 0 {
            return Err(SegmentError::InvalidParameters {
                name: "hop_length".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Elapsed time per analysis frame, in beats.
    pub fn time_step(&self) -> f64 {
        (self.hop_length as f64 / self.sample_rate as f64) * (self.tempo_bpm / 60.0)
    }
}

/// Convert the pitch stream into discrete note events.
///
/// Events come out in onset order (a single linear sweep over frames),
/// every pitch clamped into the configured range, channel fixed at 0.
pub fn segment_notes(
    observations: &[PitchObservation],
    params: &SegmentParams,
) -> Result<Vec<NoteEvent>, SegmentError> {
    params.validate()?;
    let time_step = params.time_step();

    let mut events = Vec::new();
    let mut active_onsets: HashMap<u8, f64> = HashMap::new();
    let mut curr_time = 0.0f64;

    for obs in observations {
        if obs.is_voiced() {
            let pitch = hz_to_midi(obs.frequency_hz as f64).clamp(params.min_note, params.max_note);
            if let Entry::Vacant(slot) = active_onsets.entry(pitch) {
                slot.insert(curr_time);
                events.push(NoteEvent {
                    pitch,
                    onset: curr_time,
                    duration: time_step,
                    velocity: params.velocity,
                    channel: 0,
                });
            }
        }
        curr_time += time_step;
    }

    Ok(events)
}
