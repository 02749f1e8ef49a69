//! Symbolic note events and tracks.

use serde::{Deserialize, Serialize};

/// A symbolic note derived from the pitch stream.
///
/// Times are in beats at the track tempo. `pitch`, `velocity`, and
/// `channel` must fit the MIDI data-byte ranges (0-127, 0-127, 0-15);
/// the encoder rejects events that do not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI note number, clamped into the configured note range.
    pub pitch: u8,
    /// Onset time in beats, non-negative.
    pub onset: f64,
    /// Duration in beats, positive.
    pub duration: f64,
    /// Note-on velocity.
    pub velocity: u8,
    /// MIDI channel.
    pub channel: u8,
}

impl NoteEvent {
    /// End time of the note in beats.
    pub fn end(&self) -> f64 {
        self.onset + self.duration
    }
}

/// An ordered collection of note events plus track metadata.
///
/// Events are kept in the order they were appended; the segmenter emits
/// them in a single linear sweep, so onsets are non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track name written into the sequencer file.
    pub name: String,
    /// Tempo in beats per minute, positive.
    pub tempo_bpm: f64,
    /// Ordered note events.
    pub events: Vec<NoteEvent>,
}

impl Track {
    /// Create an empty track.
    pub fn new(name: impl Into<String>, tempo_bpm: f64) -> Self {
        Self {
            name: name.into(),
            tempo_bpm,
            events: Vec::new(),
        }
    }

    /// Append an event. Callers append in onset order.
    pub fn push(&mut self, event: NoteEvent) {
        debug_assert!(
            self.events.last().map_or(true, |last| event.onset >= last.onset),
            "events must be appended in onset order"
        );
        self.events.push(event);
    }

    /// End of the last-sounding event in beats, or zero for an empty track.
    pub fn end(&self) -> f64 {
        self.events.iter().map(NoteEvent::end).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_track_end() {
        let mut track = Track::new("test", 120.0);
        assert_eq!(track.end(), 0.0);
        track.push(NoteEvent {
            pitch: 69,
            onset: 0.5,
            duration: 0.25,
            velocity: 100,
            channel: 0,
        });
        track.push(NoteEvent {
            pitch: 72,
            onset: 0.6,
            duration: 0.1,
            velocity: 100,
            channel: 0,
        });
        assert!((track.end() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_note_event_serde_round_trip() {
        let event = NoteEvent {
            pitch: 60,
            onset: 1.25,
            duration: 0.5,
            velocity: 90,
            channel: 0,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: NoteEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
