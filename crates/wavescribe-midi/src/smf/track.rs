//! SMF track chunk and event serialization.

use std::io::{self, Write};

use byteorder::{BigEndian, WriteBytesExt};

use super::vlq::write_vlq;

/// Track chunk magic identifier.
pub const SMF_TRACK_MAGIC: &[u8; 4] = b"MTrk";

/// Status nibble for Note-Off events.
pub const STATUS_NOTE_OFF: u8 = 0x80;
/// Status nibble for Note-On events.
pub const STATUS_NOTE_ON: u8 = 0x90;
/// Prefix byte of every meta-event.
pub const META_PREFIX: u8 = 0xFF;

/// Meta-event type bytes emitted by this writer.
pub mod meta {
    /// Track name (text).
    pub const TRACK_NAME: u8 = 0x03;
    /// Set tempo (microseconds per beat, 3 bytes).
    pub const SET_TEMPO: u8 = 0x51;
    /// End of track.
    pub const END_OF_TRACK: u8 = 0x2F;
}

/// The events this writer emits into a track chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    /// Track name meta-event.
    TrackName(String),
    /// Tempo meta-event.
    SetTempo {
        /// Microseconds per beat (24-bit payload).
        microseconds_per_beat: u32,
    },
    /// Note-Off channel event. Release velocity is fixed at zero.
    NoteOff {
        /// MIDI channel, 0-15.
        channel: u8,
        /// MIDI note number, 0-127.
        pitch: u8,
    },
    /// Note-On channel event.
    NoteOn {
        /// MIDI channel, 0-15.
        channel: u8,
        /// MIDI note number, 0-127.
        pitch: u8,
        /// Velocity, 1-127 (zero would mean note-off).
        velocity: u8,
    },
    /// End-of-track meta-event.
    EndOfTrack,
}

impl TrackEvent {
    /// Fixed ordering for events that share a tick: metadata first, then
    /// note-offs ahead of note-ons so releases precede new onsets, with
    /// end-of-track always last.
    fn order_rank(&self) -> u8 {
        match self {
            TrackEvent::TrackName(_) => 0,
            TrackEvent::SetTempo { .. } => 1,
            TrackEvent::NoteOff { .. } => 2,
            TrackEvent::NoteOn { .. } => 3,
            TrackEvent::EndOfTrack => 4,
        }
    }

    fn pitch_rank(&self) -> u8 {
        match self {
            TrackEvent::NoteOff { pitch, .. } | TrackEvent::NoteOn { pitch, .. } => *pitch,
            _ => 0,
        }
    }

    /// Serialize the event body (without its delta time).
    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            TrackEvent::TrackName(name) => {
                writer.write_all(&[META_PREFIX, meta::TRACK_NAME])?;
                write_vlq(writer, name.len() as u32)?;
                writer.write_all(name.as_bytes())
            }
            TrackEvent::SetTempo {
                microseconds_per_beat,
            } => {
                writer.write_all(&[META_PREFIX, meta::SET_TEMPO, 0x03])?;
                writer.write_u24::<BigEndian>(*microseconds_per_beat)
            }
            TrackEvent::NoteOff { channel, pitch } => {
                writer.write_all(&[STATUS_NOTE_OFF | channel, *pitch, 0x00])
            }
            TrackEvent::NoteOn {
                channel,
                pitch,
                velocity,
            } => writer.write_all(&[STATUS_NOTE_ON | channel, *pitch, *velocity]),
            TrackEvent::EndOfTrack => {
                writer.write_all(&[META_PREFIX, meta::END_OF_TRACK, 0x00])
            }
        }
    }
}

/// An event at an absolute tick position.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEvent {
    /// Absolute tick from the start of the track.
    pub tick: u32,
    /// The event itself.
    pub event: TrackEvent,
}

/// A track chunk holding events at absolute ticks.
///
/// Delta times are computed at write time, so the event list must be in
/// non-decreasing tick order by then; `sort` establishes the canonical
/// deterministic order.
#[derive(Debug, Clone, Default)]
pub struct TrackChunk {
    events: Vec<TimedEvent>,
}

impl TrackChunk {
    /// Create an empty chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at an absolute tick.
    pub fn push(&mut self, tick: u32, event: TrackEvent) {
        self.events.push(TimedEvent { tick, event });
    }

    /// Events in their current order.
    pub fn events(&self) -> &[TimedEvent] {
        &self.events
    }

    /// Sort into the canonical order: by tick, then by the fixed event
    /// rank, then by pitch. Stable, so equal keys keep insertion order.
    pub fn sort(&mut self) {
        self.events.sort_by_key(|timed| {
            (
                timed.tick,
                timed.event.order_rank(),
                timed.event.pitch_rank(),
            )
        });
    }

    /// Write the complete chunk: magic, payload length, delta-encoded
    /// events.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut body = Vec::new();
        let mut prev_tick = 0u32;
        for timed in &self.events {
            let delta = timed.tick.checked_sub(prev_tick).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "track events not in tick order",
                )
            })?;
            write_vlq(&mut body, delta)?;
            timed.event.write(&mut body)?;
            prev_tick = timed.tick;
        }
        writer.write_all(SMF_TRACK_MAGIC)?;
        writer.write_u32::<BigEndian>(body.len() as u32)?;
        writer.write_all(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_note_events_serialize() {
        let mut chunk = TrackChunk::new();
        chunk.push(
            0,
            TrackEvent::NoteOn {
                channel: 0,
                pitch: 69,
                velocity: 100,
            },
        );
        chunk.push(960, TrackEvent::NoteOff { channel: 0, pitch: 69 });
        chunk.push(960, TrackEvent::EndOfTrack);

        let mut bytes = Vec::new();
        chunk.write(&mut bytes).unwrap();
        assert_eq!(&bytes[0..4], SMF_TRACK_MAGIC);
        // delta 0, on; delta 960 (0x87 0x40), off; delta 0, end of track
        assert_eq!(
            &bytes[8..],
            &[
                0x00, 0x90, 69, 100, // note on
                0x87, 0x40, 0x80, 69, 0x00, // note off after one beat
                0x00, 0xFF, 0x2F, 0x00, // end of track
            ]
        );
    }

    #[test]
    fn test_sort_orders_offs_before_ons() {
        let mut chunk = TrackChunk::new();
        chunk.push(
            480,
            TrackEvent::NoteOn {
                channel: 0,
                pitch: 72,
                velocity: 100,
            },
        );
        chunk.push(480, TrackEvent::NoteOff { channel: 0, pitch: 69 });
        chunk.sort();
        assert!(matches!(
            chunk.events()[0].event,
            TrackEvent::NoteOff { pitch: 69, .. }
        ));
        assert!(matches!(
            chunk.events()[1].event,
            TrackEvent::NoteOn { pitch: 72, .. }
        ));
    }

    #[test]
    fn test_unsorted_ticks_rejected_at_write() {
        let mut chunk = TrackChunk::new();
        chunk.push(960, TrackEvent::EndOfTrack);
        chunk.push(0, TrackEvent::TrackName("late".into()));
        let mut bytes = Vec::new();
        assert!(chunk.write(&mut bytes).is_err());
    }
}
