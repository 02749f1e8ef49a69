//! SMF byte-stream validation and parsing.
//!
//! A strict reader for the files this crate writes: it checks chunk
//! magics and lengths, walks every delta time and event, and pairs each
//! Note-On with its Note-Off. Tests use it to prove round-trip
//! decodability; the CLI uses it for inspection.

use std::collections::HashMap;

use super::header::{SMF_HEADER_LENGTH, SMF_HEADER_MAGIC};
use super::track::{meta, META_PREFIX, SMF_TRACK_MAGIC, STATUS_NOTE_OFF, STATUS_NOTE_ON};
use super::vlq;

/// A note reconstructed from a Note-On/Note-Off pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNote {
    /// MIDI note number.
    pub pitch: u8,
    /// MIDI channel.
    pub channel: u8,
    /// Note-On velocity.
    pub velocity: u8,
    /// Absolute tick of the Note-On.
    pub on_tick: u32,
    /// Absolute tick of the Note-Off.
    pub off_tick: u32,
}

/// Summary of a parsed sequencer file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSmf {
    /// File format tag.
    pub format: u16,
    /// Declared number of track chunks.
    pub num_tracks: u16,
    /// Time division in ticks per beat.
    pub division: u16,
    /// Track name, if a name meta-event was present.
    pub track_name: Option<String>,
    /// Tempo payload, if a tempo meta-event was present.
    pub microseconds_per_beat: Option<u32>,
    /// Completed notes in note-off order.
    pub notes: Vec<ParsedNote>,
}

impl ParsedSmf {
    /// Tempo in beats per minute, if a tempo event was present.
    pub fn tempo_bpm(&self) -> Option<f64> {
        self.microseconds_per_beat
            .map(|us| 60_000_000.0 / us as f64)
    }
}

/// Validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// File is too small to hold a header chunk.
    FileTooSmall(usize),
    /// Header chunk magic is not `MThd`.
    InvalidMagic,
    /// Header chunk declares an unexpected payload length.
    InvalidHeaderLength(u32),
    /// SMPTE time division is not supported by this reader.
    SmpteDivision(u16),
    /// Track chunk magic is not `MTrk`.
    InvalidTrackMagic,
    /// A chunk runs past the end of the file.
    TruncatedChunk,
    /// Bytes remain after the last declared chunk.
    TrailingData(usize),
    /// A delta time is malformed or overlong.
    BadDeltaTime,
    /// Accumulated ticks overflow the tick counter.
    TickOverflow,
    /// An event runs past the end of its chunk.
    TruncatedEvent,
    /// A data byte arrived with no running status in effect.
    MissingRunningStatus,
    /// A meta-event payload has the wrong length.
    BadMetaLength {
        /// Meta-event type byte.
        meta_type: u8,
        /// Declared payload length.
        length: usize,
    },
    /// Unrecognized status byte.
    UnknownStatus(u8),
    /// A data byte has its high bit set.
    BadDataByte(u8),
    /// Note-On for a pitch that is already sounding.
    OverlappingNote {
        /// MIDI note number.
        pitch: u8,
        /// MIDI channel.
        channel: u8,
    },
    /// Note-Off with no matching Note-On.
    UnmatchedNoteOff {
        /// MIDI note number.
        pitch: u8,
        /// MIDI channel.
        channel: u8,
    },
    /// An event follows the end-of-track meta-event.
    EventAfterEnd,
    /// The track chunk ends without an end-of-track meta-event.
    MissingEndOfTrack,
    /// A note is still sounding at end of track.
    DanglingNote {
        /// MIDI note number.
        pitch: u8,
        /// MIDI channel.
        channel: u8,
    },
}

impl std::fmt::Display for ValidateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidateError::FileTooSmall(size) => write!(f, "file too small: {} bytes", size),
            ValidateError::InvalidMagic => write!(f, "invalid header magic"),
            ValidateError::InvalidHeaderLength(len) => {
                write!(f, "invalid header length: {}", len)
            }
            ValidateError::SmpteDivision(division) => {
                write!(f, "SMPTE time division not supported: {:#06x}", division)
            }
            ValidateError::InvalidTrackMagic => write!(f, "invalid track magic"),
            ValidateError::TruncatedChunk => write!(f, "chunk runs past end of file"),
            ValidateError::TrailingData(extra) => {
                write!(f, "{} trailing bytes after last chunk", extra)
            }
            ValidateError::BadDeltaTime => write!(f, "malformed delta time"),
            ValidateError::TickOverflow => write!(f, "tick counter overflow"),
            ValidateError::TruncatedEvent => write!(f, "event runs past end of chunk"),
            ValidateError::MissingRunningStatus => {
                write!(f, "data byte with no running status")
            }
            ValidateError::BadMetaLength { meta_type, length } => {
                write!(f, "meta-event {:#04x} has bad length {}", meta_type, length)
            }
            ValidateError::UnknownStatus(status) => {
                write!(f, "unknown status byte: {:#04x}", status)
            }
            ValidateError::BadDataByte(byte) => write!(f, "bad data byte: {:#04x}", byte),
            ValidateError::OverlappingNote { pitch, channel } => {
                write!(f, "note {} already sounding on channel {}", pitch, channel)
            }
            ValidateError::UnmatchedNoteOff { pitch, channel } => {
                write!(f, "note-off without note-on: {} on channel {}", pitch, channel)
            }
            ValidateError::EventAfterEnd => write!(f, "event after end-of-track"),
            ValidateError::MissingEndOfTrack => write!(f, "missing end-of-track"),
            ValidateError::DanglingNote { pitch, channel } => {
                write!(f, "note {} still sounding on channel {} at end of track", pitch, channel)
            }
        }
    }
}

impl std::error::Error for ValidateError {}

/// Validate an SMF byte stream without keeping the parse result.
pub fn validate_smf_bytes(data: &[u8]) -> Result<(), ValidateError> {
    parse_smf(data).map(|_| ())
}

/// Parse and validate a complete SMF byte stream.
pub fn parse_smf(data: &[u8]) -> Result<ParsedSmf, ValidateError> {
    if data.len() < 14 {
        return Err(ValidateError::FileTooSmall(data.len()));
    }
    if &data[0..4] != SMF_HEADER_MAGIC {
        return Err(ValidateError::InvalidMagic);
    }
    let header_len = read_u32(data, 4);
    if header_len != SMF_HEADER_LENGTH {
        return Err(ValidateError::InvalidHeaderLength(header_len));
    }
    let division = read_u16(data, 12);
    if division & 0x8000 != 0 {
        return Err(ValidateError::SmpteDivision(division));
    }

    let mut parsed = ParsedSmf {
        format: read_u16(data, 8),
        num_tracks: read_u16(data, 10),
        division,
        track_name: None,
        microseconds_per_beat: None,
        notes: Vec::new(),
    };

    let mut pos = 14usize;
    for _ in 0..parsed.num_tracks {
        if pos + 8 > data.len() {
            return Err(ValidateError::TruncatedChunk);
        }
        if &data[pos..pos + 4] != SMF_TRACK_MAGIC {
            return Err(ValidateError::InvalidTrackMagic);
        }
        let chunk_len = read_u32(data, pos + 4) as usize;
        pos += 8;
        let end = pos
            .checked_add(chunk_len)
            .filter(|&end| end <= data.len())
            .ok_or(ValidateError::TruncatedChunk)?;
        parse_track(&data[pos..end], &mut parsed)?;
        pos = end;
    }
    if pos != data.len() {
        return Err(ValidateError::TrailingData(data.len() - pos));
    }
    Ok(parsed)
}

fn parse_track(body: &[u8], parsed: &mut ParsedSmf) -> Result<(), ValidateError> {
    let mut pos = 0usize;
    let mut tick = 0u32;
    let mut running_status: Option<u8> = None;
    let mut open: HashMap<(u8, u8), (u32, u8)> = HashMap::new();
    let mut ended = false;

    while pos < body.len() {
        if ended {
            return Err(ValidateError::EventAfterEnd);
        }
        let (delta, used) = vlq::decode(&body[pos..]).ok_or(ValidateError::BadDeltaTime)?;
        pos += used;
        tick = tick.checked_add(delta).ok_or(ValidateError::TickOverflow)?;

        let first = *body.get(pos).ok_or(ValidateError::TruncatedEvent)?;
        let status = if first & 0x80 != 0 {
            pos += 1;
            // Meta and sysex events cancel running status.
            running_status = if first < 0xF0 { Some(first) } else { None };
            first
        } else {
            running_status.ok_or(ValidateError::MissingRunningStatus)?
        };

        match status {
            META_PREFIX => {
                let meta_type = *body.get(pos).ok_or(ValidateError::TruncatedEvent)?;
                pos += 1;
                let (length, used) =
                    vlq::decode(&body[pos..]).ok_or(ValidateError::TruncatedEvent)?;
                pos += used;
                let end = pos
                    .checked_add(length as usize)
                    .filter(|&end| end <= body.len())
                    .ok_or(ValidateError::TruncatedEvent)?;
                let payload = &body[pos..end];
                pos = end;
                match meta_type {
                    meta::TRACK_NAME => {
                        parsed.track_name = Some(String::from_utf8_lossy(payload).into_owned());
                    }
                    meta::SET_TEMPO => {
                        if payload.len() != 3 {
                            return Err(ValidateError::BadMetaLength {
                                meta_type,
                                length: payload.len(),
                            });
                        }
                        parsed.microseconds_per_beat = Some(
                            u32::from(payload[0]) << 16
                                | u32::from(payload[1]) << 8
                                | u32::from(payload[2]),
                        );
                    }
                    meta::END_OF_TRACK => {
                        if !payload.is_empty() {
                            return Err(ValidateError::BadMetaLength {
                                meta_type,
                                length: payload.len(),
                            });
                        }
                        ended = true;
                    }
                    // Other meta-events are valid but carry nothing the
                    // transcription round trip needs.
                    _ => {}
                }
            }
            0xF0 | 0xF7 => {
                let (length, used) =
                    vlq::decode(&body[pos..]).ok_or(ValidateError::TruncatedEvent)?;
                pos += used;
                pos = pos
                    .checked_add(length as usize)
                    .filter(|&end| end <= body.len())
                    .ok_or(ValidateError::TruncatedEvent)?;
            }
            _ => {
                let kind = status & 0xF0;
                let channel = status & 0x0F;
                let data_len = match kind {
                    0xC0 | 0xD0 => 1,
                    0x80 | 0x90 | 0xA0 | 0xB0 | 0xE0 => 2,
                    _ => return Err(ValidateError::UnknownStatus(status)),
                };
                if pos + data_len > body.len() {
                    return Err(ValidateError::TruncatedEvent);
                }
                let d1 = body[pos];
                let d2 = if data_len == 2 { body[pos + 1] } else { 0 };
                pos += data_len;
                if d1 & 0x80 != 0 {
                    return Err(ValidateError::BadDataByte(d1));
                }
                if d2 & 0x80 != 0 {
                    return Err(ValidateError::BadDataByte(d2));
                }

                if kind == STATUS_NOTE_ON && d2 > 0 {
                    if open.insert((channel, d1), (tick, d2)).is_some() {
                        return Err(ValidateError::OverlappingNote {
                            pitch: d1,
                            channel,
                        });
                    }
                } else if kind == STATUS_NOTE_OFF || kind == STATUS_NOTE_ON {
                    let (on_tick, velocity) =
                        open.remove(&(channel, d1))
                            .ok_or(ValidateError::UnmatchedNoteOff {
                                pitch: d1,
                                channel,
                            })?;
                    parsed.notes.push(ParsedNote {
                        pitch: d1,
                        channel,
                        velocity,
                        on_tick,
                        off_tick: tick,
                    });
                }
            }
        }
    }
    if !ended {
        return Err(ValidateError::MissingEndOfTrack);
    }
    if let Some((&(channel, pitch), _)) = open.iter().next() {
        return Err(ValidateError::DanglingNote { pitch, channel });
    }
    Ok(())
}

fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn minimal_file() -> Vec<u8> {
        let mut bytes = vec![
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x03, 0xC0,
        ];
        let body: &[u8] = &[
            0x00, 0xFF, 0x03, 0x04, b'T', b'e', b's', b't', // name
            0x00, 0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20, // 500000 us = 120 bpm
            0x00, 0x90, 69, 100, // note on A4
            0x87, 0x40, 0x80, 69, 0x00, // note off one beat later
            0x00, 0xFF, 0x2F, 0x00, // end of track
        ];
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn test_parse_minimal_file() {
        let parsed = parse_smf(&minimal_file()).unwrap();
        assert_eq!(parsed.format, 0);
        assert_eq!(parsed.num_tracks, 1);
        assert_eq!(parsed.division, 960);
        assert_eq!(parsed.track_name.as_deref(), Some("Test"));
        assert_eq!(parsed.microseconds_per_beat, Some(500_000));
        assert_eq!(parsed.tempo_bpm(), Some(120.0));
        assert_eq!(
            parsed.notes,
            vec![ParsedNote {
                pitch: 69,
                channel: 0,
                velocity: 100,
                on_tick: 0,
                off_tick: 960,
            }]
        );
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = minimal_file();
        bytes[0] = b'X';
        assert_eq!(parse_smf(&bytes), Err(ValidateError::InvalidMagic));
    }

    #[test]
    fn test_trailing_data_rejected() {
        let mut bytes = minimal_file();
        bytes.push(0x00);
        assert_eq!(parse_smf(&bytes), Err(ValidateError::TrailingData(1)));
    }

    #[test]
    fn test_truncated_chunk_rejected() {
        let bytes = minimal_file();
        assert_eq!(
            parse_smf(&bytes[..bytes.len() - 4]),
            Err(ValidateError::TruncatedChunk)
        );
    }

    #[test]
    fn test_dangling_note_rejected() {
        let mut bytes = vec![
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x03, 0xC0,
        ];
        let body: &[u8] = &[
            0x00, 0x90, 69, 100, // note on, never released
            0x00, 0xFF, 0x2F, 0x00,
        ];
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        assert_eq!(
            parse_smf(&bytes),
            Err(ValidateError::DanglingNote {
                pitch: 69,
                channel: 0
            })
        );
    }

    #[test]
    fn test_note_on_velocity_zero_is_note_off() {
        let mut bytes = vec![
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x03, 0xC0,
        ];
        let body: &[u8] = &[
            0x00, 0x90, 60, 100, // note on
            0x60, 0x90, 60, 0, // note on with zero velocity releases it
            0x00, 0xFF, 0x2F, 0x00,
        ];
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        let parsed = parse_smf(&bytes).unwrap();
        assert_eq!(parsed.notes.len(), 1);
        assert_eq!(parsed.notes[0].off_tick, 0x60);
    }

    #[test]
    fn test_running_status_accepted() {
        let mut bytes = vec![
            b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x03, 0xC0,
        ];
        let body: &[u8] = &[
            0x00, 0x90, 60, 100, // explicit status
            0x10, 64, 100, // running status note on
            0x10, 60, 0, // running status release
            0x10, 64, 0, // running status release
            0x00, 0xFF, 0x2F, 0x00,
        ];
        bytes.extend_from_slice(b"MTrk");
        bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
        bytes.extend_from_slice(body);
        let parsed = parse_smf(&bytes).unwrap();
        assert_eq!(parsed.notes.len(), 2);
    }
}
