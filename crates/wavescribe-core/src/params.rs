//! Per-call transcription configuration.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// Default lowest emitted MIDI note (C2).
pub const DEFAULT_MIN_NOTE: u8 = 36;
/// Default highest emitted MIDI note (C6).
pub const DEFAULT_MAX_NOTE: u8 = 84;
/// Default tempo in beats per minute.
pub const DEFAULT_TEMPO_BPM: f64 = 120.0;
/// Default note-on velocity.
pub const DEFAULT_VELOCITY: u8 = 100;
/// Default analysis window length in samples.
pub const DEFAULT_WINDOW_LENGTH: usize = 2048;
/// Default hop between analysis windows in samples.
pub const DEFAULT_HOP_LENGTH: usize = 512;

/// Configuration for one transcription call.
///
/// One explicit structure rather than scattered function arguments, so
/// the pipeline contract stays stable as parameters grow. Every field
/// has a default; `validate` rejects inconsistent combinations before
/// any stage runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TranscriptionParams {
    /// Lowest MIDI note emitted; detected pitches below clamp to it.
    pub min_note: u8,
    /// Highest MIDI note emitted; detected pitches above clamp to it.
    pub max_note: u8,
    /// Tempo written to the output file, in beats per minute.
    pub tempo_bpm: f64,
    /// Velocity assigned to every emitted note.
    pub velocity: u8,
    /// Analysis window length in samples.
    pub window_length: usize,
    /// Hop between analysis windows in samples.
    pub hop_length: usize,
    /// Whether harmonic/percussive separation runs before pitch tracking.
    pub separation: bool,
}

impl Default for TranscriptionParams {
    fn default() -> Self {
        Self {
            min_note: DEFAULT_MIN_NOTE,
            max_note: DEFAULT_MAX_NOTE,
            tempo_bpm: DEFAULT_TEMPO_BPM,
            velocity: DEFAULT_VELOCITY,
            window_length: DEFAULT_WINDOW_LENGTH,
            hop_length: DEFAULT_HOP_LENGTH,
            separation: true,
        }
    }
}

impl TranscriptionParams {
    /// Check the parameter set for internal consistency.
    ///
    /// Individual stages still guard the subset they own; this runs once
    /// up front so a bad configuration fails before any audio is touched.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.min_note > self.max_note {
            return Err(ParamsError::NoteRange {
                min: self.min_note,
                max: self.max_note,
            });
        }
        if !self.tempo_bpm.is_finite() || self.tempo_bpm <= 0.0 {
            return Err(ParamsError::Tempo {
                bpm: self.tempo_bpm,
            });
        }
        if self.velocity > 127 {
            return Err(ParamsError::Velocity {
                velocity: self.velocity,
            });
        }
        if self.window_length == 0 {
            return Err(ParamsError::WindowLength(self.window_length));
        }
        if self.hop_length == 0 {
            return Err(ParamsError::HopLength(self.hop_length));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let params = TranscriptionParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.min_note, 36);
        assert_eq!(params.max_note, 84);
        assert_eq!(params.window_length, 2048);
        assert_eq!(params.hop_length, 512);
    }

    #[test]
    fn test_inverted_note_range_rejected() {
        let params = TranscriptionParams {
            min_note: 84,
            max_note: 36,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::NoteRange { min: 84, max: 36 })
        ));
    }

    #[test]
    fn test_bad_tempo_rejected() {
        for bpm in [0.0, -120.0, f64::NAN, f64::INFINITY] {
            let params = TranscriptionParams {
                tempo_bpm: bpm,
                ..Default::default()
            };
            assert!(params.validate().is_err(), "tempo {} accepted", bpm);
        }
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let params = TranscriptionParams {
            window_length: 0,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::WindowLength(0))
        ));
        let params = TranscriptionParams {
            hop_length: 0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(ParamsError::HopLength(0))));
    }

    #[test]
    fn test_serde_defaults() {
        let params: TranscriptionParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, TranscriptionParams::default());

        let params: TranscriptionParams =
            serde_json::from_str(r#"{"min_note": 48, "separation": false}"#).unwrap();
        assert_eq!(params.min_note, 48);
        assert!(!params.separation);
        assert_eq!(params.max_note, DEFAULT_MAX_NOTE);
    }
}
