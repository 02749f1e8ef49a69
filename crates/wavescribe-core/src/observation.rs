//! Per-frame pitch estimates.

/// One fundamental-frequency estimate for a single analysis frame.
///
/// Observations are produced by the pitch tracker in increasing frame
/// order and consumed immediately by the note segmenter; they are not
/// retained after segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchObservation {
    /// Index of the analysis frame this estimate belongs to.
    pub frame: usize,
    /// Estimated fundamental frequency in Hz. Zero marks an unvoiced
    /// frame; consumers must treat it as "no note active", never as a
    /// valid pitch.
    pub frequency_hz: f32,
    /// Spectral magnitude of the selected bin, a relative confidence.
    pub magnitude: f32,
}

impl PitchObservation {
    /// An unvoiced observation for the given frame.
    pub fn unvoiced(frame: usize) -> Self {
        Self {
            frame,
            frequency_hz: 0.0,
            magnitude: 0.0,
        }
    }

    /// True if a pitch was detected for this frame.
    pub fn is_voiced(&self) -> bool {
        self.frequency_hz > 0.0
    }
}
