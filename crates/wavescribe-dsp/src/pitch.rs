//! Spectral pitch tracking.
//!
//! For every overlapping analysis frame the tracker computes a magnitude
//! spectrum, refines each candidate bin with parabolic interpolation of
//! the peak neighborhood, and reports the refined frequency of the
//! strongest bin together with its magnitude. Frames with no spectral
//! energy report frequency zero, the unvoiced sentinel.

use rustfft::num_complex::Complex;

use wavescribe_core::PitchObservation;

use crate::error::{DspError, DspResult};
use crate::preprocess::MonoSignal;
use crate::stft::{FrameParams, Stft};

/// Lowest frequency considered when searching for the dominant bin.
/// DC and sub-audible rumble carry offset, not pitch.
const MIN_TRACKED_HZ: f32 = 20.0;

/// Estimate a dominant fundamental per frame.
///
/// Output length equals the frame-count formula in [`crate::frame_count`]
/// and observations come out in increasing frame order from a single
/// forward pass.
pub fn track_pitch(signal: &MonoSignal, params: FrameParams) -> DspResult<Vec<PitchObservation>> {
    if signal.sample_rate == 0 {
        return Err(DspError::invalid_audio("sample rate must be positive"));
    }
    let stft = Stft::new(params)?;
    let spectrogram = stft.analyze(&signal.samples)?;

    let n = params.window_length;
    let freq_resolution = signal.sample_rate as f32 / n as f32;
    let nyquist_bin = n / 2;
    let min_bin = ((MIN_TRACKED_HZ / freq_resolution).ceil() as usize).max(1);

    let mut observations = Vec::with_capacity(spectrogram.num_frames());
    for (index, frame) in spectrogram.frames().iter().enumerate() {
        let mut best_bin = 0usize;
        let mut best_mag = 0.0f32;
        for bin in min_bin..nyquist_bin {
            let mag = frame[bin].norm();
            if mag > best_mag {
                best_mag = mag;
                best_bin = bin;
            }
        }
        if best_mag <= 0.0 {
            observations.push(PitchObservation::unvoiced(index));
            continue;
        }
        let frequency_hz = (best_bin as f32 + peak_offset(frame, best_bin)) * freq_resolution;
        observations.push(PitchObservation {
            frame: index,
            frequency_hz,
            magnitude: best_mag,
        });
    }
    Ok(observations)
}

/// Parabolic interpolation of the spectral peak around `bin`, returning
/// a fractional bin offset in [-0.5, 0.5].
fn peak_offset(frame: &[Complex<f32>], bin: usize) -> f32 {
    let prev = frame[bin - 1].norm();
    let cur = frame[bin].norm();
    let next = frame[bin + 1].norm();
    let denom = prev - 2.0 * cur + next;
    if denom.abs() < f32::EPSILON {
        return 0.0;
    }
    (0.5 * (prev - next) / denom).clamp(-0.5, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stft::frame_count;
    use pretty_assertions::assert_eq;

    fn tone(freq: f32, sample_rate: u32, len: usize) -> MonoSignal {
        MonoSignal {
            samples: (0..len)
                .map(|i| {
                    (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
                })
                .collect(),
            sample_rate,
        }
    }

    #[test]
    fn test_observation_count_matches_formula() {
        let signal = tone(440.0, 32000, 32000);
        let params = FrameParams::default();
        let observations = track_pitch(&signal, params).unwrap();
        assert_eq!(
            observations.len(),
            frame_count(32000, params.window_length, params.hop_length)
        );
        assert_eq!(observations.len(), 59);
        for (i, obs) in observations.iter().enumerate() {
            assert_eq!(obs.frame, i);
        }
    }

    #[test]
    fn test_pure_tone_tracks_near_440() {
        let signal = tone(440.0, 32000, 32000);
        let observations = track_pitch(&signal, FrameParams::default()).unwrap();
        for obs in &observations {
            assert!(obs.is_voiced());
            assert!(
                (obs.frequency_hz - 440.0).abs() < 5.0,
                "frame {} tracked {} Hz",
                obs.frame,
                obs.frequency_hz
            );
            assert!(obs.magnitude > 0.0);
        }
    }

    #[test]
    fn test_silence_is_unvoiced() {
        let signal = MonoSignal {
            samples: vec![0.0; 32000],
            sample_rate: 32000,
        };
        let observations = track_pitch(&signal, FrameParams::default()).unwrap();
        assert_eq!(observations.len(), 59);
        for obs in &observations {
            assert!(!obs.is_voiced());
            assert_eq!(obs.frequency_hz, 0.0);
            assert_eq!(obs.magnitude, 0.0);
        }
    }

    #[test]
    fn test_window_larger_than_signal_rejected() {
        let signal = tone(440.0, 32000, 1024);
        assert!(matches!(
            track_pitch(&signal, FrameParams::default()),
            Err(DspError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let signal = tone(440.0, 32000, 4096);
        for params in [
            FrameParams {
                window_length: 0,
                hop_length: 512,
            },
            FrameParams {
                window_length: 2048,
                hop_length: 0,
            },
        ] {
            assert!(matches!(
                track_pitch(&signal, params),
                Err(DspError::InvalidParameters { .. })
            ));
        }
    }
}
