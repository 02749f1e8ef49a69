//! Pitch stabilization by harmonic/percussive separation.
//!
//! Transient energy corrupts fundamental-frequency estimation, so the
//! default stabilizer suppresses it before tracking: median-filter a
//! magnitude spectrogram along the time axis (harmonic enhancement) and
//! along the frequency axis (percussive enhancement), build soft masks
//! from the two estimates, and resynthesize only the harmonic component.

use rustfft::num_complex::Complex;

use crate::error::DspResult;
use crate::stft::{FrameParams, Stft};

/// A pluggable stabilization stage run on the mono signal before pitch
/// tracking. Implementations must be pure functions of their input so
/// the pipeline stays deterministic and re-entrant.
pub trait PitchStabilizer {
    /// Return the stabilized signal, same length as the input.
    fn stabilize(&self, signal: &[f32], sample_rate: u32) -> DspResult<Vec<f32>>;
}

/// Passes the signal through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStabilizer;

impl PitchStabilizer for NoOpStabilizer {
    fn stabilize(&self, signal: &[f32], _sample_rate: u32) -> DspResult<Vec<f32>> {
        Ok(signal.to_vec())
    }
}

/// Median-filtering separator that keeps the harmonic component and
/// discards the percussive one.
#[derive(Debug, Clone)]
pub struct HarmonicSeparator {
    frame: FrameParams,
    kernel_length: usize,
    mask_power: f32,
}

impl HarmonicSeparator {
    /// Default median kernel length, in frames along time and bins along
    /// frequency.
    pub const DEFAULT_KERNEL_LENGTH: usize = 17;
    /// Default soft-mask exponent.
    pub const DEFAULT_MASK_POWER: f32 = 2.0;

    /// Separator using the given frame sizing and default kernel.
    pub fn new(frame: FrameParams) -> Self {
        Self {
            frame,
            kernel_length: Self::DEFAULT_KERNEL_LENGTH,
            mask_power: Self::DEFAULT_MASK_POWER,
        }
    }

    /// Override the median kernel length. Even lengths round up to stay
    /// centered.
    pub fn with_kernel_length(mut self, kernel_length: usize) -> Self {
        self.kernel_length = kernel_length.max(1) | 1;
        self
    }
}

impl Default for HarmonicSeparator {
    fn default() -> Self {
        Self::new(FrameParams::default())
    }
}

impl PitchStabilizer for HarmonicSeparator {
    fn stabilize(&self, signal: &[f32], _sample_rate: u32) -> DspResult<Vec<f32>> {
        // Signals too short for a single analysis frame pass through;
        // the tracker reports its own sizing error for them.
        if signal.len() < self.frame.window_length {
            return Ok(signal.to_vec());
        }

        let stft = Stft::new(self.frame)?;
        let mut spectrogram = stft.analyze(signal)?;
        let mags = spectrogram.magnitudes();
        let num_frames = mags.len();
        if num_frames == 0 {
            return Ok(signal.to_vec());
        }
        let num_bins = spectrogram.num_bins();
        let half = self.kernel_length / 2;
        let mut scratch = Vec::with_capacity(self.kernel_length);

        // Harmonic enhancement: median along time, per bin.
        let mut harmonic = vec![vec![0.0f32; num_bins]; num_frames];
        for bin in 0..num_bins {
            for t in 0..num_frames {
                let lo = t.saturating_sub(half);
                let hi = (t + half + 1).min(num_frames);
                scratch.clear();
                scratch.extend((lo..hi).map(|u| mags[u][bin]));
                harmonic[t][bin] = median(&mut scratch);
            }
        }

        // Percussive enhancement: median along frequency, per frame.
        let mut percussive = vec![vec![0.0f32; num_bins]; num_frames];
        for (t, frame_mags) in mags.iter().enumerate() {
            for bin in 0..num_bins {
                let lo = bin.saturating_sub(half);
                let hi = (bin + half + 1).min(num_bins);
                scratch.clear();
                scratch.extend(frame_mags[lo..hi].iter().copied());
                percussive[t][bin] = median(&mut scratch);
            }
        }

        // Soft Wiener-style masks; the upper mirrored bins reuse the
        // mask of their conjugate partner.
        let n = self.frame.window_length;
        for (t, frame) in spectrogram.frames_mut().iter_mut().enumerate() {
            for (k, value) in frame.iter_mut().enumerate() {
                let bin = if k < num_bins { k } else { n - k };
                let h = harmonic[t][bin].powf(self.mask_power);
                let p = percussive[t][bin].powf(self.mask_power);
                let mask = if h + p > f32::EPSILON { h / (h + p) } else { 0.0 };
                *value = Complex::new(value.re * mask, value.im * mask);
            }
        }

        Ok(stft.synthesize(&spectrogram, signal.len()))
    }
}

fn median(values: &mut Vec<f32>) -> f32 {
    values.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values[values.len() / 2]
}
