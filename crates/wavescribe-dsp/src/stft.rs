//! Short-time Fourier transform over overlapping Hann-windowed frames.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use wavescribe_core::TranscriptionParams;

use crate::error::{DspError, DspResult};

/// Frame sizing for spectral analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameParams {
    /// Analysis window length in samples.
    pub window_length: usize,
    /// Hop between successive windows in samples.
    pub hop_length: usize,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            window_length: 2048,
            hop_length: 512,
        }
    }
}

impl From<&TranscriptionParams> for FrameParams {
    fn from(params: &TranscriptionParams) -> Self {
        Self {
            window_length: params.window_length,
            hop_length: params.hop_length,
        }
    }
}

impl FrameParams {
    fn validate(&self) -> DspResult<()> {
        if self.window_length == 0 {
            return Err(DspError::invalid_param("window_length", "must be positive"));
        }
        if self.hop_length == 0 {
            return Err(DspError::invalid_param("hop_length", "must be positive"));
        }
        Ok(())
    }

    fn validate_against(&self, signal_len: usize) -> DspResult<()> {
        self.validate()?;
        if self.window_length > signal_len {
            return Err(DspError::invalid_param(
                "window_length",
                format!(
                    "window of {} samples exceeds signal of {} samples",
                    self.window_length, signal_len
                ),
            ));
        }
        Ok(())
    }
}

/// Number of full analysis frames covering a signal of `signal_len`
/// samples: `floor((len - window) / hop) + 1`, or zero when the window
/// does not fit. Frames never read past the end of the signal.
pub fn frame_count(signal_len: usize, window_length: usize, hop_length: usize) -> usize {
    if window_length == 0 || hop_length == 0 || window_length > signal_len {
        return 0;
    }
    (signal_len - window_length) / hop_length + 1
}

/// One windowed slice of the analysis signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisFrame {
    /// Frame index, the sole ordering key for downstream consumers.
    pub index: usize,
    /// Offset of the first sample in the frame.
    pub start: usize,
    /// Window length in samples.
    pub window_length: usize,
    /// Hop to the next frame in samples.
    pub hop_length: usize,
}

impl AnalysisFrame {
    /// All frames covering `signal_len` samples, in index order.
    pub fn cover(signal_len: usize, params: FrameParams) -> Vec<AnalysisFrame> {
        (0..frame_count(signal_len, params.window_length, params.hop_length))
            .map(|index| AnalysisFrame {
                index,
                start: index * params.hop_length,
                window_length: params.window_length,
                hop_length: params.hop_length,
            })
            .collect()
    }
}

/// A complex spectrogram: one full-length FFT per analysis frame.
///
/// The upper half of each frame mirrors the lower (real input), so
/// magnitude consumers look at the first `num_bins` entries only; the
/// full spectrum is kept so a masked spectrogram can be resynthesized.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    params: FrameParams,
    frames: Vec<Vec<Complex<f32>>>,
}

impl Spectrogram {
    /// Frame sizing this spectrogram was computed with.
    pub fn params(&self) -> FrameParams {
        self.params
    }

    /// Number of analysis frames.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of non-mirrored bins (`window_length / 2 + 1`).
    pub fn num_bins(&self) -> usize {
        self.params.window_length / 2 + 1
    }

    /// Complex spectra, one per frame, `window_length` bins each.
    pub fn frames(&self) -> &[Vec<Complex<f32>>] {
        &self.frames
    }

    /// Mutable access for spectral masking.
    pub fn frames_mut(&mut self) -> &mut [Vec<Complex<f32>>] {
        &mut self.frames
    }

    /// Magnitudes for the non-mirrored bins, frames x bins.
    pub fn magnitudes(&self) -> Vec<Vec<f32>> {
        let bins = self.num_bins();
        self.frames
            .iter()
            .map(|frame| frame.iter().take(bins).map(|c| c.norm()).collect())
            .collect()
    }
}

/// Forward and inverse STFT with a Hann window.
pub struct Stft {
    params: FrameParams,
    window: Vec<f32>,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
}

impl Stft {
    /// Plan transforms for the given frame sizing.
    pub fn new(params: FrameParams) -> DspResult<Self> {
        params.validate()?;
        let mut planner = FftPlanner::new();
        Ok(Self {
            params,
            window: hann_window(params.window_length),
            forward: planner.plan_fft_forward(params.window_length),
            inverse: planner.plan_fft_inverse(params.window_length),
        })
    }

    /// Frame sizing this transform was planned for.
    pub fn params(&self) -> FrameParams {
        self.params
    }

    /// Compute the complex spectrogram of `signal`.
    pub fn analyze(&self, signal: &[f32]) -> DspResult<Spectrogram> {
        self.params.validate_against(signal.len())?;
        let n = self.params.window_length;
        let mut frames = Vec::with_capacity(frame_count(signal.len(), n, self.params.hop_length));
        for frame in AnalysisFrame::cover(signal.len(), self.params) {
            let slice = &signal[frame.start..frame.start + n];
            let mut buffer: Vec<Complex<f32>> = slice
                .iter()
                .zip(&self.window)
                .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
                .collect();
            self.forward.process(&mut buffer);
            frames.push(buffer);
        }
        Ok(Spectrogram {
            params: self.params,
            frames,
        })
    }

    /// Reconstruct a time signal from a (possibly masked) spectrogram by
    /// inverse transform and windowed overlap-add, normalized by the
    /// accumulated window energy so fully covered samples reconstruct
    /// exactly.
    pub fn synthesize(&self, spectrogram: &Spectrogram, output_len: usize) -> Vec<f32> {
        let n = self.params.window_length;
        let hop = self.params.hop_length;
        let scale = 1.0 / n as f32;
        let mut output = vec![0.0f32; output_len];
        let mut weight = vec![0.0f32; output_len];
        for (index, frame) in spectrogram.frames().iter().enumerate() {
            let start = index * hop;
            let mut buffer = frame.clone();
            self.inverse.process(&mut buffer);
            for (i, value) in buffer.iter().enumerate() {
                let pos = start + i;
                if pos >= output_len {
                    break;
                }
                output[pos] += value.re * scale * self.window[i];
                weight[pos] += self.window[i] * self.window[i];
            }
        }
        for (sample, &w) in output.iter_mut().zip(&weight) {
            if w > 1e-8 {
                *sample /= w;
            }
        }
        output
    }
}

/// Hann window of the given length.
fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / len as f32).cos()))
        .collect()
}
