//! Waveform normalization to a single analysis channel.

use wavescribe_core::AudioBuffer;

use crate::error::{DspError, DspResult};
use crate::separate::PitchStabilizer;

/// A single-channel analysis signal plus its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoSignal {
    /// Samples in [-1, 1].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// Average an interleaved buffer down to one channel.
///
/// Multi-channel buffers take the arithmetic mean across channels at
/// each sample index; mono buffers pass through. Fails with
/// [`DspError::InvalidAudio`] for empty or malformed buffers.
pub fn downmix(buffer: &AudioBuffer) -> DspResult<MonoSignal> {
    if buffer.is_empty() {
        return Err(DspError::invalid_audio("buffer contains no samples"));
    }
    if buffer.sample_rate() == 0 {
        return Err(DspError::invalid_audio("sample rate must be positive"));
    }
    if buffer.channels() == 0 {
        return Err(DspError::invalid_audio("channel count must be positive"));
    }
    let channels = buffer.channels() as usize;
    if buffer.samples().len() % channels != 0 {
        return Err(DspError::invalid_audio(format!(
            "{} samples do not divide into {} channels",
            buffer.samples().len(),
            channels
        )));
    }

    let samples = if channels == 1 {
        buffer.samples().to_vec()
    } else {
        buffer
            .samples()
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(MonoSignal {
        samples,
        sample_rate: buffer.sample_rate(),
    })
}

/// Normalize a buffer for pitch analysis: downmix to mono, then run the
/// given stabilization stage. Pure function of its inputs.
pub fn preprocess(buffer: &AudioBuffer, stabilizer: &dyn PitchStabilizer) -> DspResult<MonoSignal> {
    let mono = downmix(buffer)?;
    let samples = stabilizer.stabilize(&mono.samples, mono.sample_rate)?;
    Ok(MonoSignal {
        samples,
        sample_rate: mono.sample_rate,
    })
}
