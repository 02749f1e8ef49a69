//! WAV decoding into an [`AudioBuffer`].

use std::path::Path;

use anyhow::{bail, Context, Result};
use wavescribe_core::AudioBuffer;

/// Load a WAV file, preserving its channel layout and sample rate.
///
/// Integer samples of 8, 16, 24, or 32 bits and 32-bit float samples
/// are normalized into [-1, 1]. Downmixing is left to the preprocessor.
pub fn load_wav(path: &Path) -> Result<AudioBuffer> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open WAV file: {}", path.display()))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("failed to read float samples")?,
        (hound::SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<Result<_, _>>()
            .context("failed to read 8-bit samples")?,
        (hound::SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<Result<_, _>>()
            .context("failed to read 16-bit samples")?,
        (hound::SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<Result<_, _>>()
            .context("failed to read 24-bit samples")?,
        (hound::SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<Result<_, _>>()
            .context("failed to read 32-bit samples")?,
        (format, bits) => bail!(
            "unsupported WAV format in '{}': {:?} at {} bits",
            path.display(),
            format,
            bits
        ),
    };

    Ok(AudioBuffer::new(spec.sample_rate, spec.channels, samples))
}
