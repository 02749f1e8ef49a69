//! Wavescribe DSP stages.
//!
//! This crate owns the two signal-processing stages of the pipeline:
//!
//! - [`preprocess`]: downmix an [`wavescribe_core::AudioBuffer`] to a
//!   single analysis channel and run a pluggable pitch-stabilization
//!   step (harmonic/percussive separation by default)
//! - [`track_pitch`]: estimate a dominant fundamental frequency and
//!   magnitude for every overlapping analysis frame
//!
//! Both stages are pure functions of their inputs. There is no shared
//! state between calls and no process-wide cache, so concurrent
//! transcription requests do not interact.
//!
//! # Determinism
//!
//! All processing is deterministic: for the same input samples and
//! parameters the observation stream is identical across runs. Frame
//! index is the sole ordering key.

pub mod error;
pub mod pitch;
pub mod preprocess;
pub mod separate;
pub mod stft;

pub use error::{DspError, DspResult};
pub use pitch::track_pitch;
pub use preprocess::{downmix, preprocess, MonoSignal};
pub use separate::{HarmonicSeparator, NoOpStabilizer, PitchStabilizer};
pub use stft::{frame_count, AnalysisFrame, FrameParams, Spectrogram, Stft};

/// Crate version for pipeline identification.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
