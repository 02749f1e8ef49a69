//! CLI argument definitions.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined
//! here, keeping `main.rs` focused on dispatch logic.

use clap::{Args, Parser, Subcommand};
use wavescribe_core::params::{
    DEFAULT_HOP_LENGTH, DEFAULT_MAX_NOTE, DEFAULT_MIN_NOTE, DEFAULT_TEMPO_BPM, DEFAULT_VELOCITY,
    DEFAULT_WINDOW_LENGTH,
};

/// Wavescribe - audio-to-MIDI transcription
#[derive(Parser)]
#[command(name = "wavescribe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transcribe a WAV file into a standard MIDI file
    Transcribe(TranscribeArgs),

    /// Parse a MIDI file and print its transcription summary
    Inspect {
        /// Path to the MIDI file
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON instead of colored text
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for the transcribe command.
#[derive(Args)]
pub struct TranscribeArgs {
    /// Path to the input WAV file
    #[arg(short, long)]
    pub input: String,

    /// Path to the output MIDI file
    #[arg(short, long)]
    pub output: String,

    /// Lowest MIDI note emitted; detected pitches below clamp to it
    #[arg(long, default_value_t = DEFAULT_MIN_NOTE)]
    pub min_note: u8,

    /// Highest MIDI note emitted; detected pitches above clamp to it
    #[arg(long, default_value_t = DEFAULT_MAX_NOTE)]
    pub max_note: u8,

    /// Tempo written to the MIDI file, in beats per minute
    #[arg(long, default_value_t = DEFAULT_TEMPO_BPM)]
    pub tempo: f64,

    /// Velocity assigned to every emitted note (0-127)
    #[arg(long, default_value_t = DEFAULT_VELOCITY)]
    pub velocity: u8,

    /// Analysis window length in samples
    #[arg(long, default_value_t = DEFAULT_WINDOW_LENGTH)]
    pub window_length: usize,

    /// Hop between analysis windows in samples
    #[arg(long, default_value_t = DEFAULT_HOP_LENGTH)]
    pub hop_length: usize,

    /// Track name written to the MIDI file
    #[arg(long, default_value = "Generated from Audio")]
    pub track_name: String,

    /// Skip harmonic/percussive separation before pitch tracking
    #[arg(long)]
    pub no_separation: bool,

    /// Output machine-readable JSON instead of colored text
    #[arg(long)]
    pub json: bool,
}
