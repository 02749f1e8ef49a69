//! Transcribe command implementation.
//!
//! Runs the full pipeline: WAV decode, downmix + harmonic separation,
//! pitch tracking, note segmentation, SMF encoding, atomic write.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use wavescribe_core::TranscriptionParams;
use wavescribe_dsp::{
    preprocess, track_pitch, FrameParams, HarmonicSeparator, NoOpStabilizer, PitchStabilizer,
};
use wavescribe_midi::{segment_notes, write_to_path, SegmentParams};

use crate::cli_args::TranscribeArgs;
use crate::input::load_wav;

/// Machine-readable transcription summary.
#[derive(Debug, Serialize)]
struct TranscribeSummary<'a> {
    input: &'a str,
    output: &'a str,
    sample_rate: u32,
    channels: u16,
    frames: usize,
    voiced_frames: usize,
    events: usize,
    duration_beats: f64,
    hash: String,
}

/// Run the transcribe command.
///
/// # Returns
/// Exit code: 0 on success, 1 on any propagated failure.
pub fn run(args: &TranscribeArgs) -> Result<ExitCode> {
    let params = TranscriptionParams {
        min_note: args.min_note,
        max_note: args.max_note,
        tempo_bpm: args.tempo,
        velocity: args.velocity,
        window_length: args.window_length,
        hop_length: args.hop_length,
        separation: !args.no_separation,
    };
    params
        .validate()
        .context("invalid transcription parameters")?;

    let buffer = load_wav(Path::new(&args.input))?;

    let frame_params = FrameParams::from(&params);
    let separator;
    let stabilizer: &dyn PitchStabilizer = if params.separation {
        separator = HarmonicSeparator::new(frame_params);
        &separator
    } else {
        &NoOpStabilizer
    };

    let mono = preprocess(&buffer, stabilizer).context("preprocessing failed")?;
    let observations =
        track_pitch(&mono, frame_params).context("pitch tracking failed")?;
    let voiced_frames = observations.iter().filter(|obs| obs.is_voiced()).count();

    let segment_params = SegmentParams::new(mono.sample_rate, &params);
    let events = segment_notes(&observations, &segment_params).context("segmentation failed")?;

    let result = write_to_path(
        Path::new(&args.output),
        &args.track_name,
        params.tempo_bpm,
        &events,
    )
    .with_context(|| format!("failed to write MIDI file: {}", args.output))?;

    let duration_beats = events
        .iter()
        .map(|event| event.end())
        .fold(0.0, f64::max);

    if args.json {
        let summary = TranscribeSummary {
            input: &args.input,
            output: &args.output,
            sample_rate: buffer.sample_rate(),
            channels: buffer.channels(),
            frames: observations.len(),
            voiced_frames,
            events: events.len(),
            duration_beats,
            hash: result.hash,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{} {}", "Transcribing:".cyan().bold(), args.input);
        println!(
            "  {} Hz, {} channel(s), {} frames ({} voiced)",
            buffer.sample_rate(),
            buffer.channels(),
            observations.len(),
            voiced_frames
        );
        println!(
            "  {} note event(s), {:.3} beats at {} bpm",
            events.len(),
            duration_beats,
            params.tempo_bpm
        );
        println!("{} {}", "Wrote:".green().bold(), args.output);
        println!("  hash: {}", result.hash.dimmed());
    }

    Ok(ExitCode::SUCCESS)
}
