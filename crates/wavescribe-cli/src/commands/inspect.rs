//! Inspect command implementation.
//!
//! Parses a MIDI file with the strict validator and prints what a
//! transcription round trip cares about: division, tempo, track name,
//! and the note on/off pairs.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use wavescribe_midi::note::note_name;
use wavescribe_midi::smf::parse_smf;

#[derive(Debug, Serialize)]
struct InspectSummary {
    format: u16,
    division: u16,
    tempo_bpm: Option<f64>,
    track_name: Option<String>,
    notes: Vec<InspectNote>,
}

#[derive(Debug, Serialize)]
struct InspectNote {
    pitch: u8,
    name: String,
    channel: u8,
    velocity: u8,
    on_tick: u32,
    off_tick: u32,
}

/// Run the inspect command.
///
/// # Returns
/// Exit code: 0 if the file parses, 1 otherwise.
pub fn run(input: &str, json: bool) -> Result<ExitCode> {
    let data = std::fs::read(input)
        .with_context(|| format!("failed to read MIDI file: {}", input))?;
    let parsed = parse_smf(&data)
        .with_context(|| format!("failed to parse MIDI file: {}", input))?;

    let notes: Vec<InspectNote> = parsed
        .notes
        .iter()
        .map(|note| InspectNote {
            pitch: note.pitch,
            name: note_name(note.pitch),
            channel: note.channel,
            velocity: note.velocity,
            on_tick: note.on_tick,
            off_tick: note.off_tick,
        })
        .collect();

    if json {
        let summary = InspectSummary {
            format: parsed.format,
            division: parsed.division,
            tempo_bpm: parsed.tempo_bpm(),
            track_name: parsed.track_name.clone(),
            notes,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Inspecting:".cyan().bold(), input);
    println!(
        "  format {}, {} ticks per beat",
        parsed.format, parsed.division
    );
    if let Some(name) = &parsed.track_name {
        println!("  track name: {}", name);
    }
    if let Some(bpm) = parsed.tempo_bpm() {
        println!("  tempo: {:.2} bpm", bpm);
    }
    println!("  {} note(s)", notes.len());
    for note in &notes {
        println!(
            "    {:>4} {:<4} ch {:<2} vel {:>3}  ticks {} - {}",
            note.pitch, note.name, note.channel, note.velocity, note.on_tick, note.off_tick
        );
    }

    Ok(ExitCode::SUCCESS)
}
