//! Wavescribe CLI - WAV in, standard MIDI file out.
//!
//! The binary is a thin collaborator around the core pipeline: it
//! decodes a WAV file into an [`wavescribe_core::AudioBuffer`], runs
//! preprocessing, pitch tracking, segmentation, and encoding, and
//! writes the resulting file. The core crates never log or print; all
//! presentation lives here.

pub mod cli_args;
pub mod commands;
pub mod input;
