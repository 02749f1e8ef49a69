//! End-to-end pipeline tests: waveform in, parsed MIDI out.

use pretty_assertions::assert_eq;

use wavescribe_cli::cli_args::TranscribeArgs;
use wavescribe_cli::commands::transcribe;
use wavescribe_cli::input::load_wav;
use wavescribe_core::{AudioBuffer, TranscriptionParams};
use wavescribe_dsp::{preprocess, track_pitch, FrameParams, HarmonicSeparator};
use wavescribe_midi::smf::parse_smf;
use wavescribe_midi::{encode, segment_notes, SegmentParams};

fn sine_buffer(freq: f32, sample_rate: u32, seconds: f32) -> AudioBuffer {
    let len = (sample_rate as f32 * seconds) as usize;
    let samples = (0..len)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
        .collect();
    AudioBuffer::mono(sample_rate, samples)
}

fn run_pipeline(
    buffer: &AudioBuffer,
    params: &TranscriptionParams,
) -> (usize, Vec<wavescribe_core::NoteEvent>, Vec<u8>, String) {
    let frame_params = FrameParams::from(params);
    let mono = preprocess(buffer, &HarmonicSeparator::new(frame_params)).unwrap();
    let observations = track_pitch(&mono, frame_params).unwrap();
    let events =
        segment_notes(&observations, &SegmentParams::new(mono.sample_rate, params)).unwrap();
    let result = encode("Generated from Audio", params.tempo_bpm, &events).unwrap();
    (observations.len(), events, result.data, result.hash)
}

// One second of a pure 440 Hz tone at 32 kHz with default parameters:
// 59 frames, interior frames near 440 Hz, exactly one event at MIDI 69,
// and a file whose single on/off pair survives a round trip.
#[test]
fn test_pure_tone_scenario() {
    let buffer = sine_buffer(440.0, 32000, 1.0);
    let params = TranscriptionParams::default();

    let frame_params = FrameParams::from(&params);
    let mono = preprocess(&buffer, &HarmonicSeparator::new(frame_params)).unwrap();
    assert_eq!(mono.samples.len(), 32000);

    let observations = track_pitch(&mono, frame_params).unwrap();
    assert_eq!(observations.len(), 59);

    // Edge frames see partial separation coverage; the interior must
    // track the tone tightly.
    for obs in &observations[5..54] {
        assert!(obs.is_voiced(), "frame {} unvoiced", obs.frame);
        assert!(
            (obs.frequency_hz - 440.0).abs() < 5.0,
            "frame {} tracked {} Hz",
            obs.frame,
            obs.frequency_hz
        );
    }

    let events =
        segment_notes(&observations, &SegmentParams::new(mono.sample_rate, &params)).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].pitch, 69);
    assert_eq!(events[0].velocity, 100);

    let result = encode("Generated from Audio", params.tempo_bpm, &events).unwrap();
    let parsed = parse_smf(&result.data).unwrap();
    assert_eq!(parsed.track_name.as_deref(), Some("Generated from Audio"));
    assert_eq!(parsed.tempo_bpm(), Some(120.0));
    assert_eq!(parsed.notes.len(), 1);
    assert_eq!(parsed.notes[0].pitch, 69);
    assert!(parsed.notes[0].on_tick < parsed.notes[0].off_tick);
}

#[test]
fn test_full_pipeline_is_deterministic() {
    let buffer = sine_buffer(440.0, 32000, 1.0);
    let params = TranscriptionParams::default();

    let (frames_a, events_a, data_a, hash_a) = run_pipeline(&buffer, &params);
    let (frames_b, events_b, data_b, hash_b) = run_pipeline(&buffer, &params);

    assert_eq!(frames_a, frames_b);
    assert_eq!(events_a, events_b);
    assert_eq!(data_a, data_b);
    assert_eq!(hash_a, hash_b);
}

#[test]
fn test_silence_produces_empty_valid_file() {
    let buffer = AudioBuffer::mono(32000, vec![0.0; 32000]);
    let params = TranscriptionParams::default();

    let (frames, events, data, _) = run_pipeline(&buffer, &params);
    assert_eq!(frames, 59);
    assert!(events.is_empty());

    let parsed = parse_smf(&data).unwrap();
    assert!(parsed.notes.is_empty());
    assert_eq!(parsed.track_name.as_deref(), Some("Generated from Audio"));
    assert_eq!(parsed.microseconds_per_beat, Some(500_000));
}

#[test]
fn test_clamping_to_note_range() {
    // 55 Hz is MIDI 33, below the default floor of 36.
    let buffer = sine_buffer(55.0, 32000, 1.0);
    let params = TranscriptionParams::default();
    let (_, events, _, _) = run_pipeline(&buffer, &params);
    assert!(!events.is_empty());
    for event in &events {
        assert_eq!(event.pitch, 36);
    }
}

#[test]
fn test_transcribe_command_writes_wav_to_midi() {
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("tone.wav");
    let mid_path = dir.path().join("tone.mid");

    // 16-bit stereo WAV carrying the tone on both channels.
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 32000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
    for i in 0..32000 {
        let t = i as f32 / 32000.0;
        let value = (0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 32767.0) as i16;
        writer.write_sample(value).unwrap();
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();

    let loaded = load_wav(&wav_path).unwrap();
    assert_eq!(loaded.channels(), 2);
    assert_eq!(loaded.sample_rate(), 32000);
    assert_eq!(loaded.frame_count(), 32000);

    let args = TranscribeArgs {
        input: wav_path.to_string_lossy().into_owned(),
        output: mid_path.to_string_lossy().into_owned(),
        min_note: 36,
        max_note: 84,
        tempo: 120.0,
        velocity: 100,
        window_length: 2048,
        hop_length: 512,
        track_name: "Generated from Audio".into(),
        no_separation: false,
        json: true,
    };
    transcribe::run(&args).unwrap();

    let parsed = parse_smf(&std::fs::read(&mid_path).unwrap()).unwrap();
    assert_eq!(parsed.notes.len(), 1);
    assert_eq!(parsed.notes[0].pitch, 69);
    assert_eq!(parsed.notes[0].velocity, 100);
}

#[test]
fn test_invalid_parameters_fail_before_processing() {
    let dir = tempfile::tempdir().unwrap();
    let args = TranscribeArgs {
        input: "missing.wav".into(),
        output: dir
            .path()
            .join("out.mid")
            .to_string_lossy()
            .into_owned(),
        min_note: 84,
        max_note: 36,
        tempo: 120.0,
        velocity: 100,
        window_length: 2048,
        hop_length: 512,
        track_name: "x".into(),
        no_separation: false,
        json: true,
    };
    // The inverted note range is rejected before the input is opened.
    assert!(transcribe::run(&args).is_err());
}
