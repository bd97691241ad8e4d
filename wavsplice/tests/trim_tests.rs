//! Silence trimmer integration tests

mod helpers;

use helpers::*;
use std::fs;
use tempfile::TempDir;
use wavsplice::tempfiles::temp_path_for;
use wavsplice::{trim_file, Error, Stage, Threshold, TrimParams};
use wavsplice_common::timing::TimeSpan;

#[test]
fn test_removes_leading_and_trailing_silence() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("padded.wav");
    let output = dir.path().join("trimmed.wav");
    generate_padded_tone(&input, 0.5, 1.0, 0.7, 0.5).unwrap();

    let report = trim_file(&input, &output, &TrimParams::default()).unwrap();

    assert_eq!(report.frames_before, 22_050 + 44_100 + 30_870);
    assert_eq!(report.frames_after, 44_100);
    assert_eq!(report.frames_removed(), 22_050 + 30_870);
    assert_eq!(frame_count(&output), 44_100);

    let (_, samples) = read_samples(&output);
    assert_ne!(samples[0], 0);
    assert_ne!(samples[samples.len() - 1], 0);
    // Input is left alone when writing elsewhere
    assert_eq!(frame_count(&input), report.frames_before);
}

#[test]
fn test_trim_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("padded.wav");
    let once = dir.path().join("once.wav");
    let twice = dir.path().join("twice.wav");
    generate_padded_tone(&input, 0.3, 0.6, 0.3, 0.4).unwrap();

    trim_file(&input, &once, &TrimParams::default()).unwrap();
    let report = trim_file(&once, &twice, &TrimParams::default()).unwrap();

    assert_eq!(report.frames_removed(), 0);
    assert_eq!(fs::read(&once).unwrap(), fs::read(&twice).unwrap());
}

#[test]
fn test_trim_in_place() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("track.wav");
    generate_padded_tone(&path, 0.25, 0.5, 0.25, 0.5).unwrap();

    let report = trim_file(&path, &path, &TrimParams::default()).unwrap();

    assert_eq!(report.frames_after, 22_050);
    assert_eq!(frame_count(&path), 22_050);
    assert!(!temp_path_for(&path).exists());
}

#[test]
fn test_short_blip_inside_silence_is_trimmed() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("blip.wav");
    let output = dir.path().join("out.wav");
    // 20 ms of tone is shorter than the 0.1 s of sound needed to stop trimming
    generate_padded_tone(&input, 0.5, 0.02, 0.5, 0.5).unwrap();

    let report = trim_file(&input, &output, &TrimParams::default()).unwrap();

    assert_eq!(report.frames_after, 0);
    assert_eq!(frame_count(&output), 0);
}

#[test]
fn test_quiet_tone_below_threshold_is_silence() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("quiet.wav");
    let output = dir.path().join("out.wav");
    generate_padded_tone(&input, 0.1, 0.5, 0.1, 0.005).unwrap();

    let loose = TrimParams {
        duration: TimeSpan::Seconds(0.05),
        threshold: Threshold::Decibels(-60.0),
    };
    assert_eq!(trim_file(&input, &output, &loose).unwrap().frames_after, 22_050);

    let strict = TrimParams::default();
    assert_eq!(trim_file(&input, &output, &strict).unwrap().frames_after, 0);
}

#[test]
fn test_bad_threshold_leaves_input_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("track.wav");
    generate_padded_tone(&path, 0.25, 0.5, 0.25, 0.5).unwrap();
    let before = fs::read(&path).unwrap();

    let params = TrimParams {
        duration: TimeSpan::Seconds(0.1),
        threshold: Threshold::Fraction(1.5),
    };
    let result = trim_file(&path, &path, &params);

    assert!(matches!(
        result,
        Err(Error::EffectConfiguration {
            stage: Stage::Silence,
            ..
        })
    ));
    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!temp_path_for(&path).exists());
}

#[test]
fn test_missing_input_reports_open_failure() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.wav");
    let output = dir.path().join("out.wav");

    assert!(matches!(
        trim_file(&missing, &output, &TrimParams::default()),
        Err(Error::OpenFailure { .. })
    ));
    assert!(!output.exists());
}
