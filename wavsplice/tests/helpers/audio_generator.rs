//! Deterministic WAV fixtures
//!
//! 16-bit PCM files with known lengths: silence, sine tones, and tones
//! padded with silence on both sides.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::f64::consts::PI;
use std::path::Path;

/// Standard test sample rate (44.1 kHz)
pub const TEST_SAMPLE_RATE: u32 = 44100;

fn spec(sample_rate: u32, channels: u16) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn frames_for(sample_rate: u32, seconds: f64) -> u64 {
    (sample_rate as f64 * seconds).round() as u64
}

/// Write `seconds` of digital silence
pub fn generate_silent_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    channels: u16,
    seconds: f64,
) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec(sample_rate, channels))?;
    for _ in 0..frames_for(sample_rate, seconds) * channels as u64 {
        writer.write_sample(0i16)?;
    }
    writer.finalize()
}

/// Write `seconds` of a sine tone at `amplitude` (0.0-1.0) on every channel
pub fn generate_sine_wav<P: AsRef<Path>>(
    path: P,
    sample_rate: u32,
    channels: u16,
    seconds: f64,
    frequency_hz: f64,
    amplitude: f64,
) -> Result<(), hound::Error> {
    let mut writer = WavWriter::create(path, spec(sample_rate, channels))?;
    for frame in 0..frames_for(sample_rate, seconds) {
        let t = frame as f64 / sample_rate as f64;
        let value = (amplitude * (2.0 * PI * frequency_hz * t).sin() * i16::MAX as f64) as i16;
        for _ in 0..channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()
}

/// Mono file: `lead` seconds of silence, `tone` seconds of a constant-level
/// square-ish tone at `amplitude`, then `tail` seconds of silence
pub fn generate_padded_tone<P: AsRef<Path>>(
    path: P,
    lead: f64,
    tone: f64,
    tail: f64,
    amplitude: f64,
) -> Result<(), hound::Error> {
    let rate = TEST_SAMPLE_RATE;
    let mut writer = WavWriter::create(path, spec(rate, 1))?;
    let level = (amplitude * i16::MAX as f64) as i16;

    for _ in 0..frames_for(rate, lead) {
        writer.write_sample(0i16)?;
    }
    for frame in 0..frames_for(rate, tone) {
        // Alternate polarity every 50 frames; magnitude stays at `level`
        let value = if (frame / 50) % 2 == 0 { level } else { -level };
        writer.write_sample(value)?;
    }
    for _ in 0..frames_for(rate, tail) {
        writer.write_sample(0i16)?;
    }
    writer.finalize()
}

/// Number of frames in a WAV file
pub fn frame_count<P: AsRef<Path>>(path: P) -> u64 {
    WavReader::open(path).unwrap().duration() as u64
}

/// Spec and interleaved 16-bit samples of a WAV file
pub fn read_samples<P: AsRef<Path>>(path: P) -> (WavSpec, Vec<i16>) {
    let mut reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}
