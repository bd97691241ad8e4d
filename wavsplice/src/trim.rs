//! Silence trimmer
//!
//! Removes leading and trailing silence from one file with a four-stage
//! chain: reverse, trim start, reverse, trim start. The result goes to a
//! temporary sibling of the output and is renamed over it on success, so
//! trimming a file in place never leaves it half written.

use crate::audio::codec::{read_to_end, write_all, AudioCodec, SampleReader, SampleWriter, SignalFormat};
use crate::audio::WavCodec;
use crate::effects::{EffectsChain, Reverse, SampleBuffer, SilenceTrim};
use crate::error::Result;
use crate::tempfiles::TempOutput;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use wavsplice_common::config::TrimSettings;
use wavsplice_common::timing::TimeSpan;

pub use crate::effects::Threshold;

/// Silence detection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimParams {
    /// How long audio must stay above the threshold before trimming stops
    pub duration: TimeSpan,

    /// Amplitude below which audio counts as silence
    pub threshold: Threshold,
}

impl Default for TrimParams {
    fn default() -> Self {
        Self {
            duration: TimeSpan::Seconds(0.1),
            threshold: Threshold::Fraction(0.01),
        }
    }
}

impl TrimParams {
    /// Build from the `[trim]` configuration section
    pub fn from_settings(settings: &TrimSettings) -> Result<Self> {
        Ok(Self {
            duration: TimeSpan::Seconds(settings.duration_seconds),
            threshold: Threshold::parse(&settings.threshold)?,
        })
    }
}

/// Result of trimming one file
#[derive(Debug, Clone, Serialize)]
pub struct TrimReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: SignalFormat,
    pub frames_before: u64,
    pub frames_after: u64,
}

impl TrimReport {
    pub fn frames_removed(&self) -> u64 {
        self.frames_before - self.frames_after
    }
}

/// Trim `input` into `output` with the WAV codec (`output` may equal `input`)
pub fn trim_file(input: &Path, output: &Path, params: &TrimParams) -> Result<TrimReport> {
    trim(&WavCodec, input, output, params)
}

/// Trim leading and trailing silence from `input`, writing `output`
pub fn trim<C: AudioCodec>(
    codec: &C,
    input: &Path,
    output: &Path,
    params: &TrimParams,
) -> Result<TrimReport> {
    let (format, samples) = {
        let mut reader = codec.open_read(input)?;
        let format = reader.format();
        (format, read_to_end(&mut reader)?)
    };
    let channels = format.channels as usize;
    let frames_before = (samples.len() / channels) as u64;

    let above_frames = params.duration.to_frames(format.sample_rate) as usize;
    let mut chain = EffectsChain::new()
        .with(Reverse)
        .with(SilenceTrim::new(above_frames, params.threshold)?)
        .with(Reverse)
        .with(SilenceTrim::new(above_frames, params.threshold)?);

    let trimmed = chain.run(SampleBuffer::new(samples, channels))?;

    let temp = TempOutput::new(output)?;
    let mut writer = codec.open_write(temp.path(), &format)?;
    write_all(&mut writer, &trimmed.samples)?;
    let frames_after = writer.finalize()?;
    temp.commit()?;

    info!(
        "Trimmed {}: {} -> {} frames",
        input.display(),
        frames_before,
        frames_after
    );

    Ok(TrimReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        format,
        frames_before,
        frames_after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_from_settings() {
        let settings = TrimSettings {
            duration_seconds: 0.25,
            threshold: "-40dB".to_string(),
        };
        let params = TrimParams::from_settings(&settings).unwrap();
        assert_eq!(params.duration.to_frames(8000), 2000);
        assert_eq!(params.threshold, Threshold::Decibels(-40.0));
    }

    #[test]
    fn test_params_reject_bad_threshold() {
        let settings = TrimSettings {
            duration_seconds: 0.1,
            threshold: "quiet".to_string(),
        };
        assert!(TrimParams::from_settings(&settings).is_err());
    }
}
