//! Splice pipeline
//!
//! Concatenates an ordered list of inputs into one output, crossfading
//! every join. Inputs are used in the order given; sorting is the caller's
//! business (see [`crate::scan`]).
//!
//! Job flow:
//! 1. Validate the input count
//! 2. Open every input; the first sets the reference format and every other
//!    input must match its sample rate and channel count
//! 3. Open the output (a temporary sibling of the destination) in the
//!    reference format
//! 4. Stream the inputs through the [`crossfade`] splicer
//! 5. Close the output and rename it onto the destination
//!
//! Any failure aborts the whole job and removes the temporary output.

mod crossfade;

use crate::audio::codec::{AudioCodec, SampleReader, SampleWriter, SignalFormat};
use crate::audio::WavCodec;
use crate::error::{Error, Result};
use crate::tempfiles::TempOutput;
use crate::worker::{JobControl, JobEvent};
use crossfade::Splicer;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use wavsplice_common::config::SpliceSettings;
use wavsplice_common::human_time::format_clock_frames;
use wavsplice_common::timing::{frames_to_seconds, TimeSpan};
use wavsplice_common::FadeCurve;

/// Most inputs a single job accepts
pub const MAX_INPUT_FILES: usize = 50;

/// Crossfade parameters, fixed for the whole job
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpliceConfig {
    /// Shape of the fade-in/fade-out gains
    pub fade_curve: FadeCurve,

    /// Length of the blended region at each join
    pub overlap: TimeSpan,

    /// How far before the natural join the blend may start
    pub search_window: TimeSpan,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            fade_curve: FadeCurve::default(),
            overlap: TimeSpan::Seconds(0.5),
            // No search: output length is exactly ΣL - (N-1)·overlap
            search_window: TimeSpan::Seconds(0.0),
        }
    }
}

impl SpliceConfig {
    /// Build from the `[splice]` configuration section
    pub fn from_settings(settings: &SpliceSettings) -> Result<Self> {
        Ok(Self {
            fade_curve: settings.fade_curve()?,
            overlap: TimeSpan::Seconds(settings.overlap_seconds),
            search_window: TimeSpan::Seconds(settings.search_window_seconds),
        })
    }
}

/// Working state of one splice invocation
#[derive(Debug, Clone)]
pub struct SpliceJob {
    inputs: Vec<PathBuf>,
    output: PathBuf,
    config: SpliceConfig,
}

impl SpliceJob {
    /// Create a job, rejecting an empty or oversized input list
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>, config: SpliceConfig) -> Result<Self> {
        if inputs.is_empty() {
            return Err(Error::Validation("no input files to splice".to_string()));
        }
        if inputs.len() > MAX_INPUT_FILES {
            return Err(Error::Validation(format!(
                "{} input files given; at most {} can be spliced",
                inputs.len(),
                MAX_INPUT_FILES
            )));
        }
        Ok(Self {
            inputs,
            output: output.into(),
            config,
        })
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn config(&self) -> &SpliceConfig {
        &self.config
    }

    /// Open every input and check it against the first input's format.
    ///
    /// Nothing is written; all inputs are closed again before returning.
    pub fn validate<C: AudioCodec>(&self, codec: &C, control: &JobControl) -> Result<SignalFormat> {
        let (_, reference) = open_inputs(codec, &self.inputs, control)?;
        Ok(reference)
    }
}

/// Open `inputs` in order and check each against the first one's format
fn open_inputs<C: AudioCodec>(
    codec: &C,
    inputs: &[PathBuf],
    control: &JobControl,
) -> Result<(Vec<C::Reader>, SignalFormat)> {
    let mut readers = Vec::with_capacity(inputs.len());
    for path in inputs {
        control.check_cancelled()?;
        readers.push(codec.open_read(path)?);
    }

    let reference = match readers.first() {
        Some(reader) => reader.format(),
        None => return Err(Error::Validation("no input files to splice".to_string())),
    };
    for reader in &readers[1..] {
        let format = reader.format();
        if !format.matches_reference(&reference) {
            warn!(
                "{} does not match the reference format {}",
                reader.path().display(),
                reference
            );
            return Err(Error::FormatMismatch {
                path: reader.path().to_path_buf(),
                expected: reference.to_string(),
                found: format.to_string(),
            });
        }
    }
    Ok((readers, reference))
}

/// One crossfaded boundary in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    /// Index of the input that was faded in
    pub index: usize,
    pub overlap_frames: u64,
    pub offset_frames: u64,
}

/// Result of a successful splice
#[derive(Debug, Clone, Serialize)]
pub struct OutputSummary {
    pub output: PathBuf,
    pub inputs: usize,
    pub format: SignalFormat,
    pub frames: u64,
    pub joins: Vec<JoinReport>,
}

impl OutputSummary {
    pub fn duration_seconds(&self) -> f64 {
        frames_to_seconds(self.frames, self.format.sample_rate)
    }

    /// Output duration as `HH:MM:SS.ss`
    pub fn clock(&self) -> String {
        format_clock_frames(self.frames, self.format.sample_rate)
    }
}

/// Splice `inputs` into `output` with the WAV codec
pub fn splice_files(inputs: &[PathBuf], output: &Path, config: SpliceConfig) -> Result<OutputSummary> {
    let job = SpliceJob::new(inputs.to_vec(), output, config)?;
    run(&WavCodec, &job, &JobControl::detached())
}

/// Run a splice job to completion
pub fn run<C: AudioCodec>(codec: &C, job: &SpliceJob, control: &JobControl) -> Result<OutputSummary> {
    info!(
        "Splicing {} file(s) into {}",
        job.inputs.len(),
        job.output.display()
    );

    let (readers, reference) = open_inputs(codec, &job.inputs, control)?;

    let overlap = job.config.overlap.to_frames(reference.sample_rate) as usize;
    let search = job.config.search_window.to_frames(reference.sample_rate) as usize;
    info!(
        "Reference format {}; {} crossfade over {} frames, search window {} frames",
        reference, job.config.fade_curve, overlap, search
    );

    // Declared before the writer so the writer is closed before the
    // temporary file is removed on an error path.
    let temp = TempOutput::new(&job.output)?;
    let mut writer = codec.open_write(temp.path(), &reference)?;
    let mut splicer = Splicer::new(reference.channels as usize, overlap, search, job.config.fade_curve);
    let mut joins = Vec::with_capacity(readers.len().saturating_sub(1));

    for (index, mut reader) in readers.into_iter().enumerate() {
        control.check_cancelled()?;
        control.emit(JobEvent::FileStarted {
            index,
            path: reader.path().to_path_buf(),
        });

        if index > 0 {
            let join = splicer.join(&mut reader)?;
            let report = JoinReport {
                index,
                overlap_frames: join.overlap_frames as u64,
                offset_frames: join.offset_frames as u64,
            };
            control.emit(JobEvent::Joined(report));
            joins.push(report);
        }

        splicer.stream(&mut reader, &mut writer)?;
    }

    splicer.finish(&mut writer)?;
    let frames = writer.finalize()?;
    temp.commit()?;

    let summary = OutputSummary {
        output: job.output.clone(),
        inputs: job.inputs.len(),
        format: reference,
        frames,
        joins,
    };
    info!(
        "Wrote {} ({} frames, {})",
        summary.output.display(),
        summary.frames,
        summary.clock()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_rejects_empty_input_list() {
        let result = SpliceJob::new(Vec::new(), "out.wav", SpliceConfig::default());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_job_rejects_too_many_inputs() {
        let inputs: Vec<PathBuf> = (0..=MAX_INPUT_FILES)
            .map(|i| PathBuf::from(format!("{:02}.wav", i)))
            .collect();
        let result = SpliceJob::new(inputs, "out.wav", SpliceConfig::default());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_job_accepts_the_maximum() {
        let inputs: Vec<PathBuf> = (0..MAX_INPUT_FILES)
            .map(|i| PathBuf::from(format!("{:02}.wav", i)))
            .collect();
        let job = SpliceJob::new(inputs, "out.wav", SpliceConfig::default()).unwrap();
        assert_eq!(job.inputs().len(), MAX_INPUT_FILES);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = SpliceSettings {
            fade_curve: "linear".to_string(),
            overlap_seconds: 0.25,
            search_window_seconds: 0.1,
            ..SpliceSettings::default()
        };
        let config = SpliceConfig::from_settings(&settings).unwrap();
        assert_eq!(config.fade_curve, FadeCurve::Linear);
        assert_eq!(config.overlap.to_frames(44100), 11_025);
        assert_eq!(config.search_window.to_frames(44100), 4_410);
    }

    #[test]
    fn test_config_rejects_unknown_curve() {
        let settings = SpliceSettings {
            fade_curve: "sawtooth".to_string(),
            ..SpliceSettings::default()
        };
        assert!(matches!(
            SpliceConfig::from_settings(&settings),
            Err(Error::Config(_))
        ));
    }
}
