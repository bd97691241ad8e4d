//! Running-time report for a set of files

use crate::audio::codec::{AudioCodec, SampleReader, READ_CHUNK_FRAMES};
use crate::audio::WavCodec;
use crate::error::Result;
use crate::worker::JobControl;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use wavsplice_common::human_time::{format_clock, format_clock_frames};
use wavsplice_common::timing::frames_to_seconds;

/// Running time of one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRuntime {
    pub path: PathBuf,
    pub frames: u64,
    pub sample_rate: u32,
}

impl FileRuntime {
    pub fn seconds(&self) -> f64 {
        frames_to_seconds(self.frames, self.sample_rate)
    }

    pub fn clock(&self) -> String {
        format_clock_frames(self.frames, self.sample_rate)
    }
}

/// Running times of a set of files
#[derive(Debug, Clone, Default, Serialize)]
pub struct DurationReport {
    pub files: Vec<FileRuntime>,
}

impl DurationReport {
    /// Sum of the per-file durations in seconds
    pub fn total_seconds(&self) -> f64 {
        self.files.iter().map(FileRuntime::seconds).sum()
    }

    pub fn clock(&self) -> String {
        format_clock(self.total_seconds())
    }
}

/// Measure every file in `paths` with the WAV codec
pub fn total_duration_of(paths: &[PathBuf]) -> Result<DurationReport> {
    total_duration(&WavCodec, paths, &JobControl::detached())
}

/// Measure every file in `paths`; any unreadable file fails the report
pub fn total_duration<C: AudioCodec>(
    codec: &C,
    paths: &[PathBuf],
    control: &JobControl,
) -> Result<DurationReport> {
    let mut report = DurationReport::default();

    for path in paths {
        control.check_cancelled()?;
        let runtime = measure(codec, path)?;
        info!("{} ... {}", display_name(path), runtime.clock());
        report.files.push(runtime);
    }

    info!("Total duration of {} file(s): {}", report.files.len(), report.clock());
    Ok(report)
}

fn measure<C: AudioCodec>(codec: &C, path: &Path) -> Result<FileRuntime> {
    let mut reader = codec.open_read(path)?;
    let format = reader.format();

    let frames = match reader.length_frames() {
        Some(frames) => frames,
        None => {
            let mut frames = 0u64;
            let mut scratch = Vec::new();
            loop {
                scratch.clear();
                let read = reader.read(&mut scratch, READ_CHUNK_FRAMES)?;
                if read == 0 {
                    break;
                }
                frames += read as u64;
            }
            frames
        }
    };

    Ok(FileRuntime {
        path: path.to_path_buf(),
        frames,
        sample_rate: format.sample_rate,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_mixed_rates() {
        let report = DurationReport {
            files: vec![
                FileRuntime {
                    path: PathBuf::from("01.wav"),
                    frames: 88_200,
                    sample_rate: 44100,
                },
                FileRuntime {
                    path: PathBuf::from("02.wav"),
                    frames: 72_000,
                    sample_rate: 48000,
                },
            ],
        };
        assert_eq!(report.total_seconds(), 3.5);
        assert_eq!(report.clock(), "00:00:03.50");
        assert_eq!(report.files[1].clock(), "00:00:01.50");
    }

    #[test]
    fn test_empty_report() {
        let report = DurationReport::default();
        assert_eq!(report.total_seconds(), 0.0);
        assert_eq!(report.clock(), "00:00:00.00");
    }
}
