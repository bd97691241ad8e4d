//! # wavsplice
//!
//! Batch operations over a directory of `.wav` files:
//! - splice: concatenate the files in track order, crossfading every join
//! - trim: strip leading and trailing silence from a file
//! - duration: add up the running time of the files
//!
//! **Architecture:** job-scoped pipelines over the [`audio::AudioCodec`]
//! seam (PCM WAV via hound), run one at a time on a background worker.

pub mod audio;
pub mod duration;
pub mod effects;
pub mod error;
pub mod scan;
pub mod splice;
pub mod tempfiles;
pub mod trim;
pub mod worker;

pub use error::{Error, Result, SpliceError, Stage, TrimError};
pub use splice::{splice_files, OutputSummary, SpliceConfig, SpliceJob, MAX_INPUT_FILES};
pub use trim::{trim, trim_file, Threshold, TrimParams};
