//! Error types for wavsplice
//!
//! Every variant is fatal to the job that raised it. Nothing is retried and
//! no job skips a bad input to carry on with the rest.

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline stage named in effect and flow errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    Reverse,
    Silence,
    Output,
    Worker,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::Reverse => "reverse",
            Stage::Silence => "silence",
            Stage::Output => "output",
            Stage::Worker => "worker",
        };
        f.write_str(name)
    }
}

/// Main error type for wavsplice jobs
#[derive(Error, Debug)]
pub enum Error {
    /// An input or output stream (or the scanned directory) could not be opened
    #[error("Cannot open {}: {reason}", path.display())]
    OpenFailure { path: PathBuf, reason: String },

    /// An input disagrees with the job's reference format
    #[error("Format mismatch in {}: expected {expected}, found {found}", path.display())]
    FormatMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    /// An effect could not be built from the supplied parameters
    #[error("Cannot configure {stage} effect: {reason}")]
    EffectConfiguration { stage: Stage, reason: String },

    /// The pipeline started but a stage failed partway
    #[error("{stage} stage failed: {reason}")]
    FlowExecution { stage: Stage, reason: String },

    /// Zero inputs, too many inputs, or an otherwise unusable request
    #[error("Invalid job: {0}")]
    Validation(String),

    /// The job observed a cancellation request at a file boundary
    #[error("Job cancelled")]
    Cancelled,

    /// A job is already running on the worker
    #[error("Another job is already running")]
    JobInProgress,

    /// Configuration loading or validation errors
    #[error(transparent)]
    Config(#[from] wavsplice_common::Error),
}

impl Error {
    pub(crate) fn open(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::OpenFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn flow(stage: Stage, reason: impl std::fmt::Display) -> Self {
        Error::FlowExecution {
            stage,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn effect(stage: Stage, reason: impl std::fmt::Display) -> Self {
        Error::EffectConfiguration {
            stage,
            reason: reason.to_string(),
        }
    }
}

/// Convenience Result type using wavsplice Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the splice pipeline
pub type SpliceError = Error;

/// Errors returned by the silence trimmer
pub type TrimError = Error;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_stage() {
        let err = Error::flow(Stage::Output, "short write");
        assert_eq!(err.to_string(), "output stage failed: short write");

        let err = Error::effect(Stage::Silence, "threshold out of range");
        assert_eq!(
            err.to_string(),
            "Cannot configure silence effect: threshold out of range"
        );
    }

    #[test]
    fn test_open_failure_names_path() {
        let err = Error::open("/music/01.wav", "No such file or directory");
        assert!(err.to_string().contains("/music/01.wav"));
    }
}
