//! Background job worker
//!
//! Jobs (splice, duration, trim) run synchronously on tokio's blocking pool,
//! one at a time. The caller gets a [`JobHandle`] to follow progress events,
//! request cancellation and collect the outcome. Cancellation is observed at
//! file boundaries; a cancelled splice leaves no output behind.

use crate::audio::WavCodec;
use crate::duration::{self, DurationReport};
use crate::error::{Error, Result, Stage};
use crate::scan::FileEnumerator;
use crate::splice::{self, JoinReport, OutputSummary, SpliceConfig, SpliceJob};
use crate::tempfiles::TempOutput;
use crate::trim::{self, TrimParams, TrimReport};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wavsplice_common::config::is_plain_file_name;

/// Progress notifications emitted while a job runs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// The directory was scanned; files are listed in processing order
    Scanned { files: Vec<PathBuf> },
    /// A trimmed copy of an input is ready for splicing
    FileTrimmed { path: PathBuf, frames_removed: u64 },
    /// The splicer started reading an input (the trimmed copy when trimming first)
    FileStarted { index: usize, path: PathBuf },
    /// A join between two inputs was crossfaded
    Joined(JoinReport),
    Finished,
}

/// Cancellation flag and event sink shared with a running job
#[derive(Debug, Clone)]
pub struct JobControl {
    cancel: CancellationToken,
    events: Option<mpsc::UnboundedSender<JobEvent>>,
}

impl JobControl {
    /// Control for a job run directly on the calling thread, with no listener
    pub fn detached() -> Self {
        Self {
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Err(Error::Cancelled)` once cancellation has been requested
    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            info!("Job cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Send an event to the listener, if it is still there
    pub fn emit(&self, event: JobEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                debug!("Event listener has gone away");
            }
        }
    }
}

/// Work the runner can perform
#[derive(Debug, Clone)]
pub enum Job {
    /// Splice every `.wav` file in `directory` into `directory/output_name`
    Splice {
        directory: PathBuf,
        output_name: String,
        config: SpliceConfig,
        /// Splice trimmed copies of the inputs; the inputs stay untouched
        trim_first: Option<TrimParams>,
        enumerator: FileEnumerator,
    },
    /// Report the running time of every `.wav` file in `directory`
    Duration {
        directory: PathBuf,
        enumerator: FileEnumerator,
    },
    /// Trim silence from one file
    Trim {
        input: PathBuf,
        output: PathBuf,
        params: TrimParams,
    },
}

/// Result of a finished job
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum JobOutcome {
    Spliced(OutputSummary),
    Duration(DurationReport),
    Trimmed(TrimReport),
}

/// Run `job` to completion on the calling thread
pub fn execute(job: Job, control: &JobControl) -> Result<JobOutcome> {
    let outcome = match job {
        Job::Splice {
            directory,
            output_name,
            config,
            trim_first,
            enumerator,
        } => {
            if !is_plain_file_name(&output_name) {
                return Err(Error::Validation(format!(
                    "output name '{}' must be a file name without directories",
                    output_name
                )));
            }
            let files = enumerator.exclude(output_name.as_str()).list(&directory)?;
            control.emit(JobEvent::Scanned {
                files: files.clone(),
            });

            let job = SpliceJob::new(files, directory.join(&output_name), config)?;
            let summary = match trim_first {
                Some(params) => splice_trimmed(&job, &params, control)?,
                None => splice::run(&WavCodec, &job, control)?,
            };
            JobOutcome::Spliced(summary)
        }
        Job::Duration {
            directory,
            enumerator,
        } => {
            let files = enumerator.list(&directory)?;
            control.emit(JobEvent::Scanned {
                files: files.clone(),
            });
            JobOutcome::Duration(duration::total_duration(&WavCodec, &files, control)?)
        }
        Job::Trim {
            input,
            output,
            params,
        } => {
            control.check_cancelled()?;
            JobOutcome::Trimmed(trim::trim(&WavCodec, &input, &output, &params)?)
        }
    };

    control.emit(JobEvent::Finished);
    Ok(outcome)
}

/// Splice trimmed copies of the job's inputs.
///
/// Every input is validated before anything is trimmed, and the trimmed
/// copies are temporaries next to their originals that are removed when the
/// job ends, so the inputs themselves are never modified.
fn splice_trimmed(
    job: &SpliceJob,
    params: &TrimParams,
    control: &JobControl,
) -> Result<OutputSummary> {
    job.validate(&WavCodec, control)?;

    let mut copies = Vec::with_capacity(job.inputs().len());
    for path in job.inputs() {
        control.check_cancelled()?;
        let copy = TempOutput::new(path)?;
        let report = trim::trim(&WavCodec, path, copy.path(), params)?;
        control.emit(JobEvent::FileTrimmed {
            path: path.clone(),
            frames_removed: report.frames_removed(),
        });
        copies.push(copy);
    }

    let trimmed = SpliceJob::new(
        copies.iter().map(|copy| copy.path().to_path_buf()).collect(),
        job.output(),
        *job.config(),
    )?;
    splice::run(&WavCodec, &trimmed, control)
}

/// Clears the runner's busy flag when the job ends, however it ends
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs at most one job at a time in the background
#[derive(Debug, Clone, Default)]
pub struct JobRunner {
    busy: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Start `job` on the blocking pool. Must be called inside a Tokio runtime.
    ///
    /// # Errors
    /// [`Error::JobInProgress`] if an earlier job has not finished yet.
    pub fn start(&self, job: Job) -> Result<JobHandle> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejecting job: another job is still running");
            return Err(Error::JobInProgress);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let control = JobControl {
            cancel: cancel.clone(),
            events: Some(tx),
        };

        let task = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            execute(job, &control)
        });

        Ok(JobHandle {
            cancel,
            events: rx,
            task,
        })
    }
}

/// Caller's side of a running job
#[derive(Debug)]
pub struct JobHandle {
    cancel: CancellationToken,
    events: mpsc::UnboundedReceiver<JobEvent>,
    task: JoinHandle<Result<JobOutcome>>,
}

impl JobHandle {
    /// Ask the job to stop at the next file boundary
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Next progress event; `None` once the job has ended
    pub async fn next_event(&mut self) -> Option<JobEvent> {
        self.events.recv().await
    }

    /// Wait for the job and return its outcome
    pub async fn wait(self) -> Result<JobOutcome> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(Error::flow(Stage::Worker, e)),
        }
    }
}
