//! wavsplice - command-line entry point
//!
//! Subcommands:
//! - `splice DIR`: join every `.wav` in DIR, in track order, into one file
//! - `trim FILE`: strip leading and trailing silence
//! - `duration DIR`: print each file's running time and the total
//! - `list DIR`: print the files `splice` would use, in order

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wavsplice::scan::FileEnumerator;
use wavsplice::tempfiles;
use wavsplice::worker::{Job, JobEvent, JobOutcome, JobRunner};
use wavsplice::{SpliceConfig, TrimParams};
use wavsplice_common::config::{ConfigResolver, TomlConfig};

/// Command-line arguments for wavsplice
#[derive(Parser, Debug)]
#[command(name = "wavsplice")]
#[command(about = "Splice, trim and time directories of WAV files")]
#[command(version)]
struct Args {
    /// Configuration file (takes priority over WAVSPLICE_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Concatenate a directory of WAV files with crossfades
    Splice {
        directory: PathBuf,

        /// Output file name, created inside DIRECTORY
        #[arg(short, long)]
        output: Option<String>,

        /// Crossfade length in seconds
        #[arg(long)]
        overlap: Option<f64>,

        /// How far back to search for a better join point, in seconds
        #[arg(long)]
        search: Option<f64>,

        /// Fade curve: linear, half_cosine or quarter_cosine
        #[arg(long)]
        curve: Option<String>,

        /// Splice silence-trimmed copies of the inputs (the inputs are left untouched)
        #[arg(long)]
        trim: bool,

        /// Leading characters of the file name used for ordering (0 = whole name)
        #[arg(long)]
        track_width: Option<usize>,
    },

    /// Remove leading and trailing silence from a WAV file
    Trim {
        input: PathBuf,

        /// Write here instead of replacing INPUT
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seconds of sound that end a silent stretch
        #[arg(long)]
        duration: Option<f64>,

        /// Silence threshold, e.g. "1%", "-40dB" or "0.01"
        #[arg(long)]
        threshold: Option<String>,
    },

    /// Show the running time of each WAV file in a directory
    Duration { directory: PathBuf },

    /// List the WAV files of a directory in splice order
    List { directory: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    let mut config = loaded.config;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &config.logging.level;
                format!("wavsplice={level},wavsplice_common={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Configuration source: {:?}", loaded.source);

    match args.command {
        Command::List { directory } => {
            let files = enumerator(&config).list(&directory)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                for file in &files {
                    println!("{}", file.display());
                }
            }
            Ok(())
        }
        Command::Splice {
            directory,
            output,
            overlap,
            search,
            curve,
            trim,
            track_width,
        } => {
            if let Some(output) = output {
                config.splice.output_name = output;
            }
            if let Some(overlap) = overlap {
                config.splice.overlap_seconds = overlap;
            }
            if let Some(search) = search {
                config.splice.search_window_seconds = search;
            }
            if let Some(curve) = curve {
                config.splice.fade_curve = curve;
            }
            if let Some(width) = track_width {
                config.scan.track_number_width = width;
            }
            config.splice.trim_before_splice |= trim;
            config.validate().context("Invalid splice options")?;

            let trim_first = if config.splice.trim_before_splice {
                Some(TrimParams::from_settings(&config.trim)?)
            } else {
                None
            };
            let job = Job::Splice {
                directory: directory.clone(),
                output_name: config.splice.output_name.clone(),
                config: SpliceConfig::from_settings(&config.splice)?,
                trim_first,
                enumerator: enumerator(&config),
            };
            run_job(job, &directory, args.json).await
        }
        Command::Trim {
            input,
            output,
            duration,
            threshold,
        } => {
            if let Some(duration) = duration {
                config.trim.duration_seconds = duration;
            }
            if let Some(threshold) = threshold {
                config.trim.threshold = threshold;
            }
            config.validate().context("Invalid trim options")?;

            let output = output.unwrap_or_else(|| input.clone());
            let sweep_dir = parent_dir(&output);
            let job = Job::Trim {
                input,
                output,
                params: TrimParams::from_settings(&config.trim)?,
            };
            run_job(job, &sweep_dir, args.json).await
        }
        Command::Duration { directory } => {
            let job = Job::Duration {
                directory: directory.clone(),
                enumerator: enumerator(&config),
            };
            run_job(job, &directory, args.json).await
        }
    }
}

fn enumerator(config: &TomlConfig) -> FileEnumerator {
    FileEnumerator::new(config.scan.prefix_width())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Run a job on the worker, cancelling it on Ctrl+C
async fn run_job(job: Job, work_dir: &Path, json: bool) -> Result<()> {
    let runner = JobRunner::new();
    let mut handle = runner.start(job)?;
    let mut listen_ctrl_c = true;

    loop {
        tokio::select! {
            event = handle.next_event() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
            result = signal::ctrl_c(), if listen_ctrl_c => match result {
                Ok(()) => {
                    warn!("Received Ctrl+C, cancelling at the next file boundary");
                    handle.cancel();
                }
                Err(e) => {
                    warn!("Cannot listen for Ctrl+C: {}", e);
                    listen_ctrl_c = false;
                }
            },
        }
    }

    let outcome = handle.wait().await;

    let swept = tempfiles::sweep(work_dir);
    if swept > 0 {
        info!("Removed {} leftover temporary file(s)", swept);
    }

    let outcome = outcome.context("Job failed")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn log_event(event: &JobEvent) {
    match event {
        JobEvent::Scanned { files } => info!("Processing {} file(s)", files.len()),
        JobEvent::FileTrimmed {
            path,
            frames_removed,
        } => info!("Trimmed {} frames from {}", frames_removed, path.display()),
        JobEvent::FileStarted { index, path } => {
            info!("[{}] {}", index + 1, path.display())
        }
        JobEvent::Joined(join) => debug!(
            "Join before input {}: overlap {} frames, offset {} frames",
            join.index, join.overlap_frames, join.offset_frames
        ),
        JobEvent::Finished => debug!("Job finished"),
    }
}

fn print_outcome(outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Spliced(summary) => {
            println!(
                "{} ... {} ({} files, {})",
                summary.output.display(),
                summary.clock(),
                summary.inputs,
                summary.format
            );
        }
        JobOutcome::Duration(report) => {
            for file in &report.files {
                let name = file
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                println!("{} ... {}", name, file.clock());
            }
            println!("Total duration: {}", report.clock());
        }
        JobOutcome::Trimmed(report) => {
            println!(
                "{} ... removed {} of {} frames",
                report.output.display(),
                report.frames_removed(),
                report.frames_before
            );
        }
    }
}
