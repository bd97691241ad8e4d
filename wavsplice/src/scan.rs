//! Directory scanning for `.wav` inputs
//!
//! Track order comes from file names. Only the first `prefix_width`
//! characters of each name are compared, so names are expected to start
//! with a fixed-width track number ("001 Intro.wav", "002 Theme.wav").
//! Names whose prefixes tie keep the order the directory listing produced
//! them in; the sort is stable and does not look past the prefix.

use crate::error::{Error, Result};
use crate::splice::MAX_INPUT_FILES;
use crate::tempfiles::is_temp_name;
use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wavsplice_common::config::DEFAULT_TRACK_NUMBER_WIDTH;

/// Lists the `.wav` files of a directory in track order
#[derive(Debug, Clone)]
pub struct FileEnumerator {
    prefix_width: Option<usize>,
    max_files: usize,
    excluded: Vec<OsString>,
}

impl Default for FileEnumerator {
    fn default() -> Self {
        Self::new(Some(DEFAULT_TRACK_NUMBER_WIDTH))
    }
}

impl FileEnumerator {
    /// Enumerator comparing `prefix_width` leading characters (`None` = whole name)
    pub fn new(prefix_width: Option<usize>) -> Self {
        Self {
            prefix_width,
            max_files: MAX_INPUT_FILES,
            excluded: Vec::new(),
        }
    }

    /// Skip a file name, e.g. the job's own output
    pub fn exclude(mut self, name: impl Into<OsString>) -> Self {
        self.excluded.push(name.into());
        self
    }

    pub fn prefix_width(&self) -> Option<usize> {
        self.prefix_width
    }

    /// List regular `.wav` files in `directory`, sorted by track prefix
    pub fn list(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(directory).map_err(|e| Error::open(directory, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::open(directory, e))?;
            let name = entry.file_name();
            let path = entry.path();

            if !is_wav_file(&path) || is_temp_name(&name) || self.excluded.contains(&name) {
                continue;
            }
            // Follows symlinks, like the attribute check on the file itself
            if !path.is_file() {
                debug!("Skipping non-file entry {}", path.display());
                continue;
            }
            files.push(path);
        }

        if files.len() > self.max_files {
            return Err(Error::Validation(format!(
                "{} contains {} .wav files; at most {} can be processed",
                directory.display(),
                files.len(),
                self.max_files
            )));
        }

        files.sort_by(|a, b| {
            compare_track_names(
                a.file_name().unwrap_or_default(),
                b.file_name().unwrap_or_default(),
                self.prefix_width,
            )
        });

        info!("Found {} .wav file(s) in {}", files.len(), directory.display());
        Ok(files)
    }
}

/// Whether `path` has a `.wav` extension, in any letter case
pub fn is_wav_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Compare two file names on their first `width` characters
pub fn compare_track_names(a: &OsStr, b: &OsStr, width: Option<usize>) -> Ordering {
    let a = a.to_string_lossy();
    let b = b.to_string_lossy();
    match width {
        Some(width) => a.chars().take(width).cmp(b.chars().take(width)),
        None => a.cmp(&b),
    }
}
