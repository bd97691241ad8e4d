//! Temporary output files
//!
//! Outputs are written to a sibling file with a fixed prefix and renamed onto
//! the destination only when the job succeeds, so a failed job never leaves a
//! partial file at the caller-visible path. Stray temporaries (for example
//! from a killed process) are removed by [`sweep`].

use crate::error::{Error, Result, Stage};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix of every temporary file this crate creates
pub const TEMP_PREFIX: &str = "wavsplice.tmp.";

/// Deterministic temporary sibling for `destination`
pub fn temp_path_for(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.wav".to_string());
    destination.with_file_name(format!("{}{}", TEMP_PREFIX, name))
}

/// Whether a file name carries the temporary prefix
pub fn is_temp_name(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with(TEMP_PREFIX)
}

/// A temporary output that is deleted unless committed
#[derive(Debug)]
pub struct TempOutput {
    temp: PathBuf,
    destination: PathBuf,
    committed: bool,
}

impl TempOutput {
    /// Reserve the temporary path for `destination`, clearing a stale one
    pub fn new(destination: &Path) -> Result<Self> {
        let temp = temp_path_for(destination);
        if temp.exists() {
            warn!("Removing stale temporary file {}", temp.display());
            fs::remove_file(&temp).map_err(|e| Error::open(&temp, e))?;
        }
        Ok(Self {
            temp,
            destination: destination.to_path_buf(),
            committed: false,
        })
    }

    /// Path the output stream should be opened at
    pub fn path(&self) -> &Path {
        &self.temp
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Atomically move the finished temporary onto the destination
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp, &self.destination).map_err(|e| {
            Error::flow(
                Stage::Output,
                format!(
                    "cannot move {} to {}: {}",
                    self.temp.display(),
                    self.destination.display(),
                    e
                ),
            )
        })?;
        self.committed = true;
        debug!("Committed {}", self.destination.display());
        Ok(())
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.temp) {
            Ok(()) => debug!("Discarded {}", self.temp.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Cannot remove {}: {}", self.temp.display(), e),
        }
    }
}

/// Remove stray temporaries in `directory`, returning how many were removed
pub fn sweep(directory: &Path) -> usize {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping temp sweep of {}: {}", directory.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        if !is_temp_name(&entry.file_name()) {
            continue;
        }
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Swept {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Cannot sweep {}: {}", path.display(), e),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_path_is_a_sibling() {
        let temp = temp_path_for(Path::new("/music/spliced-audio.wav"));
        assert_eq!(temp, PathBuf::from("/music/wavsplice.tmp.spliced-audio.wav"));
        assert!(is_temp_name(temp.file_name().unwrap()));
        assert!(!is_temp_name(OsStr::new("01 intro.wav")));
    }

    #[test]
    fn test_uncommitted_output_is_removed() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("out.wav");
        let temp_path;
        {
            let temp = TempOutput::new(&destination).unwrap();
            temp_path = temp.path().to_path_buf();
            fs::write(&temp_path, b"partial").unwrap();
        }
        assert!(!temp_path.exists());
        assert!(!destination.exists());
    }

    #[test]
    fn test_commit_replaces_destination() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("out.wav");
        fs::write(&destination, b"old").unwrap();

        let temp = TempOutput::new(&destination).unwrap();
        fs::write(temp.path(), b"new").unwrap();
        let temp_path = temp.path().to_path_buf();
        temp.commit().unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"new");
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_sweep_removes_only_prefixed_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("wavsplice.tmp.a.wav"), b"x").unwrap();
        fs::write(dir.path().join("wavsplice.tmp.b.wav"), b"x").unwrap();
        fs::write(dir.path().join("01 keep.wav"), b"x").unwrap();

        assert_eq!(sweep(dir.path()), 2);
        assert!(dir.path().join("01 keep.wav").exists());
        assert_eq!(sweep(dir.path()), 0);
    }
}
