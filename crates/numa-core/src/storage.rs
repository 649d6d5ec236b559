//! Artifact file lifecycle.
//!
//! Downloads land in `<name>.part` and are renamed to the final name only
//! after the transfer completes, so a half-written artifact never carries the
//! name the installer looks for.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `app.exe` → `app.exe.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for an in-progress artifact.
pub struct ArtifactWriter {
    file: File,
    temp_path: PathBuf,
    written: u64,
}

impl ArtifactWriter {
    /// Create (or truncate) the temp file for `final_path`, creating parent dirs.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = temp_path(final_path);
        let file = File::create(&temp_path)?;
        Ok(Self {
            file,
            temp_path,
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync and atomically rename the temp file to `final_path`. Consumes the writer.
    ///
    /// On failure the temp file is removed.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let synced = self.file.sync_all();
        drop(self.file);
        let result = synced.and_then(|()| fs::rename(&self.temp_path, final_path));
        if result.is_err() {
            if let Err(e) = fs::remove_file(&self.temp_path) {
                tracing::debug!(path = %self.temp_path.display(), "could not remove partial artifact: {}", e);
            }
        }
        result
    }

    /// Drop the temp file. Best effort; used when a transfer fails.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        if let Err(e) = fs::remove_file(&temp_path) {
            tracing::debug!(path = %temp_path.display(), "could not remove partial artifact: {}", e);
        }
    }
}

/// Remove a finished artifact that failed verification. Missing files are fine.
pub fn remove_artifact(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed rejected artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "could not remove artifact: {}", e),
    }
}
