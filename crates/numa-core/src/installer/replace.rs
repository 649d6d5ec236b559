//! In-place binary replacement (Linux/macOS).

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::{InstallAction, Installer};
use crate::error::{Result, UpdateError};

/// Replaces `target` with the artifact: old binary → `<target>.old`, artifact
/// copied into place, executable bit set. The backup is restored if any step
/// after the rename fails.
#[derive(Debug, Clone)]
pub struct BinaryReplaceInstaller {
    target: PathBuf,
    relaunch_args: Vec<OsString>,
}

impl BinaryReplaceInstaller {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            relaunch_args: Vec::new(),
        }
    }

    /// Arguments passed to the relaunched program.
    pub fn with_relaunch_args(mut self, args: Vec<OsString>) -> Self {
        self.relaunch_args = args;
        self
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    fn backup_path(&self) -> PathBuf {
        let mut o = self.target.as_os_str().to_owned();
        o.push(".old");
        PathBuf::from(o)
    }
}

impl Installer for BinaryReplaceInstaller {
    fn install(&self, artifact: &Path) -> Result<InstallAction> {
        if !artifact.is_file() {
            return Err(UpdateError::install(format!(
                "artifact {} does not exist",
                artifact.display()
            )));
        }
        swap_with_backup(&self.target, &self.backup_path(), |target| {
            place_binary(artifact, target)
        })?;
        remove_leftover(artifact);

        tracing::info!("binary updated at {}", self.target.display());
        Ok(InstallAction::Relaunch {
            program: self.target.clone(),
            args: self.relaunch_args.clone(),
        })
    }
}

/// Move `target` aside to `backup`, then run `place` to put the new binary at
/// `target`. If `place` fails at any point the backup is moved back.
fn swap_with_backup<F>(target: &Path, backup: &Path, place: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    if target.exists() {
        fs::rename(target, backup).map_err(|e| {
            UpdateError::install(format!(
                "cannot back up {} to {}: {e}",
                target.display(),
                backup.display()
            ))
        })?;
    }
    if let Err(e) = place(target) {
        restore_backup(backup, target);
        return Err(e);
    }
    remove_leftover(backup);
    Ok(())
}

/// Copy the artifact over `target` and mark it executable.
fn place_binary(artifact: &Path, target: &Path) -> Result<()> {
    fs::copy(artifact, target).map_err(|e| {
        UpdateError::install(format!(
            "cannot install new binary to {}: {e}",
            target.display()
        ))
    })?;
    set_executable(target)
}

/// Put the previous binary back after a failed install. Without a backup
/// (fresh install) the half-installed target is removed.
fn restore_backup(backup: &Path, target: &Path) {
    if !backup.exists() {
        remove_leftover(target);
        return;
    }
    if let Err(e) = fs::rename(backup, target) {
        tracing::error!("could not restore {}: {}", target.display(), e);
    }
}

fn remove_leftover(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "could not remove leftover file: {}", e),
    }
}

fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|e| {
            UpdateError::install(format!(
                "cannot set executable permission on {}: {e}",
                path.display()
            ))
        })?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
