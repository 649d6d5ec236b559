//! Applying a verified artifact.
//!
//! An installer never relaunches the process itself. It prepares the
//! replacement and returns the [`InstallAction`] the caller must perform
//! (typically right before exiting).

mod nsis;
mod replace;
mod staged;

pub use nsis::NsisInstaller;
pub use replace::BinaryReplaceInstaller;
pub use staged::StagedInstaller;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::InstallConfig;
use crate::error::{Result, UpdateError};

/// What the process must do once the installer has prepared the update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction {
    /// The binary on disk was replaced; start it in place of this process.
    Relaunch { program: PathBuf, args: Vec<OsString> },
    /// Run an installer program; it replaces the app after this process exits.
    RunInstaller { program: PathBuf, args: Vec<OsString> },
}

impl InstallAction {
    pub fn program(&self) -> &Path {
        match self {
            InstallAction::Relaunch { program, .. } | InstallAction::RunInstaller { program, .. } => {
                program
            }
        }
    }

    pub fn args(&self) -> &[OsString] {
        match self {
            InstallAction::Relaunch { args, .. } | InstallAction::RunInstaller { args, .. } => args,
        }
    }
}

/// Strategy for applying an artifact that already passed checksum verification.
pub trait Installer: Send + Sync {
    fn install(&self, artifact: &Path) -> Result<InstallAction>;
}

/// Installer for the current platform: NSIS on Windows, binary replacement elsewhere.
pub fn default_installer(cfg: &InstallConfig) -> Result<Arc<dyn Installer>> {
    if cfg!(target_os = "windows") {
        Ok(Arc::new(NsisInstaller::new(cfg.silent, cfg.force_run_after)))
    } else {
        let target = std::env::current_exe().map_err(|e| {
            UpdateError::install(format!("cannot determine current executable path: {e}"))
        })?;
        let args = std::env::args_os().skip(1).collect();
        Ok(Arc::new(BinaryReplaceInstaller::new(target).with_relaunch_args(args)))
    }
}

/// Perform an install action: replace this process on unix, spawn and return elsewhere.
///
/// Only returns on unix if `exec` failed.
pub fn perform(action: &InstallAction) -> Result<()> {
    tracing::info!(program = %action.program().display(), "handing over to updated program");
    let mut cmd = std::process::Command::new(action.program());
    cmd.args(action.args());

    #[cfg(unix)]
    {
        if matches!(action, InstallAction::Relaunch { .. }) {
            use std::os::unix::process::CommandExt;
            let err = cmd.exec();
            return Err(UpdateError::install(format!(
                "exec {} failed: {err}",
                action.program().display()
            )));
        }
    }

    cmd.spawn().map_err(|e| {
        UpdateError::install(format!("spawn {} failed: {e}", action.program().display()))
    })?;
    Ok(())
}
