//! Stage-only install: keep the verified artifact and leave the installed
//! program alone.

use std::path::Path;

use super::{InstallAction, Installer};
use crate::error::{Result, UpdateError};

/// Leaves the artifact where it was downloaded. The returned action runs the
/// artifact itself; nothing on disk outside the download dir changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StagedInstaller;

impl Installer for StagedInstaller {
    fn install(&self, artifact: &Path) -> Result<InstallAction> {
        if !artifact.is_file() {
            return Err(UpdateError::install(format!(
                "artifact {} does not exist",
                artifact.display()
            )));
        }
        tracing::info!(path = %artifact.display(), "update staged, not installed");
        Ok(InstallAction::RunInstaller {
            program: artifact.to_path_buf(),
            args: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn keeps_artifact_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("numa-1.2.0");
        std::fs::write(&artifact, b"new binary").unwrap();

        let action = StagedInstaller.install(&artifact).unwrap();
        assert_eq!(
            action,
            InstallAction::RunInstaller {
                program: artifact.clone(),
                args: Vec::new(),
            }
        );
        assert_eq!(std::fs::read(&artifact).unwrap(), b"new binary");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_artifact_is_install_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = StagedInstaller.install(&dir.path().join("gone")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Install);
    }
}
