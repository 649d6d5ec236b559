//! NSIS installer hand-off (Windows).
//!
//! Equivalent of quit-and-install with `silent` and `force_run_after`: the
//! installer is started with `--updated`, `/S` when silent, and `--force-run`
//! so it relaunches the app once it is done.

use std::ffi::OsString;
use std::path::Path;

use super::{InstallAction, Installer};
use crate::error::{Result, UpdateError};

#[derive(Debug, Clone, Copy)]
pub struct NsisInstaller {
    silent: bool,
    force_run_after: bool,
}

impl NsisInstaller {
    pub fn new(silent: bool, force_run_after: bool) -> Self {
        Self {
            silent,
            force_run_after,
        }
    }

    fn args(&self) -> Vec<OsString> {
        let mut args = vec![OsString::from("--updated")];
        if self.silent {
            args.push(OsString::from("/S"));
        }
        if self.force_run_after {
            args.push(OsString::from("--force-run"));
        }
        args
    }
}

impl Installer for NsisInstaller {
    fn install(&self, artifact: &Path) -> Result<InstallAction> {
        if !artifact.is_file() {
            return Err(UpdateError::install(format!(
                "installer {} does not exist",
                artifact.display()
            )));
        }
        tracing::info!(installer = %artifact.display(), silent = self.silent, "installer ready");
        Ok(InstallAction::RunInstaller {
            program: artifact.to_path_buf(),
            args: self.args(),
        })
    }
}
