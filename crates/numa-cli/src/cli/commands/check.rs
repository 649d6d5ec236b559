//! `numa-updater check` – one update cycle in the foreground.

use anyhow::Result;
use numa_core::config::UpdaterConfig;
use numa_core::events::EventSink;
use numa_core::installer::{self, Installer, StagedInstaller};
use numa_core::poller::{CycleOutcome, Updater};
use std::sync::Arc;

use super::run::spawn_event_printer;

/// Installer for a one-shot check. `no_install` only stages the verified
/// artifact; the installed program is left untouched.
fn installer_for(cfg: &UpdaterConfig, no_install: bool) -> Result<Arc<dyn Installer>> {
    if no_install {
        Ok(Arc::new(StagedInstaller))
    } else {
        Ok(installer::default_installer(&cfg.install())?)
    }
}

pub async fn run_check(cfg: &UpdaterConfig, token: Option<&str>, no_install: bool) -> Result<()> {
    let (events_tx, printer) = spawn_event_printer();
    let updater = Updater::from_config_with_installer(
        cfg,
        installer_for(cfg, no_install)?,
        EventSink::new(events_tx),
    )?;
    let outcome = updater.check(token).await;
    drop(updater);
    let _ = printer.await;

    match outcome? {
        CycleOutcome::UpToDate { latest } => {
            println!("Up to date (running {}, latest {})", cfg.current_version()?, latest);
        }
        CycleOutcome::Skipped => println!("Check skipped"),
        CycleOutcome::InstallPending(pending) if no_install => {
            println!(
                "Update {} downloaded, not installed: {}",
                pending.descriptor.version,
                pending.artifact.display()
            );
        }
        CycleOutcome::InstallPending(pending) => {
            println!(
                "Update {} ready: {}",
                pending.descriptor.version,
                pending.artifact.display()
            );
            installer::perform(&pending.action)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use numa_core::installer::InstallAction;

    #[test]
    fn no_install_only_stages_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("numa-1.2.0");
        std::fs::write(&artifact, b"new binary").unwrap();

        let installer = installer_for(&UpdaterConfig::default(), true).unwrap();
        let action = installer.install(&artifact).unwrap();

        // Binary replacement would consume the artifact and ask for a relaunch.
        assert!(matches!(action, InstallAction::RunInstaller { .. }));
        assert_eq!(action.program(), artifact.as_path());
        assert_eq!(std::fs::read(&artifact).unwrap(), b"new binary");
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn install_uses_platform_installer() {
        assert!(installer_for(&UpdaterConfig::default(), false).is_ok());
    }
}
