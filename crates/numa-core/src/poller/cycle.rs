//! One check-download-verify-install cycle.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use semver::Version;

use super::guard::InFlightGuard;
use super::session::{InFlightRequest, UpdateSession};
use super::Updater;
use crate::checksum;
use crate::descriptor::VersionDescriptor;
use crate::error::{Result, UpdateError};
use crate::events::{PollerState, ProgressThrottle, UpdateEvent};
use crate::http;
use crate::installer::InstallAction;
use crate::storage;
use crate::version;

/// A verified, prepared update waiting for the process to hand over.
#[derive(Debug, Clone)]
pub struct PendingInstall {
    pub descriptor: VersionDescriptor,
    pub artifact: PathBuf,
    pub action: InstallAction,
}

/// Result of a cycle that did not fail.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// Remote version is equal to or older than the running one.
    UpToDate { latest: Version },
    /// Newer version downloaded, verified and prepared for install.
    InstallPending(PendingInstall),
    /// Another cycle was in flight, or an install is already pending.
    Skipped,
}

/// Run a blocking closure on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        UpdateError::Storage(io::Error::new(
            io::ErrorKind::Other,
            format!("blocking task failed: {e}"),
        ))
    })?
}

impl Updater {
    /// Run one full cycle with `token` for authorization.
    ///
    /// Errors are logged, emitted as `UpdateEvent::Error`, and leave the
    /// poller `Idle`; they are also returned for one-shot callers.
    pub async fn check(&self, token: Option<&str>) -> Result<CycleOutcome> {
        let Some(_guard) = InFlightGuard::try_acquire(&self.inner.in_flight) else {
            tracing::debug!("update check already in flight; tick ignored");
            return Ok(CycleOutcome::Skipped);
        };
        if self.install_pending() {
            tracing::debug!("install already pending; tick ignored");
            return Ok(CycleOutcome::Skipped);
        }

        let mut session = UpdateSession::begin(self.inner.current_version.clone());
        let result = self.run_session(&mut session, token).await;
        match &result {
            Ok(CycleOutcome::InstallPending(_)) => {}
            Ok(_) => self.set_state(PollerState::Idle),
            Err(e) => {
                tracing::warn!(
                    in_flight = ?session.in_flight_request,
                    kind = ?e.kind(),
                    "Error in auto-updater: {}",
                    e
                );
                self.inner.events.emit(UpdateEvent::Error(e.to_string()));
                self.set_state(PollerState::Idle);
            }
        }
        tracing::debug!(elapsed_ms = session.elapsed().as_millis() as u64, "update cycle finished");
        result
    }

    async fn run_session(
        &self,
        session: &mut UpdateSession,
        token: Option<&str>,
    ) -> Result<CycleOutcome> {
        self.set_state(PollerState::Checking);
        self.inner.events.emit(UpdateEvent::CheckingForUpdate);
        tracing::info!(provider = self.inner.provider.name(), "Checking for update...");

        let headers = http::auth_headers(token);
        session.in_flight_request = Some(InFlightRequest::Descriptor);
        let descriptor = {
            let provider = Arc::clone(&self.inner.provider);
            let headers = headers.clone();
            blocking(move || provider.fetch_latest(&headers)).await?
        };
        session.in_flight_request = None;

        if !version::should_install(&session.current_version, &descriptor.version) {
            self.set_state(PollerState::UpToDate);
            tracing::info!(
                current = %session.current_version,
                latest = %descriptor.version,
                "Update not available."
            );
            let latest = descriptor.version.clone();
            self.inner.events.emit(UpdateEvent::UpdateNotAvailable(descriptor));
            return Ok(CycleOutcome::UpToDate { latest });
        }

        tracing::info!(
            current = %session.current_version,
            latest = %descriptor.version,
            released = %descriptor.release_timestamp,
            "Update available."
        );
        self.inner.events.emit(UpdateEvent::UpdateAvailable(descriptor.clone()));
        self.set_state(PollerState::DownloadingUpdate);

        let location = self.inner.provider.resolve_artifact(&descriptor)?;
        let final_path = self.inner.download_dir.join(&location.file_name);
        session.in_flight_request = Some(InFlightRequest::Artifact(location.url.to_string()));
        let artifact = self
            .download_and_verify(location.url.to_string(), headers, final_path, &descriptor)
            .await?;
        session.in_flight_request = None;
        self.inner.events.emit(UpdateEvent::UpdateDownloaded {
            descriptor: descriptor.clone(),
            path: artifact.clone(),
        });

        let action = {
            let installer = Arc::clone(&self.inner.installer);
            let artifact = artifact.clone();
            blocking(move || installer.install(&artifact)).await
        };
        let action = match action {
            Ok(action) => action,
            Err(e) => {
                storage::remove_artifact(&artifact);
                return Err(e);
            }
        };

        let pending = PendingInstall {
            descriptor,
            artifact,
            action,
        };
        self.store_pending_install(pending.clone());
        self.set_state(PollerState::InstallPending);
        tracing::info!(version = %pending.descriptor.version, "update ready to install");
        Ok(CycleOutcome::InstallPending(pending))
    }

    async fn download_and_verify(
        &self,
        url: String,
        headers: HashMap<String, String>,
        final_path: PathBuf,
        descriptor: &VersionDescriptor,
    ) -> Result<PathBuf> {
        let events = self.inner.events.clone();
        let expected = descriptor.checksum.clone();
        blocking(move || {
            let mut throttle = ProgressThrottle::default();
            let mut on_progress = |received: u64, total: Option<u64>| {
                if throttle.should_emit(received, total) {
                    tracing::trace!(received, ?total, "Download progress...");
                    events.emit(UpdateEvent::DownloadProgress { received, total });
                }
            };
            http::download_to(&url, &headers, &final_path, &mut on_progress)?;
            if let Err(e) = checksum::verify_sha512(&final_path, &expected) {
                storage::remove_artifact(&final_path);
                return Err(e);
            }
            Ok(final_path)
        })
        .await
    }
}
