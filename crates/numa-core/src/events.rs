//! Update lifecycle events and poller state.

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::descriptor::VersionDescriptor;

/// Poller state machine: `Idle → Checking → {UpToDate | DownloadingUpdate} → Idle`,
/// with `InstallPending` terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Checking,
    UpToDate,
    DownloadingUpdate,
    InstallPending,
}

/// Notifications emitted while a cycle runs.
#[derive(Debug, Clone)]
pub enum UpdateEvent {
    CheckingForUpdate,
    UpdateAvailable(VersionDescriptor),
    UpdateNotAvailable(VersionDescriptor),
    DownloadProgress { received: u64, total: Option<u64> },
    UpdateDownloaded { descriptor: VersionDescriptor, path: PathBuf },
    Error(String),
}

/// Best-effort event sink. Never blocks; events are dropped when nobody
/// listens or the channel is full.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<UpdateEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<UpdateEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that discards everything.
    pub fn none() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: UpdateEvent) {
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.try_send(event) {
                tracing::trace!("update event dropped: {}", e);
            }
        }
    }
}

/// Throttles progress events to whole-percent steps (or every 1 MiB when the
/// size is unknown).
#[derive(Debug, Default)]
pub(crate) struct ProgressThrottle {
    last_step: Option<u64>,
}

impl ProgressThrottle {
    const UNKNOWN_STEP: u64 = 1024 * 1024;

    pub(crate) fn should_emit(&mut self, received: u64, total: Option<u64>) -> bool {
        let step = match total {
            Some(t) if t > 0 => received.saturating_mul(100) / t,
            _ => received / Self::UNKNOWN_STEP,
        };
        if self.last_step == Some(step) {
            return false;
        }
        self.last_step = Some(step);
        true
    }
}
