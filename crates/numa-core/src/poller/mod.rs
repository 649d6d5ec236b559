//! Update poller.
//!
//! [`Updater`] owns the provider, installer and in-flight guard; it is cheap
//! to clone and shared by every timer started from it. [`Updater::start_interval`]
//! returns an owned [`PollerHandle`]: the only way to stop or restart that timer.
//!
//! Each tick runs its cycle as a separate task, so stopping the timer cancels
//! future ticks without aborting a download that is already running. At most
//! one cycle runs at a time per `Updater`; overlapping ticks are ignored.

mod cycle;
mod guard;
mod session;

pub use cycle::{CycleOutcome, PendingInstall};
pub use session::{InFlightRequest, UpdateSession};

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use semver::Version;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::UpdaterConfig;
use crate::events::{EventSink, PollerState};
use crate::installer::{self, Installer};
use crate::provider::{self, UpdateProvider};

/// Static poller settings.
#[derive(Debug, Clone)]
pub struct UpdaterOptions {
    /// Version the running program reports.
    pub current_version: Version,
    /// Period between scheduled checks.
    pub interval: Duration,
    /// Directory artifacts are downloaded into.
    pub download_dir: PathBuf,
}

impl UpdaterOptions {
    pub fn from_config(cfg: &UpdaterConfig) -> anyhow::Result<Self> {
        Ok(Self {
            current_version: cfg.current_version()?,
            interval: cfg.check_interval(),
            download_dir: cfg.download_dir()?,
        })
    }
}

struct Inner {
    provider: Arc<dyn UpdateProvider>,
    installer: Arc<dyn Installer>,
    current_version: Version,
    interval: Duration,
    download_dir: PathBuf,
    in_flight: AtomicBool,
    pending: Mutex<Option<PendingInstall>>,
    state: watch::Sender<PollerState>,
    events: EventSink,
}

#[derive(Clone)]
pub struct Updater {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("provider", &self.inner.provider.name())
            .field("current_version", &self.inner.current_version)
            .field("interval", &self.inner.interval)
            .field("state", &self.state())
            .finish()
    }
}

#[derive(Debug)]
enum PollerCommand {
    CheckNow,
}

/// Owned handle to a running interval timer.
#[derive(Debug)]
pub struct PollerHandle {
    task: JoinHandle<()>,
    commands: mpsc::Sender<PollerCommand>,
    token: Option<String>,
}

impl PollerHandle {
    /// Request an immediate check. Returns false if the timer has stopped or a
    /// request is already queued.
    pub fn check_now(&self) -> bool {
        self.commands.try_send(PollerCommand::CheckNow).is_ok()
    }

    /// Token this timer authenticates with.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// True once the timer loop has ended (stopped, or an install is pending).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel future ticks. A cycle already running is left to finish.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Updater {
    pub fn new(
        provider: Arc<dyn UpdateProvider>,
        installer: Arc<dyn Installer>,
        options: UpdaterOptions,
    ) -> Self {
        Self::with_events(provider, installer, options, EventSink::none())
    }

    /// Like `new`, with lifecycle events delivered to `events`.
    pub fn with_events(
        provider: Arc<dyn UpdateProvider>,
        installer: Arc<dyn Installer>,
        options: UpdaterOptions,
        events: EventSink,
    ) -> Self {
        let (state, _) = watch::channel(PollerState::Idle);
        Self {
            inner: Arc::new(Inner {
                provider,
                installer,
                current_version: options.current_version,
                interval: options.interval,
                download_dir: options.download_dir,
                in_flight: AtomicBool::new(false),
                pending: Mutex::new(None),
                state,
                events,
            }),
        }
    }

    /// Provider, installer and options as described by `cfg`.
    pub fn from_config(cfg: &UpdaterConfig, events: EventSink) -> anyhow::Result<Self> {
        let installer = installer::default_installer(&cfg.install())?;
        Self::from_config_with_installer(cfg, installer, events)
    }

    /// Like `from_config`, applying updates with `installer`.
    pub fn from_config_with_installer(
        cfg: &UpdaterConfig,
        installer: Arc<dyn Installer>,
        events: EventSink,
    ) -> anyhow::Result<Self> {
        let provider = provider::from_config(cfg)?;
        let options = UpdaterOptions::from_config(cfg)?;
        Ok(Self::with_events(provider, installer, options, events))
    }

    pub fn current_version(&self) -> &Version {
        &self.inner.current_version
    }

    pub fn state(&self) -> PollerState {
        *self.inner.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<PollerState> {
        self.inner.state.subscribe()
    }

    fn set_state(&self, state: PollerState) {
        let prev = self.inner.state.send_replace(state);
        if prev != state {
            tracing::debug!(from = ?prev, to = ?state, "poller state");
        }
    }

    /// True once a cycle reached `InstallPending`; no further cycles run.
    pub fn install_pending(&self) -> bool {
        self.state() == PollerState::InstallPending
    }

    fn store_pending_install(&self, pending: PendingInstall) {
        if let Ok(mut slot) = self.inner.pending.lock() {
            *slot = Some(pending);
        }
    }

    /// Take the prepared update, if a cycle reached `InstallPending`.
    pub fn take_pending_install(&self) -> Option<PendingInstall> {
        self.inner.pending.lock().ok().and_then(|mut p| p.take())
    }

    /// Wait until a cycle reaches `InstallPending` and return the prepared update.
    pub async fn wait_for_install(&self) -> Option<PendingInstall> {
        let mut rx = self.subscribe_state();
        if rx
            .wait_for(|s| *s == PollerState::InstallPending)
            .await
            .is_err()
        {
            return None;
        }
        self.take_pending_install()
    }

    /// Start the timer: one check right away, then one per interval.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_interval(&self, token: Option<String>) -> PollerHandle {
        let (commands, mut rx) = mpsc::channel(1);
        let updater = self.clone();
        let loop_token = token.clone();
        let period = self.inner.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut commands_open = true;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    cmd = rx.recv(), if commands_open => match cmd {
                        Some(PollerCommand::CheckNow) => {
                            tracing::info!("manual update check requested");
                        }
                        None => {
                            commands_open = false;
                            continue;
                        }
                    },
                }
                if updater.install_pending() {
                    tracing::debug!("install pending; update timer stopping");
                    break;
                }
                let cycle_updater = updater.clone();
                let cycle_token = loop_token.clone();
                tokio::spawn(async move {
                    // Failures are already logged and reported as events.
                    let _ = cycle_updater.check(cycle_token.as_deref()).await;
                });
            }
        });

        tracing::info!(interval_secs = period.as_secs(), "update timer started");
        PollerHandle {
            task,
            commands,
            token,
        }
    }

    /// Cancel future ticks of `handle`'s timer.
    pub fn stop_interval(&self, handle: PollerHandle) {
        handle.stop();
        tracing::info!("update timer stopped");
    }

    /// `stop_interval(handle)` followed by `start_interval(token)`.
    pub fn restart(&self, handle: PollerHandle, token: Option<String>) -> PollerHandle {
        self.stop_interval(handle);
        self.start_interval(token)
    }
}
