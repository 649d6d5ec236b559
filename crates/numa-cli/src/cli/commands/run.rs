//! `numa-updater run` – run the poller until ctrl-c or an install hand-over.

use anyhow::Result;
use numa_core::config::UpdaterConfig;
use numa_core::control::{default_control_socket_path, ControlCommand};
use numa_core::events::{EventSink, UpdateEvent};
use numa_core::installer;
use numa_core::poller::Updater;
use std::io::Write;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cli::control_socket;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Event channel plus a task printing events to stdout. The task ends once
/// every sender is dropped.
pub(super) fn spawn_event_printer() -> (mpsc::Sender<UpdateEvent>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<UpdateEvent>(EVENT_CHANNEL_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut progress_shown = false;
        while let Some(event) = rx.recv().await {
            match event {
                UpdateEvent::CheckingForUpdate => println!("Checking for update..."),
                UpdateEvent::UpdateAvailable(d) => {
                    println!("Update available: {} (released {})", d.version, d.release_timestamp)
                }
                UpdateEvent::UpdateNotAvailable(d) => {
                    println!("Update not available (latest {})", d.version)
                }
                UpdateEvent::DownloadProgress { received, total } => {
                    let done_mib = received as f64 / 1_048_576.0;
                    match total {
                        Some(t) if t > 0 => print!(
                            "\r  {:.1} / {:.1} MiB ({:.0}%)  ",
                            done_mib,
                            t as f64 / 1_048_576.0,
                            received as f64 * 100.0 / t as f64
                        ),
                        _ => print!("\r  {:.1} MiB  ", done_mib),
                    }
                    let _ = std::io::stdout().flush();
                    progress_shown = true;
                }
                UpdateEvent::UpdateDownloaded { descriptor, path } => {
                    end_progress_line(&mut progress_shown);
                    println!("Update {} downloaded to {}", descriptor.version, path.display())
                }
                UpdateEvent::Error(msg) => {
                    end_progress_line(&mut progress_shown);
                    eprintln!("Error in auto-updater: {msg}")
                }
            }
        }
    });
    (tx, handle)
}

/// Terminate an in-place progress line before printing anything else.
fn end_progress_line(progress_shown: &mut bool) {
    if std::mem::take(progress_shown) {
        println!();
    }
}

pub async fn run_poller(cfg: &UpdaterConfig, token: Option<String>) -> Result<()> {
    let (events_tx, _printer) = spawn_event_printer();
    let updater = Updater::from_config(cfg, EventSink::new(events_tx))?;
    tracing::info!(version = %updater.current_version(), "numa-updater starting");

    let (control_tx, mut control_rx) = mpsc::channel::<ControlCommand>(8);
    let socket_path = default_control_socket_path().ok();
    if let Some(path) = &socket_path {
        if control_socket::spawn_control_listener(control_tx, path).is_ok() {
            tracing::debug!(path = %path.display(), "control socket listening");
        }
    }

    let mut handle = updater.start_interval(token);
    let mut control_open = true;
    let pending = loop {
        tokio::select! {
            cmd = control_rx.recv(), if control_open => match cmd {
                Some(ControlCommand::CheckNow) => {
                    if !handle.check_now() {
                        tracing::debug!("check already queued or poller stopped");
                    }
                }
                Some(ControlCommand::Restart { token }) => {
                    handle = updater.restart(handle, token);
                }
                None => control_open = false,
            },
            pending = updater.wait_for_install() => break pending,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted; stopping");
                break None;
            }
        }
    };

    updater.stop_interval(handle);
    if let Some(path) = &socket_path {
        let _ = std::fs::remove_file(path);
    }
    if let Some(pending) = pending {
        println!("Installing update {}", pending.descriptor.version);
        installer::perform(&pending.action)?;
    }
    Ok(())
}
