//! `numa-updater check-now` and `numa-updater restart` – drive a running poller.

use anyhow::{Context, Result};
use numa_core::control::{default_control_socket_path, ControlCommand};

use crate::cli::control_socket;

pub async fn run_check_now() -> Result<()> {
    send(ControlCommand::CheckNow).await?;
    println!("Requested update check");
    Ok(())
}

pub async fn run_restart(token: Option<String>) -> Result<()> {
    send(ControlCommand::Restart { token }).await?;
    println!("Requested poller restart");
    Ok(())
}

async fn send(cmd: ControlCommand) -> Result<()> {
    let path = default_control_socket_path().context("control socket path")?;
    control_socket::send_command(&path, &cmd)
        .await
        .with_context(|| format!("is `numa-updater run` active? ({})", path.display()))
}
