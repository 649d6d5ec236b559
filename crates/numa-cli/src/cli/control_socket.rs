//! Control socket: server (during `numa-updater run`) and client (for
//! `check-now` / `restart`). Protocol: one line per command, see
//! [`ControlCommand`].

use anyhow::Result;
use numa_core::control::ControlCommand;
use std::path::Path;
use tokio::sync::mpsc;

/// Spawns a task that listens on `path` and forwards each parsed command to
/// `commands`. Malformed lines are logged and ignored.
#[cfg(unix)]
pub fn spawn_control_listener(
    commands: mpsc::Sender<ControlCommand>,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::UnixListener;

    let path = path.as_ref().to_path_buf();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let _ = std::fs::remove_file(&path);
    let listener = UnixListener::bind(&path)?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let commands = commands.clone();
                    tokio::spawn(async move {
                        let mut reader = BufReader::new(stream).lines();
                        while let Ok(Some(line)) = reader.next_line().await {
                            match ControlCommand::parse(&line) {
                                Some(cmd) => {
                                    tracing::debug!(?cmd, "control command");
                                    if commands.send(cmd).await.is_err() {
                                        return;
                                    }
                                }
                                None => tracing::debug!(line = %line.trim(), "ignored control line"),
                            }
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

#[cfg(not(unix))]
pub fn spawn_control_listener(
    _commands: mpsc::Sender<ControlCommand>,
    _path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    anyhow::bail!("control socket requires unix domain sockets")
}

/// Writes `cmd` to the control socket of a running poller.
#[cfg(unix)]
pub async fn send_command(socket_path: &Path, cmd: &ControlCommand) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut stream = tokio::net::UnixStream::connect(socket_path).await?;
    stream.write_all(cmd.to_line().as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

#[cfg(not(unix))]
pub async fn send_command(_socket_path: &Path, _cmd: &ControlCommand) -> Result<()> {
    anyhow::bail!("control socket requires unix domain sockets")
}
