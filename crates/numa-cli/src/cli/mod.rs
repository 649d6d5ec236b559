//! CLI for the Numa self-updater.

mod commands;
mod control_socket;

use anyhow::Result;
use clap::{Parser, Subcommand};
use numa_core::config;
use std::path::Path;

use commands::{run_check, run_check_now, run_checksum, run_poller, run_restart};

/// Top-level CLI for the Numa self-updater.
#[derive(Debug, Parser)]
#[command(name = "numa-updater")]
#[command(about = "Numa: background self-updater", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the update poller until ctrl-c or until an update is installed.
    Run {
        /// Auth token for the update server (overrides config).
        #[arg(long)]
        token: Option<String>,
    },

    /// Run a single update check and report the result.
    Check {
        /// Auth token for the update server (overrides config).
        #[arg(long)]
        token: Option<String>,
        /// Download and verify a newer version, but leave the installed program untouched.
        #[arg(long)]
        no_install: bool,
    },

    /// Ask a running poller to check immediately.
    CheckNow,

    /// Restart a running poller's timer, optionally with a new token.
    Restart {
        /// New auth token; omitted means no token.
        #[arg(long)]
        token: Option<String>,
    },

    /// Compute SHA-512 of a file (e.g. a downloaded artifact).
    Checksum {
        /// Path to the file.
        path: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run { token } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let token = token.or_else(|| cfg.token.clone());
                run_poller(&cfg, token).await?;
            }
            CliCommand::Check { token, no_install } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let token = token.or_else(|| cfg.token.clone());
                run_check(&cfg, token.as_deref(), no_install).await?;
            }
            CliCommand::CheckNow => run_check_now().await?,
            CliCommand::Restart { token } => run_restart(token).await?,
            CliCommand::Checksum { path } => run_checksum(Path::new(&path)).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
