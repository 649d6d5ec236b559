use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::version;

/// Directory/file prefix used under the XDG base directories.
pub const APP_NAME: &str = "numa-updater";

/// Production update API.
pub const PACKAGED_BASE_URL: &str = "https://numa.com/api";
/// Local development server.
pub const DEVELOPMENT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default poll period: 15 minutes.
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 15 * 60;

/// Packaging flag: selects the built-in endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Packaged,
    Development,
}

impl Environment {
    /// Release builds are packaged; debug builds talk to the local server.
    pub fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Environment::Development
        } else {
            Environment::Packaged
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Packaged => PACKAGED_BASE_URL,
            Environment::Development => DEVELOPMENT_BASE_URL,
        }
    }
}

/// Which update provider to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Custom endpoint `{base_url}/latest_numa_app`.
    #[default]
    Numa,
    /// Fixed `feed_url` serving the same JSON shape.
    Generic,
}

/// How a verified artifact is applied (optional `[install]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Run the installer without UI.
    pub silent: bool,
    /// Relaunch the application once the installer finishes.
    pub force_run_after: bool,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            silent: true,
            force_run_after: true,
        }
    }
}

/// Global configuration loaded from `~/.config/numa-updater/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdaterConfig {
    /// Seconds between scheduled checks.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    /// Packaged or development endpoint; None = decided by the build profile.
    #[serde(default)]
    pub environment: Option<Environment>,
    /// Overrides the environment's base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub provider: ProviderKind,
    /// Required when `provider = "generic"`.
    #[serde(default)]
    pub feed_url: Option<String>,
    /// Overrides the version compiled into the binary.
    #[serde(default)]
    pub current_version: Option<String>,
    /// Auth token sent as `Authorization: Token <token>`.
    #[serde(default)]
    pub token: Option<String>,
    /// Where artifacts are downloaded; None = XDG cache dir.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub install: Option<InstallConfig>,
}

fn default_check_interval_secs() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            environment: None,
            base_url: None,
            provider: ProviderKind::Numa,
            feed_url: None,
            current_version: None,
            token: None,
            download_dir: None,
            install: None,
        }
    }
}

impl UpdaterConfig {
    pub fn environment(&self) -> Environment {
        self.environment.unwrap_or_else(Environment::from_build)
    }

    /// Base URL for the custom endpoint provider.
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.environment().base_url().to_string())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    /// Version the poller compares against.
    pub fn current_version(&self) -> Result<semver::Version> {
        match &self.current_version {
            Some(raw) => version::parse_version(raw).context("current_version in config"),
            None => Ok(version::running_version()),
        }
    }

    pub fn install(&self) -> InstallConfig {
        self.install.clone().unwrap_or_default()
    }

    pub fn download_dir(&self) -> Result<PathBuf> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_download_dir(),
        }
    }

    /// Reject values that would make the poller misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.check_interval_secs == 0 {
            anyhow::bail!("check_interval_secs must be greater than 0");
        }
        if self.provider == ProviderKind::Generic && self.feed_url.is_none() {
            anyhow::bail!("provider \"generic\" requires feed_url");
        }
        self.current_version()?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME)?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// `$XDG_CACHE_HOME/numa-updater/pending`.
pub fn default_download_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME)?;
    Ok(xdg_dirs.get_cache_home().join(APP_NAME).join("pending"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<UpdaterConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = UpdaterConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: UpdaterConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
