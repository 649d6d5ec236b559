//! Update source adapters.
//!
//! The poller only depends on the [`UpdateProvider`] trait; how the latest
//! version is discovered (custom endpoint, static feed, ...) is up to the
//! implementation.

mod generic;
mod numa;

pub use generic::GenericProvider;
pub use numa::{NumaProvider, LATEST_PATH};

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ProviderKind, UpdaterConfig};
use crate::descriptor::{self, ArtifactLocation, VersionDescriptor};
use crate::error::{Result, UpdateError};
use crate::http;

/// Strategy for discovering the latest release and where to download it.
///
/// Calls block; the poller runs them on the blocking pool.
pub trait UpdateProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Fetch the latest descriptor. `headers` carries the auth header.
    fn fetch_latest(&self, headers: &HashMap<String, String>) -> Result<VersionDescriptor>;

    /// Where to download the artifact described by `descriptor`.
    fn resolve_artifact(&self, descriptor: &VersionDescriptor) -> Result<ArtifactLocation> {
        descriptor::artifact_location(descriptor)
    }
}

/// GET a "latest version" JSON document and parse it.
///
/// Anything but 200 is reported as `Parse`: the endpoint answered, just not
/// with a descriptor.
pub(crate) fn fetch_descriptor(
    url: &str,
    headers: &HashMap<String, String>,
) -> Result<VersionDescriptor> {
    let body = http::get_ok(url, headers).map_err(|e| match e {
        UpdateError::Http { url, status } => {
            UpdateError::parse(format!("{url} returned HTTP {status}"))
        }
        other => other,
    })?;
    descriptor::parse_latest(&body)
}

/// Build the provider selected by configuration.
pub fn from_config(cfg: &UpdaterConfig) -> anyhow::Result<Arc<dyn UpdateProvider>> {
    match cfg.provider {
        ProviderKind::Numa => Ok(Arc::new(NumaProvider::new(cfg.base_url()))),
        ProviderKind::Generic => {
            let feed = cfg
                .feed_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("provider \"generic\" requires feed_url"))?;
            Ok(Arc::new(GenericProvider::new(feed)))
        }
    }
}
