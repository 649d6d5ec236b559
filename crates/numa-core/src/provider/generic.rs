//! Generic feed provider: a fixed URL serving the descriptor JSON (e.g. a
//! `latest.json` next to the artifacts on a CDN).

use std::collections::HashMap;

use super::{fetch_descriptor, UpdateProvider};
use crate::descriptor::{ArtifactLocation, VersionDescriptor};
use crate::error::{Result, UpdateError};

#[derive(Debug, Clone)]
pub struct GenericProvider {
    feed_url: String,
}

impl GenericProvider {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
        }
    }
}

impl UpdateProvider for GenericProvider {
    fn name(&self) -> &str {
        "generic"
    }

    fn fetch_latest(&self, headers: &HashMap<String, String>) -> Result<VersionDescriptor> {
        tracing::debug!(url = %self.feed_url, "fetching latest version feed");
        fetch_descriptor(&self.feed_url, headers)
    }

    /// Artifact URLs in a feed may be relative to the feed itself.
    fn resolve_artifact(&self, descriptor: &VersionDescriptor) -> Result<ArtifactLocation> {
        let base = url::Url::parse(&self.feed_url)
            .map_err(|e| UpdateError::parse(format!("invalid feed url {:?}: {e}", self.feed_url)))?;
        let joined = base.join(&descriptor.download_url).map_err(|e| {
            UpdateError::parse(format!("invalid artifact url {:?}: {e}", descriptor.download_url))
        })?;
        let mut resolved = descriptor.clone();
        resolved.download_url = joined.to_string();
        crate::descriptor::artifact_location(&resolved)
    }
}
