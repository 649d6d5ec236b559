//! Custom endpoint provider: `GET {base_url}/latest_numa_app`.

use std::collections::HashMap;

use super::{fetch_descriptor, UpdateProvider};
use crate::config::Environment;
use crate::descriptor::VersionDescriptor;
use crate::error::Result;

/// Path of the latest-version endpoint under the base URL.
pub const LATEST_PATH: &str = "latest_numa_app";

#[derive(Debug, Clone)]
pub struct NumaProvider {
    base_url: String,
}

impl NumaProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Provider for the built-in endpoint of `env`.
    pub fn for_environment(env: Environment) -> Self {
        Self::new(env.base_url())
    }

    /// Full URL of the latest-version endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), LATEST_PATH)
    }
}

impl UpdateProvider for NumaProvider {
    fn name(&self) -> &str {
        "numa"
    }

    fn fetch_latest(&self, headers: &HashMap<String, String>) -> Result<VersionDescriptor> {
        let url = self.endpoint();
        tracing::debug!(url = %url, "fetching latest version");
        fetch_descriptor(&url, headers)
    }
}
