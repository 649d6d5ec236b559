//! Version descriptor: the generic shape the poller understands.

use semver::Version;
use serde::Deserialize;

use crate::error::{Result, UpdateError};
use crate::version::parse_version;

/// Metadata describing an available update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub version: Version,
    pub download_url: String,
    /// SHA-512 of the artifact (hex or base64).
    pub checksum: String,
    pub release_timestamp: String,
}

/// Where to fetch the artifact from, and the local file name to store it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub url: url::Url,
    pub file_name: String,
}

/// Wire format of the "latest version" endpoint. Every field is required.
#[derive(Debug, Deserialize)]
struct LatestResponse {
    version: String,
    url: String,
    sha512: String,
    release_date: String,
}

/// Parse a "latest version" JSON body into a descriptor.
///
/// Missing fields, wrong types, an unparseable version or empty url/sha512
/// are all `Parse` errors.
pub fn parse_latest(body: &[u8]) -> Result<VersionDescriptor> {
    let raw: LatestResponse = serde_json::from_slice(body)
        .map_err(|e| UpdateError::parse(format!("latest version body: {e}")))?;

    let version = parse_version(&raw.version)?;
    if raw.url.trim().is_empty() {
        return Err(UpdateError::parse("latest version body: empty url"));
    }
    if raw.sha512.trim().is_empty() {
        return Err(UpdateError::parse("latest version body: empty sha512"));
    }

    Ok(VersionDescriptor {
        version,
        download_url: raw.url.trim().to_string(),
        checksum: raw.sha512.trim().to_string(),
        release_timestamp: raw.release_date,
    })
}

/// Resolve the artifact location of a descriptor.
///
/// The file name is the last non-empty path segment of the URL, or
/// `update-<version>.bin` when the URL has none.
pub fn artifact_location(descriptor: &VersionDescriptor) -> Result<ArtifactLocation> {
    let url = url::Url::parse(&descriptor.download_url).map_err(|e| {
        UpdateError::parse(format!("invalid artifact url {:?}: {e}", descriptor.download_url))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UpdateError::parse(format!(
            "unsupported artifact url scheme: {}",
            url.scheme()
        )));
    }
    let file_name = url
        .path_segments()
        .and_then(|segs| segs.filter(|s| !s.is_empty()).last())
        .filter(|s| *s != "." && *s != "..")
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("update-{}.bin", descriptor.version));
    Ok(ArtifactLocation { url, file_name })
}
