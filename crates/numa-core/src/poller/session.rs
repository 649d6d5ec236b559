//! Per-tick session record.

use semver::Version;
use std::time::{Duration, SystemTime};

/// Request currently outstanding within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InFlightRequest {
    /// Fetching the latest descriptor.
    Descriptor,
    /// Downloading the artifact from this URL.
    Artifact(String),
}

/// Transient record of one check cycle. Created at the start of a tick and
/// dropped when the cycle ends.
#[derive(Debug, Clone)]
pub struct UpdateSession {
    pub last_check_time: SystemTime,
    pub current_version: Version,
    pub in_flight_request: Option<InFlightRequest>,
}

impl UpdateSession {
    pub fn begin(current_version: Version) -> Self {
        Self {
            last_check_time: SystemTime::now(),
            current_version,
            in_flight_request: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.last_check_time.elapsed().unwrap_or_default()
    }
}
