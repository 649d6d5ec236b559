//! Blocking HTTP over libcurl.
//!
//! Both entry points run in the current thread; the poller calls them from
//! `spawn_blocking`. Transport failures surface as `UpdateError::Network`,
//! non-2xx statuses as `UpdateError::Http`.

mod download;
mod headers;

pub use download::download_to;
pub use headers::{auth_headers, content_length};

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{Result, UpdateError};

const USER_AGENT: &str = concat!("numa-updater/", env!("CARGO_PKG_VERSION"));

/// A fully read response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u32,
    pub body: Vec<u8>,
}

/// Base curl handle shared by both request kinds: redirects, timeouts, headers.
pub(crate) fn easy_for(url: &str, custom_headers: &HashMap<String, String>) -> Result<curl::easy::Easy> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(USER_AGENT)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    // Abort stalled transfers: under 1 KiB/s for a minute.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;

    let mut list = curl::easy::List::new();
    for (k, v) in custom_headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !custom_headers.is_empty() {
        easy.http_headers(list)?;
    }
    Ok(easy)
}

/// GET `url` and return status and body. Does not judge the status.
pub fn get(url: &str, custom_headers: &HashMap<String, String>) -> Result<Response> {
    let mut body = Vec::new();
    let mut easy = easy_for(url, custom_headers)?;
    easy.timeout(Duration::from_secs(60))?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    let status = easy.response_code()?;
    tracing::debug!(url, status, bytes = body.len(), "GET completed");
    Ok(Response { status, body })
}

/// GET `url` and fail with `UpdateError::Http` unless the status is 200.
pub fn get_ok(url: &str, custom_headers: &HashMap<String, String>) -> Result<Vec<u8>> {
    let resp = get(url, custom_headers)?;
    if resp.status != 200 {
        return Err(UpdateError::Http {
            url: url.to_string(),
            status: resp.status,
        });
    }
    Ok(resp.body)
}
