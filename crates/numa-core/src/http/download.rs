//! Streaming artifact download into a `.part` file.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;
use std::str;

use super::{easy_for, headers};
use crate::error::{Result, UpdateError};
use crate::storage::ArtifactWriter;

/// Download `url` to `final_path`, streaming through a temp file.
///
/// `on_progress` is called after every chunk with bytes received so far and
/// the `Content-Length` if the server sent one. On any failure the partial
/// file is removed and nothing exists at `final_path`.
pub fn download_to(
    url: &str,
    custom_headers: &HashMap<String, String>,
    final_path: &Path,
    on_progress: &mut dyn FnMut(u64, Option<u64>),
) -> Result<u64> {
    let mut writer = ArtifactWriter::create(final_path)?;
    let total: Cell<Option<u64>> = Cell::new(None);
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = match easy_for(url, custom_headers) {
        Ok(easy) => easy,
        Err(e) => {
            writer.discard();
            return Err(e);
        }
    };

    let performed = perform_into(&mut easy, &mut writer, &total, &mut write_err, on_progress);

    if let Some(e) = write_err {
        writer.discard();
        return Err(UpdateError::Storage(e));
    }
    if let Err(e) = performed {
        writer.discard();
        return Err(UpdateError::Network(e));
    }

    let status = match easy.response_code() {
        Ok(code) => code,
        Err(e) => {
            writer.discard();
            return Err(UpdateError::Network(e));
        }
    };
    if !(200..300).contains(&status) {
        writer.discard();
        return Err(UpdateError::Http {
            url: url.to_string(),
            status,
        });
    }

    let written = writer.written();
    if let Some(expected) = total.get() {
        if written != expected {
            writer.discard();
            return Err(UpdateError::Storage(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("partial transfer: wrote {written} of {expected}"),
            )));
        }
    }
    writer.finalize(final_path)?;
    tracing::info!(url, path = %final_path.display(), bytes = written, "artifact downloaded");
    Ok(written)
}

fn perform_into(
    easy: &mut curl::easy::Easy,
    writer: &mut ArtifactWriter,
    total: &Cell<Option<u64>>,
    write_err: &mut Option<std::io::Error>,
    on_progress: &mut dyn FnMut(u64, Option<u64>),
) -> std::result::Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.header_function(|data| {
        // Redirect hops each send a header block; only the last one counts.
        let line = str::from_utf8(data).unwrap_or("");
        if line.starts_with("HTTP/") {
            total.set(None);
        } else if let Some(n) = headers::content_length(line) {
            total.set(Some(n));
        }
        true
    })?;
    transfer.write_function(|data| match writer.write_chunk(data) {
        Ok(()) => {
            on_progress(writer.written(), total.get());
            Ok(data.len())
        }
        Err(e) => {
            tracing::warn!("artifact write failed: {}", e);
            *write_err = Some(e);
            Ok(0) // abort transfer
        }
    })?;
    transfer.perform()
}
