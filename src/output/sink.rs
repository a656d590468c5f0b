//! Locator resolution and `rodio` sink construction.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::OutputError;

/// Map a track locator to a local file path.
///
/// Plain paths and `file://` URLs are accepted; any other scheme is
/// reported as unsupported since this output does no network fetching.
pub fn resolve_locator(locator: &str) -> Result<PathBuf, OutputError> {
    let locator = locator.trim();
    if let Some(rest) = locator.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if locator.is_empty() || locator.contains("://") {
        return Err(OutputError::UnsupportedSource(locator.to_string()));
    }
    Ok(PathBuf::from(locator))
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Returns the sink and the total length of the source when the decoder knows it.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), OutputError> {
    let file = File::open(path).map_err(|e| OutputError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let decoder = Decoder::new(BufReader::new(file)).map_err(|e| OutputError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let total = decoder.total_duration();

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
