//! Celebration snapshot capture.
//!
//! The rendering shell rasterizes the celebration view; the core only
//! receives the result, either as raw PNG bytes or as a `data:` URL.

use crate::relay::{RelayError, RelayResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;

static DATA_URL_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/\w+;base64,").expect("valid data url regex"));

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Produces the PNG bytes of the rendered celebration view.
pub trait SnapshotCapturer {
    fn capture(&self) -> RelayResult<Vec<u8>>;
}

/// Snapshot already rasterized by the shell.
#[derive(Debug, Clone)]
pub struct PngSnapshot(pub Vec<u8>);

impl SnapshotCapturer for PngSnapshot {
    fn capture(&self) -> RelayResult<Vec<u8>> {
        ensure_png(&self.0)?;
        Ok(self.0.clone())
    }
}

/// Snapshot delivered as `data:image/png;base64,...`.
#[derive(Debug, Clone)]
pub struct DataUrlSnapshot(pub String);

impl SnapshotCapturer for DataUrlSnapshot {
    fn capture(&self) -> RelayResult<Vec<u8>> {
        decode_png_data_url(&self.0)
    }
}

/// Used when the shell could not capture anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnapshot;

impl SnapshotCapturer for NoSnapshot {
    fn capture(&self) -> RelayResult<Vec<u8>> {
        Err(RelayError::Capture("no snapshot provided".to_string()))
    }
}

/// Decodes a base64 image data URL into PNG bytes.
pub fn decode_png_data_url(data_url: &str) -> RelayResult<Vec<u8>> {
    let payload = DATA_URL_PREFIX_RE.replace(data_url.trim(), "");
    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|err| RelayError::Capture(format!("invalid base64 payload: {err}")))?;
    ensure_png(&bytes)?;
    Ok(bytes)
}

/// Object name for an uploaded snapshot: `{pageId}-{timestampMs}.png`.
pub fn snapshot_object_name(page_id: &str, timestamp_ms: i64) -> String {
    format!("{page_id}-{timestamp_ms}.png")
}

fn ensure_png(bytes: &[u8]) -> RelayResult<()> {
    if bytes.starts_with(PNG_SIGNATURE) {
        Ok(())
    } else {
        Err(RelayError::Capture("payload is not a PNG image".to_string()))
    }
}
