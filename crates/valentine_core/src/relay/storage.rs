//! Snapshot object storage.

use crate::relay::{check_status, RelayError, RelayResult};
use log::info;
use reqwest::blocking::Client;
use std::path::PathBuf;
use std::time::Duration;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Stores a PNG under `name` and returns its public retrieval URL.
pub trait SnapshotStore {
    fn upload_png(&self, name: &str, bytes: &[u8]) -> RelayResult<String>;
}

/// Bucket store speaking the storage REST dialect of the hosted backend:
/// `POST {base}/storage/v1/object/{bucket}/{name}`.
pub struct HttpBucketStore {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: Option<String>,
}

impl HttpBucketStore {
    pub fn new(
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        api_key: Option<String>,
    ) -> RelayResult<Self> {
        let client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            api_key,
        })
    }

    /// Public URL of an object in this bucket.
    pub fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, name
        )
    }
}

impl SnapshotStore for HttpBucketStore {
    fn upload_png(&self, name: &str, bytes: &[u8]) -> RelayResult<String> {
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, name);
        let mut request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(bytes.to_vec());
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key).header("apikey", key);
        }

        check_status(request.send()?)?;
        info!(
            "event=snapshot_upload module=relay status=ok backend=http bytes={}",
            bytes.len()
        );
        Ok(self.public_url(name))
    }
}

/// Store writing snapshots into a local directory, for self-hosted setups.
pub struct DirSnapshotStore {
    dir: PathBuf,
    public_base_url: Option<String>,
}

impl DirSnapshotStore {
    /// `public_base_url` is the URL prefix the directory is served under;
    /// without one, `file://` URLs are returned.
    pub fn new(dir: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.map(|base| base.trim_end_matches('/').to_string()),
        }
    }
}

impl SnapshotStore for DirSnapshotStore {
    fn upload_png(&self, name: &str, bytes: &[u8]) -> RelayResult<String> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(RelayError::Capture(format!("invalid object name `{name}`")));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        info!(
            "event=snapshot_upload module=relay status=ok backend=dir bytes={}",
            bytes.len()
        );

        Ok(match self.public_base_url.as_deref() {
            Some(base) => format!("{base}/{name}"),
            None => format!("file://{}", path.display()),
        })
    }
}
