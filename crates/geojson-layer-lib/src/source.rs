//! Data sources providing raw GeoJSON text
//!
//! A source has a single capability: fetch the document text or fail. Retries,
//! caching and the like are left to the source implementation.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Errors raised while fetching a document
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed with status {0}")]
    HttpStatus(u16),

    #[error("Response body exceeds the limit of {0} bytes")]
    BodyTooLarge(u64),

    #[error("Network error: {0}")]
    Network(String),
}

/// Something that can fetch a GeoJSON document as text
pub trait DataSource: Send + Sync {
    /// Fetch the raw document
    fn fetch(&self) -> impl Future<Output = Result<String, SourceError>> + Send;

    /// Human readable description used in logs
    fn describe(&self) -> String;
}

/// A document in a local file
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataSource for FileSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SourceError::NotFound(self.path.clone()),
                _ => SourceError::Io(e),
            })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// A document held in memory
#[derive(Clone, Debug)]
pub struct MemorySource {
    text: Arc<str>,
}

impl MemorySource {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self { text: text.into() }
    }
}

impl DataSource for MemorySource {
    async fn fetch(&self) -> Result<String, SourceError> {
        Ok(self.text.to_string())
    }

    fn describe(&self) -> String {
        format!("in-memory document ({} bytes)", self.text.len())
    }
}

/// A document served over HTTP(S)
///
/// The request is blocking and runs on tokio's blocking pool. Any non-2xx
/// response is reported as [`SourceError::HttpStatus`]. Bodies are read in
/// full; there is no size limit unless one is set with
/// [`HttpSource::with_body_limit`].
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpSource {
    url: String,
    body_limit: u64,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body_limit: u64::MAX,
        }
    }

    /// Fail with [`SourceError::BodyTooLarge`] on bodies over `bytes`
    pub fn with_body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch_blocking(url: &str, body_limit: u64) -> Result<String, SourceError> {
        let mut response = ureq::get(url).call().map_err(map_http_error)?;
        response
            .body_mut()
            .with_config()
            .limit(body_limit)
            .read_to_string()
            .map_err(map_http_error)
    }
}

#[cfg(feature = "http")]
fn map_http_error(error: ureq::Error) -> SourceError {
    match error {
        ureq::Error::StatusCode(status) => SourceError::HttpStatus(status),
        ureq::Error::BodyExceedsLimit(limit) => SourceError::BodyTooLarge(limit),
        e => SourceError::Network(e.to_string()),
    }
}

#[cfg(feature = "http")]
impl DataSource for HttpSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        let url = self.url.clone();
        let body_limit = self.body_limit;
        tokio::task::spawn_blocking(move || Self::fetch_blocking(&url, body_limit))
            .await
            .map_err(|e| SourceError::Network(format!("request task failed: {e}")))?
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}
