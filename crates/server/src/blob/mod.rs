//! Image storage.
//!
//! Uploaded images are handed to a [`BlobStore`] which returns the URL the
//! record will reference. Two stores exist, chosen once from [`BlobConfig`]:
//! [`LocalBlobStore`] writes into a directory served by this service, and
//! [`RemoteBlobStore`] uploads to an object-storage bucket.
mod local;
mod remote;

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use salvo::async_trait;

pub use local::LocalBlobStore;
pub use remote::RemoteBlobStore;

use crate::config::{BlobBackend, BlobConfig};

/// Content type used when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension used when the uploaded file name has none.
pub const DEFAULT_EXTENSION: &str = ".png";

/// Chunked body of an upload.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send + 'static>>;

/// Result of blob operations.
pub type BlobResult<T> = Result<T, BlobError>;

/// Failures of a blob store.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Reading the upload or writing the file failed.
    #[error("failed to store {name}: {source}")]
    Io {
        /// Blob name.
        name: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The bucket could not be reached or replied with an unreadable body.
    #[error("blob request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The bucket answered with a non-success status.
    #[error("blob bucket rejected {name} with status {status}")]
    Rejected {
        /// Blob name.
        name: String,
        /// HTTP status returned by the bucket.
        status: u16,
    },

    /// The name would escape the store.
    #[error("invalid blob name: {0}")]
    InvalidName(String),

    /// The configured bucket endpoint is not a usable URL.
    #[error("invalid blob endpoint {endpoint}: {reason}")]
    Endpoint {
        /// Configured value.
        endpoint: String,
        /// Why it was refused.
        reason: String,
    },
}

impl BlobError {
    pub(crate) fn io(name: &str, source: io::Error) -> Self {
        Self::Io {
            name: name.to_owned(),
            source,
        }
    }
}

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Name the blob was stored under.
    pub name: String,
    /// Where clients fetch it.
    pub url: String,
}

/// A place uploaded images can be written to.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Short name for logs.
    fn kind(&self) -> &'static str;

    /// Writes `stream` under `name` and returns its public location.
    async fn store(&self, stream: ByteStream, name: &str, content_type: &str) -> BlobResult<StoredBlob>;

    /// Deletes a blob previously returned by [`BlobStore::store`]. Missing blobs are not an error.
    async fn remove(&self, blob: &StoredBlob) -> BlobResult<()>;

    /// Directory and URL prefix to serve, for stores whose files this service hands out itself.
    fn served_dir(&self) -> Option<(&str, &Path)> {
        None
    }
}

/// Builds the store selected by `config`.
///
/// # Errors
///
/// Returns an error if the remote endpoint is not a valid URL.
pub fn from_config(config: &BlobConfig) -> BlobResult<Arc<dyn BlobStore>> {
    Ok(match (config.backend(), &config.token) {
        (BlobBackend::Remote, Some(token)) => Arc::new(RemoteBlobStore::new(&config.endpoint, token.clone())?),
        _ => Arc::new(LocalBlobStore::new(&config.local_dir, &config.public_prefix)),
    })
}

/// Name for an uploaded image: `school-<unix millis><ext>`.
///
/// `ext` is the lowercased extension of `original` when it is ASCII alphanumeric,
/// otherwise [`DEFAULT_EXTENSION`].
#[must_use]
pub fn blob_name(original: Option<&str>, now: DateTime<Utc>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()))
        .map_or_else(|| DEFAULT_EXTENSION.to_owned(), |ext| format!(".{}", ext.to_lowercase()));
    format!("school-{}{ext}", now.timestamp_millis())
}

pub(crate) fn check_name(name: &str) -> BlobResult<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.contains("..");
    if bad {
        Err(BlobError::InvalidName(name.to_owned()))
    } else {
        Ok(())
    }
}
