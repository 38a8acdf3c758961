use std::io;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use salvo::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{BlobError, BlobResult, BlobStore, ByteStream, StoredBlob, check_name};

/// Writes images into a directory and hands out `<public_prefix>/<name>` paths.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_prefix: String,
}

impl LocalBlobStore {
    /// Store rooted at `root`, whose files are served under `public_prefix`.
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        let public_prefix = public_prefix.into().trim_end_matches('/').to_owned();
        Self {
            root: root.into(),
            public_prefix,
        }
    }

    /// Directory receiving the files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url_for(&self, name: &str) -> String {
        format!("{}/{name}", self.public_prefix)
    }

    /// Opens a new file for `name`, numbering the name when it is taken.
    async fn create(&self, name: &str) -> BlobResult<(String, PathBuf, fs::File)> {
        for attempt in 0..MAX_ATTEMPTS {
            let candidate = numbered(name, attempt);
            let path = self.root.join(&candidate);
            match fs::OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((candidate, path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(BlobError::io(&candidate, e)),
            }
        }
        Err(BlobError::io(
            name,
            io::Error::new(io::ErrorKind::AlreadyExists, "no free file name"),
        ))
    }
}

const MAX_ATTEMPTS: u32 = 100;

/// `school-1.png` becomes `school-1-2.png` for attempt 2.
fn numbered(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_owned();
    }
    match name.rfind('.') {
        Some(dot) => format!("{}-{attempt}{}", &name[..dot], &name[dot..]),
        None => format!("{name}-{attempt}"),
    }
}

async fn copy_stream(mut stream: ByteStream, file: &mut fs::File) -> io::Result<()> {
    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }
    file.flush().await
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn store(&self, stream: ByteStream, name: &str, _content_type: &str) -> BlobResult<StoredBlob> {
        check_name(name)?;
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BlobError::io(name, e))?;

        let (name, path, mut file) = self.create(name).await?;
        if let Err(e) = copy_stream(stream, &mut file).await {
            drop(file);
            let _ = fs::remove_file(&path).await;
            return Err(BlobError::io(&name, e));
        }

        tracing::debug!(path = %path.display(), "image written");
        Ok(StoredBlob {
            url: self.url_for(&name),
            name,
        })
    }

    async fn remove(&self, blob: &StoredBlob) -> BlobResult<()> {
        check_name(&blob.name)?;
        match fs::remove_file(self.root.join(&blob.name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::io(&blob.name, e)),
        }
    }

    fn served_dir(&self) -> Option<(&str, &Path)> {
        Some((self.public_prefix.as_str(), self.root.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use futures_util::stream;

    use super::*;

    fn chunks(parts: &[&'static str]) -> ByteStream {
        let items: Vec<io::Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect();
        Box::pin(stream::iter(items))
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_public_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("schoolImages");
        let store = LocalBlobStore::new(&root, "/schoolImages/");

        let blob = store
            .store(chunks(&["PNG", "rest"]), "school-1.png", "image/png")
            .await
            .unwrap();

        assert_eq!(blob.url, "/schoolImages/school-1.png");
        assert_eq!(std::fs::read(root.join("school-1.png")).unwrap(), b"PNGrest");
    }

    #[tokio::test]
    async fn test_taken_name_gets_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/img");
        store.store(chunks(&["a"]), "school-1.png", "image/png").await.unwrap();

        let second = store.store(chunks(&["b"]), "school-1.png", "image/png").await.unwrap();
        assert_eq!(second.name, "school-1-1.png");
        assert_eq!(second.url, "/img/school-1-1.png");
        assert_eq!(std::fs::read(dir.path().join("school-1.png")).unwrap(), b"a");
        assert_eq!(std::fs::read(dir.path().join("school-1-1.png")).unwrap(), b"b");
    }

    #[test]
    fn test_numbered() {
        assert_eq!(numbered("school-7.png", 0), "school-7.png");
        assert_eq!(numbered("school-7.png", 3), "school-7-3.png");
        assert_eq!(numbered("school-7", 1), "school-7-1");
    }

    #[tokio::test]
    async fn test_failed_stream_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/img");
        let items: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "client went away")),
        ];

        let err = store
            .store(Box::pin(stream::iter(items)), "school-2.png", "image/png")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("client went away"));
        assert!(!dir.path().join("school-2.png").exists());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/img");
        let blob = store.store(chunks(&["a"]), "school-3.png", "image/png").await.unwrap();

        store.remove(&blob).await.unwrap();
        assert!(!dir.path().join("school-3.png").exists());
        store.remove(&blob).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/img");
        let err = store.store(chunks(&["a"]), "../evil.png", "image/png").await.unwrap_err();
        assert!(matches!(err, BlobError::InvalidName(_)));
    }
}
