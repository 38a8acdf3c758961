use reqwest::header::CONTENT_TYPE;
use reqwest::{Body, Client};
use salvo::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::{BlobError, BlobResult, BlobStore, ByteStream, StoredBlob, check_name};

/// Uploads images to an object-storage bucket over HTTP.
///
/// Objects are written with `PUT <endpoint>/<name>` and the bucket answers with
/// the public URL of the object. Deletion goes through `POST <endpoint>/delete`.
#[derive(Debug, Clone)]
pub struct RemoteBlobStore {
    client: Client,
    endpoint: Url,
    token: String,
}

#[derive(Deserialize)]
struct PutBlobResult {
    url: String,
}

impl RemoteBlobStore {
    /// Store writing to the bucket API at `endpoint` with a bearer `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not an absolute http(s) URL.
    pub fn new(endpoint: &str, token: impl Into<String>) -> BlobResult<Self> {
        let invalid = |reason: String| BlobError::Endpoint {
            endpoint: endpoint.to_owned(),
            reason,
        };
        let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: url,
            token: token.into(),
        })
    }

    /// Bucket API base URL, always ending in `/`.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn join(&self, path: &str) -> BlobResult<Url> {
        self.endpoint.join(path).map_err(|e| BlobError::Endpoint {
            endpoint: self.endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
    fn kind(&self) -> &'static str {
        "remote"
    }

    async fn store(&self, stream: ByteStream, name: &str, content_type: &str) -> BlobResult<StoredBlob> {
        check_name(name)?;
        let res = self
            .client
            .put(self.join(name)?)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, content_type)
            .header("x-content-type", content_type)
            .body(Body::wrap_stream(stream))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(BlobError::Rejected {
                name: name.to_owned(),
                status: status.as_u16(),
            });
        }
        let PutBlobResult { url } = res.json().await?;
        tracing::debug!(%url, "image uploaded");
        Ok(StoredBlob {
            name: name.to_owned(),
            url,
        })
    }

    async fn remove(&self, blob: &StoredBlob) -> BlobResult<()> {
        let res = self
            .client
            .post(self.join("delete")?)
            .bearer_auth(&self.token)
            .json(&json!({ "urls": [&blob.url] }))
            .send()
            .await?;

        let status = res.status();
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(BlobError::Rejected {
                name: blob.name.clone(),
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use bytes::Bytes;
    use futures_util::stream;
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn body(content: &'static str) -> ByteStream {
        Box::pin(stream::iter(vec![Ok::<_, io::Error>(Bytes::from_static(content.as_bytes()))]))
    }

    #[test]
    fn test_endpoint_gets_trailing_slash() {
        let store = RemoteBlobStore::new("https://bucket.example/api", "t").unwrap();
        assert_eq!(store.endpoint().as_str(), "https://bucket.example/api/");
    }

    #[test]
    fn test_endpoint_must_be_http() {
        assert!(RemoteBlobStore::new("ftp://bucket.example", "t").is_err());
        assert!(RemoteBlobStore::new("bucket.example", "t").is_err());
    }

    #[tokio::test]
    async fn test_store_puts_object_and_returns_bucket_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/school-9.png"))
            .and(header("authorization", "Bearer secret"))
            .and(header("x-content-type", "image/png"))
            .and(body_string("PNGDATA"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "url": "https://cdn.example/school-9.png", "pathname": "school-9.png" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = RemoteBlobStore::new(&server.uri(), "secret").unwrap();
        let blob = store.store(body("PNGDATA"), "school-9.png", "image/png").await.unwrap();

        assert_eq!(blob.url, "https://cdn.example/school-9.png");
        assert_eq!(blob.name, "school-9.png");
    }

    #[tokio::test]
    async fn test_store_reports_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let store = RemoteBlobStore::new(&server.uri(), "wrong").unwrap();
        let err = store.store(body("x"), "school-1.png", "image/png").await.unwrap_err();
        assert!(matches!(err, BlobError::Rejected { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_remove_posts_delete() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/delete"))
            .and(body_json(json!({ "urls": ["https://cdn.example/school-9.png"] })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = RemoteBlobStore::new(&server.uri(), "secret").unwrap();
        let blob = StoredBlob {
            name: "school-9.png".to_owned(),
            url: "https://cdn.example/school-9.png".to_owned(),
        };
        store.remove(&blob).await.unwrap();
    }
}
