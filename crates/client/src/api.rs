//! HTTP access to the schoolhouse service.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use schoolhouse_model::{CreatedResponse, ErrorResponse, Field, IMAGE_FIELD, NewSchool, SchoolRecord};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::form::ImagePreview;

/// Reason shown when a listing reply reports failure without one.
pub const FETCH_FALLBACK: &str = "Failed to fetch";

/// Default service address.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5800";

/// Operations the views need from the service.
#[async_trait]
pub trait SchoolApi: Send + Sync {
    /// Submits a school with its image.
    async fn add_school(&self, school: &NewSchool, image: &ImagePreview) -> ClientResult<CreatedResponse>;

    /// Fetches every school, newest first.
    async fn list_schools(&self) -> ClientResult<Vec<SchoolRecord>>;
}

/// reqwest-backed [`SchoolApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Client for the service at `base`, e.g. `http://127.0.0.1:5800`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] if `base` is not an http(s) URL.
    pub fn new(base: &str) -> ClientResult<Self> {
        let mut base = Url::parse(base).map_err(|e| ClientError::Invalid(format!("invalid server url {base}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::Invalid(format!("unsupported server url scheme {}", base.scheme())));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: Client::builder().build()?,
            base,
        })
    }

    /// Service base URL.
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Makes a stored image reference fetchable: absolute URLs are kept, paths are resolved against the service.
    #[must_use]
    pub fn resolve(&self, image: &str) -> String {
        if Url::parse(image).is_ok() {
            return image.to_owned();
        }
        self.base
            .join(image.trim_start_matches('/'))
            .map_or_else(|_| image.to_owned(), String::from)
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::Invalid(format!("invalid endpoint {path}: {e}")))
    }
}

/// Listing reply as received: a failure may still arrive with a success status.
#[derive(Deserialize)]
struct ListReply {
    success: bool,
    #[serde(default)]
    data: Vec<SchoolRecord>,
    #[serde(default)]
    message: String,
}

async fn decode<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }
    let bytes = res.bytes().await?;
    let message = serde_json::from_slice::<ErrorResponse>(&bytes)
        .map(|envelope| envelope.message)
        .unwrap_or_default();
    tracing::debug!(%status, %message, "service returned an error");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl SchoolApi for ApiClient {
    async fn add_school(&self, school: &NewSchool, image: &ImagePreview) -> ClientResult<CreatedResponse> {
        let mut form = Form::new();
        for field in Field::TEXT {
            form = form.text(field.key(), school.get(field).to_owned());
        }
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_owned())
            .mime_str(image.content_type())?;
        form = form.part(IMAGE_FIELD, part);

        tracing::debug!(name = %school.name, image = image.file_name(), "submitting school");
        let res = self.http.post(self.endpoint("api/addSchool")?).multipart(form).send().await?;
        decode(res).await
    }

    async fn list_schools(&self) -> ClientResult<Vec<SchoolRecord>> {
        let res = self.http.get(self.endpoint("api/getSchools")?).send().await?;
        let status = res.status().as_u16();
        let reply: ListReply = decode(res).await?;
        if !reply.success {
            let message = if reply.message.trim().is_empty() {
                FETCH_FALLBACK.to_owned()
            } else {
                reply.message
            };
            return Err(ClientError::Api { status, message });
        }
        Ok(reply.data)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn oak() -> NewSchool {
        NewSchool {
            name: "Oak Elementary".to_owned(),
            email_id: "a@b.com".to_owned(),
            contact: "1234567".to_owned(),
            address: "12 Oak St, Springfield".to_owned(),
            city: "Springfield".to_owned(),
            state: "Illinois".to_owned(),
        }
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(ApiClient::new("localhost:5800"), Err(ClientError::Invalid(_))));
        assert!(matches!(ApiClient::new("not a url"), Err(ClientError::Invalid(_))));
    }

    #[test]
    fn test_resolve() {
        let api = ApiClient::new("http://school.test:5800").unwrap();
        assert_eq!(api.resolve("/schoolImages/a.png"), "http://school.test:5800/schoolImages/a.png");
        assert_eq!(api.resolve("https://cdn.example/a.png"), "https://cdn.example/a.png");
    }

    #[tokio::test]
    async fn test_add_school_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/addSchool"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .and(body_string_contains("name=\"email_id\""))
            .and(body_string_contains("Oak Elementary"))
            .and(body_string_contains("filename=\"oak.png\""))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "success": true, "id": 3, "imageUrl": "/schoolImages/school-1.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let image = ImagePreview::from_bytes("oak.png", b"PNG".to_vec());
        let created = api.add_school(&oak(), &image).await.unwrap();
        assert_eq!(created, CreatedResponse::new(3, "/schoolImages/school-1.png"));
    }

    #[tokio::test]
    async fn test_add_school_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false, "message": "Image is required"
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let image = ImagePreview::from_bytes("oak.png", b"PNG".to_vec());
        let err = api.add_school(&oak(), &image).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 400, .. }));
        assert_eq!(err.server_message(), Some("Image is required"));
    }

    #[tokio::test]
    async fn test_list_schools() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/getSchools"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{
                    "id": 1, "name": "Oak Elementary", "address": "12 Oak St", "city": "Springfield",
                    "state": "Illinois", "contact": "1234567", "image": "/schoolImages/a.png", "email_id": "a@b.com"
                }]
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let records = api.list_schools().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Oak Elementary");
    }

    #[tokio::test]
    async fn test_list_schools_failure_keeps_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/getSchools"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false, "message": "Database is busy"
            })))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let err = api.list_schools().await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 200, .. }));
        assert_eq!(err.server_message(), Some("Database is busy"));
    }

    #[tokio::test]
    async fn test_list_schools_failure_without_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let err = api.list_schools().await.unwrap_err();
        assert_eq!(err.server_message(), Some(FETCH_FALLBACK));
    }

    #[tokio::test]
    async fn test_list_schools_error_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let api = ApiClient::new(&server.uri()).unwrap();
        let err = api.list_schools().await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 502, .. }));
        assert_eq!(err.server_message(), None);
    }
}
