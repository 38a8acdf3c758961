//! `/api/addSchool` and `/api/getSchools`.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use salvo::http::Method;
use salvo::http::form::{FilePart, FormData};
use salvo::prelude::*;
use schoolhouse_model::{CreatedResponse, Field, IMAGE_FIELD, ListResponse, NewSchool};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::blob::{self, BlobError, BlobStore, StoredBlob};
use crate::error::{AppError, AppResult};
use crate::storage::{self, Database};

/// Shared by every request, injected into the [`Depot`].
#[derive(Clone)]
pub struct AppState {
    /// Records database.
    pub db: Database,
    /// Where uploaded images go.
    pub blobs: Arc<dyn BlobStore>,
    /// Largest accepted multipart body, in bytes.
    pub max_upload_size: usize,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("blobs", &self.blobs.kind())
            .field("max_upload_size", &self.max_upload_size)
            .finish()
    }
}

fn app_state(depot: &Depot) -> AppResult<&AppState> {
    depot
        .obtain::<AppState>()
        .map_err(|_| AppError::Internal("application state is not configured".to_owned()))
}

fn submission(form: &FormData) -> NewSchool {
    let mut school = NewSchool::default();
    for field in Field::TEXT {
        if let (Some(slot), Some(value)) = (school.get_mut(field), form.fields.get(field.key())) {
            value.clone_into(slot);
        }
    }
    school.trimmed()
}

fn image_part(form: &FormData) -> Option<&FilePart> {
    form.files.get(IMAGE_FIELD).filter(|file| file.size() > 0)
}

async fn insert(db: &Database, school: &NewSchool, image: &str) -> Result<i64, sqlx::Error> {
    let mut conn = db.acquire().await?;
    storage::insert_school(&mut conn, school, image).await
}

async fn discard(blobs: &dyn BlobStore, stored: &StoredBlob) {
    match blobs.remove(stored).await {
        Ok(()) => tracing::info!(url = %stored.url, "removed image of failed submission"),
        Err(e) => tracing::warn!(url = %stored.url, error = %e, "failed to remove orphaned image"),
    }
}

/// Accepts a multipart submission, stores its image and inserts the record.
///
/// Replies `201 {success, id, imageUrl}`.
#[handler]
pub async fn add_school(req: &mut Request, depot: &mut Depot, res: &mut Response) -> AppResult<()> {
    if req.method() != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }
    let state = app_state(depot)?;
    let form = req.form_data_max_size(state.max_upload_size).await?;

    let school = submission(form);
    let image = image_part(form).ok_or(AppError::MissingImage)?;
    school.validate()?;

    let name = blob::blob_name(image.name(), Utc::now());
    let content_type = image
        .content_type()
        .map_or_else(|| blob::DEFAULT_CONTENT_TYPE.to_owned(), |mime| mime.to_string());
    let file = File::open(image.path())
        .await
        .map_err(|e| BlobError::io(&name, e))?;

    let stored = state
        .blobs
        .store(Box::pin(ReaderStream::new(file)), &name, &content_type)
        .await?;

    let id = match insert(&state.db, &school, &stored.url).await {
        Ok(id) => id,
        Err(e) => {
            discard(state.blobs.as_ref(), &stored).await;
            return Err(e.into());
        }
    };

    tracing::info!(id, name = %school.name, image = %stored.url, "school added");
    res.status_code(StatusCode::CREATED);
    res.render(Json(CreatedResponse::new(id, stored.url)));
    Ok(())
}

/// Lists every record, newest first.
///
/// Replies `200 {success, data}`.
#[handler]
pub async fn get_schools(req: &mut Request, depot: &mut Depot) -> AppResult<Json<ListResponse>> {
    if req.method() != Method::GET {
        return Err(AppError::MethodNotAllowed);
    }
    let state = app_state(depot)?;
    let mut conn = state.db.acquire().await?;
    let records = storage::list_schools(&mut conn).await?;
    Ok(Json(ListResponse::new(records)))
}
