use salvo::http::{ParseError, StatusCode};
use salvo::prelude::*;
use schoolhouse_model::{ErrorResponse, FieldError};

use crate::blob::BlobError;

/// Result of request handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Failures surfaced by the API endpoints.
///
/// Every variant is rendered as `{"success": false, "message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The endpoint does not accept the request method.
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// The submission carries no image file.
    #[error("Image is required")]
    MissingImage,

    /// A text field breaks its rule.
    #[error("{0}")]
    Validation(#[from] FieldError),

    /// The multipart body could not be parsed.
    #[error("Failed to parse form data: {0}")]
    Form(#[from] ParseError),

    /// The image could not be stored.
    #[error("Failed to store image: {0}")]
    Storage(#[from] BlobError),

    /// The database rejected a query.
    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingImage | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Form(_) | Self::Storage(_) | Self::Persistence(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[async_trait]
impl Writer for AppError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        res.status_code(status);
        res.render(Json(ErrorResponse::new(self.to_string())));
    }
}
