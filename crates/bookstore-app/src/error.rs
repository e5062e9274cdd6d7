use axum::response::{IntoResponse, Response};
use http::StatusCode;
use tracing::error;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

/// Request handling errors, mapped directly to a status and a plain text
/// message. No structured error codes on the wire.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl From<bookstore_dal::Error> for ApiError {
    fn from(e: bookstore_dal::Error) -> Self {
        match e {
            bookstore_dal::Error::RecordNotFound(what) => ApiError::NotFound(what),
            // Persistence failures are not distinguished by cause, the
            // detail is logged and the client gets a generic 500.
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(cause) => {
                error!("Internal error while handling request: {cause:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
