use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Maps every error this crate can produce — from either storage backend or
/// from `authn` — to an HTTP response. Handlers return `Result<_, ApiError>`
/// and never construct a `StatusCode` by hand.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Auth(#[from] authn::AuthError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<logdb::Error> for ApiError {
    fn from(e: logdb::Error) -> Self {
        match e {
            logdb::Error::NotFound => ApiError::NotFound,
            logdb::Error::Conflict { .. } => ApiError::Conflict(e.to_string()),
            logdb::Error::ContractViolation(_) => ApiError::BadRequest(e.to_string()),
            logdb::Error::Corrupt { .. } | logdb::Error::Io(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<sqlstore::Error> for ApiError {
    fn from(e: sqlstore::Error) -> Self {
        match e {
            sqlstore::Error::NotFound => ApiError::NotFound,
            sqlstore::Error::Database(_) | sqlstore::Error::Io(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Auth(e) => e.status_code(),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error serving request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
