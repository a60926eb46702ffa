use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::session::verify_session;

/// Authentication context attached to a request once its session token has
/// been verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: String,
    pub is_admin: bool,
}

impl AuthContext {
    pub fn requires_admin(&self) -> Result<(), AuthError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("missing or malformed authorization")]
    MissingAuth,

    #[error("invalid session")]
    InvalidSession,

    #[error("session expired")]
    ExpiredSession,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered")]
    EmailTaken,

    #[error("insufficient permissions")]
    Forbidden,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuth | AuthError::InvalidSession | AuthError::ExpiredSession | AuthError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?.strip_prefix("Bearer ")
}

fn session_cookie(parts: &Parts) -> Option<String> {
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|c| c.strip_prefix("session=")).map(str::to_string)
}

/// JWT signing secret, installed into `axum::Router` state so the extractor
/// below can reach it without a second state parameter.
#[derive(Clone)]
pub struct SessionSecret(pub std::sync::Arc<[u8; 32]>);

impl<S> FromRequestParts<S> for AuthContext
where
    SessionSecret: axum::extract::FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let secret = SessionSecret::from_ref(state);

        let token = bearer_token(parts).map(str::to_string).or_else(|| session_cookie(parts)).ok_or(AuthError::MissingAuth)?;

        let session = verify_session(&token, secret.0.as_ref())?;
        Ok(AuthContext { user_id: session.user_id, is_admin: session.is_admin })
    }
}
