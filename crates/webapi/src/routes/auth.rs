use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use authn::{create_session, hash_password, verify_password, AuthError};
use domain::User;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse { id: u.id, name: u.name, email: u.email, is_admin: u.is_admin }
    }
}

fn session_response(user: &User, jwt_secret: &[u8; 32]) -> Result<Response, ApiError> {
    let token = create_session(&user.id, user.is_admin, jwt_secret).map_err(ApiError::from)?;
    let cookie = format!("session={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age=86400");
    let body = Json(UserResponse::from(user.clone()));
    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}

async fn signup(State(state): State<AppState>, Json(req): Json<SignupRequest>) -> Result<Response, ApiError> {
    if state.backend.load_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::from(AuthError::EmailTaken));
    }

    let hash = hash_password(&req.password)?;
    let user = User::new(req.name, req.email, hash);
    state.backend.store_user(&user)?;

    session_response(&user, state.jwt_secret.0.as_ref())
}

async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Result<Response, ApiError> {
    let user = state.backend.load_user_by_email(&req.email)?.ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::from(AuthError::InvalidCredentials));
    }

    session_response(&user, state.jwt_secret.0.as_ref())
}

async fn logout() -> impl IntoResponse {
    let cookie = "session=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0";
    ([(header::SET_COOKIE, cookie)], Json(serde_json::json!({ "ok": true })))
}

pub fn router() -> Router<AppState> {
    use axum::routing::post;
    Router::new().route("/auth/signup", post(signup)).route("/auth/login", post(login)).route("/auth/logout", post(logout))
}
