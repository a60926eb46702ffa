use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::error::ApiError;
use crate::routes::auth::UserResponse;
use crate::state::AppState;

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<UserResponse>, ApiError> {
    let user = state.backend.load_user(&id)?;
    Ok(Json(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users/:id", get(get_user))
}
