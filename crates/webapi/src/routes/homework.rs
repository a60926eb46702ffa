use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use authn::AuthContext;
use domain::Homework;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitHomeworkRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct HomeworkResponse {
    pub id: String,
    pub learner_id: String,
    pub text: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl From<Homework> for HomeworkResponse {
    fn from(h: Homework) -> Self {
        HomeworkResponse { id: h.id, learner_id: h.learner_id, text: h.text, submitted_at: h.submitted_at }
    }
}

async fn submit_homework(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(learner_id): Path<String>,
    Json(req): Json<SubmitHomeworkRequest>,
) -> Result<Json<HomeworkResponse>, ApiError> {
    if auth.user_id != learner_id && !auth.is_admin {
        return Err(ApiError::from(authn::AuthError::Forbidden));
    }
    let homework = Homework::new(learner_id, req.text);
    state.backend.store_homework(&homework)?;
    Ok(Json(homework.into()))
}

async fn list_homework(
    State(state): State<AppState>,
    Path(learner_id): Path<String>,
) -> Result<Json<Vec<HomeworkResponse>>, ApiError> {
    let homework = state.backend.query_homework_by_learner(&learner_id)?;
    Ok(Json(homework.into_iter().map(HomeworkResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/users/:id/homework", get(list_homework).post(submit_homework))
}
