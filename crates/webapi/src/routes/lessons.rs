use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use authn::AuthContext;
use domain::Lesson;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLessonRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Lesson> for LessonResponse {
    fn from(l: Lesson) -> Self {
        LessonResponse { id: l.id, course_id: l.course_id, name: l.name, created_at: l.created_at }
    }
}

async fn create_lesson(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(course_id): Path<String>,
    Json(req): Json<CreateLessonRequest>,
) -> Result<Json<LessonResponse>, ApiError> {
    state.backend.load_course(&course_id)?;
    let lesson = Lesson::new(course_id, req.name);
    state.backend.store_lesson(&lesson)?;
    Ok(Json(lesson.into()))
}

async fn list_lessons(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<LessonResponse>>, ApiError> {
    let lessons = state.backend.query_lessons_by_course(&course_id)?;
    Ok(Json(lessons.into_iter().map(LessonResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/courses/:id/lessons", get(list_lessons).post(create_lesson))
}
