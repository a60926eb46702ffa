use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use authn::AuthContext;
use domain::Course;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListCoursesParams {
    pub owner: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Course> for CourseResponse {
    fn from(c: Course) -> Self {
        CourseResponse { id: c.id, owner_id: c.owner_id, name: c.name, created_at: c.created_at }
    }
}

async fn create_course(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateCourseRequest>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = Course::new(auth.user_id, req.name);
    state.backend.store_course(&course)?;
    Ok(Json(course.into()))
}

async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<CourseResponse>, ApiError> {
    let course = state.backend.load_course(&id)?;
    Ok(Json(course.into()))
}

async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<ListCoursesParams>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let owner = params.owner.ok_or_else(|| ApiError::BadRequest("owner query parameter is required".into()))?;
    let courses = state.backend.query_courses_by_owner(&owner)?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/courses", get(list_courses).post(create_course)).route("/courses/:id", get(get_course))
}
