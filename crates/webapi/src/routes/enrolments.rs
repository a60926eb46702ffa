use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use authn::AuthContext;
use domain::Enrolment;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateEnrolmentRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct EnrolmentResponse {
    pub id: String,
    pub course_id: String,
    pub user_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Enrolment> for EnrolmentResponse {
    fn from(e: Enrolment) -> Self {
        EnrolmentResponse { id: e.id, course_id: e.course_id, user_id: e.user_id, created_at: e.created_at }
    }
}

async fn create_enrolment(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(course_id): Path<String>,
    Json(req): Json<CreateEnrolmentRequest>,
) -> Result<Json<EnrolmentResponse>, ApiError> {
    state.backend.load_course(&course_id)?;
    state.backend.load_user(&req.user_id)?;
    let enrolment = Enrolment::new(course_id, req.user_id);
    state.backend.store_enrolment(&enrolment)?;
    Ok(Json(enrolment.into()))
}

async fn list_enrolments_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<EnrolmentResponse>>, ApiError> {
    let enrolments = state.backend.query_enrolments_by_course(&course_id)?;
    Ok(Json(enrolments.into_iter().map(EnrolmentResponse::from).collect()))
}

async fn list_enrolments_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<EnrolmentResponse>>, ApiError> {
    let enrolments = state.backend.query_enrolments_by_user(&user_id)?;
    Ok(Json(enrolments.into_iter().map(EnrolmentResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses/:id/enrolments", get(list_enrolments_by_course).post(create_enrolment))
        .route("/users/:id/enrolments", get(list_enrolments_by_user))
}
