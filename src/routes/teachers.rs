//! Teacher directory route handlers

use crate::error::{not_found_error, ApiResult};
use crate::roster::models::{DropdownData, SearchResult, TeacherRecord, TeacherScheduleEntry};
use crate::state::SharedState;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

/// GET /api/teachers
pub async fn list_teachers(State(state): State<SharedState>) -> Json<SearchResult<TeacherRecord>> {
    Json(state.teachers.all_teachers().await)
}

/// GET /api/teachers/dropdown-data
pub async fn dropdown_data(State(state): State<SharedState>) -> ApiResult<Json<DropdownData>> {
    Ok(Json(state.teachers.teacher_dropdown_data().await?))
}

/// GET /api/teachers/{id}
pub async fn get_teacher(
    State(state): State<SharedState>,
    Path(employee_id): Path<i32>,
) -> ApiResult<Json<TeacherRecord>> {
    debug!("Getting teacher {}", employee_id);

    state
        .teachers
        .teacher_by_id(employee_id)
        .await
        .map(Json)
        .ok_or_else(|| not_found_error(format!("Teacher with ID {} not found", employee_id)))
}

/// GET /api/teachers/{id}/schedule
pub async fn teacher_schedule(
    State(state): State<SharedState>,
    Path(employee_id): Path<i32>,
) -> Json<SearchResult<TeacherScheduleEntry>> {
    Json(state.teachers.teacher_schedule(employee_id).await)
}
