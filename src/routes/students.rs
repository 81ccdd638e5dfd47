//! Student roster route handlers
//!
//! Search envelopes are always returned with 200; a failed search is
//! reported inside the body.

use crate::error::{not_found_error, ApiResult};
use crate::roster::{
    DropdownData, FilterCriteria, IndividualSearchCriteria, OptionSet, SearchResult,
    StudentDetail, StudentRecord, ALL,
};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramQuery {
    pub program_type: String,
    #[serde(default = "all")]
    pub school: String,
    #[serde(default = "all")]
    pub grade: String,
}

fn all() -> String {
    ALL.to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct CascadingQuery {
    pub school: Option<String>,
    pub grade: Option<String>,
    pub teacher: Option<String>,
}

/// POST /api/students/search
pub async fn search(
    State(state): State<SharedState>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<SearchResult<StudentRecord>> {
    info!(criteria = ?criteria, "Searching students");
    Json(state.roster.search(&criteria).await)
}

/// POST /api/students/count
pub async fn count(
    State(state): State<SharedState>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<i64> {
    debug!(criteria = ?criteria, "Counting students");
    Json(state.roster.count(&criteria).await)
}

/// POST /api/students/search-individual
pub async fn search_individual(
    State(state): State<SharedState>,
    Json(criteria): Json<IndividualSearchCriteria>,
) -> Json<SearchResult<StudentRecord>> {
    info!(search_type = %criteria.search_type, "Searching individual student");
    Json(state.roster.search_individual(&criteria).await)
}

/// GET /api/students/{id}
pub async fn get_student(
    State(state): State<SharedState>,
    Path(row_id): Path<i64>,
) -> ApiResult<Json<StudentRecord>> {
    debug!("Getting student {}", row_id);

    state
        .roster
        .student(row_id)
        .await
        .map(Json)
        .ok_or_else(|| not_found_error(format!("Student with ID {} not found", row_id)))
}

/// GET /api/students/{id}/detail
pub async fn detail(
    State(state): State<SharedState>,
    Path(student_id): Path<i32>,
) -> ApiResult<Json<StudentDetail>> {
    debug!("Getting student detail for {}", student_id);

    state
        .roster
        .detail(student_id)
        .await
        .map(Json)
        .ok_or_else(|| not_found_error(format!("Student with ID {} not found", student_id)))
}

/// GET /api/students/search-by-program
pub async fn search_by_program(
    State(state): State<SharedState>,
    Query(query): Query<ProgramQuery>,
) -> Json<SearchResult<StudentRecord>> {
    info!(
        program_type = %query.program_type,
        school = %query.school,
        grade = %query.grade,
        "Searching students by program"
    );

    Json(
        state
            .roster
            .search_by_program(&query.program_type, &query.school, &query.grade)
            .await,
    )
}

/// GET /api/students/dropdown-data
pub async fn dropdown_data(State(state): State<SharedState>) -> ApiResult<Json<DropdownData>> {
    Ok(Json(state.resolver.dropdown_data().await?))
}

/// GET /api/students/cascading-dropdown/{level}
pub async fn cascading_dropdown(
    State(state): State<SharedState>,
    Path(level): Path<String>,
    Query(query): Query<CascadingQuery>,
) -> Json<OptionSet> {
    let options = state
        .resolver
        .cascading_options(
            &level,
            query.school.as_deref(),
            query.grade.as_deref(),
            query.teacher.as_deref(),
        )
        .await;

    if options.is_fallback() {
        debug!(level = %level, "Serving fallback option for cascading dropdown");
    }
    Json(options)
}

/// GET /api/students/diagnose-database
pub async fn diagnose_database(State(state): State<SharedState>) -> Json<BTreeMap<String, String>> {
    info!("Running database diagnostics");
    Json(state.roster.diagnose().await)
}
