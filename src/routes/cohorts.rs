use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::{require_manage, require_record};
use crate::models::auth::AuthenticatedUser;
use crate::models::cohort::{
    AttendanceRecord, Cohort, CohortDetail, CreateCohortRequest, GenerateCohortsRequest,
    GeneratedCohort, RecordAttendanceRequest, SetStudentsRequest, UpdateCohortRequest,
};
use crate::services::cohorts::CohortService;
use crate::AppState;

#[derive(Deserialize)]
pub struct CohortFilter {
    pub school_id: Option<Uuid>,
}

pub async fn list_cohorts(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<CohortFilter>,
) -> Result<Json<Vec<Cohort>>, ApiError> {
    let cohorts = CohortService::list(&state.db, filter.school_id)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(cohorts))
}

pub async fn get_cohort(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CohortDetail>, ApiError> {
    let detail = CohortService::get_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Cohort"))?;
    Ok(Json(detail))
}

pub async fn create_cohort(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCohortRequest>,
) -> Result<(StatusCode, Json<Cohort>), ApiError> {
    require_manage(&user)?;
    if body.level < 1 {
        return Err(ApiError::Validation("level must be at least 1".into()));
    }
    let cohort = CohortService::create(&state.db, &body)
        .await
        .map_err(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(cohort)))
}

pub async fn update_cohort(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCohortRequest>,
) -> Result<Json<Cohort>, ApiError> {
    require_manage(&user)?;
    let cohort = CohortService::update(&state.db, id, &body)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Cohort"))?;
    Ok(Json(cohort))
}

pub async fn delete_cohort(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_manage(&user)?;
    let deleted = CohortService::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::NotFound("Cohort"));
    }
    Ok(Json(json!({ "message": "Cohort deleted" })))
}

/// Replaces the cohort's full membership.
pub async fn set_students(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<SetStudentsRequest>,
) -> Result<Json<CohortDetail>, ApiError> {
    require_manage(&user)?;
    CohortService::get_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Cohort"))?;
    CohortService::set_students(&state.db, id, &body.student_ids)
        .await
        .map_err(ApiError::Internal)?;
    let detail = CohortService::get_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Cohort"))?;
    Ok(Json(detail))
}

/// Auto-generates cohorts for a school/program by level.
pub async fn generate_cohorts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<GenerateCohortsRequest>,
) -> Result<(StatusCode, Json<Vec<GeneratedCohort>>), ApiError> {
    require_manage(&user)?;
    let generated = CohortService::generate(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(generated)))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let records = CohortService::list_attendance(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(records))
}

pub async fn record_attendance(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RecordAttendanceRequest>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    require_record(&user)?;
    if body.entries.is_empty() {
        return Err(ApiError::Validation("entries must not be empty".into()));
    }
    CohortService::get_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Cohort"))?;
    let records =
        CohortService::record_attendance(&state.db, id, &body, Some(user.user_id))
            .await
            .map_err(ApiError::Internal)?;
    Ok(Json(records))
}
