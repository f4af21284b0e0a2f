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
use crate::models::profile::ProfileDetail;
use crate::models::student::{
    Assessment, CreateStudentRequest, RecordAssessmentRequest, Student, UpdateStudentRequest,
};
use crate::services::metrics::ASSESSMENTS_COUNTER;
use crate::services::profiles::ProfileService;
use crate::services::students::StudentService;
use crate::AppState;

#[derive(Deserialize)]
pub struct StudentFilter {
    pub school_id: Option<Uuid>,
}

pub async fn list_students(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<StudentFilter>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = StudentService::list(&state.db, filter.school_id)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, ApiError> {
    let student = StudentService::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Student"))?;
    Ok(Json(student))
}

pub async fn create_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    require_manage(&user)?;
    let student = StudentService::create(&state.db, &body)
        .await
        .map_err(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, ApiError> {
    require_manage(&user)?;
    let student = StudentService::update(&state.db, id, &body)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Student"))?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_manage(&user)?;
    let deleted = StudentService::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::NotFound("Student"));
    }
    Ok(Json(json!({ "message": "Student deleted" })))
}

/// Convenience lookup of the student's enhanced profile.
pub async fn get_student_profile(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileDetail>, ApiError> {
    let profile = ProfileService::get_by_student(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Profile"))?;
    let detail = ProfileService::get_detail(&state.db, profile.id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(detail))
}

pub async fn list_assessments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Assessment>>, ApiError> {
    StudentService::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Student"))?;
    let assessments = StudentService::list_assessments(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(assessments))
}

pub async fn record_assessment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RecordAssessmentRequest>,
) -> Result<(StatusCode, Json<Assessment>), ApiError> {
    require_record(&user)?;
    let assessment =
        StudentService::record_assessment(&state.db, id, &body, Some(user.user_id)).await?;
    ASSESSMENTS_COUNTER
        .with_label_values(&[&body.kind.to_string()])
        .inc();
    Ok((StatusCode::CREATED, Json(assessment)))
}
