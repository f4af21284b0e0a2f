use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::reports::ProfileReport;
use crate::error::ApiError;
use crate::middleware::auth::{require_manage, require_record};
use crate::models::auth::AuthenticatedUser;
use crate::models::profile::{
    AcademicRecord, AddAcademicRecordRequest, AddBehavioralRecordRequest,
    AddCommunicationLogRequest, AddGoalRequest, AddInterventionRequest, BehavioralRecord,
    CommunicationLog, CreateProfileRequest, Goal, Intervention, ProfileDetail, ReportType,
    StudentProfile, UpdateGoalRequest,
};
use crate::services::profiles::ProfileService;
use crate::AppState;

pub async fn create_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<StudentProfile>), ApiError> {
    require_manage(&user)?;
    let profile = ProfileService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileDetail>, ApiError> {
    let detail = ProfileService::get_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(detail))
}

#[derive(Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
}

pub async fn get_profile_report(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<ProfileReport>, ApiError> {
    let report_type = match query.report_type.as_deref() {
        None => ReportType::Comprehensive,
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid report type: {raw}")))?,
    };
    let report = ProfileService::report(&state.db, id, report_type)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(report))
}

pub async fn add_academic_record(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddAcademicRecordRequest>,
) -> Result<(StatusCode, Json<AcademicRecord>), ApiError> {
    require_record(&user)?;
    if body.max_score < 1 {
        return Err(ApiError::Validation("max_score must be at least 1".into()));
    }
    if body.score < 0 || body.score > body.max_score {
        return Err(ApiError::Validation(
            "score must be between 0 and max_score".into(),
        ));
    }
    let record = ProfileService::add_academic_record(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn add_behavioral_record(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddBehavioralRecordRequest>,
) -> Result<(StatusCode, Json<BehavioralRecord>), ApiError> {
    require_record(&user)?;
    let record = ProfileService::add_behavioral_record(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn add_intervention(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddInterventionRequest>,
) -> Result<(StatusCode, Json<Intervention>), ApiError> {
    require_record(&user)?;
    let intervention = ProfileService::add_intervention(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(intervention)))
}

pub async fn add_communication_log(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddCommunicationLogRequest>,
) -> Result<(StatusCode, Json<CommunicationLog>), ApiError> {
    require_record(&user)?;
    let log = ProfileService::add_communication_log(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn add_goal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddGoalRequest>,
) -> Result<(StatusCode, Json<Goal>), ApiError> {
    require_record(&user)?;
    let goal = ProfileService::add_goal(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, goal_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateGoalRequest>,
) -> Result<Json<Goal>, ApiError> {
    require_record(&user)?;
    let goal = ProfileService::update_goal(&state.db, id, goal_id, &body).await?;
    Ok(Json(goal))
}
