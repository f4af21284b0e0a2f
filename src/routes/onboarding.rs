use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::reports::OnboardingReport;
use crate::error::ApiError;
use crate::middleware::auth::require_manage;
use crate::models::auth::AuthenticatedUser;
use crate::models::onboarding::{
    AddCommentRequest, CompleteMilestoneRequest, CompleteTaskRequest, CreateMilestoneRequest,
    CreateOnboardingRequest, CreateTaskRequest, CreateTicketRequest, CreateTrainingSessionRequest,
    MilestoneSignOff, OnboardingDetail, OnboardingMilestone, OnboardingTask, SchoolOnboarding,
    SupportTicket, TaskComment, TrainingSession, UpdateMilestoneRequest, UpdateOnboardingRequest,
    UpdateTaskRequest, UpdateTicketRequest,
};
use crate::services::onboarding::OnboardingService;
use crate::AppState;

pub async fn list_onboardings(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<SchoolOnboarding>>, ApiError> {
    let onboardings = OnboardingService::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(onboardings))
}

pub async fn create_onboarding(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateOnboardingRequest>,
) -> Result<(StatusCode, Json<SchoolOnboarding>), ApiError> {
    require_manage(&user)?;
    let onboarding = OnboardingService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(onboarding)))
}

pub async fn get_onboarding(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OnboardingDetail>, ApiError> {
    let detail = OnboardingService::get_detail(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Onboarding"))?;
    Ok(Json(detail))
}

pub async fn update_onboarding(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateOnboardingRequest>,
) -> Result<Json<SchoolOnboarding>, ApiError> {
    require_manage(&user)?;
    let onboarding = OnboardingService::update(&state.db, id, &body)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Onboarding"))?;
    Ok(Json(onboarding))
}

pub async fn delete_onboarding(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_manage(&user)?;
    let deleted = OnboardingService::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::NotFound("Onboarding"));
    }
    Ok(Json(json!({ "message": "Onboarding deleted" })))
}

pub async fn get_report(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OnboardingReport>, ApiError> {
    let report = OnboardingService::report(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Onboarding"))?;
    Ok(Json(report))
}

// ── Tasks ────────────────────────────────────────────────────────────────

pub async fn create_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<OnboardingTask>), ApiError> {
    require_manage(&user)?;
    let task = OnboardingService::create_task(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<OnboardingTask>, ApiError> {
    require_manage(&user)?;
    let task = OnboardingService::update_task(&state.db, id, task_id, &body).await?;
    Ok(Json(task))
}

pub async fn complete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<CompleteTaskRequest>,
) -> Result<Json<OnboardingTask>, ApiError> {
    require_manage(&user)?;
    let task =
        OnboardingService::complete_task(&state.db, id, task_id, &body, Some(user.user_id))
            .await?;
    Ok(Json(task))
}

pub async fn add_task_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<TaskComment>), ApiError> {
    if body.body.trim().is_empty() {
        return Err(ApiError::Validation("body must not be empty".into()));
    }
    let comment =
        OnboardingService::add_comment(&state.db, id, task_id, &body, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_task_comments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<TaskComment>>, ApiError> {
    let comments = OnboardingService::list_comments(&state.db, id, task_id).await?;
    Ok(Json(comments))
}

pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    require_manage(&user)?;
    OnboardingService::delete_task(&state.db, id, task_id).await?;
    Ok(Json(json!({ "message": "Task deleted" })))
}

// ── Milestones ───────────────────────────────────────────────────────────

pub async fn create_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateMilestoneRequest>,
) -> Result<(StatusCode, Json<OnboardingMilestone>), ApiError> {
    require_manage(&user)?;
    let milestone = OnboardingService::create_milestone(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

pub async fn update_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, milestone_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateMilestoneRequest>,
) -> Result<Json<OnboardingMilestone>, ApiError> {
    require_manage(&user)?;
    let milestone =
        OnboardingService::update_milestone(&state.db, id, milestone_id, &body).await?;
    Ok(Json(milestone))
}

pub async fn complete_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, milestone_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<CompleteMilestoneRequest>,
) -> Result<Json<OnboardingMilestone>, ApiError> {
    require_manage(&user)?;
    let milestone =
        OnboardingService::complete_milestone(&state.db, id, milestone_id, &body).await?;
    Ok(Json(milestone))
}

pub async fn list_sign_offs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path((id, milestone_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<MilestoneSignOff>>, ApiError> {
    let sign_offs = OnboardingService::list_sign_offs(&state.db, id, milestone_id).await?;
    Ok(Json(sign_offs))
}

// ── Training sessions & support tickets ──────────────────────────────────

pub async fn add_training_session(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateTrainingSessionRequest>,
) -> Result<(StatusCode, Json<TrainingSession>), ApiError> {
    require_manage(&user)?;
    let session = OnboardingService::add_training_session(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn add_support_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<SupportTicket>), ApiError> {
    require_manage(&user)?;
    let ticket = OnboardingService::add_ticket(&state.db, id, &body).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn update_support_ticket(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, ticket_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTicketRequest>,
) -> Result<Json<SupportTicket>, ApiError> {
    require_manage(&user)?;
    let ticket = OnboardingService::update_ticket(&state.db, id, ticket_id, &body).await?;
    Ok(Json(ticket))
}
