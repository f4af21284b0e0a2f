use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::require_manage;
use crate::models::auth::AuthenticatedUser;
use crate::models::program::{CreateProgramRequest, Program, UpdateProgramRequest};
use crate::services::programs::ProgramService;
use crate::AppState;

fn validate_level_fields(level_count: Option<i32>, pass_threshold: Option<i32>) -> Result<(), ApiError> {
    if let Some(count) = level_count {
        if count < 1 {
            return Err(ApiError::Validation("level_count must be at least 1".into()));
        }
    }
    if let Some(threshold) = pass_threshold {
        if !(0..=100).contains(&threshold) {
            return Err(ApiError::Validation(
                "pass_threshold must be between 0 and 100".into(),
            ));
        }
    }
    Ok(())
}

pub async fn list_programs(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<Program>>, ApiError> {
    let programs = ProgramService::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(programs))
}

pub async fn get_program(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Program>, ApiError> {
    let program = ProgramService::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Program"))?;
    Ok(Json(program))
}

pub async fn create_program(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateProgramRequest>,
) -> Result<(StatusCode, Json<Program>), ApiError> {
    require_manage(&user)?;
    validate_level_fields(body.level_count, body.pass_threshold)?;
    let program = ProgramService::create(&state.db, &body)
        .await
        .map_err(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(program)))
}

pub async fn update_program(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProgramRequest>,
) -> Result<Json<Program>, ApiError> {
    require_manage(&user)?;
    validate_level_fields(body.level_count, body.pass_threshold)?;
    let program = ProgramService::update(&state.db, id, &body)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Program"))?;
    Ok(Json(program))
}

pub async fn delete_program(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_manage(&user)?;
    let deleted = ProgramService::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::NotFound("Program"));
    }
    Ok(Json(json!({ "message": "Program deleted" })))
}
