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
use crate::models::school::{CreateSchoolRequest, School, UpdateSchoolRequest};
use crate::services::schools::SchoolService;
use crate::AppState;

pub async fn list_schools(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<School>>, ApiError> {
    let schools = SchoolService::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(schools))
}

pub async fn get_school(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<School>, ApiError> {
    let school = SchoolService::get(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("School"))?;
    Ok(Json(school))
}

pub async fn create_school(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateSchoolRequest>,
) -> Result<(StatusCode, Json<School>), ApiError> {
    require_manage(&user)?;
    let school = SchoolService::create(&state.db, &body)
        .await
        .map_err(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(school)))
}

pub async fn update_school(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSchoolRequest>,
) -> Result<Json<School>, ApiError> {
    require_manage(&user)?;
    let school = SchoolService::update(&state.db, id, &body)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("School"))?;
    Ok(Json(school))
}

pub async fn delete_school(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_manage(&user)?;
    let deleted = SchoolService::delete(&state.db, id)
        .await
        .map_err(ApiError::Internal)?;
    if !deleted {
        return Err(ApiError::NotFound("School"));
    }
    Ok(Json(json!({ "message": "School deleted" })))
}
