use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::require_admin;
use crate::models::auth::AuthenticatedUser;
use crate::models::user::{UpdateUserRequest, UserProfile};
use crate::services::users::UserService;
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    require_admin(&user)?;
    let users = UserService::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    require_admin(&user)?;
    let updated = UserService::update(&state.db, id, &body)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(updated.into()))
}

/// Deletes both the profile row and the identity account.
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&user)?;
    if id == user.user_id {
        return Err(ApiError::Validation("Cannot delete your own account".into()));
    }
    UserService::delete(&state.db, state.identity.as_ref(), id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(json!({ "message": "User deleted" })))
}
