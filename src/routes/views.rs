use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::auth::AuthenticatedUser;
use crate::services::views::{PlatformSummary, SchoolView, ViewService};
use crate::AppState;

/// Read-only dashboard tallies. Open to every authenticated role,
/// including view-only users.
pub async fn summary(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<PlatformSummary>, ApiError> {
    let summary = ViewService::summary(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(summary))
}

pub async fn school_view(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SchoolView>, ApiError> {
    let view = ViewService::school_view(&state.db, id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("School"))?;
    Ok(Json(view))
}
