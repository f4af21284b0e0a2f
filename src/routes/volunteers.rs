use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::require_admin;
use crate::models::auth::AuthenticatedUser;
use crate::models::volunteer::{SubmitVolunteerRequest, UpdateVolunteerRequest, VolunteerRequest};
use crate::services::metrics::VOLUNTEER_SUBMISSIONS_COUNTER;
use crate::services::volunteers::VolunteerService;
use crate::AppState;

/// Public form submission. Validation reports every missing required field
/// in one response.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitVolunteerRequest>,
) -> Result<(StatusCode, Json<VolunteerRequest>), ApiError> {
    let missing = VolunteerService::missing_fields(&body);
    if !missing.is_empty() {
        VOLUNTEER_SUBMISSIONS_COUNTER
            .with_label_values(&["invalid"])
            .inc();
        return Err(ApiError::missing_fields(&missing));
    }

    let request = VolunteerService::submit(&state.db, &body)
        .await
        .map_err(ApiError::Internal)?;
    VOLUNTEER_SUBMISSIONS_COUNTER
        .with_label_values(&["accepted"])
        .inc();
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<VolunteerRequest>>, ApiError> {
    require_admin(&user)?;
    let requests = VolunteerService::list(&state.db)
        .await
        .map_err(ApiError::Internal)?;
    Ok(Json(requests))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVolunteerRequest>,
) -> Result<Json<VolunteerRequest>, ApiError> {
    require_admin(&user)?;
    if let Some(status) = &body.status {
        let valid = ["new", "contacted", "onboarded", "declined"];
        if !valid.contains(&status.as_str()) {
            return Err(ApiError::Validation(format!("Invalid status: {status}")));
        }
    }
    let request = VolunteerService::update(&state.db, id, &body)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::NotFound("Volunteer request"))?;
    Ok(Json(request))
}
