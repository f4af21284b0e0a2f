use axum::{extract::State, http::StatusCode, Json};

use crate::error::ApiError;
use crate::middleware::auth::require_admin;
use crate::models::auth::AuthenticatedUser;
use crate::models::user::{LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use crate::services::metrics::{LOGINS_COUNTER, REGISTRATIONS_COUNTER};
use crate::services::users::{RegisterError, UserService};
use crate::AppState;

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = match state.identity.sign_in(&body.email, &body.password).await {
        Ok(token) => token,
        Err(_) => {
            LOGINS_COUNTER.with_label_values(&["failure"]).inc();
            return Err(ApiError::Unauthorized("Invalid credentials"));
        }
    };

    let verified = state
        .identity
        .verify_id_token(&token)
        .await
        .map_err(ApiError::Internal)?;
    let user = UserService::find_by_auth_uid(&state.db, &verified.uid)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::Unauthorized("Unknown or deactivated user"))?;

    LOGINS_COUNTER.with_label_values(&["success"]).inc();
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

pub async fn me(user: AuthenticatedUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": user.user_id,
        "email": user.email,
        "role": user.role.to_string(),
        "school_id": user.school_id,
    }))
}

/// Admin-only staff registration. Creates the identity account and the
/// profile row; a failed profile save rolls the identity account back.
pub async fn register(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    require_admin(&user)?;

    match UserService::register(&state.db, state.identity.as_ref(), &body).await {
        Ok(created) => {
            REGISTRATIONS_COUNTER.with_label_values(&["success"]).inc();
            Ok((StatusCode::CREATED, Json(created.into())))
        }
        Err(RegisterError::AlreadyExists) => {
            REGISTRATIONS_COUNTER.with_label_values(&["duplicate"]).inc();
            Err(ApiError::Validation("User already exists".into()))
        }
        Err(RegisterError::Other(e)) => {
            REGISTRATIONS_COUNTER.with_label_values(&["failure"]).inc();
            Err(ApiError::Internal(e))
        }
    }
}
